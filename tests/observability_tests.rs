//! # Observability Tests Module
//!
//! Metrics recorded by the bot flows, spans and the health server routes.

#[cfg(test)]
mod tests {
    use hyper::{Method, StatusCode};
    use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};
    use recipe_of_the_day::observability::{self, UserAction};
    use std::time::Duration;

    fn recorder() -> PrometheusRecorder {
        PrometheusBuilder::new().build_recorder()
    }

    /// Recorded counters show up in the Prometheus export
    #[test]
    fn test_flow_counters_are_exported() {
        let recorder = recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            observability::record_callback_action("recipe");
            observability::record_callback_action("recipe");
            observability::record_callback_action("pay_now");
            observability::record_registration("success");
            observability::record_registration("failure");
            observability::record_recipe_delivery("random", 4);
            observability::record_telegram_message("text");
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"telegram_callbacks_total{action="recipe"} 2"#), "{}", rendered);
        assert!(rendered.contains(r#"telegram_callbacks_total{action="pay_now"} 1"#));
        assert!(rendered.contains(r#"registrations_total{result="success"} 1"#));
        assert!(rendered.contains(r#"registrations_total{result="failure"} 1"#));
        assert!(rendered.contains(r#"recipes_delivered_total{flow="random"} 1"#));
        assert!(rendered.contains(r#"telegram_messages_total{type="text"} 1"#));
    }

    #[test]
    fn test_error_and_engagement_metrics() {
        let recorder = recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            observability::record_error_metrics("conflict", "registration");
            observability::record_user_engagement_metrics(1, UserAction::PremiumStart, Some("ru"));
            observability::record_user_engagement_metrics(2, UserAction::RandomRecipe, None);
            observability::record_db_metrics("get_random_recipe", Duration::from_millis(3));
        });

        let rendered = handle.render();
        let errors = rendered
            .lines()
            .find(|line| line.starts_with("errors_total{"))
            .expect("errors_total exported");
        assert!(errors.contains(r#"type="conflict""#));
        assert!(errors.contains(r#"component="registration""#));
        assert!(rendered.contains(r#"user_actions_total{action="premium_start"} 1"#));
        assert!(rendered.contains(r#"user_language_usage_total{language="ru"} 1"#));
        assert!(rendered.contains(r#"db_operations_total{operation="get_random_recipe"} 1"#));
    }

    /// Recording without any installed recorder is a no-op
    #[test]
    fn test_recording_without_recorder_does_not_panic() {
        observability::record_callback_action("premium");
        observability::record_request_metrics("GET", 200, Duration::from_millis(5));
    }

    #[test]
    fn test_span_names() {
        let subscriber = tracing_subscriber::registry();
        tracing::subscriber::with_default(subscriber, || {
            let db_span = observability::db_span("list_categories", "categories");
            assert_eq!(db_span.metadata().map(|m| m.name()), Some("db_operation"));

            let telegram_span = observability::telegram_span("callback", Some(12345));
            assert_eq!(
                telegram_span.metadata().map(|m| m.name()),
                Some("telegram_operation")
            );
        });
    }

    #[tokio::test]
    async fn test_metrics_route_renders_recorded_values() {
        let recorder = recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            observability::record_registration("success");
        });

        let response =
            observability::route_health_request(&Method::GET, "/metrics", &handle, None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().contains("registrations_total"));
    }

    #[tokio::test]
    async fn test_readiness_checks_pass_without_database() {
        assert!(observability::perform_readiness_checks(None).await.is_ok());
    }
}
