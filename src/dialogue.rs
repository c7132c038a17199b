//! Registration dialogue module for handling conversation state with users.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::db::Registration;

/// Represents the conversation state of the premium registration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationState {
    /// No registration in progress
    #[default]
    Idle,
    AwaitingFirstName,
    AwaitingLastName {
        first_name: String,
    },
    AwaitingEmail {
        first_name: String,
        last_name: String,
    },
}

/// What a registration answer leads to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationStep {
    /// Store the next state and send its prompt
    Prompt(RegistrationState),
    /// All fields collected; create the profile and leave the dialogue
    Submit(Registration),
}

impl RegistrationState {
    /// Whether the user is in the middle of a registration
    pub fn is_active(&self) -> bool {
        !matches!(self, RegistrationState::Idle)
    }

    /// Consume one text answer. Input is taken verbatim, without validation.
    ///
    /// Returns `None` when no registration is in progress.
    pub fn accept(self, input: &str) -> Option<RegistrationStep> {
        match self {
            RegistrationState::Idle => None,
            RegistrationState::AwaitingFirstName => {
                Some(RegistrationStep::Prompt(RegistrationState::AwaitingLastName {
                    first_name: input.to_string(),
                }))
            }
            RegistrationState::AwaitingLastName { first_name } => {
                Some(RegistrationStep::Prompt(RegistrationState::AwaitingEmail {
                    first_name,
                    last_name: input.to_string(),
                }))
            }
            RegistrationState::AwaitingEmail {
                first_name,
                last_name,
            } => Some(RegistrationStep::Submit(Registration {
                first_name,
                last_name,
                email: input.to_string(),
            })),
        }
    }

    /// Localization key of the prompt sent on entering this state
    pub fn prompt_key(&self) -> Option<&'static str> {
        match self {
            RegistrationState::Idle => None,
            RegistrationState::AwaitingFirstName => Some("prompt-first-name"),
            RegistrationState::AwaitingLastName { .. } => Some("prompt-last-name"),
            RegistrationState::AwaitingEmail { .. } => Some("prompt-email"),
        }
    }
}

/// Type alias for the registration dialogue
pub type RegistrationDialogue =
    Dialogue<RegistrationState, InMemStorage<RegistrationState>>;
