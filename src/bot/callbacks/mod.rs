//! Callbacks module for handling all inline keyboard callback queries
//!
//! This module is organized into submodules for different types of callbacks:
//! - `callback_handler`: Main routing handler for all callback queries
//! - `callback_types`: Payload parsing shared by keyboards and the router
//! - `recipe_callbacks`: Random recipe and category browsing
//! - `workflow_callbacks`: Payment choices and the category listing

pub mod callback_handler;
pub mod callback_types;
pub mod recipe_callbacks;
pub mod workflow_callbacks;
