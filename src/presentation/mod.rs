//! Front-ends: a terminal loop and an HTTP chat server.

pub mod repl;
#[cfg(feature = "web")]
pub mod web;

use crate::config::Profile;

/// Interaction state of a front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Waiting for the next user message.
    #[default]
    Idle,
    /// A turn is running; no further input is taken until it finishes.
    Processing,
}

/// Opening line shown to the user. Display only; never stored in a session.
pub fn greeting(profile: Profile) -> &'static str {
    match profile {
        Profile::Github => {
            "Hello! I can search the internet and read your GitHub repositories. What shall we do today?"
        }
        Profile::Basic | Profile::Dated => {
            "Hello! I can search the internet, look things up on Wikipedia and convert dollars to Conchita coins. How can I help?"
        }
    }
}
