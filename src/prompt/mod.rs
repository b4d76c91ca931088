//! Prompt assembly: a fixed system directive plus ordered slots for the
//! conversation history, the user's input and the tool-call scratchpad.

use bon::Builder;
use chrono::NaiveDate;

use crate::config::Profile;
use crate::types::ModelMessage;

/// Directive for the search, Wikipedia and currency profiles.
pub const GENERAL_DIRECTIVE: &str = "You are a helpful assistant. You can search the internet, \
look things up on Wikipedia and convert US dollars to Conchita coins.";

/// Directive for the GitHub profile.
pub const GITHUB_DIRECTIVE: &str = "You are a technical assistant. You can search the internet \
and use the GitHub API to review repositories, issues and files.";

/// Appended when the profile asks the model to persist with searches.
pub const RETRY_ADVISORY: &str = "If a search does not return a good answer on the first try, \
search again with different keywords before answering.";

/// Placeholder positions in a rendered prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSlot {
    System,
    History,
    Input,
    Scratchpad,
}

/// Slot order used by every template.
pub const SLOT_ORDER: [PromptSlot; 4] = [
    PromptSlot::System,
    PromptSlot::History,
    PromptSlot::Input,
    PromptSlot::Scratchpad,
];

/// The instruction set sent ahead of each model request.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct PromptTemplate {
    #[builder(into)]
    directive: String,
    /// Append today's (local) date to the directive.
    #[builder(default)]
    inject_date: bool,
    #[builder(default)]
    retry_advisory: bool,
}

impl PromptTemplate {
    /// Template for a profile, optionally replacing its directive.
    pub fn for_profile(profile: Profile, directive_override: Option<&str>) -> Self {
        let directive = directive_override.unwrap_or(match profile {
            Profile::Github => GITHUB_DIRECTIVE,
            Profile::Basic | Profile::Dated => GENERAL_DIRECTIVE,
        });
        Self::builder()
            .directive(directive)
            .inject_date(profile.inject_date())
            .retry_advisory(profile.retry_advisory())
            .build()
    }

    /// System text for today.
    pub fn system_text(&self) -> String {
        self.system_text_on(chrono::Local::now().date_naive())
    }

    pub fn system_text_on(&self, today: NaiveDate) -> String {
        let mut text = self.directive.clone();
        if self.inject_date {
            text.push_str(&format!(" Today's date is {}.", today.format("%Y-%m-%d")));
        }
        if self.retry_advisory {
            text.push(' ');
            text.push_str(RETRY_ADVISORY);
        }
        text
    }

    /// Expand the slots in order.
    pub fn render(
        &self,
        history: &[ModelMessage],
        input: &str,
        scratchpad: &[ModelMessage],
    ) -> Vec<ModelMessage> {
        let mut messages = Vec::with_capacity(history.len() + scratchpad.len() + 2);
        for slot in SLOT_ORDER {
            match slot {
                PromptSlot::System => messages.push(ModelMessage::system(self.system_text())),
                PromptSlot::History => messages.extend_from_slice(history),
                PromptSlot::Input => messages.push(ModelMessage::user(input)),
                PromptSlot::Scratchpad => messages.extend_from_slice(scratchpad),
            }
        }
        messages
    }
}
