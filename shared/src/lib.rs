#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;

mod app;
mod event;
mod model;

pub use app::{App, ComposerView, FooterView, ItemView, NoticeView, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::{EditDraft, Filter, Model, NewTodo, Todo, TodoId};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collection endpoint the four persistence calls are issued against.
/// Deployment-specific routing is the shell's concern.
pub const API_BASE_URL: &str = "https://api.todos.dev/v1";

/// Owner of the collection. Single-user system, so this is fixed.
pub const USER_ID: i64 = 837;

/// How long the error banner stays up before auto-dismissing.
pub const NOTICE_TIMEOUT_MS: u64 = 3000;

/// Composer refocus is deferred one tick so it lands after the input has
/// been re-enabled by the settle that scheduled it.
pub const COMPOSER_REFOCUS_DELAY_MS: u64 = 0;

/// Everything that can go wrong from the user's point of view. Each failure
/// is terminal for its operation and never fatal to the app; the user may
/// simply re-trigger the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum TodoError {
    #[error("Unable to load todos")]
    LoadFailed,
    #[error("Unable to add a todo")]
    AddFailed,
    #[error("Unable to delete a todo")]
    DeleteFailed,
    #[error("Unable to update a todo")]
    UpdateFailed,
    #[error("Title should not be empty")]
    EmptyTitle,
}

impl TodoError {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LoadFailed => "LOAD_FAILED",
            Self::AddFailed => "ADD_FAILED",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::EmptyTitle => "EMPTY_TITLE",
        }
    }

    /// Local validation failures never reach the network.
    #[must_use]
    pub const fn is_validation(self) -> bool {
        matches!(self, Self::EmptyTitle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_distinct() {
        let codes = [
            TodoError::LoadFailed.code(),
            TodoError::AddFailed.code(),
            TodoError::DeleteFailed.code(),
            TodoError::UpdateFailed.code(),
            TodoError::EmptyTitle.code(),
        ];

        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn only_empty_title_is_local_validation() {
        assert!(TodoError::EmptyTitle.is_validation());
        assert!(!TodoError::LoadFailed.is_validation());
        assert!(!TodoError::AddFailed.is_validation());
        assert!(!TodoError::DeleteFailed.is_validation());
        assert!(!TodoError::UpdateFailed.is_validation());
    }

    #[test]
    fn messages_are_user_readable() {
        assert_eq!(TodoError::LoadFailed.to_string(), "Unable to load todos");
        assert_eq!(TodoError::EmptyTitle.to_string(), "Title should not be empty");
    }
}
