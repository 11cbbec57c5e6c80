use serde::{Deserialize, Serialize};

use crate::model::{Filter, Todo, TodoId};

type HttpResult<T> = crux_http::Result<crux_http::Response<T>>;

/// Everything that can happen to the app: user intents, network
/// settlements, and timer firings. Settlement variants are shell-internal
/// and therefore not serializable across the FFI boundary.
#[derive(Serialize, Deserialize)]
pub enum Event {
    /// First mount: kick off the initial load and focus the composer.
    AppStarted,
    #[serde(skip)]
    LoadSettled(Box<HttpResult<Vec<Todo>>>),

    ComposerTextChanged {
        text: String,
    },
    /// Submit of the new-item form. Validates, then issues the create.
    ComposerSubmitted,
    #[serde(skip)]
    CreateSettled(Box<HttpResult<Todo>>),

    /// Checkbox on a single item.
    CompletionToggled {
        id: TodoId,
    },
    #[serde(skip)]
    UpdateSettled {
        id: TodoId,
        result: Box<HttpResult<Todo>>,
    },

    DeleteRequested {
        id: TodoId,
    },
    #[serde(skip)]
    DeleteSettled {
        id: TodoId,
        result: Box<HttpResult<Vec<u8>>>,
    },

    ToggleAllRequested,
    ClearCompletedRequested,
    FilterSelected {
        filter: Filter,
    },

    /// Double-click on an item title opens the inline editor.
    EditStarted {
        id: TodoId,
    },
    EditTextChanged {
        text: String,
    },
    /// Blur or form submit of the inline editor.
    EditCommitted,
    /// Escape key: discard the draft, commit nothing.
    EditCancelled,

    NoticeDismissed,
    NoticeExpired {
        timer: u64,
    },
    RefocusFired {
        timer: u64,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::LoadSettled(_) => "load_settled",
            Self::ComposerTextChanged { .. } => "composer_text_changed",
            Self::ComposerSubmitted => "composer_submitted",
            Self::CreateSettled(_) => "create_settled",
            Self::CompletionToggled { .. } => "completion_toggled",
            Self::UpdateSettled { .. } => "update_settled",
            Self::DeleteRequested { .. } => "delete_requested",
            Self::DeleteSettled { .. } => "delete_settled",
            Self::ToggleAllRequested => "toggle_all_requested",
            Self::ClearCompletedRequested => "clear_completed_requested",
            Self::FilterSelected { .. } => "filter_selected",
            Self::EditStarted { .. } => "edit_started",
            Self::EditTextChanged { .. } => "edit_text_changed",
            Self::EditCommitted => "edit_committed",
            Self::EditCancelled => "edit_cancelled",
            Self::NoticeDismissed => "notice_dismissed",
            Self::NoticeExpired { .. } => "notice_expired",
            Self::RefocusFired { .. } => "refocus_fired",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ComposerTextChanged { .. }
                | Self::ComposerSubmitted
                | Self::CompletionToggled { .. }
                | Self::DeleteRequested { .. }
                | Self::ToggleAllRequested
                | Self::ClearCompletedRequested
                | Self::FilterSelected { .. }
                | Self::EditStarted { .. }
                | Self::EditTextChanged { .. }
                | Self::EditCommitted
                | Self::EditCancelled
                | Self::NoticeDismissed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlements_and_timers_are_not_user_initiated() {
        assert!(!Event::AppStarted.is_user_initiated());
        assert!(!Event::NoticeExpired { timer: 1 }.is_user_initiated());
        assert!(!Event::RefocusFired { timer: 1 }.is_user_initiated());

        assert!(Event::ComposerSubmitted.is_user_initiated());
        assert!(Event::ToggleAllRequested.is_user_initiated());
        assert!(Event::NoticeDismissed.is_user_initiated());
    }

    #[test]
    fn user_intents_round_trip_through_serde() {
        let event = Event::FilterSelected {
            filter: Filter::Active,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "filter_selected");
    }
}
