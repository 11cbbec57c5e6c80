use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{TodoError, USER_ID};

/// Server-assigned item identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TodoId(pub i64);

impl TodoId {
    /// Sentinel for an item that has not been persisted yet. Only the
    /// creation placeholder carries it; it never enters the collection.
    pub const PLACEHOLDER: Self = Self(0);

    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 == Self::PLACEHOLDER.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One to-do entry, as stored by the server. Mutations never edit in
/// place; they build a replacement value and swap it in wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// A fresh, not-yet-persisted entry. Callers trim the title first.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TodoId::PLACEHOLDER,
            user_id: USER_ID,
            title: title.into(),
            completed: false,
        }
    }

    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Body of the create call; the server assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl From<&Todo> for NewTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            user_id: todo.user_id,
            title: todo.title.clone(),
            completed: todo.completed,
        }
    }
}

/// View projection over the collection. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

/// Working copy of the item currently open for inline editing. The
/// snapshot keeps the original title around so an unchanged commit can be
/// recognized without a network call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDraft {
    pub item: Todo,
    pub text: String,
}

impl EditDraft {
    #[must_use]
    pub fn new(item: Todo) -> Self {
        let text = item.title.clone();
        Self { item, text }
    }
}

/// The single source of truth. Only `App::update` mutates it, one event at
/// a time.
#[derive(Debug)]
pub struct Model {
    /// Ordered collection as last confirmed by the server. Ids are unique.
    pub todos: Vec<Todo>,
    pub filter: Filter,
    /// True while the initial load is pending; suppresses the list view.
    pub is_loading: bool,

    pub composer_text: String,
    /// The composer is disabled while a create call is outstanding.
    pub composer_enabled: bool,
    /// Creation placeholder, overlaid on the rendered list. Held outside
    /// `todos` so the collection never contains the sentinel id.
    pub pending_create: Option<Todo>,

    /// Ids with an outstanding update or delete; drives busy overlays.
    /// An id enters when the call is issued and leaves when it settles.
    pub in_flight: HashSet<TodoId>,
    pub edit: Option<EditDraft>,

    /// Single-slot error banner.
    pub notice: Option<TodoError>,

    /// Live timer ids. Single-slot each: starting a new timer cancels the
    /// one in the slot, and a firing whose id no longer matches is stale.
    pub notice_timer: Option<u64>,
    pub refocus_timer: Option<u64>,
    pub timer_seq: u64,

    /// The shell focuses the composer whenever this increases.
    pub focus_generation: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            filter: Filter::All,
            is_loading: false,
            composer_text: String::new(),
            composer_enabled: true,
            pending_create: None,
            in_flight: HashSet::new(),
            edit: None,
            notice: None,
            notice_timer: None,
            refocus_timer: None,
            timer_seq: 0,
            focus_generation: 0,
        }
    }
}

impl Model {
    /// Projection of the collection through a status filter, preserving
    /// relative order. Recomputed from current state on every call.
    #[must_use]
    pub fn visible_todos(&self, filter: Filter) -> Vec<&Todo> {
        self.todos.iter().filter(|t| filter.matches(t)).collect()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.visible_todos(Filter::Active).len()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.visible_todos(Filter::Completed).len()
    }

    #[must_use]
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Swaps in the server's canonical value for an existing item.
    pub(crate) fn replace_todo(&mut self, incoming: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == incoming.id) {
            *slot = incoming;
        }
    }

    pub(crate) fn remove_todo(&mut self, id: TodoId) {
        self.todos.retain(|t| t.id != id);
    }

    /// Drops the edit selection if it targets the given item.
    pub(crate) fn clear_edit_for(&mut self, id: TodoId) {
        if self.edit.as_ref().is_some_and(|draft| draft.item.id == id) {
            self.edit = None;
        }
    }

    pub(crate) fn next_timer(&mut self) -> u64 {
        self.timer_seq = self.timer_seq.wrapping_add(1);
        self.timer_seq
    }
}
