use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::model::{EditDraft, Filter, Model, NewTodo, Todo, TodoId};
use crate::{TodoError, API_BASE_URL, COMPOSER_REFOCUS_DELAY_MS, NOTICE_TIMEOUT_MS, USER_ID};

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "handling event"
        );

        match event {
            Event::AppStarted => {
                model.is_loading = true;
                model.focus_generation += 1;
                Self::send_list_request(caps);
                caps.render.render();
            }

            Event::LoadSettled(result) => {
                model.is_loading = false;
                match Self::into_body(*result) {
                    Ok(todos) => model.todos = todos,
                    Err(cause) => {
                        warn!(code = TodoError::LoadFailed.code(), %cause, "load failed");
                        Self::show_notice(model, caps, TodoError::LoadFailed);
                    }
                }
                caps.render.render();
            }

            Event::ComposerTextChanged { text } => {
                model.composer_text = text;
                caps.render.render();
            }

            Event::ComposerSubmitted => {
                let title = model.composer_text.trim();
                if title.is_empty() {
                    Self::show_notice(model, caps, TodoError::EmptyTitle);
                    caps.render.render();
                    return;
                }

                let placeholder = Todo::new(title);
                match Self::send_create_request(&placeholder, caps) {
                    Ok(()) => {
                        model.composer_enabled = false;
                        model.pending_create = Some(placeholder);
                    }
                    Err(cause) => {
                        warn!(
                            code = TodoError::AddFailed.code(),
                            %cause, "create request not issued"
                        );
                        Self::show_notice(model, caps, TodoError::AddFailed);
                    }
                }
                caps.render.render();
            }

            Event::CreateSettled(result) => {
                model.pending_create = None;
                model.composer_enabled = true;

                match Self::into_body(*result) {
                    Ok(todo) => {
                        model.todos.push(todo);
                        model.composer_text.clear();
                    }
                    Err(cause) => {
                        warn!(code = TodoError::AddFailed.code(), %cause, "create failed");
                        Self::show_notice(model, caps, TodoError::AddFailed);
                    }
                }

                Self::schedule_refocus(model, caps);
                caps.render.render();
            }

            Event::CompletionToggled { id } => {
                let Some(todo) = model.todo(id).cloned() else {
                    return;
                };
                let completed = !todo.completed;
                Self::start_update(todo.with_completed(completed), model, caps);
                caps.render.render();
            }

            Event::UpdateSettled { id, result } => {
                model.in_flight.remove(&id);

                match Self::into_body(*result) {
                    Ok(stored) => {
                        // The server's value is authoritative for what got
                        // persisted.
                        model.replace_todo(stored);
                        model.clear_edit_for(id);
                    }
                    Err(cause) => {
                        warn!(
                            code = TodoError::UpdateFailed.code(),
                            %id,
                            %cause,
                            "update failed"
                        );
                        Self::show_notice(model, caps, TodoError::UpdateFailed);
                    }
                }
                caps.render.render();
            }

            Event::DeleteRequested { id } => {
                Self::start_delete(id, model, caps);
                caps.render.render();
            }

            Event::DeleteSettled { id, result } => {
                model.in_flight.remove(&id);

                match Self::status_only(*result) {
                    Ok(()) => {
                        model.remove_todo(id);
                        model.clear_edit_for(id);
                    }
                    Err(cause) => {
                        warn!(
                            code = TodoError::DeleteFailed.code(),
                            %id,
                            %cause,
                            "delete failed"
                        );
                        Self::show_notice(model, caps, TodoError::DeleteFailed);
                    }
                }

                Self::schedule_refocus(model, caps);
                caps.render.render();
            }

            Event::ToggleAllRequested => {
                let total = model.todos.len();
                let active: Vec<Todo> = model
                    .visible_todos(Filter::Active)
                    .into_iter()
                    .cloned()
                    .collect();
                let completed = total - active.len();

                // Uniform collection: flip everything. Mixed: complete the
                // stragglers and leave finished items alone.
                let replacements: Vec<Todo> = if active.len() == total || completed == total {
                    model
                        .todos
                        .iter()
                        .map(|t| t.with_completed(!t.completed))
                        .collect()
                } else {
                    active.iter().map(|t| t.with_completed(true)).collect()
                };

                // One independent call per item; partial failure leaves the
                // survivors changed and reports the last error.
                for todo in replacements {
                    Self::start_update(todo, model, caps);
                }
                caps.render.render();
            }

            Event::ClearCompletedRequested => {
                let completed: Vec<TodoId> = model
                    .visible_todos(Filter::Completed)
                    .iter()
                    .map(|t| t.id)
                    .collect();

                for id in completed {
                    Self::start_delete(id, model, caps);
                }
                caps.render.render();
            }

            Event::FilterSelected { filter } => {
                model.filter = filter;
                caps.render.render();
            }

            Event::EditStarted { id } => {
                let Some(todo) = model.todo(id).cloned() else {
                    return;
                };
                model.edit = Some(EditDraft::new(todo));
                caps.render.render();
            }

            Event::EditTextChanged { text } => {
                let Some(draft) = model.edit.as_mut() else {
                    return;
                };
                draft.text = text;
                caps.render.render();
            }

            Event::EditCommitted => {
                let Some(draft) = model.edit.clone() else {
                    return;
                };
                let title = draft.text.trim();

                if title.is_empty() {
                    // Blanking a title means "delete this item".
                    Self::start_delete(draft.item.id, model, caps);
                } else if title == draft.item.title {
                    model.edit = None;
                } else {
                    Self::start_update(draft.item.with_title(title), model, caps);
                }
                caps.render.render();
            }

            Event::EditCancelled => {
                model.edit = None;
                caps.render.render();
            }

            Event::NoticeDismissed => {
                model.notice = None;
                if let Some(timer) = model.notice_timer.take() {
                    caps.timer.cancel(timer);
                }
                caps.render.render();
            }

            Event::NoticeExpired { timer } => {
                // A superseded countdown must not dismiss a newer notice.
                if model.notice_timer == Some(timer) {
                    model.notice = None;
                    model.notice_timer = None;
                    caps.render.render();
                }
            }

            Event::RefocusFired { timer } => {
                if model.refocus_timer == Some(timer) {
                    model.refocus_timer = None;
                    model.focus_generation += 1;
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let mut items: Vec<ItemView> = model
            .visible_todos(model.filter)
            .into_iter()
            .map(|todo| ItemView {
                id: todo.id,
                title: todo.title.clone(),
                completed: todo.completed,
                busy: model.in_flight.contains(&todo.id),
                pending: false,
                edit_text: model
                    .edit
                    .as_ref()
                    .filter(|draft| draft.item.id == todo.id)
                    .map(|draft| draft.text.clone()),
            })
            .collect();

        // The creation placeholder overlays the rendered list regardless of
        // the filter; it is never part of the collection.
        if let Some(pending) = &model.pending_create {
            items.push(ItemView {
                id: pending.id,
                title: pending.title.clone(),
                completed: pending.completed,
                busy: true,
                pending: true,
                edit_text: None,
            });
        }

        let total = model.todos.len();
        let completed_count = model.completed_count();

        ViewModel {
            is_loading: model.is_loading,
            composer: ComposerView {
                text: model.composer_text.clone(),
                enabled: model.composer_enabled,
                focus_generation: model.focus_generation,
            },
            items,
            toggle_all_visible: total > 0,
            all_completed: total > 0 && completed_count == total,
            footer: (total > 0).then(|| FooterView {
                filter: model.filter,
                active_count: model.active_count(),
                completed_count,
                can_clear_completed: completed_count > 0,
            }),
            notice: model.notice.map(|error| NoticeView {
                message: error.to_string(),
                code: error.code().to_string(),
            }),
        }
    }
}

impl App {
    fn send_list_request(caps: &Capabilities) {
        caps.http
            .get(format!("{API_BASE_URL}/todos?userId={USER_ID}"))
            .expect_json()
            .send(|result| Event::LoadSettled(Box::new(result)));
    }

    fn send_create_request(todo: &Todo, caps: &Capabilities) -> Result<(), String> {
        let body = serde_json::to_vec(&NewTodo::from(todo)).map_err(|e| e.to_string())?;

        caps.http
            .post(format!("{API_BASE_URL}/todos"))
            .header("Content-Type", "application/json")
            .body(body)
            .expect_json()
            .send(|result| Event::CreateSettled(Box::new(result)));

        Ok(())
    }

    /// Issues one update call for a replacement value and marks the id
    /// in flight. The id leaves the set when the call settles.
    fn start_update(todo: Todo, model: &mut Model, caps: &Capabilities) {
        let id = todo.id;
        let body = match serde_json::to_vec(&todo) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    code = TodoError::UpdateFailed.code(),
                    %id,
                    cause = %e,
                    "update request not issued"
                );
                Self::show_notice(model, caps, TodoError::UpdateFailed);
                return;
            }
        };

        model.in_flight.insert(id);
        caps.http
            .put(format!("{API_BASE_URL}/todos/{id}"))
            .header("Content-Type", "application/json")
            .body(body)
            .expect_json()
            .send(move |result| Event::UpdateSettled {
                id,
                result: Box::new(result),
            });
    }

    fn start_delete(id: TodoId, model: &mut Model, caps: &Capabilities) {
        model.in_flight.insert(id);
        caps.http
            .delete(format!("{API_BASE_URL}/todos/{id}"))
            .send(move |result| Event::DeleteSettled {
                id,
                result: Box::new(result),
            });
    }

    /// Replaces the active notice and restarts the dismissal countdown.
    fn show_notice(model: &mut Model, caps: &Capabilities, error: TodoError) {
        if let Some(timer) = model.notice_timer.take() {
            caps.timer.cancel(timer);
        }

        let timer = model.next_timer();
        model.notice = Some(error);
        model.notice_timer = Some(timer);
        caps.timer
            .start(timer, NOTICE_TIMEOUT_MS, Event::NoticeExpired { timer });
    }

    /// Defers a composer refocus until after the settle that scheduled it
    /// has rendered and re-enabled the input.
    fn schedule_refocus(model: &mut Model, caps: &Capabilities) {
        if let Some(timer) = model.refocus_timer.take() {
            caps.timer.cancel(timer);
        }

        let timer = model.next_timer();
        model.refocus_timer = Some(timer);
        caps.timer
            .start(timer, COMPOSER_REFOCUS_DELAY_MS, Event::RefocusFired { timer });
    }

    /// A call settles successfully only if the transport succeeded, the
    /// status is a success status, and the expected body decoded.
    fn into_body<T>(result: crux_http::Result<crux_http::Response<T>>) -> Result<T, String> {
        match result {
            Ok(mut response) if response.status().is_success() => response
                .take_body()
                .ok_or_else(|| "response body missing".to_string()),
            Ok(response) => Err(format!("unexpected status {}", response.status())),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Delete responds with no body; only the status matters.
    fn status_only(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> Result<(), String> {
        match result {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("unexpected status {}", response.status())),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerView {
    pub text: String,
    pub enabled: bool,
    /// Increases every time the shell should focus the composer input.
    pub focus_generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    /// Show the busy overlay: an update or delete is outstanding.
    pub busy: bool,
    /// True only for the creation placeholder, which has no affordances.
    pub pending: bool,
    /// Working text of the inline editor when this item is being edited.
    pub edit_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterView {
    pub filter: Filter,
    pub active_count: usize,
    pub completed_count: usize,
    pub can_clear_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeView {
    pub message: String,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    /// True while the initial load is pending; the shell suppresses the
    /// list and renders a loading state instead.
    pub is_loading: bool,
    pub composer: ComposerView,
    pub items: Vec<ItemView>,
    pub toggle_all_visible: bool,
    pub all_completed: bool,
    /// Hidden entirely while the collection is empty.
    pub footer: Option<FooterView>,
    pub notice: Option<NoticeView>,
}
