use crux_core::testing::AppTester;
use crux_http::protocol::HttpRequest;
use crux_http::testing::ResponseBuilder;
use crux_http::HttpError;
use shared::capabilities::TimerOperation;
use shared::{App, Effect, Event, Model, Todo, TodoError, TodoId, NOTICE_TIMEOUT_MS, USER_ID};

fn todo(id: i64, title: &str, completed: bool) -> Todo {
    Todo {
        id: TodoId(id),
        user_id: USER_ID,
        title: title.into(),
        completed,
    }
}

fn http_requests(effects: &[Effect]) -> Vec<&HttpRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(&request.operation),
            _ => None,
        })
        .collect()
}

fn timer_starts(effects: &[Effect]) -> Vec<(u64, u64)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Timer(request) => match request.operation {
                TimerOperation::Start { id, millis } => Some((id, millis)),
                TimerOperation::Cancel { .. } => None,
            },
            _ => None,
        })
        .collect()
}

#[test]
fn startup_requests_the_collection_and_focuses_the_composer() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    let update = app.update(Event::AppStarted, &mut model);

    assert!(model.is_loading);
    assert_eq!(model.focus_generation, 1);

    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert!(requests[0].url.ends_with(&format!("/todos?userId={USER_ID}")));
    assert!(update
        .effects
        .iter()
        .any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn successful_load_replaces_the_collection() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(Event::AppStarted, &mut model);

    let response = ResponseBuilder::ok()
        .body(vec![todo(1, "walk the dog", false), todo(2, "read", true)])
        .build();
    app.update(Event::LoadSettled(Box::new(Ok(response))), &mut model);

    assert!(!model.is_loading);
    assert_eq!(model.todos.len(), 2);
    assert_eq!(model.todos[0], todo(1, "walk the dog", false));
    assert!(model.notice.is_none());
}

#[test]
fn failed_load_surfaces_the_error_and_leaves_the_collection_empty() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(Event::AppStarted, &mut model);
    let update = app.update(
        Event::LoadSettled(Box::new(Err(HttpError::Io("connection reset".into())))),
        &mut model,
    );

    assert!(!model.is_loading);
    assert!(model.todos.is_empty());
    assert_eq!(model.notice, Some(TodoError::LoadFailed));

    // The dismissal countdown is armed for the full window.
    let starts = timer_starts(&update.effects);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].1, NOTICE_TIMEOUT_MS);
}

#[test]
fn blank_submission_never_reaches_the_network() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(
        Event::ComposerTextChanged { text: "   ".into() },
        &mut model,
    );
    let update = app.update(Event::ComposerSubmitted, &mut model);

    assert!(http_requests(&update.effects).is_empty());
    assert_eq!(model.notice, Some(TodoError::EmptyTitle));
    assert!(model.pending_create.is_none());
    assert!(model.composer_enabled);
}

#[test]
fn create_posts_the_trimmed_title_and_appends_the_server_item() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    app.update(
        Event::ComposerTextChanged {
            text: "  buy milk  ".into(),
        },
        &mut model,
    );
    let update = app.update(Event::ComposerSubmitted, &mut model);

    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert!(requests[0].url.ends_with("/todos"));

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["userId"], USER_ID);
    assert_eq!(body["title"], "buy milk");
    assert_eq!(body["completed"], false);
    assert!(body.get("id").is_none());

    // While the call is outstanding the composer is locked and the
    // placeholder overlays the list.
    assert!(!model.composer_enabled);
    let pending = model.pending_create.as_ref().unwrap();
    assert!(pending.id.is_placeholder());
    assert_eq!(pending.title, "buy milk");
    assert!(model.todos.is_empty());

    let response = ResponseBuilder::ok().body(todo(101, "buy milk", false)).build();
    let update = app.update(Event::CreateSettled(Box::new(Ok(response))), &mut model);

    assert_eq!(model.todos, vec![todo(101, "buy milk", false)]);
    assert!(model.pending_create.is_none());
    assert!(model.composer_enabled);
    assert_eq!(model.composer_text, "");

    // Settling schedules a refocus of the composer.
    assert_eq!(timer_starts(&update.effects).len(), 1);
    let refocus = model.refocus_timer.unwrap();
    app.update(Event::RefocusFired { timer: refocus }, &mut model);
    assert_eq!(model.focus_generation, 1);
}

#[test]
fn failed_create_leaves_the_collection_unchanged() {
    let app = AppTester::<App, _>::default();
    let mut model = Model::default();

    let response = ResponseBuilder::ok().body(vec![todo(1, "a", false)]).build();
    app.update(Event::LoadSettled(Box::new(Ok(response))), &mut model);

    app.update(
        Event::ComposerTextChanged {
            text: "new item".into(),
        },
        &mut model,
    );
    app.update(Event::ComposerSubmitted, &mut model);
    app.update(
        Event::CreateSettled(Box::new(Err(HttpError::Io("connection reset".into())))),
        &mut model,
    );

    assert_eq!(model.todos, vec![todo(1, "a", false)]);
    assert!(model.pending_create.is_none());
    assert!(model.composer_enabled);
    assert_eq!(model.notice, Some(TodoError::AddFailed));
    // The rejected text stays in the composer for another attempt.
    assert_eq!(model.composer_text, "new item");
}
