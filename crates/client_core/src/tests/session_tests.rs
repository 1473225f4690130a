use super::*;
use crate::{
    request::RequestDescriptor,
    transport::{RawResponse, Transport, TransportFailure},
    view_state::{FailureKind, GENERIC_FAILURE_NOTICE},
};
use async_trait::async_trait;
use reqwest::Method;
use shared::domain::MovieId;
use std::{collections::HashMap, sync::Mutex};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Result<RawResponse, TransportFailure>>>,
}

impl ScriptedTransport {
    fn route(self, method: Method, path: &str, response: Result<RawResponse, TransportFailure>) -> Self {
        self.routes
            .lock()
            .expect("lock")
            .insert((method, path.to_string()), response);
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportFailure> {
        self.routes
            .lock()
            .expect("lock")
            .get(&(request.method.clone(), request.url.path().to_string()))
            .cloned()
            .unwrap_or_else(|| Ok(RawResponse::new(404, "")))
    }
}

fn session_with(transport: ScriptedTransport) -> ScreenSession {
    session_with_settings(transport, &Settings::default())
}

fn session_with_settings(transport: ScriptedTransport, settings: &Settings) -> ScreenSession {
    let client = RecommenderClient::new("http://scripted.test", Arc::new(transport))
        .with_no_favourites_message(settings.no_favourites_message.clone());
    ScreenSession::start_with_client(settings, Arc::new(client)).expect("session")
}

fn ok(body: &str) -> Result<RawResponse, TransportFailure> {
    Ok(RawResponse::new(200, body))
}

#[test]
fn empty_title_is_rejected_before_dispatch() {
    let mut session = session_with(ScriptedTransport::default());
    assert_eq!(session.add_favourite("alice", "   "), None);
    assert_eq!(session.status(), MISSING_TITLE_NOTICE);
    assert_eq!(session.pending(), 0);
}

#[test]
fn incomplete_context_is_rejected_before_dispatch() {
    let mut session = session_with(ScriptedTransport::default());
    assert_eq!(
        session.request_recommendations("alice", TimeOfWeek::Weekday, Some(Venue::Home), None),
        None
    );
    assert_eq!(session.status(), MISSING_CONTEXT_NOTICE);
}

#[test]
fn fetched_favourites_populate_the_view() {
    let mut session = session_with(ScriptedTransport::default().route(
        Method::GET,
        "/favourites",
        ok(r#"[{"movieId":1,"title":"A"}]"#),
    ));

    session.request_favourites("alice").expect("queued");
    assert_eq!(session.status(), "Fetching favourites...");
    let notices = session.wait_for_deliveries(WAIT);

    assert_eq!(
        notices,
        vec![Notice::CollectionChanged(CollectionKey::Favourites)]
    );
    let favourites = session.view().favourites();
    assert_eq!(favourites.keys(), vec![MovieId(1)]);
    assert_eq!(favourites.cards()[0].movie().title, "A");
    assert_eq!(session.status(), "Favourites updated");
    assert_eq!(session.pending(), 0);
}

#[test]
fn added_favourites_merge_after_existing_cards() {
    let mut session = session_with(
        ScriptedTransport::default()
            .route(Method::GET, "/favourites", ok(r#"[{"movieId":1,"title":"A"}]"#))
            .route(
                Method::POST,
                "/favourites",
                ok(r#"[{"movieId":1,"title":"A (changed)"},{"movieId":2,"title":"B"}]"#),
            ),
    );

    session.request_favourites("alice").expect("queued");
    session.wait_for_deliveries(WAIT);
    session.add_favourite("alice", "B").expect("queued");
    let notices = session.wait_for_deliveries(WAIT);

    assert_eq!(
        notices,
        vec![Notice::CollectionChanged(CollectionKey::Favourites)]
    );
    let favourites = session.view().favourites();
    assert_eq!(favourites.keys(), vec![MovieId(1), MovieId(2)]);
    assert_eq!(favourites.cards()[0].movie().title, "A");
}

#[test]
fn missing_favourites_rejection_shows_friendly_text() {
    let mut session = session_with(ScriptedTransport::default().route(
        Method::GET,
        "/",
        Ok(RawResponse::new(400, r#"{"error":"No favourite movies found"}"#)),
    ));

    session
        .request_recommendations(
            "alice",
            TimeOfWeek::Weekend,
            Some(Venue::Cinema),
            Some(Companion::Partner),
        )
        .expect("queued");
    let notices = session.wait_for_deliveries(WAIT);

    assert_eq!(
        notices,
        vec![Notice::Failure {
            kind: FailureKind::Domain,
            message: Settings::default().no_favourites_message,
        }]
    );
    assert!(session.view().categories().all(|(_, c)| c.is_empty()));
}

#[test]
fn contextual_recommendations_fill_both_categories() {
    let mut session = session_with(ScriptedTransport::default().route(
        Method::GET,
        "/",
        ok(r#"{"collab":[{"movieId":10},{"movieId":11}],"content":[{"movieId":20}]}"#),
    ));

    session
        .request_recommendations(
            "alice",
            TimeOfWeek::Weekday,
            Some(Venue::Home),
            Some(Companion::Alone),
        )
        .expect("queued");
    let notices = session.wait_for_deliveries(WAIT);

    assert_eq!(notices.len(), 2);
    let view = session.view();
    assert_eq!(
        view.category("collab").expect("collab").keys(),
        vec![MovieId(10), MovieId(11)]
    );
    assert_eq!(
        view.category("content").expect("content").keys(),
        vec![MovieId(20)]
    );
    assert!(view.favourites().is_empty());
}

#[test]
fn transport_failure_is_silent_by_default() {
    let mut session = session_with(ScriptedTransport::default().route(
        Method::GET,
        "/favourites",
        Err(TransportFailure::Timeout("deadline elapsed".to_string())),
    ));

    session.request_favourites("alice").expect("queued");
    let notices = session.wait_for_deliveries(Duration::from_millis(300));

    assert!(notices.is_empty());
    assert!(session.view().favourites().is_empty());
    assert_eq!(session.status(), "Fetching favourites...");
    assert_eq!(session.pending(), 1);
}

#[test]
fn transport_failure_leaves_view_untouched() {
    let settings = Settings {
        notify_transport_failures: true,
        ..Settings::default()
    };
    let mut session = session_with_settings(
        ScriptedTransport::default().route(
            Method::GET,
            "/favourites",
            Err(TransportFailure::Timeout("deadline elapsed".to_string())),
        ),
        &settings,
    );

    session.request_favourites("alice").expect("queued");
    let notices = session.wait_for_deliveries(WAIT);

    assert_eq!(
        notices,
        vec![Notice::Failure {
            kind: FailureKind::Transport,
            message: GENERIC_FAILURE_NOTICE.to_string(),
        }]
    );
    assert!(session.view().favourites().is_empty());
    assert_eq!(session.status(), GENERIC_FAILURE_NOTICE);
}

#[test]
fn dropped_responses_stay_pending_until_forgotten() {
    let mut session = session_with(ScriptedTransport::default());

    session.request_favourites("alice").expect("queued");
    let notices = session.wait_for_deliveries(Duration::from_millis(200));

    assert!(notices.is_empty());
    assert_eq!(session.pending(), 1);
    session.forget_pending();
    assert_eq!(session.pending(), 0);
    session.close_and_wait();
}

#[test]
fn dispatch_reports_disconnected_backend() {
    let (cmd_tx, cmd_rx) = bounded(1);
    drop(cmd_rx);
    let mut status = String::new();

    let queued = QueuedFetch::new(FetchCommand::FetchFavourites {
        user: "alice".to_string(),
    });
    assert!(!dispatch_fetch_command(&cmd_tx, queued, &mut status));
    assert!(status.contains("not running"));
}

#[test]
fn dispatch_reports_full_queue() {
    let (cmd_tx, _cmd_rx) = bounded(1);
    let mut status = String::new();
    let fetch = || {
        QueuedFetch::new(FetchCommand::FetchFavourites {
            user: "alice".to_string(),
        })
    };

    assert!(dispatch_fetch_command(&cmd_tx, fetch(), &mut status));
    assert!(!dispatch_fetch_command(&cmd_tx, fetch(), &mut status));
    assert!(status.contains("full"));
}
