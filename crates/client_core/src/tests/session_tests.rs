use std::sync::Mutex;

use serde_json::{json, Value};

use super::*;

fn user(name: &str) -> UserData {
    UserData::new(json!({ "name": name }))
}

fn sample_states() -> Vec<SessionState> {
    vec![
        SessionState::idle(),
        SessionState::pending(),
        SessionState::resolved(user("a")),
    ]
}

#[derive(Default)]
struct RecordingMiddleware {
    seen: Mutex<Vec<(String, SessionPhase, SessionPhase)>>,
}

impl SessionMiddleware for RecordingMiddleware {
    fn after_dispatch(&self, intent: &Intent, previous: &SessionState, next: &SessionState) {
        self.seen.lock().expect("lock").push((
            intent.kind().to_string(),
            previous.phase(),
            next.phase(),
        ));
    }
}

#[test]
fn logging_in_always_yields_pending() {
    for state in sample_states() {
        let next = reduce(&state, Intent::LoggingIn);
        assert!(next.is_loading);
        assert_eq!(next.data, None);
        assert_eq!(next.phase(), SessionPhase::Pending);
    }
}

#[test]
fn logged_in_always_yields_resolved_payload() {
    for state in sample_states() {
        let next = reduce(&state, Intent::LoggedIn(user("b")));
        assert_eq!(next.data, Some(user("b")));
        assert!(!next.is_loading);
    }
}

#[test]
fn logged_out_resets_to_initial_state() {
    for state in sample_states() {
        let next = reduce(&state, Intent::LoggedOut);
        assert_eq!(next, SessionState::idle());
    }
}

#[test]
fn logged_out_is_idempotent() {
    let once = reduce(&SessionState::resolved(user("a")), Intent::LoggedOut);
    let twice = reduce(&once, Intent::LoggedOut);
    assert_eq!(once, twice);
}

#[test]
fn unrecognized_intent_is_identity() {
    for state in sample_states() {
        let next = reduce(&state, Intent::Unrecognized("USER_RENAMED".into()));
        assert_eq!(next, state);
    }
}

#[test]
fn no_reachable_state_is_loading_with_data() {
    let intents = [
        Intent::LoggingIn,
        Intent::LoggedIn(user("a")),
        Intent::Unrecognized("X".into()),
        Intent::LoggingIn,
        Intent::LoggedOut,
        Intent::LoggedIn(user("c")),
        Intent::LoggingIn,
    ];

    let mut state = SessionState::idle();
    for intent in intents {
        state = reduce(&state, intent);
        assert!(!(state.data.is_some() && state.is_loading), "{state:?}");
    }
}

#[test]
fn store_walks_login_then_logout_scenario() {
    let store = SessionStore::new();
    assert_eq!(store.state(), SessionState::idle());

    let pending = store.dispatch(Intent::LoggingIn);
    assert!(pending.is_loading());
    assert_eq!(pending.user(), None);

    let resolved = store.dispatch(Intent::LoggedIn(user("a")));
    assert_eq!(resolved.user(), Some(&user("a")));
    assert!(!resolved.is_loading());
    assert_eq!(store.state(), resolved);

    let idle = store.dispatch(Intent::LoggedOut);
    assert_eq!(idle, SessionState::idle());
    assert_eq!(store.state(), SessionState::idle());
}

#[test]
fn cloned_handles_share_state() {
    let store = SessionStore::new();
    let other = store.clone();

    other.dispatch(Intent::LoggedIn(user("a")));
    assert_eq!(store.state().user(), Some(&user("a")));
}

#[tokio::test]
async fn observers_see_changes_but_not_no_ops() {
    let store = SessionStore::new();
    let mut rx = store.subscribe();
    assert!(!rx.has_changed().expect("sender alive"));

    store.dispatch(Intent::Unrecognized("NOPE".into()));
    assert!(!rx.has_changed().expect("sender alive"));

    store.dispatch(Intent::LoggingIn);
    rx.changed().await.expect("changed");
    assert_eq!(rx.borrow_and_update().phase(), SessionPhase::Pending);

    store.dispatch(Intent::LoggedOut);
    store.dispatch(Intent::LoggedOut);
    rx.changed().await.expect("changed");
    assert_eq!(*rx.borrow_and_update(), SessionState::idle());
    assert!(!rx.has_changed().expect("sender alive"));
}

#[test]
fn middleware_observes_every_dispatch_in_order() {
    let recorder = Arc::new(RecordingMiddleware::default());
    let store = SessionStore::new_with_middleware(vec![
        recorder.clone() as Arc<dyn SessionMiddleware>,
        Arc::new(TracingMiddleware),
    ]);

    store.dispatch(Intent::LoggingIn);
    store.dispatch(Intent::Unrecognized("X".into()));
    store.dispatch(Intent::LoggedIn(user("a")));

    let seen = recorder.seen.lock().expect("lock").clone();
    assert_eq!(
        seen,
        vec![
            (
                "USER_LOGGING_IN".to_string(),
                SessionPhase::Idle,
                SessionPhase::Pending
            ),
            ("X".to_string(), SessionPhase::Pending, SessionPhase::Pending),
            (
                "USER_LOGGED_IN".to_string(),
                SessionPhase::Pending,
                SessionPhase::Resolved
            ),
        ]
    );
}

#[test]
fn decoded_intents_drive_the_store() {
    let store = SessionStore::new();
    let intent: Intent = serde_json::from_value(json!({
        "type": "USER_LOGGED_IN",
        "payload": {"name": "a"}
    }))
    .expect("decode intent");

    let state = store.dispatch(intent);
    assert_eq!(state.user(), Some(&user("a")));
}

#[test]
fn logged_in_without_user_stays_idle() {
    for state in sample_states() {
        let next = reduce(&state, Intent::LoggedIn(UserData::new(Value::Null)));
        assert_eq!(next.phase(), SessionPhase::Idle);
        assert_eq!(next, SessionState::idle());
    }

    let intent: Intent =
        serde_json::from_value(json!({"type": "USER_LOGGED_IN"})).expect("decode intent");
    let store = SessionStore::new();
    store.dispatch(Intent::LoggingIn);
    assert_eq!(store.dispatch(intent), SessionState::idle());
}

#[test]
fn session_state_survives_json_round_trip() {
    for state in sample_states() {
        let encoded = serde_json::to_value(&state).expect("encode");
        let decoded: SessionState = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, state);
    }
}

#[test]
fn decoding_rejects_data_while_loading() {
    let err = serde_json::from_value::<SessionState>(json!({
        "data": {"name": "a"},
        "is_loading": true
    }))
    .expect_err("loading with data");
    assert!(err.to_string().contains("cannot carry data while loading"), "{err}");

    let pending: SessionState =
        serde_json::from_value(json!({"data": null, "is_loading": true})).expect("pending");
    assert_eq!(pending.phase(), SessionPhase::Pending);
}

#[test]
fn concurrent_handles_reach_middleware_once_per_dispatch() {
    let recorder = Arc::new(RecordingMiddleware::default());
    let store = SessionStore::new_with_middleware(vec![recorder.clone() as Arc<dyn SessionMiddleware>]);

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    store.dispatch(Intent::LoggingIn);
                    store.dispatch(Intent::LoggedIn(user(&format!("w{i}"))));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    assert_eq!(recorder.seen.lock().expect("lock").len(), 200);
    assert_eq!(store.state().phase(), SessionPhase::Resolved);
}
