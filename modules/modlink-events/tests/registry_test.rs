//! HandlerRegistry and SharedRegistry behaviour.
//! Dispatch is synchronous, so every assertion runs right after the call.

use std::sync::{Arc, Mutex};
use std::thread;

use modlink_events::{
    CollisionPolicy, EventKind, EventPtr, EventVariant, HandlerRegistry, RegistryConfig,
    RegistryError, SharedRegistry,
};

// ---------------------------------------------------------------------------
// Test event types
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MessageEvent {
    text: String,
}

impl EventVariant for MessageEvent {
    const KIND: EventKind = 1;

    fn render(&self) -> String {
        format!("MessageEvent: {}", self.text)
    }
}

#[derive(Debug)]
struct ErrorEvent {
    message: String,
}

impl EventVariant for ErrorEvent {
    const KIND: EventKind = 2;

    fn render(&self) -> String {
        format!("ErrorEvent: {}", self.message)
    }
}

/// Shares kind 1 with `MessageEvent`, an authoring mistake the registry must catch.
#[derive(Debug)]
struct ImpostorEvent;

impl EventVariant for ImpostorEvent {
    const KIND: EventKind = 1;

    fn render(&self) -> String {
        "ImpostorEvent".into()
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn message(text: &str) -> EventPtr {
    Arc::new(MessageEvent { text: text.into() })
}

fn error(text: &str) -> EventPtr {
    Arc::new(ErrorEvent {
        message: text.into(),
    })
}

type Captured = Arc<Mutex<Vec<String>>>;

fn captured() -> Captured {
    Arc::new(Mutex::new(Vec::new()))
}

fn snapshot(captured: &Captured) -> Vec<String> {
    captured.lock().unwrap().clone()
}

fn capture_messages(registry: &mut HandlerRegistry, sink: &Captured) {
    let sink = Arc::clone(sink);
    registry.subscribe::<MessageEvent, _>(move |event| {
        sink.lock().unwrap().push(event.text.clone());
    });
}

fn capture_errors(registry: &mut HandlerRegistry, sink: &Captured) {
    let sink = Arc::clone(sink);
    registry.subscribe::<ErrorEvent, _>(move |event| {
        sink.lock().unwrap().push(event.message.clone());
    });
}

// =========================================================================
// Dispatch
// =========================================================================

#[test]
fn hello_scenario() {
    let mut registry = HandlerRegistry::new();
    let messages = captured();
    capture_messages(&mut registry, &messages);

    assert_eq!(registry.process_event(&message("Hello")), Ok(true));
    assert_eq!(snapshot(&messages), vec!["Hello"]);

    // Kind 2 has no handler
    assert_eq!(registry.process_event(&error("boom")), Ok(false));
    assert_eq!(snapshot(&messages), vec!["Hello"]);
}

#[test]
fn dispatch_routes_by_the_declared_kind() {
    #[derive(Debug)]
    struct Beacon;

    impl EventVariant for Beacon {
        const KIND: EventKind = 5;

        fn render(&self) -> String {
            "Beacon".into()
        }
    }

    let mut registry = HandlerRegistry::new();
    let hits = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&hits);
    registry.subscribe::<Beacon, _>(move |_| *counter.lock().unwrap() += 1);

    let beacon: EventPtr = Arc::new(Beacon);
    assert_eq!(beacon.kind(), Beacon::KIND);
    assert_eq!(registry.kinds(), vec![Beacon::KIND]);
    assert_eq!(registry.process_event(&beacon), Ok(true));
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn dispatch_invokes_only_the_matching_handler() {
    let mut registry = HandlerRegistry::new();
    let messages = captured();
    let errors = captured();
    capture_messages(&mut registry, &messages);
    capture_errors(&mut registry, &errors);

    registry.process_event(&message("Hello")).unwrap();
    registry.process_event(&error("Database error")).unwrap();

    assert_eq!(snapshot(&messages), vec!["Hello"]);
    assert_eq!(snapshot(&errors), vec!["Database error"]);
}

#[test]
fn each_dispatch_invokes_the_handler_exactly_once() {
    let mut registry = HandlerRegistry::new();
    let calls = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&calls);
    registry.subscribe::<MessageEvent, _>(move |_| *counter.lock().unwrap() += 1);

    for _ in 0..3 {
        registry.process_event(&message("tick")).unwrap();
    }

    assert_eq!(*calls.lock().unwrap(), 3);
}

#[test]
fn empty_registry_handles_nothing() {
    let mut registry = HandlerRegistry::new();

    assert!(registry.is_empty());
    assert_eq!(registry.process_event(&message("Test")), Ok(false));
    assert_eq!(registry.process_event(&error("Test")), Ok(false));
}

#[test]
fn handler_may_retain_the_shared_event() {
    let mut registry = HandlerRegistry::new();
    let kept: Arc<Mutex<Vec<Arc<MessageEvent>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&kept);
    registry.subscribe::<MessageEvent, _>(move |event| sink.lock().unwrap().push(event));

    let event = message("keep me");
    registry.process_event(&event).unwrap();
    drop(event);

    let kept = kept.lock().unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].text, "keep me");
}

// =========================================================================
// Subscription lifecycle
// =========================================================================

#[test]
fn resubscribe_replaces_the_previous_handler() {
    let mut registry = HandlerRegistry::new();
    let first = captured();
    let second = captured();
    capture_messages(&mut registry, &first);
    capture_messages(&mut registry, &second);

    registry.process_event(&message("only the newest")).unwrap();

    assert!(snapshot(&first).is_empty());
    assert_eq!(snapshot(&second), vec!["only the newest"]);
    assert_eq!(registry.len(), 1);
}

#[test]
fn unsubscribe_leaves_other_kinds_untouched() {
    let mut registry = HandlerRegistry::new();
    let messages = captured();
    let errors = captured();
    capture_messages(&mut registry, &messages);
    capture_errors(&mut registry, &errors);

    registry.process_event(&message("First")).unwrap();
    assert!(registry.unsubscribe(MessageEvent::KIND));

    assert_eq!(registry.process_event(&message("Second")), Ok(false));
    assert_eq!(snapshot(&messages), vec!["First"]);

    assert_eq!(registry.process_event(&error("still here")), Ok(true));
    assert_eq!(snapshot(&errors), vec!["still here"]);
}

#[test]
fn unsubscribe_absent_kind_is_a_no_op() {
    let mut registry = HandlerRegistry::new();
    let errors = captured();
    capture_errors(&mut registry, &errors);

    assert!(!registry.unsubscribe(42));
    assert_eq!(registry.kinds(), vec![ErrorEvent::KIND]);
}

#[test]
fn clear_subscriptions_removes_every_kind() {
    let mut registry = HandlerRegistry::new();
    capture_messages(&mut registry, &captured());
    capture_errors(&mut registry, &captured());
    assert_eq!(registry.kinds(), vec![1, 2]);

    registry.clear_subscriptions();

    assert!(registry.is_empty());
    assert_eq!(registry.process_event(&message("Test")), Ok(false));
    assert_eq!(registry.process_event(&error("Test")), Ok(false));

    // Clearing an empty registry is harmless
    registry.clear_subscriptions();
    assert!(registry.is_empty());
}

#[test]
fn registry_is_reusable_after_clear() {
    let mut registry = HandlerRegistry::new();
    capture_messages(&mut registry, &captured());
    registry.clear_subscriptions();

    let messages = captured();
    capture_messages(&mut registry, &messages);
    assert!(registry.is_subscribed(MessageEvent::KIND));
    assert_eq!(registry.process_event(&message("again")), Ok(true));
    assert_eq!(snapshot(&messages), vec!["again"]);
}

#[test]
fn independent_registries_do_not_share_handlers() {
    let mut a = HandlerRegistry::new();
    let mut b = HandlerRegistry::new();
    let seen_a = captured();
    let seen_b = captured();
    capture_messages(&mut a, &seen_a);
    capture_messages(&mut b, &seen_b);

    a.process_event(&message("for a")).unwrap();
    b.process_event(&message("for b")).unwrap();

    assert_eq!(snapshot(&seen_a), vec!["for a"]);
    assert_eq!(snapshot(&seen_b), vec!["for b"]);
}

// =========================================================================
// Kind collisions
// =========================================================================

#[test]
fn strict_policy_reports_collision_without_running_handler() {
    let mut registry = HandlerRegistry::new();
    let messages = captured();
    capture_messages(&mut registry, &messages);

    let impostor: EventPtr = Arc::new(ImpostorEvent);
    let err = registry.process_event(&impostor).unwrap_err();

    match err {
        RegistryError::KindCollision {
            kind,
            expected,
            actual,
        } => {
            assert_eq!(kind, 1);
            assert!(expected.ends_with("MessageEvent"));
            assert!(actual.ends_with("ImpostorEvent"));
        }
        other => panic!("expected KindCollision, got {other:?}"),
    }
    assert!(snapshot(&messages).is_empty());
}

#[test]
fn skip_policy_reports_handled_without_running_handler() {
    let mut registry =
        HandlerRegistry::with_config(RegistryConfig::new(CollisionPolicy::Skip));
    let messages = captured();
    capture_messages(&mut registry, &messages);

    let impostor: EventPtr = Arc::new(ImpostorEvent);
    assert_eq!(registry.process_event(&impostor), Ok(true));
    assert!(snapshot(&messages).is_empty());

    // The real type still reaches its handler
    assert_eq!(registry.process_event(&message("genuine")), Ok(true));
    assert_eq!(snapshot(&messages), vec!["genuine"]);
}

#[test]
fn subscribing_a_colliding_type_replaces_the_handler() {
    let mut registry = HandlerRegistry::new();
    let messages = captured();
    capture_messages(&mut registry, &messages);

    let impostors = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&impostors);
    registry.subscribe::<ImpostorEvent, _>(move |_| *counter.lock().unwrap() += 1);

    let impostor: EventPtr = Arc::new(ImpostorEvent);
    assert_eq!(registry.process_event(&impostor), Ok(true));
    assert_eq!(*impostors.lock().unwrap(), 1);

    // The displaced MessageEvent now collides instead
    assert!(matches!(
        registry.process_event(&message("lost")),
        Err(RegistryError::KindCollision { kind: 1, .. })
    ));
    assert!(snapshot(&messages).is_empty());
}

// =========================================================================
// SharedRegistry
// =========================================================================

#[test]
fn shared_registry_dispatches_across_threads() {
    let registry = Arc::new(SharedRegistry::new());
    let messages = captured();
    let sink = Arc::clone(&messages);
    registry.subscribe::<MessageEvent, _>(move |event| {
        sink.lock().unwrap().push(event.text.clone());
    });

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.process_event(&message(&format!("t{i}"))))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }

    let mut seen = snapshot(&messages);
    seen.sort();
    assert_eq!(seen, vec!["t0", "t1", "t2", "t3"]);
}

#[test]
fn shared_registry_supports_the_full_lifecycle() {
    let registry = SharedRegistry::with_config(RegistryConfig::new(CollisionPolicy::Skip));
    registry.subscribe::<ErrorEvent, _>(|_| {});
    assert!(registry.is_subscribed(ErrorEvent::KIND));
    assert_eq!(registry.len(), 1);

    assert!(registry.unsubscribe(ErrorEvent::KIND));
    assert_eq!(registry.process_event(&error("gone")), Ok(false));

    registry.subscribe::<MessageEvent, _>(|_| {});
    registry.clear_subscriptions();
    assert!(registry.is_empty());

    let inner = registry.into_inner();
    assert_eq!(inner.config().collision_policy, CollisionPolicy::Skip);
}
