use actor_router::mock::MockActor;
use actor_router::{
    args, poll_once, Actor, ActorCell, ActorDeclaration, ActorUnit, HandlerError, Handlers,
    Router, RouterError, Scheduler, ShutdownSignal, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

// --- Test Actor ---

#[derive(Default)]
struct Ledger {
    entries: Mutex<Vec<(String, i64)>>,
    rejected: Mutex<Vec<String>>,
}

impl Actor for Ledger {
    fn declaration(&self) -> ActorDeclaration {
        ActorDeclaration::owned_by::<Self>().with_capacity(4)
    }

    fn handlers(&self, handlers: &mut Handlers<Self>) {
        handlers
            .on(1, [], |ledger: &Self, (account, amount): (String, i64)| {
                if amount < 0 {
                    ledger.rejected.lock().push(account);
                    return Err(HandlerError::msg("negative amount"));
                }
                ledger.entries.lock().push((account, amount));
                Ok(())
            })
            .on(2, [1, 2], |ledger: &Self, (account,): (String,)| {
                ledger.entries.lock().push((account, 0));
                Ok(())
            });
    }
}

async fn init_units(units: &[Arc<dyn ActorCell>]) -> (Router, ShutdownSignal) {
    let signal = ShutdownSignal::new();
    let mut builder = Router::builder();
    for unit in units {
        unit.init(Scheduler::current(&signal)).await.unwrap();
        builder.register_unit(Arc::clone(unit));
    }
    (builder.build(), signal)
}

fn drain_all(router: &Router) {
    while poll_once(router) > 0 {}
}

// --- Routing ---

#[tokio::test]
async fn test_direct_route_ignores_state_and_unknown_opcodes() {
    let ledger = ActorUnit::new("ledger", Ledger::default());
    let (router, _signal) = init_units(&[ledger.clone()]).await;

    router.route(1, &args!["alice", 10]);
    // direct calls do not check the gate
    router.route(2, &args!["bob"]);
    router.route(42, &args!["nobody"]);

    assert_eq!(
        *ledger.actor().entries.lock(),
        vec![("alice".to_string(), 10), ("bob".to_string(), 0)]
    );
    assert!(!router.contains(42));
    assert_eq!(router.owner_of(1), Some("ledger"));
}

#[tokio::test]
async fn test_gated_route_respects_state() {
    let ledger = ActorUnit::new("ledger", Ledger::default());
    let (router, _signal) = init_units(&[ledger.clone()]).await;

    router.route_gated(2, 3, &args!["denied"]);
    router.route_gated(2, 2, &args!["allowed"]);

    assert_eq!(*ledger.actor().entries.lock(), vec![("allowed".to_string(), 0)]);
}

#[tokio::test]
async fn test_enqueue_accepts_only_permitted_states() {
    let ledger = ActorUnit::new("ledger", Ledger::default());
    let (router, _signal) = init_units(&[ledger.clone()]).await;

    assert!(router.enqueue(2, 1, args!["one"]));
    assert!(router.enqueue(2, 2, args!["two"]));
    assert!(!router.enqueue(2, 3, args!["three"]));
    assert!(router.enqueue(1, 77, args!["wildcard", 5]));
    assert!(!router.enqueue(42, 0, args![]));
    assert_eq!(router.pending(), 3);

    drain_all(&router);
    assert_eq!(
        *ledger.actor().entries.lock(),
        vec![
            ("one".to_string(), 0),
            ("two".to_string(), 0),
            ("wildcard".to_string(), 5)
        ]
    );
    assert_eq!(router.pending(), 0);
}

#[tokio::test]
async fn test_queued_messages_run_in_fifo_order() {
    let unit = ActorUnit::new("mock", MockActor::new().handle(7, []));
    let (router, _signal) = init_units(&[unit.clone()]).await;

    for seq in 0..20 {
        assert!(router.enqueue(7, 0, args![seq]));
    }
    // one message per unit per poll
    assert_eq!(poll_once(&router), 1);
    drain_all(&router);

    let seen: Vec<i64> = unit
        .actor()
        .calls_for(7)
        .iter()
        .filter_map(|args| args[0].as_int())
        .collect();
    assert_eq!(seen, (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_argument_mismatch_is_contained() {
    let ledger = ActorUnit::new("ledger", Ledger::default());
    let (router, _signal) = init_units(&[ledger.clone()]).await;

    assert!(router.enqueue(1, 0, args!["carol"]));
    assert!(router.enqueue(1, 0, args![10, "swapped"]));
    assert!(router.enqueue(1, 0, args!["dave", -3]));
    assert!(router.enqueue(1, 0, args!["erin", 4]));
    drain_all(&router);

    assert_eq!(*ledger.actor().entries.lock(), vec![("erin".to_string(), 4)]);
    assert_eq!(*ledger.actor().rejected.lock(), vec!["dave".to_string()]);
}

#[tokio::test]
async fn test_failing_actor_does_not_affect_others() {
    let failing = ActorUnit::new("failing", MockActor::new().fail_on(1).panic_on(2));
    let healthy = ActorUnit::new("healthy", MockActor::new().handle(3, []));
    let (router, _signal) = init_units(&[failing.clone(), healthy.clone()]).await;

    for round in 0..3 {
        assert!(router.enqueue(1, 0, args![round]));
        assert!(router.enqueue(2, 0, args![round]));
        assert!(router.enqueue(3, 0, args![round]));
    }
    router.route(2, &args!["direct panic"]);
    drain_all(&router);

    assert_eq!(failing.actor().call_count(), 7);
    assert_eq!(healthy.actor().calls_for(3).len(), 3);
    assert_eq!(router.pending(), 0);
}

#[tokio::test]
async fn test_later_actor_wins_opcode_conflict() {
    let first = ActorUnit::new("first", MockActor::new().handle(5, []).handle(6, []));
    let second = ActorUnit::new("second", MockActor::new().handle(5, []));
    let (router, _signal) = init_units(&[first.clone(), second.clone()]).await;

    router.route(5, &args!["x"]);
    router.route(6, &args!["y"]);

    assert_eq!(router.owner_of(5), Some("second"));
    assert_eq!(router.owner_of(6), Some("first"));
    assert_eq!(second.actor().calls_for(5), vec![args!["x"]]);
    assert!(first.actor().calls_for(5).is_empty());
    assert_eq!(router.opcodes(), vec![5, 6]);
    assert_eq!(router.units().len(), 2);
}

#[tokio::test]
async fn test_ownership_mismatch_fails_init() {
    let unit = ActorUnit::new("impostor", MockActor::new().handle(1, []).owned_by::<Ledger>());
    let signal = ShutdownSignal::new();

    let err = unit.init(Scheduler::current(&signal)).await.unwrap_err();
    assert!(matches!(err, RouterError::OwnershipMismatch { .. }));
    assert!(err.to_string().contains("Ledger"));
    assert!(unit.opcodes().is_empty());
    assert!(!unit.enqueue(1, 0, args![]));
}

#[tokio::test]
async fn test_init_hook_failure_is_not_fatal() {
    let unit = ActorUnit::new("mock", MockActor::new().handle(1, []).fail_init());
    let (router, _signal) = init_units(&[unit.clone()]).await;

    assert_eq!(unit.actor().init_count(), 1);
    router.route(1, &args![Value::Unit]);
    assert_eq!(unit.actor().call_count(), 1);
}

// --- Concurrency ---

#[tokio::test]
async fn test_concurrent_enqueue_loses_nothing() {
    const PRODUCERS: i64 = 8;
    const PER_PRODUCER: i64 = 250;

    let unit = ActorUnit::new("mock", MockActor::new().handle(9, []));
    let (router, _signal) = init_units(&[unit.clone()]).await;

    std::thread::scope(|scope| {
        for producer in 0..PRODUCERS {
            let router = &router;
            scope.spawn(move || {
                for seq in 0..PER_PRODUCER {
                    assert!(router.enqueue(9, 0, args![producer, seq]));
                }
            });
        }
    });
    assert_eq!(router.pending(), (PRODUCERS * PER_PRODUCER) as usize);

    // several pollers draining at once
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let router = &router;
            scope.spawn(move || {
                while router.pending() > 0 {
                    poll_once(router);
                }
            });
        }
    });

    let calls = unit.actor().calls_for(9);
    assert_eq!(calls.len(), (PRODUCERS * PER_PRODUCER) as usize);

    // each producer's messages keep their relative order
    let mut next = vec![0i64; PRODUCERS as usize];
    for args in calls {
        let producer = args[0].as_int().unwrap() as usize;
        let seq = args[1].as_int().unwrap();
        assert_eq!(seq, next[producer]);
        next[producer] += 1;
    }
    assert!(next.iter().all(|count| *count == PER_PRODUCER));
}
