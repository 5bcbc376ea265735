mod common;

use common::{AsyncTracked, DisposeLog, Tracked};
use async_trait::async_trait;
use ferrous_scope::{
    AsyncDispose, BoxError, Constructor, DiError, Disposal, Dispose, Injectable, Lifetime, Resolver, ServiceCollection,
};
use std::sync::Arc;

/// Distinct disposable contracts sharing one implementation.
struct Res<const N: u8>(Tracked);

impl<const N: u8> Dispose for Res<N> {
    fn dispose(&self) -> Result<(), BoxError> {
        self.0.dispose()
    }
}

fn add_res<const N: u8>(sc: &mut ServiceCollection, lifetime: Lifetime, name: &'static str, log: &DisposeLog) {
    let log = log.clone();
    sc.add_factory_with::<Res<N>, _>(
        lifetime,
        move |_| Ok(Arc::new(Res::<N>(Tracked::new(name, &log)))),
        Disposal::sync(),
    );
}

fn add_failing_res<const N: u8>(sc: &mut ServiceCollection, name: &'static str, log: &DisposeLog) {
    let log = log.clone();
    sc.add_factory_with::<Res<N>, _>(
        Lifetime::Scoped,
        move |_| Ok(Arc::new(Res::<N>(Tracked::failing(name, &log)))),
        Disposal::sync(),
    );
}

#[test]
fn test_three_disposables_released_exactly_once_at_teardown() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    add_res::<1>(&mut sc, Lifetime::Scoped, "first", &log);
    add_res::<2>(&mut sc, Lifetime::Scoped, "second", &log);
    add_res::<3>(&mut sc, Lifetime::Transient, "third", &log);
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<Res<1>>();
    let _ = scope.get_required::<Res<2>>();
    let _ = scope.get_required::<Res<3>>();
    let _ = scope.get_required::<Res<1>>(); // cached, not recorded again

    assert!(log.entries().is_empty(), "nothing released before teardown");
    assert_eq!(scope.pending_disposals(), 3);

    scope.dispose().unwrap();
    assert_eq!(log.entries(), vec!["first", "second", "third"]);

    scope.dispose().unwrap();
    assert_eq!(log.count("first"), 1);
    assert_eq!(log.count("second"), 1);
    assert_eq!(log.count("third"), 1);
}

#[test]
fn test_release_follows_build_order() {
    struct Consumer {
        _dep: Arc<Res<2>>,
        tracked: Tracked,
    }
    impl Dispose for Consumer {
        fn dispose(&self) -> Result<(), BoxError> {
            self.tracked.dispose()
        }
    }

    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    add_res::<2>(&mut sc, Lifetime::Scoped, "dependency", &log);
    let consumer_log = log.clone();
    sc.add_factory_with::<Consumer, _>(
        Lifetime::Scoped,
        move |r| {
            Ok(Arc::new(Consumer {
                _dep: r.get()?,
                tracked: Tracked::new("consumer", &consumer_log),
            }))
        },
        Disposal::sync(),
    );
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<Consumer>();
    scope.dispose().unwrap();

    // The dependency finished building first, so it was recorded first.
    assert_eq!(log.entries(), vec!["dependency", "consumer"]);
}

#[test]
fn test_every_transient_is_released() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    add_res::<1>(&mut sc, Lifetime::Transient, "temp", &log);
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    for _ in 0..4 {
        let _ = scope.get_required::<Res<1>>();
    }
    scope.dispose().unwrap();
    assert_eq!(log.count("temp"), 4);
}

#[test]
fn test_failures_are_aggregated_and_do_not_stop_teardown() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    add_res::<1>(&mut sc, Lifetime::Scoped, "first", &log);
    add_failing_res::<2>(&mut sc, "broken", &log);
    add_res::<3>(&mut sc, Lifetime::Scoped, "third", &log);
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<Res<1>>();
    let _ = scope.get_required::<Res<2>>();
    let _ = scope.get_required::<Res<3>>();

    match scope.dispose() {
        Err(DiError::Dispose(failures)) => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].service.contains("Res<2>"));
            assert_eq!(failures[0].message, "broken could not be released");
        }
        other => panic!("Expected Dispose error, got {:?}", other),
    }
    assert_eq!(log.entries(), vec!["first", "broken", "third"]);

    // Already drained; a second call has nothing left to report.
    assert!(scope.dispose().is_ok());
}

#[test]
fn test_panicking_release_is_reported() {
    struct Exploding;
    impl Dispose for Exploding {
        fn dispose(&self) -> Result<(), BoxError> {
            panic!("release exploded")
        }
    }

    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    sc.add_factory_with::<Exploding, _>(Lifetime::Scoped, |_| Ok(Arc::new(Exploding)), Disposal::sync());
    add_res::<1>(&mut sc, Lifetime::Scoped, "after", &log);
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<Exploding>();
    let _ = scope.get_required::<Res<1>>();

    match scope.dispose() {
        Err(DiError::Dispose(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].message, "panicked: release exploded");
        }
        other => panic!("Expected Dispose error, got {:?}", other),
    }
    assert_eq!(log.entries(), vec!["after"]);
}

struct AsyncExploding;

#[async_trait]
impl AsyncDispose for AsyncExploding {
    async fn dispose(&self) -> Result<(), BoxError> {
        panic!("async release exploded")
    }
}

fn async_exploding_collection(log: &DisposeLog) -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.add_factory_with::<AsyncExploding, _>(
        Lifetime::Scoped,
        |_| Ok(Arc::new(AsyncExploding)),
        Disposal::asynchronous(),
    );
    add_res::<1>(&mut sc, Lifetime::Scoped, "after", log);
    sc
}

#[test]
fn test_panicking_async_release_is_reported_by_sync_teardown() {
    let log = DisposeLog::new();
    let sp = async_exploding_collection(&log).build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<AsyncExploding>();
    let _ = scope.get_required::<Res<1>>();

    match scope.dispose() {
        Err(DiError::Dispose(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].message, "panicked: async release exploded");
        }
        other => panic!("Expected Dispose error, got {:?}", other),
    }
    assert_eq!(log.entries(), vec!["after"]);
}

#[tokio::test]
async fn test_panicking_async_release_is_reported_by_async_teardown() {
    let log = DisposeLog::new();
    let sp = async_exploding_collection(&log).build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<AsyncExploding>();
    let _ = scope.get_required::<Res<1>>();

    match scope.dispose_async().await {
        Err(DiError::Dispose(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].message, "panicked: async release exploded");
        }
        other => panic!("Expected Dispose error, got {:?}", other),
    }
    assert_eq!(log.entries(), vec!["after"]);
}

#[test]
fn test_async_only_disposable_released_by_sync_teardown() {
    let log = DisposeLog::new();
    let factory_log = log.clone();
    let mut sc = ServiceCollection::new();
    sc.add_factory_with::<AsyncTracked, _>(
        Lifetime::Scoped,
        move |_| Ok(Arc::new(AsyncTracked { name: "client".to_string(), log: factory_log.clone() })),
        Disposal::asynchronous(),
    );
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<AsyncTracked>();
    scope.dispose().unwrap();
    assert_eq!(log.entries(), vec!["client"]);
}

#[tokio::test]
async fn test_async_teardown_keeps_order_across_sync_and_async() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    add_res::<1>(&mut sc, Lifetime::Scoped, "sync-first", &log);
    let factory_log = log.clone();
    sc.add_factory_with::<AsyncTracked, _>(
        Lifetime::Transient,
        move |_| Ok(Arc::new(AsyncTracked { name: "async-second".to_string(), log: factory_log.clone() })),
        Disposal::asynchronous(),
    );
    add_res::<3>(&mut sc, Lifetime::Scoped, "sync-third", &log);
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<Res<1>>();
    let _ = scope.get_required::<AsyncTracked>();
    let _ = scope.get_required::<Res<3>>();

    scope.dispose_async().await.unwrap();
    assert_eq!(log.entries(), vec!["sync-first", "async-second", "sync-third"]);

    scope.dispose_async().await.unwrap();
    assert_eq!(log.entries().len(), 3);
}

#[test]
fn test_singletons_belong_to_the_root() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    add_res::<1>(&mut sc, Lifetime::Singleton, "singleton", &log);
    add_res::<2>(&mut sc, Lifetime::Scoped, "scoped", &log);
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    let _ = scope.get_required::<Res<1>>();
    let _ = scope.get_required::<Res<2>>();
    assert_eq!(scope.pending_disposals(), 1);
    assert_eq!(sp.pending_disposals(), 1);

    scope.dispose().unwrap();
    assert_eq!(log.entries(), vec!["scoped"]);

    sp.dispose().unwrap();
    assert_eq!(log.entries(), vec!["scoped", "singleton"]);
}

#[test]
fn test_disposable_instance_released_once_when_resolved() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    sc.add_singleton_disposable(Tracked::new("instance", &log), Disposal::sync());
    let sp = sc.build().unwrap();

    let a = sp.create_scope().get_required::<Tracked>();
    let b = sp.get_required::<Tracked>();
    assert!(Arc::ptr_eq(&a, &b));

    sp.dispose().unwrap();
    assert_eq!(log.entries(), vec!["instance"]);
}

#[test]
fn test_unresolved_instance_is_not_released() {
    let log = DisposeLog::new();
    let mut sc = ServiceCollection::new();
    sc.add_singleton_disposable(Tracked::new("never-used", &log), Disposal::sync());
    let sp = sc.build().unwrap();

    sp.dispose().unwrap();
    assert!(log.entries().is_empty());
}

#[test]
fn test_injectable_disposal_capability() {
    struct Pool {
        tracked: Tracked,
    }
    impl Dispose for Pool {
        fn dispose(&self) -> Result<(), BoxError> {
            self.tracked.dispose()
        }
    }

    static POOL_LOG: std::sync::OnceLock<DisposeLog> = std::sync::OnceLock::new();
    fn pool_log() -> &'static DisposeLog {
        POOL_LOG.get_or_init(DisposeLog::new)
    }

    impl Injectable for Pool {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|| Pool { tracked: Tracked::new("pool", pool_log()) })]
        }
        fn disposal() -> Disposal<Self> {
            Disposal::sync()
        }
    }

    let mut sc = ServiceCollection::new();
    sc.add_scoped_type::<Pool>();
    let sp = sc.build().unwrap();
    assert!(sp.descriptors().next().unwrap().is_disposable());

    let scope = sp.create_scope();
    let _ = scope.get_required::<Pool>();
    scope.dispose().unwrap();
    assert_eq!(pool_log().entries(), vec!["pool"]);
}

#[test]
fn test_trait_contract_with_dispose_supertrait() {
    trait Connection: Dispose {
        fn endpoint(&self) -> &str;
    }

    struct Tcp(Tracked);
    impl Dispose for Tcp {
        fn dispose(&self) -> Result<(), BoxError> {
            self.0.dispose()
        }
    }
    impl Connection for Tcp {
        fn endpoint(&self) -> &str {
            "tcp://localhost"
        }
    }

    let log = DisposeLog::new();
    let factory_log = log.clone();
    let mut sc = ServiceCollection::new();
    sc.add_factory_with::<dyn Connection, _>(
        Lifetime::Scoped,
        move |_| Ok(Arc::new(Tcp(Tracked::new("tcp", &factory_log))) as Arc<dyn Connection>),
        Disposal::sync(),
    );
    let sp = sc.build().unwrap();

    let scope = sp.create_scope();
    assert_eq!(scope.get_required::<dyn Connection>().endpoint(), "tcp://localhost");
    scope.dispose().unwrap();
    assert_eq!(log.entries(), vec!["tcp"]);
}
