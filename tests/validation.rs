mod common;

use common::{Controller, IService, RealService};
use ferrous_scope::{
    Constructor, ContainerOptions, DiError, Injectable, ServiceCollection, ValidationWarning,
};
use std::sync::Arc;

struct Ping {
    _pong: Arc<Pong>,
}
struct Pong {
    _ping: Arc<Ping>,
}

impl Injectable for Ping {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|pong: Arc<Pong>| Ping { _pong: pong })]
    }
}

impl Injectable for Pong {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|ping: Arc<Ping>| Pong { _ping: ping })]
    }
}

struct Empty;
impl Injectable for Empty {
    fn constructors() -> Vec<Constructor<Self>> {
        Vec::new()
    }
}

#[test]
fn test_valid_registry() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_as::<dyn IService, RealService, _>(|s| s);
    sc.add_transient_type::<Controller>();
    let sp = sc.build().unwrap();

    let report = sp.validate();
    assert!(report.is_valid());
    assert!(!report.has_warnings());
    assert!(report.format_issues().is_empty());
    assert!(report.into_result().is_ok());
}

#[test]
fn test_static_cycle_is_found_without_resolving() {
    let mut sc = ServiceCollection::new();
    sc.add_transient_type::<Ping>();
    sc.add_transient_type::<Pong>();
    let sp = sc.build().unwrap();

    let report = sp.validate();
    assert_eq!(report.errors().len(), 1);
    match &report.errors()[0] {
        DiError::CyclicDependency(path) => {
            assert_eq!(path.len(), 3);
            assert!(path[0].ends_with("Ping"));
            assert!(path[1].ends_with("Pong"));
        }
        other => panic!("Expected CyclicDependency, got {:?}", other),
    }
}

#[test]
fn test_constructor_problems_are_reported() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton_type::<Empty>();
    sc.add_transient_type::<Controller>();
    let sp = sc.build_with(ContainerOptions::default().reflective()).unwrap();

    let report = sp.validate();
    assert_eq!(report.errors().len(), 2);
    assert!(matches!(report.errors()[0], DiError::NoConstructor(_)));
    assert!(matches!(report.errors()[1], DiError::NotRegistered(_)));

    let text = report.format_issues();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|line| line.starts_with("error: ")));
}

#[test]
fn test_singleton_capturing_scoped_is_a_warning() {
    let mut sc = ServiceCollection::new();
    sc.add_scoped_as::<dyn IService, RealService, _>(|s| s);
    sc.add_singleton_type::<Controller>();
    let sp = sc.build().unwrap();

    let report = sp.validate();
    assert!(report.is_valid());
    assert_eq!(report.warnings().len(), 1);
    match &report.warnings()[0] {
        ValidationWarning::SingletonDependsOnScoped { singleton, scoped } => {
            assert!(singleton.ends_with("Controller"));
            assert!(scoped.contains("IService"));
        }
        other => panic!("unexpected warning {:?}", other),
    }
}

#[test]
fn test_validate_on_build_fails_fast() {
    let mut sc = ServiceCollection::new();
    sc.add_transient_type::<Ping>();
    sc.add_transient_type::<Pong>();

    let result = sc.build_with(ContainerOptions::default().validate_on_build(true));
    assert!(matches!(result, Err(DiError::CyclicDependency(_))));
}
