//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ferrous_scope::{AsyncDispose, BoxError, Constructor, Dispose, Injectable};

// ===== Controller / IService wiring =====

pub trait IService: Send + Sync {
    fn describe(&self) -> String;
}

pub struct RealService {
    pub id: usize,
}

static NEXT_SERVICE_ID: AtomicUsize = AtomicUsize::new(1);

impl IService for RealService {
    fn describe(&self) -> String {
        format!("real-{}", self.id)
    }
}

impl Injectable for RealService {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|| RealService {
            id: NEXT_SERVICE_ID.fetch_add(1, Ordering::SeqCst),
        })]
    }
}

pub struct Controller {
    pub service: Arc<dyn IService>,
}

impl Injectable for Controller {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|service: Arc<dyn IService>| Controller { service })]
    }
}

// ===== Disposal tracking =====

/// Names of released services, in release order.
#[derive(Clone, Default)]
pub struct DisposeLog(Arc<Mutex<Vec<String>>>);

impl DisposeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, name: impl Into<String>) {
        self.0.lock().unwrap().push(name.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| n.as_str() == name).count()
    }
}

/// A synchronously disposable service that records its release.
pub struct Tracked {
    pub name: String,
    pub log: DisposeLog,
    pub fail: bool,
}

impl Tracked {
    pub fn new(name: impl Into<String>, log: &DisposeLog) -> Self {
        Self { name: name.into(), log: log.clone(), fail: false }
    }

    pub fn failing(name: impl Into<String>, log: &DisposeLog) -> Self {
        Self { name: name.into(), log: log.clone(), fail: true }
    }
}

impl Dispose for Tracked {
    fn dispose(&self) -> Result<(), BoxError> {
        self.log.push(self.name.clone());
        if self.fail {
            Err(format!("{} could not be released", self.name).into())
        } else {
            Ok(())
        }
    }
}

/// A disposable whose only release path is asynchronous.
pub struct AsyncTracked {
    pub name: String,
    pub log: DisposeLog,
}

#[async_trait]
impl AsyncDispose for AsyncTracked {
    async fn dispose(&self) -> Result<(), BoxError> {
        self.log.push(self.name.clone());
        Ok(())
    }
}
