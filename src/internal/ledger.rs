//! Internal disposal ledger for scope teardown.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::DisposeFailure;
use crate::traits::{AsyncDispose, BoxError, Dispose};

enum Release {
    Sync(Box<dyn FnOnce() -> Result<(), BoxError> + Send>),
    Async(Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>),
}

/// One ledger entry: the release hook of a single built instance.
pub(crate) struct Disposer {
    service: &'static str,
    release: Release,
}

impl Disposer {
    pub(crate) fn sync<T: ?Sized + Dispose>(service: Arc<T>) -> Self {
        Self {
            service: std::any::type_name::<T>(),
            release: Release::Sync(Box::new(move || service.dispose())),
        }
    }

    pub(crate) fn asynchronous<T: ?Sized + AsyncDispose>(service: Arc<T>) -> Self {
        Self {
            service: std::any::type_name::<T>(),
            release: Release::Async(Box::new(
                move || -> BoxFuture<'static, Result<(), BoxError>> {
                    Box::pin(async move { service.dispose().await })
                },
            )),
        }
    }

    pub(crate) fn service(&self) -> &'static str {
        self.service
    }

    /// Releases on the calling thread, blocking on async-only hooks.
    pub(crate) fn release_blocking(self) -> Result<(), DisposeFailure> {
        let service = self.service;
        let outcome = match self.release {
            Release::Sync(f) => catch_unwind(AssertUnwindSafe(f))
                .unwrap_or_else(|payload| Err(panic_message(payload).into())),
            Release::Async(f) => futures::executor::block_on(AssertUnwindSafe(f()).catch_unwind())
                .unwrap_or_else(|payload| Err(panic_message(payload).into())),
        };
        outcome.map_err(|e| DisposeFailure { service, message: e.to_string() })
    }

    /// Releases, awaiting async hooks and calling sync hooks inline.
    pub(crate) async fn release(self) -> Result<(), DisposeFailure> {
        let service = self.service;
        let outcome = match self.release {
            Release::Sync(f) => catch_unwind(AssertUnwindSafe(f))
                .unwrap_or_else(|payload| Err(panic_message(payload).into())),
            Release::Async(f) => AssertUnwindSafe(f())
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(panic_message(payload).into())),
        };
        outcome.map_err(|e| DisposeFailure { service, message: e.to_string() })
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}

/// Ordered record of the disposables a scope is responsible for.
///
/// Entries are appended as instances are built and drained in append order,
/// exactly once. After draining the ledger is closed: late entries are handed
/// back to the caller instead of being stored where nobody would release them.
#[derive(Default)]
pub(crate) struct DisposeLedger {
    entries: Vec<Disposer>,
    closed: bool,
}

impl DisposeLedger {
    /// Append an entry, or return it if the ledger has already been drained.
    pub(crate) fn push(&mut self, disposer: Disposer) -> Result<(), Disposer> {
        if self.closed {
            return Err(disposer);
        }
        self.entries.push(disposer);
        Ok(())
    }

    /// Take every entry in append order and close the ledger.
    pub(crate) fn close(&mut self) -> Vec<Disposer> {
        self.closed = true;
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the ledger is empty (no disposers registered).
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Release every entry in order on the calling thread; best-effort.
pub(crate) fn drain_blocking(entries: Vec<Disposer>) -> Vec<DisposeFailure> {
    entries
        .into_iter()
        .filter_map(|d| d.release_blocking().err())
        .collect()
}

/// Release every entry in order, awaiting async hooks; best-effort.
pub(crate) async fn drain(entries: Vec<Disposer>) -> Vec<DisposeFailure> {
    let mut failures = Vec::new();
    for disposer in entries {
        if let Err(failure) = disposer.release().await {
            failures.push(failure);
        }
    }
    failures
}
