//! Scope types: per-scope instance caches and disposal ledgers.

use std::collections::hash_map::Entry;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult, DisposeFailure};
use crate::internal::{drain, drain_blocking, DisposeLedger, Disposer, FastMap, ResolutionPath};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{Activated, AnyArc};
use crate::traits::ResolverCore;

use super::{ProviderInner, ResolverContext, ServiceProvider};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Cache, ledger and teardown state shared by every handle to one scope.
pub(crate) struct ScopeState {
    id: u64,
    is_root: bool,
    instances: Mutex<FastMap<Key, AnyArc>>,
    ledger: Mutex<DisposeLedger>,
    disposed: AtomicBool,
}

impl ScopeState {
    pub(crate) fn new(is_root: bool) -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        debug!(scope = id, root = is_root, "scope created");
        Self {
            id,
            is_root,
            instances: Mutex::new(FastMap::default()),
            ledger: Mutex::new(DisposeLedger::default()),
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_root(&self) -> bool {
        self.is_root
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn pending_disposals(&self) -> usize {
        self.ledger.lock().len()
    }

    /// Resolves `key` on this scope, applying the descriptor's lifetime.
    pub(crate) fn resolve(
        &self,
        provider: &ProviderInner,
        key: &Key,
        path: &ResolutionPath<'_>,
    ) -> DiResult<AnyArc> {
        if self.is_disposed() {
            return Err(DiError::ScopeDisposed(self.id));
        }

        let descriptor = provider.descriptor(key)?;
        let path = path.enter(*key, provider.options.max_depth())?;
        trace!(
            service = key.display_name(),
            lifetime = %descriptor.lifetime(),
            scope = self.id,
            depth = path.depth(),
            "resolving"
        );

        match descriptor.lifetime() {
            Lifetime::Transient => {
                let Activated { instance, disposer } = self.build(provider, descriptor, &path)?;
                let recorded = disposer.map_or(true, |disposer| self.record(disposer));
                if !recorded || self.is_disposed() {
                    return Err(DiError::ScopeDisposed(self.id));
                }
                Ok(instance)
            }
            Lifetime::Singleton if !self.is_root => {
                provider.root.get_or_build(provider, descriptor, &path)
            }
            Lifetime::Scoped | Lifetime::Singleton => self.get_or_build(provider, descriptor, &path),
        }
    }

    fn build(
        &self,
        provider: &ProviderInner,
        descriptor: &ServiceDescriptor,
        path: &ResolutionPath<'_>,
    ) -> DiResult<Activated> {
        let activation = provider.activation(descriptor)?;
        let ctx = ResolverContext::new(provider, self, path);
        activation(&ctx)
    }

    /// Returns the cached instance, building and caching it on a miss.
    ///
    /// The cache lock is released while building, so a build may resolve
    /// other contracts from this scope. Racing builds of the same contract
    /// are settled at insert time: the first insert wins and is what every
    /// caller gets. A losing build is dropped from the cache, but anything it
    /// made that needs releasing still goes on the ledger.
    pub(crate) fn get_or_build(
        &self,
        provider: &ProviderInner,
        descriptor: &ServiceDescriptor,
        path: &ResolutionPath<'_>,
    ) -> DiResult<AnyArc> {
        if self.is_disposed() {
            return Err(DiError::ScopeDisposed(self.id));
        }

        let key = descriptor.key();
        if let Some(hit) = self.instances.lock().get(&key) {
            return Ok(hit.clone());
        }

        let Activated { instance, disposer } = self.build(provider, descriptor, path)?;

        let settled = {
            let mut instances = self.instances.lock();
            // Disposal clears the cache after setting the flag, so a build
            // finishing late must not repopulate it.
            if self.is_disposed() {
                None
            } else {
                Some(match instances.entry(key) {
                    Entry::Occupied(entry) => (entry.get().clone(), false),
                    Entry::Vacant(entry) => (entry.insert(instance.clone()).clone(), true),
                })
            }
        };

        let Some((winner, inserted)) = settled else {
            if let Some(disposer) = disposer {
                self.record(disposer);
            }
            return Err(DiError::ScopeDisposed(self.id));
        };

        if let Some(disposer) = disposer {
            // A losing build of an instance descriptor hands back the same object.
            if (inserted || !Arc::ptr_eq(&winner, &instance)) && !self.record(disposer) {
                return Err(DiError::ScopeDisposed(self.id));
            }
        }
        if !inserted {
            trace!(service = key.display_name(), scope = self.id, "lost concurrent build");
        }
        Ok(winner)
    }

    /// Appends to the ledger. Returns `false` when the scope was already
    /// disposed, in which case the instance has been released.
    fn record(&self, disposer: Disposer) -> bool {
        let late = match self.ledger.lock().push(disposer) {
            Ok(()) => return true,
            Err(late) => late,
        };
        let service = late.service();
        warn!(
            scope = self.id,
            service,
            "instance built after scope disposal, releasing immediately"
        );
        if let Err(failure) = late.release_blocking() {
            warn!(scope = self.id, service, error = %failure.message, "failed to release service");
        }
        false
    }

    /// Marks the scope disposed and takes the ledger; `None` if already done.
    fn begin_dispose(&self) -> Option<Vec<Disposer>> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return None;
        }
        let entries = self.ledger.lock().close();
        self.instances.lock().clear();
        debug!(scope = self.id, pending = entries.len(), "disposing scope");
        Some(entries)
    }

    fn finish_dispose(&self, failures: Vec<DisposeFailure>) -> DiResult<()> {
        for failure in &failures {
            warn!(
                scope = self.id,
                service = failure.service,
                error = %failure.message,
                "failed to release service"
            );
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DiError::Dispose(failures))
        }
    }

    pub(crate) fn dispose(&self) -> DiResult<()> {
        match self.begin_dispose() {
            Some(entries) => self.finish_dispose(drain_blocking(entries)),
            None => Ok(()),
        }
    }

    pub(crate) async fn dispose_async(&self) -> DiResult<()> {
        match self.begin_dispose() {
            Some(entries) => self.finish_dispose(drain(entries).await),
            None => Ok(()),
        }
    }
}

impl Drop for ScopeState {
    fn drop(&mut self) {
        let pending = self.ledger.get_mut().len();
        if !*self.disposed.get_mut() && pending > 0 {
            warn!(
                scope = self.id,
                root = self.is_root,
                pending,
                "scope dropped without being disposed, disposable services were not released"
            );
        }
    }
}

/// A resolution scope: its own cache of Scoped instances and its own
/// disposal ledger.
///
/// Scoped contracts resolve to one instance per scope. Singleton contracts
/// are delegated to the provider's root scope, so every scope sees the same
/// instance. Transient contracts are built fresh on every call. Everything
/// disposable the scope builds, including transients, is released when the
/// scope is disposed, in the order it was built.
///
/// Cloning a `Scope` yields another handle to the same scope.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ferrous_scope::{BoxError, Disposal, Dispose, Lifetime, Resolver, ServiceCollection};
///
/// struct Connection;
/// impl Dispose for Connection {
///     fn dispose(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_factory_with::<Connection, _>(
///     Lifetime::Scoped,
///     |_| Ok(Arc::new(Connection)),
///     Disposal::sync(),
/// );
/// let provider = services.build().unwrap();
///
/// let scope = provider.create_scope();
/// let a = scope.get_required::<Connection>();
/// let b = scope.get_required::<Connection>();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(scope.pending_disposals(), 1);
///
/// scope.dispose().unwrap();
/// assert!(scope.is_disposed());
/// assert!(scope.get::<Connection>().is_err());
/// ```
#[derive(Clone)]
pub struct Scope {
    provider: ServiceProvider,
    state: Arc<ScopeState>,
}

impl Scope {
    pub(crate) fn new(provider: ServiceProvider) -> Self {
        Self {
            provider,
            state: Arc::new(ScopeState::new(false)),
        }
    }

    /// Process-unique id, as reported in logs and `ScopeDisposed` errors.
    pub fn id(&self) -> u64 {
        self.state.id()
    }

    /// The provider this scope was created from.
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// Number of built instances waiting to be released.
    pub fn pending_disposals(&self) -> usize {
        self.state.pending_disposals()
    }

    /// Releases every disposable this scope built, in build order.
    ///
    /// Async-only disposables are driven to completion on the calling thread.
    /// Every entry is attempted; failures are collected into
    /// [`DiError::Dispose`]. A second call does nothing and returns `Ok`.
    /// Resolving from a disposed scope returns [`DiError::ScopeDisposed`].
    pub fn dispose(&self) -> DiResult<()> {
        self.state.dispose()
    }

    /// Like [`dispose`](Self::dispose), awaiting async release hooks.
    pub async fn dispose_async(&self) -> DiResult<()> {
        self.state.dispose_async().await
    }

    /// Runs `f` with this scope, then disposes it.
    ///
    /// The scope is disposed whether or not `f` succeeds. An error from `f`
    /// takes precedence over a disposal error.
    ///
    /// ```
    /// use ferrous_scope::{DiError, Resolver, ServiceCollection};
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<String, _>(|_| Ok("request".to_string()));
    /// let provider = services.build().unwrap();
    ///
    /// let scope = provider.create_scope();
    /// let len = scope.using_sync(|s| Ok::<_, DiError>(s.get::<String>()?.len())).unwrap();
    /// assert_eq!(len, 7);
    /// assert!(scope.is_disposed());
    /// ```
    pub fn using_sync<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&Scope) -> Result<R, E>,
        E: From<DiError>,
    {
        let result = f(self);
        let disposed = self.dispose();
        let value = result?;
        disposed?;
        Ok(value)
    }

    /// Async variant of [`using_sync`](Self::using_sync); release hooks are awaited.
    pub async fn using<F, Fut, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<DiError>,
    {
        let result = f(self.clone()).await;
        let disposed = self.dispose_async().await;
        let value = result?;
        disposed?;
        Ok(value)
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.state
            .resolve(self.provider.inner(), key, &ResolutionPath::root())
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id())
            .field("disposed", &self.is_disposed())
            .field("pending_disposals", &self.pending_disposals())
            .finish()
    }
}
