//! Service provider module for dependency injection.
//!
//! This module contains the sealed registry ([`ServiceProvider`]), the
//! scopes it creates and the context handed to factories and constructors.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::ContainerOptions;
use crate::descriptors::{ServiceDescriptor, ServiceSource};
use crate::error::{DiError, DiResult};
use crate::internal::{FastMap, ResolutionPath};
use crate::key::Key;
use crate::registration::{Activation, AnyArc};
use crate::traits::ResolverCore;
use crate::validation::{self, ValidationReport};

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

use scope::ScopeState;

/// Sealed registry of service descriptors plus the root scope.
///
/// A provider never changes after it is built. It maps each contract to its
/// descriptor, lazily turns type-based descriptors into activation routines
/// (at most one kept per contract, shared by every scope), and owns the root
/// scope where singletons live.
///
/// The provider itself resolves through the root scope. Scoped contracts
/// resolved that way live as long as the provider; use
/// [`create_scope`](Self::create_scope) for per-unit-of-work instances.
///
/// Cloning is cheap: clones share the same registry and root scope.
///
/// # Examples
///
/// ```
/// use ferrous_scope::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     Ok(UserService { db: resolver.get::<Database>()? })
/// });
///
/// let provider = collection.build().unwrap();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    descriptors: FastMap<Key, ServiceDescriptor>,
    order: Vec<Key>,
    activations: RwLock<FastMap<Key, Activation>>,
    pub(crate) options: ContainerOptions,
    pub(crate) root: ScopeState,
}

impl ProviderInner {
    pub(crate) fn descriptor(&self, key: &Key) -> DiResult<&ServiceDescriptor> {
        self.descriptors
            .get(key)
            .ok_or(DiError::NotRegistered(key.display_name()))
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.descriptors.contains_key(key)
    }

    pub(crate) fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> + '_ {
        self.order.iter().filter_map(|key| self.descriptors.get(key))
    }

    /// The activation routine for `descriptor`, compiling it on first use.
    ///
    /// Compilation runs outside the memo lock. If two threads compile the
    /// same contract at once, the first insert is kept and the other routine
    /// is dropped without ever being invoked.
    pub(crate) fn activation(&self, descriptor: &ServiceDescriptor) -> DiResult<Activation> {
        let implementation = match descriptor.source() {
            ServiceSource::Implementation(implementation) => implementation,
            ServiceSource::Factory(activation) | ServiceSource::Instance(activation) => {
                return Ok(activation.clone())
            }
        };

        let key = descriptor.key();
        if let Some(activation) = self.activations.read().get(&key) {
            return Ok(activation.clone());
        }

        let strategy = self.options.activation();
        let compiled = strategy.build_activation(implementation)?;
        debug!(
            service = key.display_name(),
            implementation = implementation.type_name(),
            strategy = strategy.name(),
            "compiled activation"
        );

        Ok(self.activations.write().entry(key).or_insert(compiled).clone())
    }
}

impl ServiceProvider {
    /// Seals `descriptors` into a provider.
    ///
    /// Fails with [`DiError::DuplicateRegistration`] if a contract appears
    /// twice, and with the first validation error when
    /// [`ContainerOptions::validate_on_build`] is set.
    pub(crate) fn seal(descriptors: Vec<ServiceDescriptor>, options: ContainerOptions) -> DiResult<Self> {
        let mut map = FastMap::default();
        let mut order = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let key = descriptor.key();
            if map.insert(key, descriptor).is_some() {
                return Err(DiError::DuplicateRegistration(key.display_name()));
            }
            order.push(key);
        }

        debug!(
            services = order.len(),
            strategy = options.activation().name(),
            max_depth = options.max_depth(),
            "service provider sealed"
        );

        let validate = options.validates_on_build();
        let provider = Self {
            inner: Arc::new(ProviderInner {
                descriptors: map,
                order,
                activations: RwLock::new(FastMap::default()),
                options,
                root: ScopeState::new(true),
            }),
        };

        if validate {
            provider.validate().into_result()?;
        }
        Ok(provider)
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Creates a new scope for resolving scoped services.
    ///
    /// Each scope keeps its own cache of Scoped instances and its own
    /// disposal ledger; Singleton resolutions are shared with the root.
    ///
    /// ```
    /// use ferrous_scope::{ServiceCollection, Resolver};
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// #[derive(Debug)]
    /// struct RequestId(String);
    ///
    /// let counter = Arc::new(AtomicUsize::new(0));
    /// let counter_clone = counter.clone();
    ///
    /// let mut collection = ServiceCollection::new();
    /// collection.add_scoped_factory::<RequestId, _>(move |_| {
    ///     let n = counter_clone.fetch_add(1, Ordering::SeqCst) + 1;
    ///     Ok(RequestId(format!("req-{}", n)))
    /// });
    ///
    /// let provider = collection.build().unwrap();
    ///
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let req1a = scope1.get_required::<RequestId>();
    /// let req1b = scope1.get_required::<RequestId>();
    /// let req2 = scope2.get_required::<RequestId>();
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// assert_eq!(counter.load(Ordering::SeqCst), 2);
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// Descriptor registered for `key`.
    pub fn descriptor(&self, key: &Key) -> DiResult<&ServiceDescriptor> {
        self.inner.descriptor(key)
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> + '_ {
        self.inner.descriptors()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.inner.contains(key)
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.inner.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.order.is_empty()
    }

    /// Name of the configured activation strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.inner.options.activation().name()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Checks every registration without building any service.
    ///
    /// Compiles the activation of every type-based registration and checks
    /// that each constructor parameter is registered and that constructor
    /// dependencies contain no cycle. See [`ValidationReport`].
    pub fn validate(&self) -> ValidationReport {
        validation::validate(&self.inner)
    }

    /// Disposes the root scope: releases every disposable singleton (and
    /// anything else built through the provider itself), in build order.
    ///
    /// Scopes created from this provider keep working for their own Scoped
    /// and Transient contracts, but Singleton resolutions fail with
    /// [`DiError::ScopeDisposed`] afterwards.
    pub fn dispose(&self) -> DiResult<()> {
        self.inner.root.dispose()
    }

    /// Like [`dispose`](Self::dispose), awaiting async release hooks.
    pub async fn dispose_async(&self) -> DiResult<()> {
        self.inner.root.dispose_async().await
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.root.is_disposed()
    }

    /// Number of root-scope instances waiting to be released.
    pub fn pending_disposals(&self) -> usize {
        self.inner.root.pending_disposals()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let _ = writeln!(s, "=== Service Provider Debug ===");
        let _ = writeln!(s, "Strategy: {}", self.strategy_name());
        let _ = writeln!(s, "Compiled activations: {}", self.inner.activations.read().len());
        for descriptor in self.descriptors() {
            let _ = writeln!(
                s,
                "  {} -> {} ({}{})",
                descriptor.type_name(),
                descriptor.implementation_name(),
                descriptor.lifetime(),
                if descriptor.is_disposable() { ", disposable" } else { "" },
            );
        }
        s
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.inner.root.resolve(&self.inner, key, &ResolutionPath::root())
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.len())
            .field("options", &self.inner.options)
            .field("root_scope", &self.inner.root.id())
            .finish()
    }
}
