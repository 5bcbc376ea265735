//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type used to register
//! services before sealing them into a [`ServiceProvider`].

use std::sync::Arc;

use tracing::trace;

use crate::activation::Injectable;
use crate::config::ContainerOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::{ResolverContext, ServiceProvider};
use crate::traits::Disposal;

/// Mutable list of registrations, sealed by [`build`](Self::build).
///
/// Registering the same contract twice is not an overwrite: the second
/// registration is kept and `build` fails with
/// [`DiError::DuplicateRegistration`](crate::DiError::DuplicateRegistration).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ferrous_scope::{Constructor, Injectable, Resolver, ServiceCollection};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".to_string() }
/// }
/// impl Injectable for English {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|| English)]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_as::<dyn Greeter, English, _>(|s| s);
/// assert_eq!(services.len(), 1);
///
/// let provider = services.build().unwrap();
/// assert_eq!(provider.get_required::<dyn Greeter>().greet(), "hello");
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor. Uniqueness is checked by [`build`](Self::build).
    pub fn register(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        trace!(
            service = descriptor.type_name(),
            lifetime = %descriptor.lifetime(),
            "registered"
        );
        self.descriptors.push(descriptor);
        self
    }

    /// Appends a descriptor unless its contract is already registered.
    /// Returns whether it was added.
    pub fn try_register(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.contains(&descriptor.key()) {
            return false;
        }
        self.register(descriptor);
        true
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.descriptors.iter().any(|d| d.key() == *key)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    // ----- Instances -----

    /// Registers a pre-built singleton value.
    ///
    /// ```rust
    /// # use ferrous_scope::ServiceCollection;
    /// struct Config {
    ///     database_url: String
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Config {
    ///     database_url: "postgres://localhost".to_string()
    /// });
    /// ```
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.register(ServiceDescriptor::instance(Arc::new(value), Disposal::none()))
    }

    /// Registers a pre-built singleton value that the provider releases on
    /// [`dispose`](ServiceProvider::dispose), provided it was resolved.
    pub fn add_singleton_disposable<T: Send + Sync + 'static>(
        &mut self,
        value: T,
        disposal: Disposal<T>,
    ) -> &mut Self {
        self.register(ServiceDescriptor::instance(Arc::new(value), disposal))
    }

    /// Registers a pre-built value under a trait-object contract.
    pub fn add_singleton_trait<C: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<C>) -> &mut Self {
        self.register(ServiceDescriptor::instance(value, Disposal::none()))
    }

    // ----- Constructed types -----

    /// Registers `T` as a singleton, built through its declared constructor.
    pub fn add_singleton_type<T: Injectable>(&mut self) -> &mut Self {
        self.register(ServiceDescriptor::implementation::<T, T, _>(Lifetime::Singleton, |s: Arc<T>| s))
    }

    /// Registers `T` as a scoped service, built through its declared constructor.
    pub fn add_scoped_type<T: Injectable>(&mut self) -> &mut Self {
        self.register(ServiceDescriptor::implementation::<T, T, _>(Lifetime::Scoped, |s: Arc<T>| s))
    }

    /// Registers `T` as a transient service, built through its declared constructor.
    pub fn add_transient_type<T: Injectable>(&mut self) -> &mut Self {
        self.register(ServiceDescriptor::implementation::<T, T, _>(Lifetime::Transient, |s: Arc<T>| s))
    }

    /// Registers `T` as the singleton implementation of contract `C`.
    pub fn add_singleton_as<C, T, F>(&mut self, cast: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::implementation::<C, T, F>(Lifetime::Singleton, cast))
    }

    /// Registers `T` as the scoped implementation of contract `C`.
    pub fn add_scoped_as<C, T, F>(&mut self, cast: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::implementation::<C, T, F>(Lifetime::Scoped, cast))
    }

    /// Registers `T` as the transient implementation of contract `C`.
    pub fn add_transient_as<C, T, F>(&mut self, cast: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::implementation::<C, T, F>(Lifetime::Transient, cast))
    }

    // ----- Factories -----

    /// Registers a singleton factory.
    ///
    /// The factory runs at most once per successful build in the root scope;
    /// concurrent first requests may run it more than once, but only one
    /// result is ever observed.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory.
    ///
    /// ```rust
    /// # use ferrous_scope::{ServiceCollection, Resolver};
    /// struct RequestContext { request_id: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<RequestContext, _>(|r| {
    ///     Ok(RequestContext { request_id: format!("scope-{}", r.scope_id()) })
    /// });
    /// ```
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a transient factory.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::factory::<T, _>(
            lifetime,
            move |ctx| factory(ctx).map(Arc::new),
            Disposal::none(),
        ))
    }

    /// Registers a singleton factory for a trait-object contract.
    pub fn add_singleton_trait_factory<C, F>(&mut self, factory: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<C>> + Send + Sync + 'static,
    {
        self.add_factory_with(Lifetime::Singleton, factory, Disposal::none())
    }

    /// Registers a scoped factory for a trait-object contract.
    pub fn add_scoped_trait_factory<C, F>(&mut self, factory: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<C>> + Send + Sync + 'static,
    {
        self.add_factory_with(Lifetime::Scoped, factory, Disposal::none())
    }

    /// Registers a transient factory for a trait-object contract.
    pub fn add_transient_trait_factory<C, F>(&mut self, factory: F) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<C>> + Send + Sync + 'static,
    {
        self.add_factory_with(Lifetime::Transient, factory, Disposal::none())
    }

    /// Registers a factory with an explicit lifetime and disposal capability.
    ///
    /// Every value the factory produces is recorded on the ledger of the
    /// scope that built it when `disposal` is not `Disposal::none()`.
    pub fn add_factory_with<C, F>(&mut self, lifetime: Lifetime, factory: F, disposal: Disposal<C>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<C>> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::factory(lifetime, factory, disposal))
    }

    // ----- Sealing -----

    /// Seals the registrations with default options.
    pub fn build(self) -> DiResult<ServiceProvider> {
        self.build_with(ContainerOptions::default())
    }

    /// Seals the registrations.
    ///
    /// Fails with `DuplicateRegistration` if a contract was registered more
    /// than once, and with the first validation error when
    /// `options.validate_on_build(true)` was set.
    pub fn build_with(self, options: ContainerOptions) -> DiResult<ServiceProvider> {
        ServiceProvider::seal(self.descriptors, options)
    }
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.descriptors.iter()).finish()
    }
}
