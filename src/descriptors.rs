//! Service descriptors: what the registry knows about each contract.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::activation::{ConstructorInfo, Injectable};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::registration::{build_fn, Activated, Activation, AnyArc};
use crate::traits::Disposal;

/// Immutable description of how to produce one contract.
///
/// A descriptor pairs a contract [`Key`] with a [`Lifetime`] and exactly one
/// [`ServiceSource`]. Descriptors are usually created through the
/// `ServiceCollection::add_*` helpers; building them directly and passing
/// them to `ServiceCollection::register` is equivalent.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use ferrous_scope::{Disposal, Lifetime, ServiceCollection, ServiceDescriptor, Resolver};
///
/// let mut services = ServiceCollection::new();
/// services.register(ServiceDescriptor::instance(Arc::new(8080u16), Disposal::none()));
/// services.register(ServiceDescriptor::factory::<String, _>(
///     Lifetime::Scoped,
///     |r| Ok(Arc::new(format!("port {}", r.get::<u16>()?))),
///     Disposal::none(),
/// ));
///
/// let provider = services.build().unwrap();
/// let port = provider.descriptors().find(|d| d.type_name() == "u16").unwrap();
/// assert_eq!(port.lifetime(), Lifetime::Singleton);
/// assert!(port.is_instance());
///
/// let scope = provider.create_scope();
/// assert_eq!(scope.get_required::<String>().as_str(), "port 8080");
/// ```
#[derive(Clone)]
pub struct ServiceDescriptor {
    key: Key,
    lifetime: Lifetime,
    source: ServiceSource,
    implementation_name: &'static str,
    disposable: bool,
}

/// Where the instances of a descriptor come from.
#[derive(Clone)]
pub enum ServiceSource {
    /// A type the container constructs through its declared constructor.
    Implementation(ImplementationType),
    /// A user routine invoked with a resolution context.
    Factory(Activation),
    /// A value built before the registry was sealed.
    Instance(Activation),
}

impl ServiceDescriptor {
    /// Contract `C` produced by constructing `T` and coercing it with `cast`.
    ///
    /// For a concrete contract use `|s| s`; for a trait contract the same
    /// closure performs the unsizing coercion to `Arc<dyn Trait>`.
    pub fn implementation<C, T, F>(lifetime: Lifetime, cast: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        Self {
            key: Key::of::<C>(),
            lifetime,
            source: ServiceSource::Implementation(ImplementationType::of::<C, T, F>(cast)),
            implementation_name: type_name::<T>(),
            disposable: T::disposal().is_disposable(),
        }
    }

    /// Contract `C` produced by a factory.
    pub fn factory<C, F>(lifetime: Lifetime, factory: F, disposal: Disposal<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<Arc<C>> + Send + Sync + 'static,
    {
        let activation = build_fn(move |ctx| {
            let value = factory(ctx)?;
            let disposer = disposal.disposer(&value);
            Ok(Activated::new(Arc::new(value), disposer))
        });
        Self {
            key: Key::of::<C>(),
            lifetime,
            source: ServiceSource::Factory(activation),
            implementation_name: type_name::<C>(),
            disposable: disposal.is_disposable(),
        }
    }

    /// A pre-built value of contract `C`. The lifetime is always Singleton.
    ///
    /// With a disposal capability, the value is released when the provider
    /// is disposed, provided it was resolved at least once.
    pub fn instance<C>(value: Arc<C>, disposal: Disposal<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        // One erased handle, so racing builds of the root cache hand back the same object.
        let erased: AnyArc = Arc::new(value.clone());
        let activation = build_fn(move |_| Ok(Activated::new(erased.clone(), disposal.disposer(&value))));
        Self {
            key: Key::of::<C>(),
            lifetime: Lifetime::Singleton,
            source: ServiceSource::Instance(activation),
            implementation_name: type_name::<C>(),
            disposable: disposal.is_disposable(),
        }
    }

    /// Contract key.
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn source(&self) -> &ServiceSource {
        &self.source
    }

    /// Contract name, as reported in errors.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// Name of the type actually produced. Equal to [`type_name`](Self::type_name)
    /// for factories and instances.
    pub fn implementation_name(&self) -> &'static str {
        self.implementation_name
    }

    /// Whether produced values are recorded on a disposal ledger.
    pub fn is_disposable(&self) -> bool {
        self.disposable
    }

    pub fn is_implementation(&self) -> bool {
        matches!(self.source, ServiceSource::Implementation(_))
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.source, ServiceSource::Factory(_))
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.source, ServiceSource::Instance(_))
    }

    /// The implementation type, for type-based descriptors.
    pub fn implementation_type(&self) -> Option<&ImplementationType> {
        match &self.source {
            ServiceSource::Implementation(implementation) => Some(implementation),
            _ => None,
        }
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            ServiceSource::Implementation(_) => "implementation",
            ServiceSource::Factory(_) => "factory",
            ServiceSource::Instance(_) => "instance",
        };
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("source", &source)
            .field("implementation", &self.implementation_name)
            .field("disposable", &self.disposable)
            .finish()
    }
}

/// A constructible type bound to the contract it is registered as.
///
/// Holds the type's constructor metadata with the coercion to the contract
/// and the disposal capability already applied, so activation strategies only
/// ever see [`ConstructorInfo`].
#[derive(Clone)]
pub struct ImplementationType {
    type_name: &'static str,
    constructors: Arc<dyn Fn() -> Vec<ConstructorInfo> + Send + Sync>,
}

impl ImplementationType {
    /// Binds `T` to contract `C` through `cast`.
    pub fn of<C, T, F>(cast: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        let cast = Arc::new(cast);
        let finish: Arc<dyn Fn(T) -> Activated + Send + Sync> = Arc::new(move |value: T| {
            let value = Arc::new(value);
            let disposer = T::disposal().disposer(&value);
            let contract: Arc<C> = cast(value);
            Activated::new(Arc::new(contract), disposer)
        });
        Self {
            type_name: type_name::<T>(),
            constructors: Arc::new(move || -> Vec<ConstructorInfo> {
                T::constructors()
                    .into_iter()
                    .map(|constructor| constructor.erase(finish.clone()))
                    .collect()
            }),
        }
    }

    /// `T` registered as itself.
    pub fn concrete<T: Injectable>() -> Self {
        Self::of::<T, T, _>(|value: Arc<T>| value)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Reads the declared constructors.
    pub fn constructors(&self) -> Vec<ConstructorInfo> {
        (self.constructors)()
    }

    /// The single declared constructor.
    pub fn constructor(&self) -> DiResult<ConstructorInfo> {
        let mut constructors = self.constructors();
        match constructors.len() {
            0 => Err(DiError::NoConstructor(self.type_name)),
            1 => Ok(constructors.remove(0)),
            count => Err(DiError::AmbiguousConstructor {
                service: self.type_name,
                count,
            }),
        }
    }
}

impl fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationType")
            .field("type", &self.type_name)
            .finish()
    }
}
