//! Statically declared constructor metadata.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::provider::ResolverContext;
use crate::registration::{build_fn, Activated, Activation, AnyArc, BuildFn};
use crate::traits::{Disposal, ResolverCore};

/// A type the container can construct by itself.
///
/// The type lists its constructors; activation requires exactly one. Each
/// constructor parameter is an `Arc` of a registered contract and is resolved,
/// left to right, from the scope performing the build.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ferrous_scope::{Constructor, Injectable, Resolver, ServiceCollection};
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// struct Stamper {
///     clock: Arc<dyn Clock>,
/// }
///
/// impl Injectable for Stamper {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|clock: Arc<dyn Clock>| Stamper { clock })]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_trait::<dyn Clock>(Arc::new(FixedClock));
/// services.add_transient_type::<Stamper>();
///
/// let provider = services.build().unwrap();
/// assert_eq!(provider.get_required::<Stamper>().clock.now(), 42);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Declared constructors. Activation fails unless there is exactly one.
    fn constructors() -> Vec<Constructor<Self>>;

    /// Disposal capability of constructed values.
    fn disposal() -> Disposal<Self> {
        Disposal::none()
    }
}

/// One constructor of `T`: its parameter contracts plus two ways of calling it.
///
/// The erased form takes already-resolved arguments in parameter order; the
/// typed form resolves its own arguments and calls straight through.
pub struct Constructor<T> {
    params: Vec<Key>,
    invoke: Arc<dyn Fn(Vec<AnyArc>) -> DiResult<T> + Send + Sync>,
    build: BuildFn<T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Declares an infallible constructor.
    pub fn new<Args, F>(f: F) -> Self
    where
        Args: Dependencies,
        F: ConstructorFn<Args, T>,
    {
        let f = Arc::new(f);
        let erased = f.clone();
        Self {
            params: Args::keys(),
            invoke: Arc::new(move |args: Vec<AnyArc>| -> DiResult<T> {
                Ok(erased.call(Args::from_args(args)?))
            }),
            build: build_fn(move |ctx| Ok(f.call(Args::resolve(ctx)?))),
        }
    }

    /// Declares a constructor that can fail; its error is returned from the
    /// resolve call that triggered the build.
    pub fn try_new<Args, F>(f: F) -> Self
    where
        Args: Dependencies,
        F: ConstructorFn<Args, DiResult<T>>,
    {
        let f = Arc::new(f);
        let erased = f.clone();
        Self {
            params: Args::keys(),
            invoke: Arc::new(move |args: Vec<AnyArc>| -> DiResult<T> { erased.call(Args::from_args(args)?) }),
            build: build_fn(move |ctx| f.call(Args::resolve(ctx)?)),
        }
    }

    /// Parameter contracts in declaration order.
    pub fn params(&self) -> &[Key] {
        &self.params
    }

    /// Binds the constructor to a registration, producing erased instances.
    pub(crate) fn erase(self, finish: Arc<dyn Fn(T) -> Activated + Send + Sync>) -> ConstructorInfo {
        let Constructor { params, invoke, build } = self;
        let finish_invoked = finish.clone();
        ConstructorInfo {
            owner: type_name::<T>(),
            params,
            invoke: Arc::new(move |args: Vec<AnyArc>| -> DiResult<Activated> {
                invoke(args).map(|value| finish_invoked(value))
            }),
            build: build_fn(move |ctx| build(ctx).map(|value| finish(value))),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("type", &type_name::<T>())
            .field("params", &self.params)
            .finish()
    }
}

/// A constructor with its result type erased, as seen by activation strategies.
#[derive(Clone)]
pub struct ConstructorInfo {
    owner: &'static str,
    params: Vec<Key>,
    invoke: Arc<dyn Fn(Vec<AnyArc>) -> DiResult<Activated> + Send + Sync>,
    build: Activation,
}

impl ConstructorInfo {
    /// Name of the type this constructor produces.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Parameter contracts in declaration order.
    pub fn params(&self) -> &[Key] {
        &self.params
    }

    /// Calls the constructor with resolved arguments, one per parameter, in
    /// declaration order.
    pub fn invoke(&self, args: Vec<AnyArc>) -> DiResult<Activated> {
        (self.invoke)(args)
    }

    /// The typed resolve-and-invoke routine captured when the constructor was
    /// declared.
    pub fn compiled(&self) -> Activation {
        self.build.clone()
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("owner", &self.owner)
            .field("params", &self.params)
            .finish()
    }
}

/// A single constructor parameter.
pub trait Dependency: Sized + Send + Sync + 'static {
    /// Contract this parameter is resolved as.
    fn key() -> Key;

    /// Recovers the parameter from an erased instance of its contract.
    fn from_any(value: AnyArc) -> DiResult<Self>;

    /// Resolves the parameter through `ctx`.
    fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self> {
        Self::from_any(ctx.resolve_any(&Self::key())?)
    }
}

impl<C: ?Sized + Send + Sync + 'static> Dependency for Arc<C> {
    fn key() -> Key {
        Key::of::<C>()
    }

    fn from_any(value: AnyArc) -> DiResult<Self> {
        value
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or(DiError::TypeMismatch(type_name::<C>()))
    }
}

/// An ordered parameter list: a tuple of [`Dependency`] values.
pub trait Dependencies: Sized + Send + Sync + 'static {
    /// Contracts in parameter order.
    fn keys() -> Vec<Key>;

    /// Builds the tuple from erased arguments in parameter order.
    fn from_args(args: Vec<AnyArc>) -> DiResult<Self>;

    /// Resolves every parameter through `ctx`, left to right.
    fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self>;
}

/// A callable usable as a constructor for parameter list `Args`.
///
/// Implemented for every `Fn` of up to eight [`Dependency`] parameters.
pub trait ConstructorFn<Args, R>: Send + Sync + 'static {
    /// Calls the constructor.
    fn call(&self, args: Args) -> R;
}

macro_rules! impl_constructor_arity {
    ($(($ty:ident, $var:ident)),*) => {
        impl<$($ty: Dependency),*> Dependencies for ($($ty,)*) {
            fn keys() -> Vec<Key> {
                vec![$($ty::key()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_args(args: Vec<AnyArc>) -> DiResult<Self> {
                let mut args = args.into_iter();
                $(
                    let $var = match args.next() {
                        Some(value) => $ty::from_any(value)?,
                        None => return Err(DiError::TypeMismatch(type_name::<$ty>())),
                    };
                )*
                Ok(($($var,)*))
            }

            #[allow(unused_variables)]
            fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self> {
                $(let $var = $ty::resolve(ctx)?;)*
                Ok(($($var,)*))
            }
        }

        impl<Func, R, $($ty),*> ConstructorFn<($($ty,)*), R> for Func
        where
            Func: Fn($($ty),*) -> R + Send + Sync + 'static,
            $($ty: Dependency,)*
        {
            #[allow(non_snake_case, unused_variables)]
            fn call(&self, args: ($($ty,)*)) -> R {
                let ($($var,)*) = args;
                (self)($($var),*)
            }
        }
    };
}

impl_constructor_arity!();
impl_constructor_arity!((A1, a1));
impl_constructor_arity!((A1, a1), (A2, a2));
impl_constructor_arity!((A1, a1), (A2, a2), (A3, a3));
impl_constructor_arity!((A1, a1), (A2, a2), (A3, a3), (A4, a4));
impl_constructor_arity!((A1, a1), (A2, a2), (A3, a3), (A4, a4), (A5, a5));
impl_constructor_arity!((A1, a1), (A2, a2), (A3, a3), (A4, a4), (A5, a5), (A6, a6));
impl_constructor_arity!((A1, a1), (A2, a2), (A3, a3), (A4, a4), (A5, a5), (A6, a6), (A7, a7));
impl_constructor_arity!((A1, a1), (A2, a2), (A3, a3), (A4, a4), (A5, a5), (A6, a6), (A7, a7), (A8, a8));
