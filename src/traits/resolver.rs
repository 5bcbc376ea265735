//! Resolver traits for service resolution.

use std::any::type_name;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::AnyArc;

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider) (resolving
/// through the root scope), [`Scope`](crate::Scope) and the
/// [`ResolverContext`](crate::ResolverContext) handed to factories and
/// constructors. Most callers use the typed methods of [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves the contract identified by `key`.
    ///
    /// The erased value is always an `Arc<C>` for the contract `C` the key
    /// was built from.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;
}

/// Typed resolution on top of [`ResolverCore`].
///
/// Works for concrete and trait-object contracts alike.
///
/// # Examples
///
/// ```
/// use ferrous_scope::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(42usize);
/// collection.add_singleton_trait::<dyn Logger>(Arc::new(ConsoleLogger));
///
/// let provider = collection.build().unwrap();
///
/// let number = provider.get_required::<usize>();
/// assert_eq!(*number, 42);
///
/// let logger = provider.get::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("resolved"), "LOG: resolved");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves contract `C`.
    fn get<C: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<C>> {
        let any = self.resolve_any(&Key::of::<C>())?;
        any.downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or(DiError::TypeMismatch(type_name::<C>()))
    }

    /// Resolves contract `C`, panicking on failure.
    ///
    /// Convenient in tests and at composition roots where a missing
    /// registration is a programming error.
    fn get_required<C: ?Sized + Send + Sync + 'static>(&self) -> Arc<C> {
        self.get::<C>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {:?}", type_name::<C>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
