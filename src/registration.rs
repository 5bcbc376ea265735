//! Type-erased building blocks shared by descriptors, strategies and scopes.

use std::any::Any;
use std::sync::Arc;

use crate::error::DiResult;
use crate::internal::Disposer;
use crate::provider::ResolverContext;

/// Type-erased instance as stored in scope caches.
///
/// For a contract `C` the erased value is always an `Arc<C>`, so
/// `downcast_ref::<Arc<C>>()` recovers it for concrete and `dyn Trait`
/// contracts alike.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Boxed resolve-and-build routine producing values of `T`.
pub type BuildFn<T> = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync>;

/// The routine that, given a resolution context, produces one instance of a
/// contract.
pub type Activation = BuildFn<Activated>;

/// One built instance plus its ledger entry, if the value is disposable.
pub struct Activated {
    pub(crate) instance: AnyArc,
    pub(crate) disposer: Option<Disposer>,
}

impl Activated {
    pub(crate) fn new(instance: AnyArc, disposer: Option<Disposer>) -> Self {
        Self { instance, disposer }
    }

    /// The erased instance.
    pub fn instance(&self) -> &AnyArc {
        &self.instance
    }

    /// Whether the scope that built this instance must release it.
    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }
}

/// Boxes a closure as a [`BuildFn`], fixing its higher-ranked signature.
pub(crate) fn build_fn<T, F>(f: F) -> BuildFn<T>
where
    F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
{
    Arc::new(f)
}
