//! Disposal traits for resource cleanup.

use std::sync::Arc;

use crate::internal::Disposer;

/// Boxed error returned by release hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for synchronous resource disposal.
///
/// Implement this trait for services that need structured teardown (e.g., flushing caches,
/// closing connections). A failing release is recorded and reported once the owning
/// scope has finished draining; it never stops the remaining entries from being released.
///
/// # Examples
///
/// ```
/// use ferrous_scope::{BoxError, Dispose};
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) -> Result<(), BoxError> {
///         println!("Flushing cache: {}", self.name);
///         Ok(())
///     }
/// }
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self) -> Result<(), BoxError>;
}

/// Trait for asynchronous resource disposal.
///
/// Implement this trait for services that require async teardown (e.g., graceful connection
/// shutdown). `Scope::dispose_async` awaits the release; the synchronous `Scope::dispose`
/// blocks the calling thread until it completes.
///
/// # Examples
///
/// ```
/// use ferrous_scope::{AsyncDispose, BoxError};
/// use async_trait::async_trait;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) -> Result<(), BoxError> {
///         println!("Closing database connection: {}", self.connection_id);
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self) -> Result<(), BoxError>;
}

/// Disposal capability of the values a registration produces.
///
/// Rust cannot ask an erased instance whether it implements [`Dispose`], so the
/// capability is chosen when the registration is made and travels with the
/// descriptor. Every instance built from that registration is then recorded on
/// the ledger of the scope that built it.
///
/// Works for trait-object contracts too, as long as the trait has `Dispose` or
/// `AsyncDispose` as a supertrait.
///
/// ```
/// use ferrous_scope::{BoxError, Disposal, Dispose};
///
/// trait Connection: Dispose {}
///
/// struct Tcp;
/// impl Dispose for Tcp {
///     fn dispose(&self) -> Result<(), BoxError> { Ok(()) }
/// }
/// impl Connection for Tcp {}
///
/// let concrete: Disposal<Tcp> = Disposal::sync();
/// let contract: Disposal<dyn Connection> = Disposal::sync();
/// assert!(concrete.is_disposable() && contract.is_disposable());
/// assert!(!Disposal::<u32>::none().is_disposable());
/// ```
pub struct Disposal<T: ?Sized> {
    hook: Option<fn(Arc<T>) -> Disposer>,
}

impl<T: ?Sized> Disposal<T> {
    /// Values are not disposable.
    pub const fn none() -> Self {
        Self { hook: None }
    }

    /// Whether built values are recorded on the disposal ledger.
    pub fn is_disposable(&self) -> bool {
        self.hook.is_some()
    }

    pub(crate) fn disposer(&self, value: &Arc<T>) -> Option<Disposer> {
        self.hook.map(|hook| hook(value.clone()))
    }
}

impl<T: ?Sized + Dispose> Disposal<T> {
    /// Values are released through [`Dispose::dispose`].
    pub fn sync() -> Self {
        Self { hook: Some(Disposer::sync::<T>) }
    }
}

impl<T: ?Sized + AsyncDispose> Disposal<T> {
    /// Values are released through [`AsyncDispose::dispose`].
    pub fn asynchronous() -> Self {
        Self { hook: Some(Disposer::asynchronous::<T>) }
    }
}

impl<T: ?Sized> Clone for Disposal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Disposal<T> {}

impl<T: ?Sized> Default for Disposal<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: ?Sized> std::fmt::Debug for Disposal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposal")
            .field("disposable", &self.is_disposable())
            .finish()
    }
}
