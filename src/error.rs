//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur while sealing a
/// registry, resolving a service, or tearing a scope down. None of them are
/// retried internally: they propagate synchronously out of the call that
/// triggered them.
///
/// # Examples
///
/// ```rust
/// use ferrous_scope::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build().unwrap();
/// match provider.get::<String>() {
///     Err(DiError::NotRegistered(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
///
/// let circular = DiError::CyclicDependency(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// No descriptor is registered for the requested contract
    #[error("Service not registered: {0}")]
    NotRegistered(&'static str),
    /// The same contract was registered more than once before sealing
    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(&'static str),
    /// The implementation type declares no constructor
    #[error("No constructor declared for: {0}")]
    NoConstructor(&'static str),
    /// The implementation type declares more than one constructor
    #[error("Ambiguous constructor for {service}: {count} constructors declared")]
    AmbiguousConstructor {
        service: &'static str,
        count: usize,
    },
    /// Circular dependency detected (includes path, outermost first)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Resolution was attempted on a scope that has been torn down
    #[error("Scope {0} has already been disposed")]
    ScopeDisposed(u64),
    /// A factory reported a failure while producing an instance
    #[error("Factory for {service} failed: {message}")]
    Factory {
        service: &'static str,
        message: String,
    },
    /// One or more ledger entries failed to release during teardown
    #[error("{} service(s) failed to dispose: {}", .0.len(), join_failures(.0))]
    Dispose(Vec<DisposeFailure>),
}

impl DiError {
    /// Wraps an arbitrary failure raised while producing `C`.
    pub fn factory<C: ?Sized>(error: impl fmt::Display) -> Self {
        DiError::Factory {
            service: std::any::type_name::<C>(),
            message: error.to_string(),
        }
    }
}

/// A single release failure recorded while draining a disposal ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposeFailure {
    /// Type name of the service whose release failed
    pub service: &'static str,
    /// Error message (or panic payload) reported by the release hook
    pub message: String,
}

impl fmt::Display for DisposeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.service, self.message)
    }
}

fn join_failures(failures: &[DisposeFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
