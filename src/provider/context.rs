//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which factories and
//! constructors use to resolve their own dependencies.

use crate::error::DiResult;
use crate::internal::ResolutionPath;
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

use super::scope::ScopeState;
use super::ProviderInner;

/// Context passed to factory functions and constructors for resolving
/// dependencies.
///
/// Resolves through the scope that is performing the build and remembers
/// which contracts are already being built on this call stack, so a
/// dependency cycle is reported as
/// [`DiError::CyclicDependency`](crate::DiError::CyclicDependency) instead of
/// recursing without end.
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
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     // resolver is a ResolverContext that provides access to other services
///     Ok(UserService {
///         db: resolver.get::<Database>()?,
///     })
/// });
///
/// let provider = services.build().unwrap();
/// assert_eq!(provider.get_required::<UserService>().db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    provider: &'a ProviderInner,
    scope: &'a ScopeState,
    path: &'a ResolutionPath<'a>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(
        provider: &'a ProviderInner,
        scope: &'a ScopeState,
        path: &'a ResolutionPath<'a>,
    ) -> Self {
        Self { provider, scope, path }
    }

    /// Id of the scope performing the build.
    pub fn scope_id(&self) -> u64 {
        self.scope.id()
    }

    /// Whether the build is running in the provider's root scope.
    pub fn is_root(&self) -> bool {
        self.scope.is_root()
    }

    /// Number of builds in progress on this call stack, this one included.
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Contracts being built on this call stack, outermost first.
    pub fn path(&self) -> Vec<&'static str> {
        self.path.names()
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.scope.resolve(self.provider, key, self.path)
    }
}
