//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// Fixed at registration time and immutable thereafter.
///
/// # Examples
///
/// ```rust
/// use ferrous_scope::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
/// struct RequestModel { id: u32 }
///
/// let mut services = ServiceCollection::new();
///
/// // Singleton: One instance for entire application
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
///
/// // Scoped: One instance per request/scope
/// services.add_scoped_factory::<Repository, _>(|r| {
///     let db = r.get::<Database>()?;
///     Ok(Repository { db_url: db.url.clone() })
/// });
///
/// // Transient: New instance every time
/// services.add_transient_factory::<RequestModel, _>(|_| Ok(RequestModel { id: 12345 }));
///
/// let provider = services.build().unwrap();
///
/// // Singleton: Same instance across scopes
/// let db1 = provider.get_required::<Database>();
/// let scope1 = provider.create_scope();
/// let db2 = scope1.get_required::<Database>();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Scoped: Same within scope, different across scopes
/// let repo1a = scope1.get_required::<Repository>();
/// let repo1b = scope1.get_required::<Repository>();
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
///
/// let scope2 = provider.create_scope();
/// let repo2 = scope2.get_required::<Repository>();
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
///
/// // Transient: Always different instances
/// let model1 = scope1.get_required::<RequestModel>();
/// let model2 = scope1.get_required::<RequestModel>();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// assert_eq!(model1.id, 12345);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// New instance per resolution, never cached
    ///
    /// The instance is owned solely by its immediate consumer; if it is
    /// disposable, the scope that built it still releases it at teardown.
    Transient,
    /// Single instance per scope, cached for scope lifetime
    ///
    /// Multiple requests within the same scope return the same instance,
    /// different scopes get different instances.
    Scoped,
    /// Single instance per provider, cached in the root scope
    ///
    /// Requests from child scopes are delegated to the root scope, so every
    /// scope observes the instance of the first successful build.
    Singleton,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
            Lifetime::Singleton => "singleton",
        };
        f.write_str(name)
    }
}
