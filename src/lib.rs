//! # ferrous-scope
//!
//! A dependency-resolution runtime: a sealed registry of producers, scopes
//! with per-scope instance caches and disposal ledgers, and interchangeable
//! activation strategies that turn a constructible type into a build routine.
//!
//! ## Features
//!
//! - **Lifetimes**: Singleton, Scoped and Transient, enforced by the scope
//! - **Constructor injection**: types declare their single constructor through [`Injectable`]
//! - **Two activation strategies**: [`ReflectiveActivation`] and [`CompiledActivation`]
//! - **Thread-safe lazy construction**: first successful build wins, no lock held while building
//! - **Circular dependency detection**: cycles fail with the full path instead of overflowing the stack
//! - **Ordered teardown**: disposables are released in build order, sync or async
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_scope::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_transient_factory::<UserService, _>(|resolver| {
//!     Ok(UserService {
//!         db: resolver.get::<Database>()?,
//!     })
//! });
//!
//! let provider = services.build().unwrap();
//! let user_service = provider.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Constructor Injection
//!
//! ```rust
//! use ferrous_scope::{Constructor, Injectable, Resolver, ServiceCollection};
//! use std::sync::Arc;
//!
//! trait Service: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct RealService;
//! impl Service for RealService {
//!     fn name(&self) -> &'static str { "real" }
//! }
//! impl Injectable for RealService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|| RealService)]
//!     }
//! }
//!
//! struct Controller {
//!     service: Arc<dyn Service>,
//! }
//! impl Injectable for Controller {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|service: Arc<dyn Service>| Controller { service })]
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_as::<dyn Service, RealService, _>(|s| s);
//! services.add_transient_type::<Controller>();
//!
//! let provider = services.build().unwrap();
//! let scope = provider.create_scope();
//! let controller = scope.get_required::<Controller>();
//! assert_eq!(controller.service.name(), "real");
//! assert!(Arc::ptr_eq(&controller.service, &scope.get_required::<dyn Service>()));
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once in the root scope and shared by every scope
//! - **Scoped**: Created once per scope (ideal for request contexts)
//! - **Transient**: Created fresh on every resolution
//!
//! ## Disposal
//!
//! ```rust
//! use ferrous_scope::{BoxError, Constructor, Dispose, Disposal, Injectable, Resolver, ServiceCollection};
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! static CLOSED: AtomicBool = AtomicBool::new(false);
//!
//! struct Connection;
//! impl Dispose for Connection {
//!     fn dispose(&self) -> Result<(), BoxError> {
//!         CLOSED.store(true, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//! impl Injectable for Connection {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|| Connection)]
//!     }
//!     fn disposal() -> Disposal<Self> {
//!         Disposal::sync()
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_type::<Connection>();
//! let provider = services.build().unwrap();
//!
//! let scope = provider.create_scope();
//! let _conn = scope.get_required::<Connection>();
//! assert!(!CLOSED.load(Ordering::SeqCst));
//! scope.dispose().unwrap();
//! assert!(CLOSED.load(Ordering::SeqCst));
//! ```

// Module declarations
pub mod activation;
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod traits;
pub mod validation;

mod internal;
mod registration;

pub use activation::{
    ActivationStrategy, CompiledActivation, Constructor, ConstructorFn, ConstructorInfo, Dependencies,
    Dependency, Injectable, ReflectiveActivation,
};
pub use collection::ServiceCollection;
pub use config::{ContainerOptions, DEFAULT_MAX_DEPTH};
pub use descriptors::{ImplementationType, ServiceDescriptor, ServiceSource};
pub use error::{DiError, DiResult, DisposeFailure};
pub use key::{key_of, Key};
pub use lifetime::Lifetime;
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use registration::{Activated, Activation, AnyArc, BuildFn};
pub use traits::{AsyncDispose, BoxError, Disposal, Dispose, Resolver, ResolverCore};
pub use validation::{ValidationReport, ValidationWarning};
