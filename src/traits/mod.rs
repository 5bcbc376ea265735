//! Core traits for the dependency injection container.

mod dispose;
mod resolver;

pub use dispose::{AsyncDispose, BoxError, Disposal, Dispose};
pub use resolver::{Resolver, ResolverCore};
