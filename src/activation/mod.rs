//! Activation strategies: turning an implementation type into an executable
//! constructor.
//!
//! A type-based registration names an [`Injectable`] type. Its single declared
//! [`Constructor`] lists the contracts it needs, in parameter order. A strategy
//! turns that metadata into an [`Activation`], the routine a scope runs to
//! build one instance. Two interchangeable strategies ship with the crate:
//!
//! - [`ReflectiveActivation`] re-reads the constructor metadata on every call,
//!   resolves each parameter by key and invokes the constructor with an erased
//!   argument vector.
//! - [`CompiledActivation`] inspects the metadata once and captures the
//!   monomorphised resolve-and-invoke closure, so each call goes straight to
//!   the typed constructor.
//!
//! Both build identical object graphs; which one a provider uses is chosen
//! through [`ContainerOptions`](crate::ContainerOptions).

mod compiled;
mod constructor;
mod reflective;

pub use compiled::CompiledActivation;
pub use constructor::{Constructor, ConstructorFn, ConstructorInfo, Dependencies, Dependency, Injectable};
pub use reflective::ReflectiveActivation;

use crate::descriptors::ImplementationType;
use crate::error::DiResult;
use crate::registration::Activation;

/// Builds the activation routine for a type-based registration.
///
/// Called at most once per contract per provider; the result is memoised by
/// the provider and shared by every scope. Implementations must reject types
/// that do not declare exactly one constructor
/// ([`DiError::NoConstructor`](crate::DiError::NoConstructor) /
/// [`DiError::AmbiguousConstructor`](crate::DiError::AmbiguousConstructor)).
pub trait ActivationStrategy: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Turn the implementation's constructor metadata into an activation.
    fn build_activation(&self, implementation: &ImplementationType) -> DiResult<Activation>;
}
