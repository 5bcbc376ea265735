use crate::descriptors::ImplementationType;
use crate::error::DiResult;
use crate::registration::{build_fn, Activation};
use crate::traits::ResolverCore;

use super::ActivationStrategy;

/// Re-reads the constructor metadata on every activation.
///
/// Each call looks the single constructor up again, resolves its parameters
/// by key into an erased argument vector and invokes it. Simple, at the price
/// of a metadata lookup and an allocation per build.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectiveActivation;

impl ActivationStrategy for ReflectiveActivation {
    fn name(&self) -> &'static str {
        "reflective"
    }

    fn build_activation(&self, implementation: &ImplementationType) -> DiResult<Activation> {
        // Surface NoConstructor / AmbiguousConstructor now, not on every call.
        implementation.constructor()?;

        let implementation = implementation.clone();
        Ok(build_fn(move |ctx| {
            let constructor = implementation.constructor()?;
            let mut args = Vec::with_capacity(constructor.params().len());
            for key in constructor.params() {
                args.push(ctx.resolve_any(key)?);
            }
            constructor.invoke(args)
        }))
    }
}
