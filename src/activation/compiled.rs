use crate::descriptors::ImplementationType;
use crate::error::DiResult;
use crate::registration::Activation;

use super::ActivationStrategy;

/// Inspects the constructor metadata once and keeps the typed routine.
///
/// The routine was monomorphised when the constructor was declared, so a
/// build resolves each parameter and calls the constructor directly, with no
/// metadata lookup or erased argument vector.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompiledActivation;

impl ActivationStrategy for CompiledActivation {
    fn name(&self) -> &'static str {
        "compiled"
    }

    fn build_activation(&self, implementation: &ImplementationType) -> DiResult<Activation> {
        Ok(implementation.constructor()?.compiled())
    }
}
