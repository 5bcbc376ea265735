//! Container options chosen when the registry is sealed.

use std::fmt;
use std::sync::Arc;

use crate::activation::{ActivationStrategy, CompiledActivation, ReflectiveActivation};

/// Default limit on nested resolutions along one path.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options applied to a provider for its whole life.
///
/// # Examples
///
/// ```
/// use ferrous_scope::{ContainerOptions, ServiceCollection};
///
/// let options = ContainerOptions::default()
///     .reflective()
///     .with_max_depth(64)
///     .validate_on_build(true);
///
/// let provider = ServiceCollection::new().build_with(options).unwrap();
/// assert_eq!(provider.strategy_name(), "reflective");
/// ```
#[derive(Clone)]
pub struct ContainerOptions {
    activation: Arc<dyn ActivationStrategy>,
    max_depth: usize,
    validate_on_build: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            activation: Arc::new(CompiledActivation),
            max_depth: DEFAULT_MAX_DEPTH,
            validate_on_build: false,
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom activation strategy for type-based registrations.
    pub fn with_strategy<S: ActivationStrategy + 'static>(mut self, strategy: S) -> Self {
        self.activation = Arc::new(strategy);
        self
    }

    /// Use [`ReflectiveActivation`].
    pub fn reflective(self) -> Self {
        self.with_strategy(ReflectiveActivation)
    }

    /// Use [`CompiledActivation`] (the default).
    pub fn compiled(self) -> Self {
        self.with_strategy(CompiledActivation)
    }

    /// Limit on nested resolutions before `DepthExceeded` is returned.
    /// Values below 1 are raised to 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Run [`ServiceProvider::validate`](crate::ServiceProvider::validate)
    /// while building and fail on the first error.
    pub fn validate_on_build(mut self, enabled: bool) -> Self {
        self.validate_on_build = enabled;
        self
    }

    pub fn activation(&self) -> &dyn ActivationStrategy {
        self.activation.as_ref()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn validates_on_build(&self) -> bool {
        self.validate_on_build
    }
}

impl fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("activation", &self.activation.name())
            .field("max_depth", &self.max_depth)
            .field("validate_on_build", &self.validate_on_build)
            .finish()
    }
}
