//! Contract identity for the dependency injection container.

use std::any::TypeId;
use std::fmt;

/// Key identifying a service contract.
///
/// Keys are nominal: two contracts are the same only when their `TypeId`s
/// are equal, no matter how alike their shapes are. Concrete types and
/// `dyn Trait` contracts share the same key space, so a registration for
/// `dyn Logger` and one for `ConsoleLogger` never collide.
///
/// # Examples
///
/// ```rust
/// use ferrous_scope::{Key, key_of};
///
/// trait Logger: Send + Sync {}
/// struct ConsoleLogger;
///
/// let concrete = key_of::<ConsoleLogger>();
/// let contract = Key::of::<dyn Logger>();
///
/// assert_ne!(concrete, contract);
/// assert_eq!(contract, key_of::<dyn Logger>());
/// assert!(contract.display_name().contains("Logger"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for the contract `C`, which may be unsized (`dyn Trait`).
    #[inline(always)]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// The `TypeId` the key is compared by.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Get the type or trait name for display
    ///
    /// This is the `std::any::type_name` result and is only used for
    /// diagnostics and error messages.
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

// TypeId-only comparison; the name is diagnostic
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Helper function for creating contract keys
#[inline(always)]
pub fn key_of<C: ?Sized + 'static>() -> Key {
    Key::of::<C>()
}
