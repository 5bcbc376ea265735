//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod ledger;

pub(crate) use circular::ResolutionPath;
pub(crate) use ledger::{drain, drain_blocking, DisposeLedger, Disposer};

/// Map used for the sealed registry, activation memo and instance caches.
#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
