//! Eager validation of a sealed registry.
//!
//! Resolution reports configuration mistakes lazily, the first time the
//! affected contract is requested. Validation finds the same mistakes up
//! front for type-based registrations, whose dependencies are declared
//! statically. Factories are opaque and are not inspected.
//!
//! # Validation Rules
//!
//! - **No single constructor**: Error - `NoConstructor` / `AmbiguousConstructor`
//! - **Missing dependency**: Error - a constructor parameter is not registered
//! - **Circular dependency**: Error - constructor dependencies form a cycle
//! - **Singleton → Scoped**: Warning - the singleton captures the scoped
//!   instance cached in the root scope
//! - **Singleton → Transient**: Warning - the singleton holds one transient
//!   instance forever

use std::fmt;

use crate::error::{DiError, DiResult};
use crate::internal::FastMap;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ProviderInner;

/// Non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A singleton's constructor takes a scoped contract.
    SingletonDependsOnScoped {
        singleton: &'static str,
        scoped: &'static str,
    },
    /// A singleton's constructor takes a transient contract.
    SingletonDependsOnTransient {
        singleton: &'static str,
        transient: &'static str,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SingletonDependsOnScoped { singleton, scoped } => {
                write!(f, "Singleton {} depends on scoped {}", singleton, scoped)
            }
            ValidationWarning::SingletonDependsOnTransient { singleton, transient } => {
                write!(f, "Singleton {} holds transient {}", singleton, transient)
            }
        }
    }
}

/// Outcome of [`ServiceProvider::validate`](crate::ServiceProvider::validate).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ferrous_scope::{Constructor, DiError, Injectable, ServiceCollection};
///
/// struct Missing;
/// struct Needy(Arc<Missing>);
///
/// impl Injectable for Needy {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|m: Arc<Missing>| Needy(m))]
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_transient_type::<Needy>();
/// let provider = services.build().unwrap();
///
/// let report = provider.validate();
/// assert!(!report.is_valid());
/// assert!(matches!(report.errors()[0], DiError::NotRegistered(_)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    errors: Vec<DiError>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[DiError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// `Ok` when valid, otherwise the first error found.
    pub fn into_result(self) -> DiResult<()> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// One line per issue, errors first.
    pub fn format_issues(&self) -> String {
        let mut lines = Vec::with_capacity(self.errors.len() + self.warnings.len());
        lines.extend(self.errors.iter().map(|e| format!("error: {}", e)));
        lines.extend(self.warnings.iter().map(|w| format!("warning: {}", w)));
        lines.join("\n")
    }
}

pub(crate) fn validate(provider: &ProviderInner) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut graph: FastMap<Key, Vec<Key>> = FastMap::default();
    let mut order = Vec::new();

    for descriptor in provider.descriptors() {
        let Some(implementation) = descriptor.implementation_type() else {
            continue;
        };

        if let Err(error) = provider.activation(descriptor) {
            report.errors.push(error);
            continue;
        }
        let constructor = match implementation.constructor() {
            Ok(constructor) => constructor,
            Err(error) => {
                report.errors.push(error);
                continue;
            }
        };

        for param in constructor.params() {
            let dependency = match provider.descriptor(param) {
                Ok(dependency) => dependency,
                Err(error) => {
                    report.errors.push(error);
                    continue;
                }
            };
            if descriptor.lifetime() == Lifetime::Singleton {
                match dependency.lifetime() {
                    Lifetime::Scoped => report.warnings.push(ValidationWarning::SingletonDependsOnScoped {
                        singleton: descriptor.type_name(),
                        scoped: dependency.type_name(),
                    }),
                    Lifetime::Transient => {
                        report.warnings.push(ValidationWarning::SingletonDependsOnTransient {
                            singleton: descriptor.type_name(),
                            transient: dependency.type_name(),
                        })
                    }
                    Lifetime::Singleton => {}
                }
            }
        }

        order.push(descriptor.key());
        graph.insert(descriptor.key(), constructor.params().to_vec());
    }

    report
        .errors
        .extend(find_cycles(&graph, &order).into_iter().map(DiError::CyclicDependency));
    report
}

#[derive(Clone, Copy)]
enum Mark {
    Active,
    Done,
}

/// Every cycle reachable in `graph`, each reported once, as the path from
/// where it was entered back to the same contract.
fn find_cycles(graph: &FastMap<Key, Vec<Key>>, order: &[Key]) -> Vec<Vec<&'static str>> {
    let mut marks = FastMap::default();
    let mut stack = Vec::new();
    let mut cycles = Vec::new();
    for key in order {
        visit(*key, graph, &mut marks, &mut stack, &mut cycles);
    }
    cycles
}

fn visit(
    key: Key,
    graph: &FastMap<Key, Vec<Key>>,
    marks: &mut FastMap<Key, Mark>,
    stack: &mut Vec<Key>,
    cycles: &mut Vec<Vec<&'static str>>,
) {
    match marks.get(&key) {
        Some(Mark::Done) => return,
        Some(Mark::Active) => {
            let start = stack.iter().position(|k| *k == key).unwrap_or(0);
            let mut path: Vec<_> = stack[start..].iter().map(|k| k.display_name()).collect();
            path.push(key.display_name());
            cycles.push(path);
            return;
        }
        None => {}
    }

    marks.insert(key, Mark::Active);
    stack.push(key);
    if let Some(dependencies) = graph.get(&key) {
        for dependency in dependencies {
            visit(*dependency, graph, marks, stack, cycles);
        }
    }
    stack.pop();
    marks.insert(key, Mark::Done);
}
