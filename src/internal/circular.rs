//! Circular dependency detection infrastructure.

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Chain of contracts currently being resolved on this call stack.
///
/// Each nested resolution pushes a frame that borrows its parent, so the
/// path lives on the stack of the resolving thread and unwinds with it.
/// Re-entering a contract already on the path is a cycle.
pub(crate) struct ResolutionPath<'a> {
    frame: Option<(Key, &'a ResolutionPath<'a>)>,
    depth: usize,
}

impl ResolutionPath<'static> {
    /// Empty path for a top-level resolve call.
    pub(crate) const fn root() -> Self {
        Self { frame: None, depth: 0 }
    }
}

impl<'a> ResolutionPath<'a> {
    /// Pushes `key`, failing if it is already in progress or the path is too deep.
    pub(crate) fn enter(&self, key: Key, max_depth: usize) -> DiResult<ResolutionPath<'_>> {
        // Circular detection BEFORE pushing the new key
        if self.keys().any(|k| k == key) {
            let mut path = self.names();
            path.push(key.display_name());
            return Err(DiError::CyclicDependency(path));
        }

        // Depth guard
        if self.depth >= max_depth {
            return Err(DiError::DepthExceeded(self.depth));
        }

        Ok(ResolutionPath {
            frame: Some((key, self)),
            depth: self.depth + 1,
        })
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Keys on the path, innermost first.
    fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        let mut cursor = Some(self);
        std::iter::from_fn(move || {
            let (key, parent) = cursor?.frame?;
            cursor = Some(parent);
            Some(key)
        })
    }

    /// Contract names on the path, outermost first.
    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.keys().map(|k| k.display_name()).collect();
        names.reverse();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of;

    struct A;
    struct B;

    #[test]
    fn reentry_reports_the_full_chain() {
        let root = ResolutionPath::root();
        let a = root.enter(key_of::<A>(), 16).unwrap();
        let b = a.enter(key_of::<B>(), 16).unwrap();
        assert_eq!(b.depth(), 2);

        match b.enter(key_of::<A>(), 16) {
            Err(DiError::CyclicDependency(path)) => {
                assert_eq!(path.len(), 3);
                assert!(path[0].ends_with("::A"));
                assert!(path[1].ends_with("::B"));
                assert!(path[2].ends_with("::A"));
            }
            _ => panic!("Expected CyclicDependency"),
        }
    }

    #[test]
    fn siblings_do_not_see_each_other() {
        let root = ResolutionPath::root();
        let a = root.enter(key_of::<A>(), 16).unwrap();
        let _b = a.enter(key_of::<B>(), 16).unwrap();
        // A second dependency of A resolving B again is not a cycle
        assert!(a.enter(key_of::<B>(), 16).is_ok());
    }

    #[test]
    fn depth_guard_trips_before_exhausting_the_stack() {
        let root = ResolutionPath::root();
        let a = root.enter(key_of::<A>(), 1).unwrap();
        assert!(matches!(a.enter(key_of::<B>(), 1), Err(DiError::DepthExceeded(1))));
    }
}
