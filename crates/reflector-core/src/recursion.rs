//! Bounding mirror-in-mirror recursion.

/// Nesting depth of the camera a reflector is viewed from.
///
/// The application's camera uses [`RecursionGuard::root`], which never blocks.
/// Every virtual camera carries the [`child`](RecursionGuard::child) of its
/// viewer's guard, so depth grows along parent→child chains of reflections
/// while sibling reflectors seen from the same camera share the same depth.
/// A reflector with recursion bound `b` renders from a virtual camera only
/// while that camera's depth is below `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecursionGuard {
    depth: Option<u32>,
}

impl RecursionGuard {
    /// Guard for the primary viewer.
    #[must_use]
    pub const fn root() -> Self {
        Self { depth: None }
    }

    /// Guard for a virtual camera at `depth` (0 for the first reflection).
    #[must_use]
    pub const fn at_depth(depth: u32) -> Self {
        Self { depth: Some(depth) }
    }

    /// Depth of the viewer, or `None` for the primary viewer.
    #[must_use]
    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// Whether this guard belongs to a virtual camera.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.depth.is_some()
    }

    /// Whether a reflector with recursion bound `bound` may render when
    /// viewed through this guard.
    #[must_use]
    pub fn allows(&self, bound: u32) -> bool {
        match self.depth {
            None => true,
            Some(depth) => depth < bound,
        }
    }

    /// Guard for the virtual camera of a reflector viewed through this guard.
    #[must_use]
    pub fn child(&self) -> Self {
        match self.depth {
            None => Self::at_depth(0),
            Some(depth) => Self::at_depth(depth.saturating_add(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_never_blocks() {
        let guard = RecursionGuard::root();
        assert!(guard.allows(0));
        assert!(guard.allows(u32::MAX));
        assert_eq!(guard.depth(), None);
        assert!(!guard.is_nested());
    }

    #[test]
    fn test_zero_bound_blocks_nested() {
        let first_reflection = RecursionGuard::root().child();
        assert_eq!(first_reflection.depth(), Some(0));
        assert!(!first_reflection.allows(0));
    }

    #[test]
    fn test_bound_one_allows_a_single_nested_level() {
        let first = RecursionGuard::root().child();
        assert!(first.allows(1));

        let second = first.child();
        assert_eq!(second.depth(), Some(1));
        assert!(!second.allows(1));
    }

    #[test]
    fn test_siblings_share_depth() {
        let viewer = RecursionGuard::at_depth(0);
        // Checking does not consume anything.
        assert!(viewer.allows(2));
        assert!(viewer.allows(2));
        assert_eq!(viewer.child(), viewer.child());
    }

    #[test]
    fn test_child_saturates() {
        let deep = RecursionGuard::at_depth(u32::MAX);
        assert_eq!(deep.child().depth(), Some(u32::MAX));
    }
}
