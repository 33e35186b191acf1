use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle to a node owned by the rendering collaborator.
///
/// The core never touches mesh memory; it refers to renderer-owned
/// subtrees by handle and tells the scene sink which handles should be
/// visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Mints a fresh, process-unique handle.
    pub fn allocate() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The visible scene, owned by the rendering collaborator.
///
/// `add` and `remove` are not idempotent: adding a node twice or removing
/// one that is absent is a collaborator error. The registry tracks
/// membership itself and never issues duplicate calls.
pub trait Scene {
    fn add(&mut self, node: NodeId);
    fn remove(&mut self, node: NodeId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_handles_are_unique() {
        let a = NodeId::allocate();
        let b = NodeId::allocate();
        assert_ne!(a, b);
    }
}
