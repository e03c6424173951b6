//! Specialized collection types

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a node in the UI arena.
    ///
    /// Handles stay valid for the lifetime of the node and are never reused
    /// for another node, so a stale handle simply fails lookups.
    pub struct NodeId;
}

/// Handle-based map using slot map for stable references
pub type NodeMap<T> = SlotMap<NodeId, T>;
