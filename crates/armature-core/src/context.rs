//! Shared build context
//!
//! One [`RigContext`] value is threaded by reference through every module
//! stage that needs rig-wide handles or the running aggregates. Nothing in
//! the core resolves well-known names from a global scene.

use crate::anchor::AnchorRegistry;
use crate::socket::SocketGraph;

/// Rig-wide handles and running aggregates for one build session
#[derive(Debug, Clone)]
pub struct RigContext {
    /// Rig name, used as the prefix of every generated node name
    pub rig_name: String,
    /// Top group every module parents under
    pub root_group: String,
    /// Master/preferences control carrying rig-wide attributes
    pub master_control: String,
    /// All sockets registered so far, append-only during a build
    pub sockets: SocketGraph,
    /// Anchor candidates surfaced so far
    pub anchors: AnchorRegistry,
    /// Deformer joints aggregated for downstream skin binding
    pub deformer_joints: Vec<String>,
}

impl RigContext {
    pub fn new(rig_name: impl Into<String>) -> Self {
        let rig_name = rig_name.into();
        Self {
            root_group: format!("{rig_name}_rig_grp"),
            master_control: format!("{rig_name}_master_ctl"),
            rig_name,
            sockets: SocketGraph::new(),
            anchors: AnchorRegistry::new(),
            deformer_joints: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_derive_from_rig_name() {
        let ctx = RigContext::new("hero");
        assert_eq!(ctx.root_group, "hero_rig_grp");
        assert_eq!(ctx.master_control, "hero_master_ctl");
        assert!(ctx.sockets.is_empty());
    }
}
