//! # Armature Engine
//!
//! Orchestration layer running the linear rig-build pass: resolve the guide
//! tree, instantiate every limb module in resolver order, wire each one to
//! the nearest upstream socket, and aggregate the outputs (deformer joints,
//! anchors, socket table) for the downstream collaborators.
//!
//! ## Example
//!
//! ```ignore
//! use armature_engine::RigBuilder;
//! use armature_core::prelude::*;
//!
//! let tree = GuideTree::from_json(&guide_dump)?;
//! let rig = RigBuilder::new("hero").build(&tree)?;
//!
//! println!("{} deformer joints", rig.deformer_joints().len());
//! ```
//!
//! The build is single threaded and synchronous: no module is instantiated
//! before the record carrying its declared parent has finished, because its
//! attachment lookup needs the ancestor sockets to exist. There is no
//! rollback; a failed build leaves no reusable partial rig value.

pub mod rig;

use anyhow::{Context, Result};
use armature_core::context::RigContext;
use armature_core::guide::GuideTree;
use armature_core::module::build_module;
use armature_core::registry::ModuleRegistry;
use armature_core::resolver::{GuideTreeResolver, LimbRecord};
use armature_core::socket::SocketId;

// Re-export commonly used types from the core
pub use armature_core::guide::{GuideRecord, Side};
pub use armature_core::module::ModuleInstance;
pub use armature_core::registry::ModuleKind;
pub use rig::Rig;

/// Builds complete rigs from guide trees
pub struct RigBuilder {
    registry: ModuleRegistry,
    rig_name: String,
}

impl RigBuilder {
    /// Create a builder for a rig named `rig_name`
    pub fn new(rig_name: impl Into<String>) -> Self {
        Self {
            registry: ModuleRegistry::new(),
            rig_name: rig_name.into(),
        }
    }

    /// Module catalog this builder instantiates from
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    // ========================================================================
    // Build pass
    // ========================================================================

    /// Run the full build for the first root of `tree`
    ///
    /// One linear pass: resolution runs to completion before any module is
    /// instantiated, then modules build strictly in resolver output order.
    pub fn build(&self, tree: &GuideTree) -> Result<Rig> {
        let root = *tree
            .roots()
            .first()
            .context("guide tree has no root guide")?;

        let resolver = GuideTreeResolver::new(&self.registry);
        let records = resolver.resolve(tree, root)?;
        tracing::info!(rig = %self.rig_name, modules = records.len(), "guide tree resolved");

        let mut ctx = RigContext::new(&self.rig_name);
        let mut modules = Vec::with_capacity(records.len());

        for (module_id, record) in records.iter().enumerate() {
            let instance = Self::instantiate(tree, &self.registry, &mut ctx, record, module_id)?;
            tracing::info!(
                module = %instance.name,
                kind = instance.kind.name(),
                joints = instance.joints.len(),
                attached = instance.attachment.is_some(),
                "module built"
            );
            modules.push(instance);
        }

        tracing::info!(
            rig = %self.rig_name,
            modules = modules.len(),
            joints = ctx.deformer_joints.len(),
            sockets = ctx.sockets.len(),
            anchors = ctx.anchors.len(),
            "rig build complete"
        );
        Ok(Rig::new(ctx, modules))
    }

    /// Instantiate one record against the running context
    ///
    /// Shared between the initial build pass and [`Rig::add_limb`]: resolve
    /// the upstream socket first (the module's own sockets are excluded),
    /// run the staged pipeline, then merge the instance's outputs into the
    /// aggregates.
    pub(crate) fn instantiate(
        tree: &GuideTree,
        registry: &ModuleRegistry,
        ctx: &mut RigContext,
        record: &LimbRecord,
        module_id: usize,
    ) -> Result<ModuleInstance> {
        let upstream: Option<SocketId> = match record.parent_guide {
            Some(parent_guide) => {
                let socket = ctx.sockets.nearest(
                    tree.position(parent_guide),
                    Some(module_id),
                    &tree.node(parent_guide).name,
                )?;
                tracing::debug!(
                    socket = %ctx.sockets.get(socket).name,
                    guide = %tree.node(parent_guide).name,
                    "upstream socket resolved"
                );
                Some(socket)
            }
            None => None,
        };

        let module = registry.factory(record.kind);
        let signature = registry.signature(record.kind);
        let instance = build_module(
            module.as_ref(),
            record,
            tree,
            &signature,
            ctx,
            module_id,
            upstream,
        )?;

        for socket in &instance.sockets {
            ctx.sockets.register(socket.clone());
        }
        for anchor in &instance.anchors {
            ctx.anchors.register(anchor.clone());
        }
        ctx.deformer_joints.extend(instance.deformer_joints());

        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_an_error() {
        let builder = RigBuilder::new("hero");
        let tree = GuideTree::default();
        assert!(builder.build(&tree).is_err());
    }
}
