//! The built rig and its queryable outputs
//!
//! A [`Rig`] owns every module instance plus the session aggregates: the
//! socket table, the anchor log and the flat deformer-joint list consumed
//! by external skin binding. It also supports attaching additional limbs
//! after the initial build, using the same nearest-socket resolution
//! against the live socket table.

use crate::RigBuilder;
use anyhow::Result;
use armature_core::anchor::AnchorCandidate;
use armature_core::context::RigContext;
use armature_core::guide::GuideTree;
use armature_core::module::ModuleInstance;
use armature_core::registry::ModuleRegistry;
use armature_core::resolver::LimbRecord;
use armature_core::socket::SocketGraph;

/// A fully built rig
#[derive(Debug, Clone)]
pub struct Rig {
    ctx: RigContext,
    modules: Vec<ModuleInstance>,
}

impl Rig {
    pub(crate) fn new(ctx: RigContext, modules: Vec<ModuleInstance>) -> Self {
        Self { ctx, modules }
    }

    /// All module instances in build order
    pub fn modules(&self) -> &[ModuleInstance] {
        &self.modules
    }

    /// Rig-wide handles and aggregates
    pub fn context(&self) -> &RigContext {
        &self.ctx
    }

    /// Flat deformer-joint list for external skin binding
    pub fn deformer_joints(&self) -> &[String] {
        &self.ctx.deformer_joints
    }

    /// Anchor candidates for the external space-switch builder
    pub fn anchors(&self) -> &[AnchorCandidate] {
        self.ctx.anchors.all()
    }

    /// Live socket table, queryable for later attachment
    pub fn sockets(&self) -> &SocketGraph {
        &self.ctx.sockets
    }

    /// Attach one more limb to the already-built rig
    ///
    /// Runs the same staged pipeline and nearest-socket resolution as the
    /// initial pass, against the live socket table. The record's parent
    /// guide picks the attachment point; records without one attach
    /// nowhere, like a rig root.
    pub fn add_limb(
        &mut self,
        tree: &GuideTree,
        registry: &ModuleRegistry,
        record: &LimbRecord,
    ) -> Result<&ModuleInstance> {
        let module_id = self.modules.len();
        let instance = RigBuilder::instantiate(tree, registry, &mut self.ctx, record, module_id)?;
        tracing::info!(module = %instance.name, "limb added to built rig");
        self.modules.push(instance);
        Ok(&self.modules[module_id])
    }
}
