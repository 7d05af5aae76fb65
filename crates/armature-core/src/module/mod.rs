//! Limb modules and the staged build pipeline
//!
//! A limb module consumes one [`LimbRecord`] plus an optional upstream
//! socket and produces an immutable [`ModuleInstance`]. Construction runs
//! through a fixed stage order; variants override the stages they need and
//! no-op the rest:
//!
//! ```text
//! create_groups -> create_joints -> create_controllers -> create_roots
//!   -> create_ik_setup -> create_fk_setup -> resolve_ik_fk_blend
//!   -> create_deformation_system -> finalize
//! ```
//!
//! Groups exist before joints, joints before controllers, controllers
//! before root-lock wiring; IK and FK both precede the blend resolution;
//! the deformation system runs last before finalize. All intermediate state
//! lives on the [`ModuleBuild`] context threaded through the stages, never
//! on the module value itself.

pub mod chain;
pub mod simple;
pub mod spine;

use crate::anchor::AnchorCandidate;
use crate::context::RigContext;
use crate::error::{Error, Result};
use crate::guide::{GuideId, GuideTree, Side};
use crate::registry::{ModuleKind, ModuleSignature};
use crate::socket::{ModuleId, Socket, SocketId};
use armature_math::stretch::StretchSolution;
use glam::Vec3;

/// A joint created by a module
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub position: Vec3,
    pub radius: f32,
    /// Rest length to the next joint along the primary axis, signed by side
    pub length: f32,
    /// Volume-preservation scale factor (`1.0` when not driven)
    pub scale: f32,
    /// Whether this joint binds to renderable geometry
    pub deformer: bool,
}

/// A control created by a module
#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub position: Vec3,
    pub color: i32,
}

/// An organizational group node
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
}

/// How a module plugs onto its parent module
#[derive(Debug, Clone, Copy)]
pub struct Attachment {
    pub socket: SocketId,
    /// When false the attachment breaks inherited non-uniform scale to
    /// avoid double-scaling
    pub inherit_scale: bool,
}

/// The immutable product of one module build
///
/// Owns every node it created; destroyed only when the whole rig is torn
/// down.
#[derive(Debug, Clone)]
pub struct ModuleInstance {
    pub id: ModuleId,
    pub kind: ModuleKind,
    pub side: Side,
    /// Base name, e.g. `arm_L2`
    pub name: String,
    pub groups: Vec<Group>,
    pub joints: Vec<Joint>,
    pub controls: Vec<Control>,
    /// Sockets this module exposes for children to attach to
    pub sockets: Vec<Socket>,
    pub anchors: Vec<AnchorCandidate>,
    /// Targets the rig-wide scale drives; never empty
    pub scale_targets: Vec<String>,
    pub attachment: Option<Attachment>,
}

impl ModuleInstance {
    /// Names of the deformer joints, for downstream skin binding
    pub fn deformer_joints(&self) -> Vec<String> {
        self.joints
            .iter()
            .filter(|j| j.deformer)
            .map(|j| j.name.clone())
            .collect()
    }
}

/// Mutable build context threaded through the pipeline stages
///
/// Accumulates the nodes a module creates; [`ModuleBuild::finish`] seals it
/// into a [`ModuleInstance`].
pub struct ModuleBuild<'a> {
    pub record: &'a crate::resolver::LimbRecord,
    pub tree: &'a GuideTree,
    pub signature: &'a ModuleSignature,
    pub ctx: &'a RigContext,
    pub module_id: ModuleId,
    pub upstream: Option<SocketId>,

    name: String,
    groups: Vec<Group>,
    joints: Vec<Joint>,
    controls: Vec<Control>,
    sockets: Vec<Socket>,
    anchors: Vec<AnchorCandidate>,
    scale_targets: Vec<String>,

    /// Solved IK chain lengths, filled by `create_ik_setup`, consumed by
    /// `resolve_ik_fk_blend`
    pub ik_solution: Option<StretchSolution>,
}

impl<'a> ModuleBuild<'a> {
    pub fn new(
        record: &'a crate::resolver::LimbRecord,
        tree: &'a GuideTree,
        signature: &'a ModuleSignature,
        ctx: &'a RigContext,
        module_id: ModuleId,
        upstream: Option<SocketId>,
    ) -> Self {
        let name = format!(
            "{}_{}{}",
            record.kind.name(),
            record.side.token(),
            module_id
        );
        Self {
            record,
            tree,
            signature,
            ctx,
            module_id,
            upstream,
            name,
            groups: Vec::new(),
            joints: Vec::new(),
            controls: Vec::new(),
            sockets: Vec::new(),
            anchors: Vec::new(),
            scale_targets: Vec::new(),
            ik_solution: None,
        }
    }

    /// Base name of the module, e.g. `leg_R4`
    pub fn base_name(&self) -> &str {
        &self.name
    }

    /// Child node name under this module, e.g. `leg_R4_ik_ctl`
    pub fn node_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.name, suffix)
    }

    /// Name of the module's root scale group
    pub fn root_group_name(&self) -> String {
        self.node_name("root_grp")
    }

    /// Effective value of a declared parameter for this instance
    ///
    /// Resolution order: attribute on the record's root guide, else the
    /// declared default. Undeclared names resolve to `0.0`.
    pub fn param(&self, name: &str) -> f32 {
        let root = self.tree.node(self.record.root_guide);
        self.signature
            .params
            .iter()
            .find(|p| p.name == name)
            .map_or(0.0, |p| p.resolve(root))
    }

    /// Bound guides in chain order
    pub fn chain_guides(&self) -> Vec<GuideId> {
        self.record.guides()
    }

    /// World positions of the bound guides in chain order
    pub fn chain_positions(&self) -> Vec<Vec3> {
        self.record
            .guides()
            .iter()
            .map(|&id| self.tree.position(id))
            .collect()
    }

    /// Unsigned rest lengths of the chain segments
    pub fn segment_lengths(&self) -> Vec<f32> {
        let positions = self.chain_positions();
        positions
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect()
    }

    /// Map a solver error to a build error carrying this record's identity
    pub fn solve_error(&self, source: armature_math::SolveError) -> Error {
        Error::ModuleBuild {
            module: self.record.kind.name().to_string(),
            guide: self.tree.node(self.record.root_guide).name.clone(),
            source,
        }
    }

    pub fn add_group(&mut self, name: String) {
        self.groups.push(Group { name });
    }

    pub fn add_joint(&mut self, joint: Joint) {
        self.joints.push(joint);
    }

    pub fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn add_socket(&mut self, name: String, position: Vec3) {
        self.sockets.push(Socket {
            name,
            module: self.module_id,
            position,
        });
    }

    pub fn add_anchor(&mut self, anchor: AnchorCandidate) {
        self.anchors.push(anchor);
    }

    pub fn add_scale_target(&mut self, name: String) {
        self.scale_targets.push(name);
    }

    /// Seal the build into an immutable instance
    ///
    /// The scale-target list is guaranteed non-empty: the module's own root
    /// scale group is appended when no stage declared one.
    pub fn finish(mut self, attachment: Option<Attachment>) -> ModuleInstance {
        if self.scale_targets.is_empty() {
            self.scale_targets.push(self.root_group_name());
        }
        ModuleInstance {
            id: self.module_id,
            kind: self.record.kind,
            side: self.record.side,
            name: self.name,
            groups: self.groups,
            joints: self.joints,
            controls: self.controls,
            sockets: self.sockets,
            anchors: self.anchors,
            scale_targets: self.scale_targets,
            attachment,
        }
    }
}

/// One parametric rig unit: arm, leg, spine, ...
///
/// Implementations override the stages they need; variants without IK/FK
/// duality keep the default no-ops for those stages.
pub trait LimbModule {
    fn kind(&self) -> ModuleKind;

    fn create_groups(&self, build: &mut ModuleBuild) -> Result<()>;

    fn create_joints(&self, build: &mut ModuleBuild) -> Result<()>;

    fn create_controllers(&self, build: &mut ModuleBuild) -> Result<()>;

    fn create_roots(&self, build: &mut ModuleBuild) -> Result<()> {
        let _ = build;
        Ok(())
    }

    fn create_ik_setup(&self, build: &mut ModuleBuild) -> Result<()> {
        let _ = build;
        Ok(())
    }

    fn create_fk_setup(&self, build: &mut ModuleBuild) -> Result<()> {
        let _ = build;
        Ok(())
    }

    fn resolve_ik_fk_blend(&self, build: &mut ModuleBuild) -> Result<()> {
        let _ = build;
        Ok(())
    }

    fn create_deformation_system(&self, build: &mut ModuleBuild) -> Result<()> {
        let _ = build;
        Ok(())
    }

    fn finalize(&self, build: &mut ModuleBuild) -> Result<()> {
        let _ = build;
        Ok(())
    }
}

/// Validate that every required role of `signature` is bound in `record`
///
/// Multiplicity roles require at least one binding. The resolver tolerates
/// partial matches; this is where they become
/// [`Error::MissingRequiredRole`].
pub fn validate_roles(
    signature: &ModuleSignature,
    record: &crate::resolver::LimbRecord,
    tree: &GuideTree,
) -> Result<()> {
    for &role in signature.roles {
        if record.role(role).is_none() {
            return Err(Error::MissingRequiredRole {
                module: signature.kind.name().to_string(),
                guide: tree.node(record.root_guide).name.clone(),
                role: role.to_string(),
            });
        }
    }
    Ok(())
}

/// Run the full staged pipeline for one record
///
/// Role validation happens before any stage runs, so a failing record never
/// produces a partial instance. The stage order is fixed here and nowhere
/// else.
pub fn build_module(
    module: &dyn LimbModule,
    record: &crate::resolver::LimbRecord,
    tree: &GuideTree,
    signature: &ModuleSignature,
    ctx: &RigContext,
    module_id: ModuleId,
    upstream: Option<SocketId>,
) -> Result<ModuleInstance> {
    validate_roles(signature, record, tree)?;

    let mut build = ModuleBuild::new(record, tree, signature, ctx, module_id, upstream);

    module.create_groups(&mut build)?;
    module.create_joints(&mut build)?;
    module.create_controllers(&mut build)?;
    module.create_roots(&mut build)?;
    module.create_ik_setup(&mut build)?;
    module.create_fk_setup(&mut build)?;
    module.resolve_ik_fk_blend(&mut build)?;
    module.create_deformation_system(&mut build)?;
    module.finalize(&mut build)?;

    let attachment = build.upstream.map(|socket| Attachment {
        socket,
        inherit_scale: signature.wants_inherited_scale,
    });

    Ok(build.finish(attachment))
}
