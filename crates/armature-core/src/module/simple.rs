//! Single-purpose modules without IK/FK duality
//!
//! Root, head/neck, finger, singleton, surface and eye all share the same
//! skeleton: one joint and one control per bound guide, sockets at every
//! joint, no solver stages. The per-kind differences are small enough to
//! live in match arms instead of separate types.

use super::{Control, Joint, LimbModule, ModuleBuild};
use crate::anchor::{AnchorCandidate, SwitchMode};
use crate::error::Result;
use crate::registry::ModuleKind;
use glam::Vec3;

/// Root/head/finger/singleton/surface/eye module
pub struct SimpleModule {
    kind: ModuleKind,
}

impl SimpleModule {
    pub fn new(kind: ModuleKind) -> Self {
        debug_assert!(matches!(
            kind,
            ModuleKind::Root
                | ModuleKind::Head
                | ModuleKind::Finger
                | ModuleKind::Singleton
                | ModuleKind::Surface
                | ModuleKind::Eye
        ));
        Self { kind }
    }
}

impl LimbModule for SimpleModule {
    fn kind(&self) -> ModuleKind {
        self.kind
    }

    fn create_groups(&self, build: &mut ModuleBuild) -> Result<()> {
        build.add_group(build.root_group_name());
        build.add_group(build.node_name("ctl_grp"));
        Ok(())
    }

    fn create_joints(&self, build: &mut ModuleBuild) -> Result<()> {
        let guides = build.chain_guides();
        let segments = build.segment_lengths();
        let side = build.record.side.multiplier();
        // The rig root is a locator for the hierarchy, not a skinning joint
        let deformer = self.kind != ModuleKind::Root;

        for (i, &guide) in guides.iter().enumerate() {
            let node = build.tree.node(guide);
            let length = segments.get(i).copied().unwrap_or(0.0);
            build.add_joint(Joint {
                name: build.node_name(&format!("{i}_jnt")),
                position: node.xform.position,
                radius: node.radius,
                length: length * side,
                scale: 1.0,
                deformer,
            });
        }
        Ok(())
    }

    fn create_controllers(&self, build: &mut ModuleBuild) -> Result<()> {
        let guides = build.chain_guides();
        for (i, &guide) in guides.iter().enumerate() {
            let node = build.tree.node(guide);
            let name = match (self.kind, i) {
                (ModuleKind::Root, _) => build.node_name("world_ctl"),
                (ModuleKind::Head, 0) => build.node_name("neck_ctl"),
                (ModuleKind::Head, _) => build.node_name("head_ctl"),
                _ => build.node_name(&format!("{i}_ctl")),
            };
            build.add_control(Control {
                name,
                position: node.xform.position,
                color: node.color,
            });
        }

        // Eyes get a detached aim target in front of the guide
        if self.kind == ModuleKind::Eye {
            let node = build.tree.node(build.record.root_guide);
            let depth = build.param("aim_depth");
            build.add_control(Control {
                name: build.node_name("aim_ctl"),
                position: node.xform.position + Vec3::Z * depth,
                color: node.color,
            });
        }
        Ok(())
    }

    fn create_roots(&self, build: &mut ModuleBuild) -> Result<()> {
        let npos: Vec<String> = build
            .controls()
            .iter()
            .map(|c| format!("{}_npo", c.name))
            .collect();
        for npo in npos {
            build.add_group(npo);
        }
        Ok(())
    }

    fn finalize(&self, build: &mut ModuleBuild) -> Result<()> {
        let sockets: Vec<(String, Vec3)> = build
            .chain_guides()
            .iter()
            .enumerate()
            .map(|(i, &guide)| {
                (
                    build.node_name(&format!("{i}_socket")),
                    build.tree.position(guide),
                )
            })
            .collect();
        for (name, position) in sockets {
            build.add_socket(name, position);
        }

        match self.kind {
            ModuleKind::Root => {
                // The world control is the fallback space for every switch
                build.add_anchor(AnchorCandidate {
                    control: build.node_name("world_ctl"),
                    mode: SwitchMode::Parent,
                    weight: 0,
                    exceptions: Vec::new(),
                });
                build.add_scale_target(build.ctx.root_group.clone());
            }
            ModuleKind::Head => {
                build.add_anchor(AnchorCandidate {
                    control: build.node_name("head_ctl"),
                    mode: SwitchMode::Orient,
                    weight: 1,
                    exceptions: Vec::new(),
                });
            }
            _ => {}
        }

        build.add_scale_target(build.root_group_name());
        Ok(())
    }
}
