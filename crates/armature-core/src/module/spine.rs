//! Segment chain modules: spine, tail, tentacle
//!
//! FK-less chains built from a base guide plus a run of multiplicity
//! segments. No IK/FK duality: those stages stay no-ops. The deformation
//! stage drives interior joints with the volume power curve.

use super::{Control, Joint, LimbModule, ModuleBuild};
use crate::anchor::{AnchorCandidate, SwitchMode};
use crate::error::Result;
use crate::registry::ModuleKind;

/// Spine/tail/tentacle segment chain
pub struct SegmentChainModule {
    kind: ModuleKind,
}

impl SegmentChainModule {
    pub fn new(kind: ModuleKind) -> Self {
        debug_assert!(matches!(
            kind,
            ModuleKind::Spine | ModuleKind::Tail | ModuleKind::Tentacle
        ));
        Self { kind }
    }
}

impl LimbModule for SegmentChainModule {
    fn kind(&self) -> ModuleKind {
        self.kind
    }

    fn create_groups(&self, build: &mut ModuleBuild) -> Result<()> {
        build.add_group(build.root_group_name());
        build.add_group(build.node_name("ctl_grp"));
        build.add_group(build.node_name("jnt_grp"));
        Ok(())
    }

    fn create_joints(&self, build: &mut ModuleBuild) -> Result<()> {
        let guides = build.chain_guides();
        let segments = build.segment_lengths();
        let side = build.record.side.multiplier();

        for (i, &guide) in guides.iter().enumerate() {
            let node = build.tree.node(guide);
            let length = segments.get(i).copied().unwrap_or(0.0);
            build.add_joint(Joint {
                name: build.node_name(&format!("{i}_jnt")),
                position: node.xform.position,
                radius: node.radius,
                length: length * side,
                scale: 1.0,
                deformer: true,
            });
        }
        Ok(())
    }

    fn create_controllers(&self, build: &mut ModuleBuild) -> Result<()> {
        let positions = build.chain_positions();
        let color = build.tree.node(build.record.root_guide).color;

        build.add_control(Control {
            name: build.node_name("base_ctl"),
            position: positions[0],
            color,
        });
        for (i, position) in positions.iter().enumerate().skip(1) {
            build.add_control(Control {
                name: build.node_name(&format!("seg{i}_ctl")),
                position: *position,
                color,
            });
        }
        build.add_control(Control {
            name: build.node_name("top_ctl"),
            position: positions[positions.len() - 1],
            color,
        });
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

    fn create_deformation_system(&self, build: &mut ModuleBuild) -> Result<()> {
        let joint_count = build.joints().len();
        if joint_count < 3 {
            // Too short for interior scaling
            return Ok(());
        }

        let segments = build.segment_lengths();
        let per_joint: Vec<f32> = (0..joint_count)
            .map(|i| segments[i.min(segments.len() - 1)])
            .collect();

        let amount = build.param("volume");
        let factors = armature_math::volume::chain_scale_factors(&per_joint, amount)
            .map_err(|e| build.solve_error(e))?;

        for (joint, factor) in build.joints_mut().iter_mut().zip(factors) {
            joint.scale = factor;
        }
        Ok(())
    }

    fn finalize(&self, build: &mut ModuleBuild) -> Result<()> {
        let sockets: Vec<(String, glam::Vec3)> = build
            .chain_guides()
            .iter()
            .enumerate()
            .map(|(i, &guide)| {
                (
                    build.node_name(&format!("seg{i}_socket")),
                    build.tree.position(guide),
                )
            })
            .collect();
        for (name, position) in sockets {
            build.add_socket(name, position);
        }

        build.add_anchor(AnchorCandidate {
            control: build.node_name("base_ctl"),
            mode: SwitchMode::Parent,
            weight: 1,
            exceptions: Vec::new(),
        });
        build.add_anchor(AnchorCandidate {
            control: build.node_name("top_ctl"),
            mode: SwitchMode::Orient,
            weight: 1,
            exceptions: Vec::new(),
        });

        build.add_scale_target(build.root_group_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RigContext;
    use crate::guide::{GuideRecord, GuideTree, Side};
    use crate::module::build_module;
    use crate::registry::ModuleRegistry;
    use crate::resolver::LimbRecord;
    use approx::assert_relative_eq;

    fn guide(name: &str, tag: &str, parent: Option<&str>, y: f32) -> GuideRecord {
        GuideRecord {
            name: name.into(),
            position: [0.0, y, 0.0],
            rotation: [0.0; 3],
            joint_orient: [0.0; 3],
            scale: [1.0; 3],
            side: Side::Center,
            type_tag: tag.into(),
            parent: parent.map(Into::into),
            color: 17,
            radius: 0.5,
            attributes: Vec::new(),
        }
    }

    fn spine_fixture(segments: usize) -> (GuideTree, LimbRecord) {
        let mut records = vec![guide("base", "spine_base", None, 0.0)];
        let mut bindings = vec![("spine_base".to_string(), 0usize)];
        for i in 0..segments {
            let parent = if i == 0 {
                "base".to_string()
            } else {
                format!("seg{}", i - 1)
            };
            records.push(guide(&format!("seg{i}"), "spine", Some(&parent), (i + 1) as f32));
            bindings.push(("spine".to_string(), i + 1));
        }
        let tree = GuideTree::from_records(&records).unwrap();
        let record = LimbRecord {
            kind: ModuleKind::Spine,
            side: Side::Center,
            root_guide: 0,
            bindings,
            parent_guide: None,
        };
        (tree, record)
    }

    #[test]
    fn spine_builds_one_joint_and_socket_per_guide() {
        let registry = ModuleRegistry::new();
        let signature = registry.signature(ModuleKind::Spine);
        let ctx = RigContext::new("hero");
        let (tree, record) = spine_fixture(4);

        let module = SegmentChainModule::new(ModuleKind::Spine);
        let instance =
            build_module(&module, &record, &tree, &signature, &ctx, 1, None).unwrap();

        assert_eq!(instance.joints.len(), 5);
        assert_eq!(instance.sockets.len(), 5);
        // base + 4 segments + top
        assert_eq!(instance.controls.len(), 6);
        assert_eq!(instance.anchors.len(), 2);
    }

    #[test]
    fn end_joints_keep_unit_volume_scale() {
        let registry = ModuleRegistry::new();
        let signature = registry.signature(ModuleKind::Spine);
        let ctx = RigContext::new("hero");
        let (tree, record) = spine_fixture(4);

        let module = SegmentChainModule::new(ModuleKind::Spine);
        let instance =
            build_module(&module, &record, &tree, &signature, &ctx, 1, None).unwrap();

        let first = instance.joints.first().unwrap();
        let last = instance.joints.last().unwrap();
        assert_relative_eq!(first.scale, 1.0, epsilon = 1e-6);
        assert_relative_eq!(last.scale, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn short_spine_skips_volume_without_error() {
        let registry = ModuleRegistry::new();
        let signature = registry.signature(ModuleKind::Spine);
        let ctx = RigContext::new("hero");
        let (tree, record) = spine_fixture(1);

        let module = SegmentChainModule::new(ModuleKind::Spine);
        let instance =
            build_module(&module, &record, &tree, &signature, &ctx, 1, None).unwrap();

        assert!(instance.joints.iter().all(|j| (j.scale - 1.0).abs() < 1e-6));
    }
}
