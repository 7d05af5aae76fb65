//! FK/IK chain modules: arm, leg and the generic solver chain
//!
//! These are the variants with full IK/FK duality: the IK setup runs the
//! soft-IK stretch solver over the guide chain, the FK setup lays out one
//! control per guide, and the blend stage mixes the two joint length sets.

use super::{Control, Joint, LimbModule, ModuleBuild};
use crate::anchor::{AnchorCandidate, SwitchMode};
use crate::error::Result;
use crate::registry::ModuleKind;
use armature_math::stretch::{self, StretchParams};
use glam::Vec3;

/// Arm/leg/generic chain with IK/FK duality and soft-IK stretch
pub struct FkIkChainModule {
    kind: ModuleKind,
}

impl FkIkChainModule {
    pub fn new(kind: ModuleKind) -> Self {
        debug_assert!(matches!(
            kind,
            ModuleKind::Arm | ModuleKind::Leg | ModuleKind::Chain
        ));
        Self { kind }
    }

    /// Pole-vector position: pushed out from the chain midpoint,
    /// perpendicular to the root-effector axis
    fn pole_position(positions: &[Vec3]) -> Vec3 {
        let root = positions[0];
        let effector = positions[positions.len() - 1];
        let mid = positions[positions.len() / 2];

        let axis_mid = (root + effector) * 0.5;
        let out = mid - axis_mid;
        let reach = root.distance(effector).max(1.0);

        if out.length_squared() < 1e-6 {
            // Straight chain: no bend plane, fall back to world Z
            mid + Vec3::Z * reach * 0.5
        } else {
            mid + out.normalize() * reach * 0.5
        }
    }
}

impl LimbModule for FkIkChainModule {
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
        // Settings control carrying the ik/fk and solver attributes; the
        // chain controls themselves belong to their respective setups.
        let positions = build.chain_positions();
        let effector = positions[positions.len() - 1];
        build.add_control(Control {
            name: build.node_name("settings_ctl"),
            position: effector,
            color: build.tree.node(build.record.root_guide).color,
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

    fn create_ik_setup(&self, build: &mut ModuleBuild) -> Result<()> {
        let positions = build.chain_positions();
        let effector = positions[positions.len() - 1];
        let color = build.tree.node(build.record.root_guide).color;

        build.add_control(Control {
            name: build.node_name("ik_ctl"),
            position: effector,
            color,
        });
        build.add_control(Control {
            name: build.node_name("upv_ctl"),
            position: Self::pole_position(&positions),
            color,
        });

        let rest = build.segment_lengths();
        let distance = positions[0].distance(effector);
        let mean_rest = rest.iter().sum::<f32>() / rest.len().max(1) as f32;
        let params = StretchParams {
            stretch: build.param("stretch"),
            squash: build.param("squash"),
            soft_radius: build.param("soft_ik"),
            stretch_limit: (build.param("max_stretch") - 1.0).max(0.0) * mean_rest,
        };

        let solution =
            stretch::solve(&rest, distance, &params).map_err(|e| build.solve_error(e))?;
        build.ik_solution = Some(solution);
        Ok(())
    }

    fn create_fk_setup(&self, build: &mut ModuleBuild) -> Result<()> {
        let positions = build.chain_positions();
        let color = build.tree.node(build.record.root_guide).color;
        for (i, position) in positions.iter().enumerate() {
            build.add_control(Control {
                name: build.node_name(&format!("fk{i}_ctl")),
                position: *position,
                color,
            });
        }
        Ok(())
    }

    fn resolve_ik_fk_blend(&self, build: &mut ModuleBuild) -> Result<()> {
        // 0.0 = full IK (solved lengths), 1.0 = full FK (rest lengths)
        let blend = build.param("ik_fk_blend");
        let rest = build.segment_lengths();
        let side = build.record.side.multiplier();

        let Some(solution) = build.ik_solution.take() else {
            return Ok(());
        };

        for (i, joint) in build.joints_mut().iter_mut().enumerate() {
            if i < rest.len() {
                let ik = solution.lengths[i];
                joint.length = (ik + (rest[i] - ik) * blend) * side;
            }
        }
        build.ik_solution = Some(solution);
        Ok(())
    }

    fn create_deformation_system(&self, build: &mut ModuleBuild) -> Result<()> {
        let joint_count = build.joints().len();
        // No interior joints to drive on 2-joint chains
        if joint_count < 3 {
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
        let bindings: Vec<(String, Vec3)> = build
            .record
            .bindings
            .iter()
            .enumerate()
            .map(|(i, (role, guide))| {
                (
                    build.node_name(&format!("{role}{i}_socket")),
                    build.tree.position(*guide),
                )
            })
            .collect();
        for (name, position) in bindings {
            build.add_socket(name, position);
        }

        build.add_anchor(AnchorCandidate {
            control: build.node_name("ik_ctl"),
            mode: SwitchMode::Parent,
            weight: 2,
            exceptions: Vec::new(),
        });
        build.add_anchor(AnchorCandidate {
            control: build.node_name("upv_ctl"),
            mode: SwitchMode::Point,
            weight: 1,
            exceptions: vec![build.node_name("ik_ctl")],
        });

        build.add_scale_target(build.root_group_name());
        Ok(())
    }
}
