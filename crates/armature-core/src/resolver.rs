//! Guide tree resolution
//!
//! Classifies and segments a guide tree into an ordered list of
//! [`LimbRecord`]s, depth first. Each record starts at a guide whose tag is
//! some module's first role; descendants are absorbed while they continue
//! the same signature, and the first child starting a different module opens
//! a new record rooted there. The output order is the order the tree exposes
//! children, with the invariant that a record never appears before the
//! record containing its declared parent guide.

use crate::error::{Error, Result};
use crate::guide::{GuideId, GuideTree, Side};
use crate::registry::{ModuleKind, ModuleRegistry, ModuleSignature};

/// One resolved module instantiation request
///
/// Created once by the resolver, consumed once by instantiation; immutable
/// after creation.
#[derive(Debug, Clone)]
pub struct LimbRecord {
    pub kind: ModuleKind,
    pub side: Side,
    /// Guide that started this record
    pub root_guide: GuideId,
    /// Role bindings in absorb order; multiplicity roles repeat their name
    pub bindings: Vec<(String, GuideId)>,
    /// Guide used for downstream socket resolution; `None` for the first
    /// module of the rig
    pub parent_guide: Option<GuideId>,
}

impl LimbRecord {
    /// First guide bound to `role`, if any
    pub fn role(&self, role: &str) -> Option<GuideId> {
        self.bindings
            .iter()
            .find(|(name, _)| name == role)
            .map(|&(_, id)| id)
    }

    /// All guides bound to `role`, in absorb order
    pub fn role_all(&self, role: &str) -> Vec<GuideId> {
        self.bindings
            .iter()
            .filter(|(name, _)| name == role)
            .map(|&(_, id)| id)
            .collect()
    }

    /// All bound guides in absorb order (the chain order)
    pub fn guides(&self) -> Vec<GuideId> {
        self.bindings.iter().map(|&(_, id)| id).collect()
    }
}

/// Resolves guide trees against a module catalog
pub struct GuideTreeResolver<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> GuideTreeResolver<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the tree hanging off `root` into ordered limb records
    ///
    /// Errors with [`Error::InvalidRoot`] when `root`'s tag starts no known
    /// module.
    pub fn resolve(&self, tree: &GuideTree, root: GuideId) -> Result<Vec<LimbRecord>> {
        let mut records = Vec::new();
        self.resolve_record(tree, root, None, &mut records)?;
        Ok(records)
    }

    /// Build the record rooted at `root`, then recurse into the new-module
    /// roots discovered along its chain (depth first, child order).
    fn resolve_record(
        &self,
        tree: &GuideTree,
        root: GuideId,
        parent_guide: Option<GuideId>,
        records: &mut Vec<LimbRecord>,
    ) -> Result<()> {
        let root_node = tree.node(root);
        let kind = self
            .registry
            .classify_root(&root_node.type_tag)
            .ok_or_else(|| Error::InvalidRoot {
                guide: root_node.name.clone(),
                tag: root_node.type_tag.clone(),
            })?;
        let signature = self.registry.signature(kind);

        let side = if signature.sided {
            root_node.side
        } else {
            Side::Center
        };

        let mut record = LimbRecord {
            kind,
            side,
            root_guide: root,
            bindings: vec![(signature.root_role().to_string(), root)],
            parent_guide,
        };

        // Child guides that open a new module, with their parent guide
        let mut pending: Vec<(GuideId, GuideId)> = Vec::new();
        self.walk(tree, root, &signature, &mut record, &mut pending);

        records.push(record);

        for (child_root, parent) in pending {
            self.resolve_record(tree, child_root, Some(parent), records)?;
        }
        Ok(())
    }

    /// Absorb the continuation chain below `node` into `record`
    ///
    /// Per node, at most one child extends the record (the first one whose
    /// tag continues the signature); every other child either opens a new
    /// module or ends its branch. This is what keeps sibling multiplicity
    /// guides (four fingers under one hand) in separate records.
    fn walk(
        &self,
        tree: &GuideTree,
        node: GuideId,
        signature: &ModuleSignature,
        record: &mut LimbRecord,
        pending: &mut Vec<(GuideId, GuideId)>,
    ) {
        let mut extended = false;
        for &child in tree.children(node) {
            let tag = tree.node(child).type_tag.as_str();

            if !extended {
                if let Some(role) = self.continuation_role(signature, record, tag) {
                    record.bindings.push((role.to_string(), child));
                    extended = true;
                    self.walk(tree, child, signature, record, pending);
                    continue;
                }
            }

            if self.registry.classify_root(tag).is_some() {
                pending.push((child, node));
            }
            // Neither a continuation nor a valid new root: branch ends here.
        }
    }

    /// Role under which `tag` extends the current record, if it does
    fn continuation_role(
        &self,
        signature: &ModuleSignature,
        record: &LimbRecord,
        tag: &str,
    ) -> Option<&'static str> {
        if let Some(multi) = signature.multi_role
            && multi == tag
        {
            return Some(multi);
        }

        // A tag that starts a different module opens a new record instead
        // of continuing this one.
        let starts_other = self
            .registry
            .classify_root(tag)
            .is_some_and(|kind| kind != signature.kind);
        if starts_other {
            return None;
        }

        // Singular roles bind once.
        signature
            .roles
            .iter()
            .find(|&&role| role == tag && record.role(role).is_none())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::{GuideRecord, GuideTree};

    fn guide(name: &str, tag: &str, parent: Option<&str>) -> GuideRecord {
        GuideRecord {
            name: name.into(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            joint_orient: [0.0; 3],
            scale: [1.0; 3],
            side: Side::Left,
            type_tag: tag.into(),
            parent: parent.map(Into::into),
            color: 0,
            radius: 0.5,
            attributes: Vec::new(),
        }
    }

    fn biped() -> GuideTree {
        GuideTree::from_records(&[
            guide("root", "root", None),
            guide("spine_base", "spine_base", Some("root")),
            guide("spine_1", "spine", Some("spine_base")),
            guide("spine_2", "spine", Some("spine_1")),
            guide("neck", "neck", Some("spine_2")),
            guide("head", "head", Some("neck")),
            guide("l_shoulder", "shoulder", Some("spine_2")),
            guide("l_elbow", "elbow", Some("l_shoulder")),
            guide("l_hand", "hand", Some("l_elbow")),
            guide("l_hip", "hip", Some("root")),
            guide("l_knee", "knee", Some("l_hip")),
            guide("l_foot", "foot", Some("l_knee")),
        ])
        .unwrap()
    }

    #[test]
    fn biped_resolves_in_depth_first_order() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        let tree = biped();

        let records = resolver.resolve(&tree, 0).unwrap();
        let kinds: Vec<ModuleKind> = records.iter().map(|r| r.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ModuleKind::Root,
                ModuleKind::Spine,
                ModuleKind::Head,
                ModuleKind::Arm,
                ModuleKind::Leg,
            ]
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        let tree = biped();

        let a = resolver.resolve(&tree, 0).unwrap();
        let b = resolver.resolve(&tree, 0).unwrap();

        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.kind, rb.kind);
            assert_eq!(ra.bindings, rb.bindings);
            assert_eq!(ra.parent_guide, rb.parent_guide);
        }
    }

    #[test]
    fn parent_record_always_precedes_child_record() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        let tree = biped();

        let records = resolver.resolve(&tree, 0).unwrap();
        for (i, record) in records.iter().enumerate() {
            if let Some(parent_guide) = record.parent_guide {
                let owner = records
                    .iter()
                    .position(|r| r.guides().contains(&parent_guide))
                    .unwrap();
                assert!(owner < i, "record {i} appeared before its parent {owner}");
            }
        }
    }

    #[test]
    fn arm_roles_bind_in_chain_order() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        let tree = biped();

        let records = resolver.resolve(&tree, 0).unwrap();
        let arm = records.iter().find(|r| r.kind == ModuleKind::Arm).unwrap();

        assert_eq!(arm.role("shoulder"), Some(6));
        assert_eq!(arm.role("elbow"), Some(7));
        assert_eq!(arm.role("hand"), Some(8));
        assert_eq!(arm.parent_guide, Some(3)); // spine_2
    }

    #[test]
    fn sibling_fingers_stay_separate_records() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);

        let mut records = vec![
            guide("l_shoulder", "shoulder", None),
            guide("l_elbow", "elbow", Some("l_shoulder")),
            guide("l_hand", "hand", Some("l_elbow")),
        ];
        for finger in ["index", "middle", "ring", "pinky"] {
            records.push(guide(&format!("{finger}_0"), "finger", Some("l_hand")));
            records.push(guide(
                &format!("{finger}_1"),
                "finger",
                Some(&format!("{finger}_0")),
            ));
            records.push(guide(
                &format!("{finger}_2"),
                "finger",
                Some(&format!("{finger}_1")),
            ));
        }
        let tree = GuideTree::from_records(&records).unwrap();

        let resolved = resolver.resolve(&tree, 0).unwrap();
        let fingers: Vec<&LimbRecord> = resolved
            .iter()
            .filter(|r| r.kind == ModuleKind::Finger)
            .collect();

        assert_eq!(fingers.len(), 4, "one record per finger chain");
        for finger in &fingers {
            assert_eq!(finger.role_all("finger").len(), 3);
            // Each chain attaches at the shared hand guide
            assert_eq!(finger.parent_guide, Some(2));
        }
    }

    #[test]
    fn multiple_children_fan_out_with_same_parent() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        let tree = GuideTree::from_records(&[
            guide("root", "root", None),
            guide("l_hip", "hip", Some("root")),
            guide("l_knee", "knee", Some("l_hip")),
            guide("l_foot", "foot", Some("l_knee")),
            guide("r_hip", "hip", Some("root")),
            guide("r_knee", "knee", Some("r_hip")),
            guide("r_foot", "foot", Some("r_knee")),
        ])
        .unwrap();

        let records = resolver.resolve(&tree, 0).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].parent_guide, Some(0));
        assert_eq!(records[2].parent_guide, Some(0));
    }

    #[test]
    fn unknown_root_tag_is_a_hard_error() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        let tree = GuideTree::from_records(&[guide("odd", "propeller", None)]).unwrap();

        let err = resolver.resolve(&tree, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot { .. }));
    }

    #[test]
    fn unsided_module_forces_center() {
        let registry = ModuleRegistry::new();
        let resolver = GuideTreeResolver::new(&registry);
        // Guide tagged Left, but spine is unsided
        let tree = GuideTree::from_records(&[
            guide("spine_base", "spine_base", None),
            guide("spine_1", "spine", Some("spine_base")),
        ])
        .unwrap();

        let records = resolver.resolve(&tree, 0).unwrap();
        assert_eq!(records[0].side, Side::Center);
    }
}
