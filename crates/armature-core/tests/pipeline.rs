//! Integration tests for the core pipeline: session JSON to module instances

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use armature_core::context::RigContext;
use armature_core::guide::GuideTree;
use armature_core::module::build_module;
use armature_core::registry::{ModuleKind, ModuleRegistry};
use armature_core::resolver::GuideTreeResolver;

const SESSION: &str = r#"[
    {"name": "root", "position": [0, 10, 0], "type": "root"},
    {"name": "base", "position": [0, 10.5, 0], "type": "spine_base", "parent": "root"},
    {"name": "s1", "position": [0, 12, 0], "type": "spine", "parent": "base"},
    {"name": "s2", "position": [0, 13.5, 0], "type": "spine", "parent": "s1"},
    {"name": "shoulder", "position": [1.5, 13.5, 0], "type": "shoulder",
     "side": "Left", "parent": "s2",
     "attributes": [{"name": "stretch", "kind": "float", "value": 0.0},
                    {"name": "soft_ik", "kind": "float", "value": 1.0}]},
    {"name": "elbow", "position": [4, 13.5, -0.3], "type": "elbow",
     "side": "Left", "parent": "shoulder"},
    {"name": "hand", "position": [6.5, 13.5, 0], "type": "hand",
     "side": "Left", "parent": "elbow"}
]"#;

const SOFT_ONLY_SESSION: &str = r#"[
    {"name": "root", "position": [0, 10, 0], "type": "root"},
    {"name": "shoulder", "position": [1.5, 13.5, 0], "type": "shoulder",
     "side": "Left", "parent": "root",
     "attributes": [{"name": "soft_ik", "kind": "float", "value": 1.0}]},
    {"name": "elbow", "position": [4, 13.5, -0.3], "type": "elbow",
     "side": "Left", "parent": "shoulder"},
    {"name": "hand", "position": [6.5, 13.5, 0], "type": "hand",
     "side": "Left", "parent": "elbow"}
]"#;

#[test]
fn session_json_resolves_into_ordered_records() {
    let tree = GuideTree::from_json(SESSION).expect("parse");
    let registry = ModuleRegistry::new();

    let records = GuideTreeResolver::new(&registry)
        .resolve(&tree, tree.roots()[0])
        .expect("resolve");

    let kinds: Vec<ModuleKind> = records.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ModuleKind::Root, ModuleKind::Spine, ModuleKind::Arm]);

    let arm = &records[2];
    assert_eq!(arm.role("shoulder"), Some(4));
    assert_eq!(arm.role("hand"), Some(6));
    assert_eq!(arm.parent_guide, Some(3));
}

#[test]
fn resolved_record_builds_a_module_instance() {
    let tree = GuideTree::from_json(SESSION).expect("parse");
    let registry = ModuleRegistry::new();
    let records = GuideTreeResolver::new(&registry)
        .resolve(&tree, tree.roots()[0])
        .expect("resolve");
    let ctx = RigContext::new("hero");

    let arm_record = &records[2];
    let module = registry.factory(arm_record.kind);
    let instance = build_module(
        module.as_ref(),
        arm_record,
        &tree,
        &registry.signature(arm_record.kind),
        &ctx,
        0,
        None,
    )
    .expect("build arm");

    assert_eq!(instance.kind, ModuleKind::Arm);
    assert!(instance.name.starts_with("arm_L"));
    assert_eq!(instance.joints.len(), 3);
    assert!(!instance.sockets.is_empty());
    assert!(!instance.scale_targets.is_empty());
}

fn build_arm(tree: &GuideTree) -> armature_core::module::ModuleInstance {
    let registry = ModuleRegistry::new();
    let records = GuideTreeResolver::new(&registry)
        .resolve(tree, tree.roots()[0])
        .expect("resolve");
    let ctx = RigContext::new("hero");

    let record = records
        .iter()
        .find(|r| r.kind == ModuleKind::Arm)
        .expect("arm record");
    let module = registry.factory(record.kind);
    build_module(
        module.as_ref(),
        record,
        tree,
        &registry.signature(record.kind),
        &ctx,
        0,
        None,
    )
    .expect("build arm")
}

#[test]
fn guide_attributes_flow_through_to_the_solver() {
    // The soft radius alone pulls the effective reach below the chain span,
    // so the default stretch would lengthen the joints. With the shoulder's
    // stretch attribute at 0.0 they must keep their rest lengths.
    let tree = GuideTree::from_json(SESSION).expect("parse");
    let instance = build_arm(&tree);

    let rest_0 = (tree.position(5) - tree.position(4)).length();
    assert!((instance.joints[0].length.abs() - rest_0).abs() < 1e-5);

    // Same chain with only the soft radius attribute: joints stretch.
    let tree = GuideTree::from_json(SOFT_ONLY_SESSION).expect("parse");
    let instance = build_arm(&tree);
    assert!(instance.joints[0].length.abs() > rest_0 + 1e-4);
}
