//! Module catalog: kinds, signatures and factories
//!
//! The set of module types is closed and compiled in. Every kind registers a
//! [`ModuleSignature`] (its ordered role tags, optional multiplicity role,
//! sidedness and declared parameters) plus a factory producing the matching
//! [`LimbModule`](crate::module::LimbModule) implementation. Classification
//! of a guide tag against the catalog is a plain match over the enum, never
//! a runtime string evaluation.

use crate::guide::GuideNode;
use crate::module::{self, LimbModule};

/// The closed set of limb module types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Root,
    Spine,
    Head,
    Arm,
    Leg,
    Finger,
    Tail,
    Tentacle,
    Chain,
    Singleton,
    Surface,
    Eye,
}

impl ModuleKind {
    /// Every registered kind, in catalog order
    pub const ALL: [ModuleKind; 12] = [
        ModuleKind::Root,
        ModuleKind::Spine,
        ModuleKind::Head,
        ModuleKind::Arm,
        ModuleKind::Leg,
        ModuleKind::Finger,
        ModuleKind::Tail,
        ModuleKind::Tentacle,
        ModuleKind::Chain,
        ModuleKind::Singleton,
        ModuleKind::Surface,
        ModuleKind::Eye,
    ];

    /// Catalog name used in logs and errors
    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::Root => "root",
            ModuleKind::Spine => "spine",
            ModuleKind::Head => "head",
            ModuleKind::Arm => "arm",
            ModuleKind::Leg => "leg",
            ModuleKind::Finger => "finger",
            ModuleKind::Tail => "tail",
            ModuleKind::Tentacle => "tentacle",
            ModuleKind::Chain => "chain",
            ModuleKind::Singleton => "singleton",
            ModuleKind::Surface => "surface",
            ModuleKind::Eye => "eye",
        }
    }
}

/// Kind of a declared module parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Enum,
}

/// One parameter a module type declares once for all its instances
///
/// Mirrors the custom attribute descriptors carried by guides; a guide
/// attribute of the same name overrides the default, clamped to the
/// declared range.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: f32,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub enum_list: &'static [&'static str],
}

impl ParamDecl {
    pub const fn float(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default,
            min: Some(min),
            max: Some(max),
            enum_list: &[],
        }
    }

    pub const fn bool(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: if default { 1.0 } else { 0.0 },
            min: None,
            max: None,
            enum_list: &[],
        }
    }

    /// Effective value for `guide`: its attribute if present, else the
    /// declared default. Out-of-range attribute values clamp.
    pub fn resolve(&self, guide: &GuideNode) -> f32 {
        let raw = guide
            .attr(self.name)
            .and_then(|a| a.value.as_float())
            .unwrap_or(self.default);
        let lo = self.min.unwrap_or(f32::NEG_INFINITY);
        let hi = self.max.unwrap_or(f32::INFINITY);
        raw.clamp(lo, hi)
    }
}

/// Role signature of one module type
#[derive(Debug, Clone)]
pub struct ModuleSignature {
    pub kind: ModuleKind,
    /// Ordered required role tags; the first is the start-of-module tag
    pub roles: &'static [&'static str],
    /// Role that may be matched 1..n times (spine segments, fingers, ...)
    pub multi_role: Option<&'static str>,
    /// When false, side is always forced to Center
    pub sided: bool,
    /// Modules opting in keep non-uniform scale from their parent socket
    pub wants_inherited_scale: bool,
    pub params: Vec<ParamDecl>,
}

impl ModuleSignature {
    /// First role tag, the one that starts a record of this module type
    pub fn root_role(&self) -> &'static str {
        self.roles[0]
    }

    /// Whether `tag` is any role of this signature
    pub fn has_role(&self, tag: &str) -> bool {
        self.roles.contains(&tag)
    }

    /// Whether this module supports the IK/FK dual setup
    pub fn has_ik_fk(&self) -> bool {
        matches!(self.kind, ModuleKind::Arm | ModuleKind::Leg | ModuleKind::Chain)
    }
}

fn solver_params() -> Vec<ParamDecl> {
    vec![
        ParamDecl::float("stretch", 1.0, 0.0, 1.0),
        ParamDecl::float("squash", 0.0, 0.0, 1.0),
        ParamDecl::float("soft_ik", 0.0, 0.0, 100.0),
        ParamDecl::float("max_stretch", 1.5, 0.0, 100.0),
        ParamDecl::float("ik_fk_blend", 0.0, 0.0, 1.0),
    ]
}

fn volume_params() -> Vec<ParamDecl> {
    vec![ParamDecl::float("volume", 1.0, 0.0, 1.0)]
}

/// Static catalog of module signatures and factories
#[derive(Debug, Default)]
pub struct ModuleRegistry;

impl ModuleRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Signature of `kind`
    pub fn signature(&self, kind: ModuleKind) -> ModuleSignature {
        match kind {
            ModuleKind::Root => ModuleSignature {
                kind,
                roles: &["root"],
                multi_role: None,
                sided: false,
                wants_inherited_scale: false,
                params: vec![ParamDecl::bool("global_scale", true)],
            },
            ModuleKind::Spine => ModuleSignature {
                kind,
                roles: &["spine_base", "spine"],
                multi_role: Some("spine"),
                sided: false,
                wants_inherited_scale: false,
                params: volume_params(),
            },
            ModuleKind::Head => ModuleSignature {
                kind,
                roles: &["neck", "head"],
                multi_role: None,
                sided: false,
                wants_inherited_scale: false,
                params: vec![ParamDecl::float("head_free", 1.0, 0.0, 1.0)],
            },
            ModuleKind::Arm => ModuleSignature {
                kind,
                roles: &["shoulder", "elbow", "hand"],
                multi_role: None,
                sided: true,
                wants_inherited_scale: false,
                params: [solver_params(), volume_params()].concat(),
            },
            ModuleKind::Leg => ModuleSignature {
                kind,
                roles: &["hip", "knee", "foot"],
                multi_role: None,
                sided: true,
                wants_inherited_scale: false,
                params: [solver_params(), volume_params()].concat(),
            },
            ModuleKind::Finger => ModuleSignature {
                kind,
                roles: &["finger"],
                multi_role: Some("finger"),
                sided: true,
                wants_inherited_scale: true,
                params: vec![ParamDecl::float("spread", 0.0, -1.0, 1.0)],
            },
            ModuleKind::Tail => ModuleSignature {
                kind,
                roles: &["tail"],
                multi_role: Some("tail"),
                sided: false,
                wants_inherited_scale: false,
                params: volume_params(),
            },
            ModuleKind::Tentacle => ModuleSignature {
                kind,
                roles: &["tentacle"],
                multi_role: Some("tentacle"),
                sided: true,
                wants_inherited_scale: false,
                params: volume_params(),
            },
            ModuleKind::Chain => ModuleSignature {
                kind,
                roles: &["chain"],
                multi_role: Some("chain"),
                sided: true,
                wants_inherited_scale: false,
                params: solver_params(),
            },
            ModuleKind::Singleton => ModuleSignature {
                kind,
                roles: &["singleton"],
                multi_role: None,
                sided: true,
                wants_inherited_scale: false,
                params: Vec::new(),
            },
            ModuleKind::Surface => ModuleSignature {
                kind,
                roles: &["surface"],
                multi_role: None,
                sided: true,
                wants_inherited_scale: true,
                params: Vec::new(),
            },
            ModuleKind::Eye => ModuleSignature {
                kind,
                roles: &["eye"],
                multi_role: None,
                sided: true,
                wants_inherited_scale: false,
                params: vec![ParamDecl::float("aim_depth", 5.0, 0.1, 100.0)],
            },
        }
    }

    /// Kind whose first role equals `tag`, if any
    ///
    /// A guide with such a tag is a valid record root.
    pub fn classify_root(&self, tag: &str) -> Option<ModuleKind> {
        ModuleKind::ALL
            .into_iter()
            .find(|kind| self.signature(*kind).root_role() == tag)
    }

    /// Factory for the limb module implementation of `kind`
    pub fn factory(&self, kind: ModuleKind) -> Box<dyn LimbModule> {
        match kind {
            ModuleKind::Arm | ModuleKind::Leg | ModuleKind::Chain => {
                Box::new(module::chain::FkIkChainModule::new(kind))
            }
            ModuleKind::Spine | ModuleKind::Tail | ModuleKind::Tentacle => {
                Box::new(module::spine::SegmentChainModule::new(kind))
            }
            ModuleKind::Root
            | ModuleKind::Head
            | ModuleKind::Finger
            | ModuleKind::Singleton
            | ModuleKind::Surface
            | ModuleKind::Eye => Box::new(module::simple::SimpleModule::new(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::{AttrDescriptor, AttrKind, AttrValue, GuideXform, Side};
    use approx::assert_relative_eq;

    fn guide_with_attrs(attrs: Vec<AttrDescriptor>) -> GuideNode {
        GuideNode {
            name: "shoulder_L".into(),
            type_tag: "shoulder".into(),
            side: Side::Left,
            xform: GuideXform::default(),
            color: 0,
            radius: 0.5,
            attributes: attrs,
            parent: None,
            children: Vec::new(),
        }
    }

    fn float_attr(name: &str, value: f32) -> AttrDescriptor {
        AttrDescriptor {
            name: name.into(),
            kind: AttrKind::Float,
            value: AttrValue::Float(value),
            min: None,
            max: None,
            enum_list: None,
        }
    }

    #[test]
    fn param_falls_back_to_default_when_attribute_is_missing() {
        let decl = ParamDecl::float("stretch", 1.0, 0.0, 1.0);
        let guide = guide_with_attrs(Vec::new());
        assert_relative_eq!(decl.resolve(&guide), 1.0);
    }

    #[test]
    fn param_reads_matching_guide_attribute() {
        let decl = ParamDecl::float("stretch", 1.0, 0.0, 1.0);
        let guide = guide_with_attrs(vec![float_attr("stretch", 0.25)]);
        assert_relative_eq!(decl.resolve(&guide), 0.25);
    }

    #[test]
    fn out_of_range_attribute_values_clamp() {
        let decl = ParamDecl::float("max_stretch", 1.5, 0.0, 100.0);

        let over = guide_with_attrs(vec![float_attr("max_stretch", 250.0)]);
        assert_relative_eq!(decl.resolve(&over), 100.0);

        let under = guide_with_attrs(vec![float_attr("max_stretch", -3.0)]);
        assert_relative_eq!(decl.resolve(&under), 0.0);
    }

    #[test]
    fn bool_param_coerces_attribute_to_float() {
        let decl = ParamDecl::bool("global_scale", true);
        let guide = guide_with_attrs(vec![AttrDescriptor {
            name: "global_scale".into(),
            kind: AttrKind::Bool,
            value: AttrValue::Bool(false),
            min: None,
            max: None,
            enum_list: None,
        }]);
        assert_relative_eq!(decl.resolve(&guide), 0.0);
    }

    #[test]
    fn inherited_scale_is_limited_to_surface_followers() {
        let registry = ModuleRegistry::new();
        assert!(registry.signature(ModuleKind::Finger).wants_inherited_scale);
        assert!(registry.signature(ModuleKind::Surface).wants_inherited_scale);
        for kind in [ModuleKind::Arm, ModuleKind::Spine, ModuleKind::Root, ModuleKind::Eye] {
            assert!(!registry.signature(kind).wants_inherited_scale);
        }
    }

    #[test]
    fn every_kind_has_a_distinct_root_role() {
        let registry = ModuleRegistry::new();
        for kind in ModuleKind::ALL {
            let sig = registry.signature(kind);
            assert_eq!(registry.classify_root(sig.root_role()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_classifies_to_none() {
        let registry = ModuleRegistry::new();
        assert_eq!(registry.classify_root("propeller"), None);
    }

    #[test]
    fn unsided_signatures_cover_center_modules() {
        let registry = ModuleRegistry::new();
        for kind in [ModuleKind::Root, ModuleKind::Spine, ModuleKind::Head, ModuleKind::Tail] {
            assert!(!registry.signature(kind).sided);
        }
    }

    #[test]
    fn ik_fk_duality_is_limited_to_solver_chains() {
        let registry = ModuleRegistry::new();
        assert!(registry.signature(ModuleKind::Arm).has_ik_fk());
        assert!(registry.signature(ModuleKind::Leg).has_ik_fk());
        assert!(registry.signature(ModuleKind::Chain).has_ik_fk());
        assert!(!registry.signature(ModuleKind::Spine).has_ik_fk());
        assert!(!registry.signature(ModuleKind::Eye).has_ik_fk());
    }

    #[test]
    fn factories_match_their_kind() {
        let registry = ModuleRegistry::new();
        for kind in ModuleKind::ALL {
            assert_eq!(registry.factory(kind).kind(), kind);
        }
    }
}
