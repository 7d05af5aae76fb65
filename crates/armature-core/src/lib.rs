//! # Armature Core
//!
//! Procedural rig assembly for articulated character skeletons.
//!
//! Armature turns a loosely-typed tree of guide placement nodes into an
//! ordered sequence of parametric limb modules, instantiates each module's
//! control and deformation hierarchy, and wires modules together through
//! nearest-attachment-point resolution.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_core::prelude::*;
//!
//! let tree = GuideTree::from_json(&guide_dump)?;
//! let registry = ModuleRegistry::new();
//! let records = GuideTreeResolver::new(&registry).resolve(&tree, tree.roots()[0])?;
//! ```
//!
//! ## Units and Conventions
//!
//! - **Distances**: arbitrary units (typically interpreted as centimeters)
//! - **Rotations**: Euler angles in degrees as delivered by guide dumps
//! - **Precision**: all rig math is `f32`
//! - **Sides**: `Left`/`Right`/`Center`; Center implies no mirroring

pub mod anchor;
pub mod context;
pub mod guide;
pub mod module;
pub mod registry;
pub mod resolver;
pub mod socket;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Guide data model
    pub use crate::guide::{
        AttrDescriptor, AttrKind, AttrValue, GuideId, GuideNode, GuideRecord, GuideTree, Side,
    };

    // Catalog and resolution
    pub use crate::registry::{ModuleKind, ModuleRegistry, ModuleSignature, ParamDecl, ParamKind};
    pub use crate::resolver::{GuideTreeResolver, LimbRecord};

    // Modules and build pipeline
    pub use crate::module::{
        Attachment, Control, Group, Joint, LimbModule, ModuleBuild, ModuleInstance, build_module,
    };

    // Wiring
    pub use crate::anchor::{AnchorCandidate, AnchorRegistry, SwitchMode};
    pub use crate::context::RigContext;
    pub use crate::socket::{ModuleId, Socket, SocketGraph, SocketId};

    // Math (re-export glam)
    pub use glam::{Mat4, Quat, Vec3};

    // Error handling
    pub use crate::{Error, Result};
}
