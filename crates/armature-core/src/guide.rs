//! Guide placement nodes and the immutable guide tree
//!
//! Guides are placement markers carrying a semantic type tag and a side tag.
//! A session dump hands them to the engine as a flat, parent-name-keyed list
//! of [`GuideRecord`]s; [`GuideTree::from_records`] builds an index-linked
//! arena from it once, so resolution never touches live external state.

use crate::error::{Error, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a guide node inside its [`GuideTree`] arena
pub type GuideId = usize;

/// Which half of the character a guide belongs to
///
/// `Center` implies no mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    #[default]
    Center,
}

impl Side {
    /// Mirroring multiplier applied by callers along the primary axis
    pub fn multiplier(self) -> f32 {
        match self {
            Side::Right => -1.0,
            Side::Left | Side::Center => 1.0,
        }
    }

    /// Single-letter naming token (`L`/`R`/`C`)
    pub fn token(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
            Side::Center => 'C',
        }
    }
}

/// Kind of a custom guide attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    Bool,
    Int,
    Float,
    Enum,
    String,
}

/// A custom attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
}

impl AttrValue {
    /// Value as an `f32`, coercing bools and ints
    pub fn as_float(&self) -> Option<f32> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f32),
            AttrValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttrValue::String(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }
}

/// Descriptor of one custom attribute on a guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrDescriptor {
    pub name: String,
    pub kind: AttrKind,
    pub value: AttrValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_list: Option<Vec<String>>,
}

/// World transform of a guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideXform {
    pub position: Vec3,
    /// Euler rotation in degrees, XYZ order
    pub rotation: Vec3,
    /// Joint orientation offset in degrees
    pub joint_orient: Vec3,
    pub scale: Vec3,
}

impl Default for GuideXform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            joint_orient: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// One guide record as produced by a session dump
///
/// This mirrors the JSON shape the session collaborator owns; the core only
/// consumes it to build the arena tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideRecord {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub joint_orient: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub side: Side,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub color: i32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub attributes: Vec<AttrDescriptor>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_radius() -> f32 {
    0.5
}

/// A guide node stored in the arena
#[derive(Debug, Clone)]
pub struct GuideNode {
    pub name: String,
    pub type_tag: String,
    pub side: Side,
    pub xform: GuideXform,
    pub color: i32,
    pub radius: f32,
    pub attributes: Vec<AttrDescriptor>,
    /// Arena index of the parent, tree navigation only
    pub parent: Option<GuideId>,
    /// Arena indices of children in session order
    pub children: Vec<GuideId>,
}

impl GuideNode {
    /// Look up a custom attribute by name
    pub fn attr(&self, name: &str) -> Option<&AttrDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Immutable arena of guide nodes with index-based parent/child links
#[derive(Debug, Clone, Default)]
pub struct GuideTree {
    nodes: Vec<GuideNode>,
    roots: Vec<GuideId>,
}

impl GuideTree {
    /// Build the arena from a flat record list keyed by parent name
    ///
    /// Records must have unique names and every named parent must exist.
    /// Child order follows record order, which keeps resolution stable.
    pub fn from_records(records: &[GuideRecord]) -> Result<Self> {
        let mut by_name: HashMap<&str, GuideId> = HashMap::with_capacity(records.len());
        for (id, rec) in records.iter().enumerate() {
            if by_name.insert(rec.name.as_str(), id).is_some() {
                return Err(Error::GuideTree(format!("duplicate guide name '{}'", rec.name)));
            }
        }

        let mut nodes: Vec<GuideNode> = records
            .iter()
            .map(|rec| GuideNode {
                name: rec.name.clone(),
                type_tag: rec.type_tag.clone(),
                side: rec.side,
                xform: GuideXform {
                    position: Vec3::from_array(rec.position),
                    rotation: Vec3::from_array(rec.rotation),
                    joint_orient: Vec3::from_array(rec.joint_orient),
                    scale: Vec3::from_array(rec.scale),
                },
                color: rec.color,
                radius: rec.radius,
                attributes: rec.attributes.clone(),
                parent: None,
                children: Vec::new(),
            })
            .collect();

        let mut roots = Vec::new();
        for (id, rec) in records.iter().enumerate() {
            match &rec.parent {
                Some(parent_name) => {
                    let parent_id = *by_name.get(parent_name.as_str()).ok_or_else(|| {
                        Error::GuideTree(format!(
                            "guide '{}' references unknown parent '{}'",
                            rec.name, parent_name
                        ))
                    })?;
                    if parent_id == id {
                        return Err(Error::GuideTree(format!(
                            "guide '{}' is its own parent",
                            rec.name
                        )));
                    }
                    nodes[id].parent = Some(parent_id);
                    nodes[parent_id].children.push(id);
                }
                None => roots.push(id),
            }
        }

        // Every node must be reachable from a root. A parent cycle
        // (a -> b -> a) links cleanly above but leaves its members
        // orphaned from every root, and resolution would never
        // terminate on such a component.
        let mut reachable = vec![false; nodes.len()];
        let mut stack: Vec<GuideId> = roots.clone();
        while let Some(id) = stack.pop() {
            if reachable[id] {
                continue;
            }
            reachable[id] = true;
            stack.extend(nodes[id].children.iter().copied());
        }
        if let Some(orphan) = reachable.iter().position(|seen| !seen) {
            return Err(Error::GuideTree(format!(
                "guide '{}' is unreachable from any root (parent cycle?)",
                nodes[orphan].name
            )));
        }

        Ok(Self { nodes, roots })
    }

    /// Parse and build from a session JSON dump
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<GuideRecord> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    pub fn node(&self, id: GuideId) -> &GuideNode {
        &self.nodes[id]
    }

    /// Top-level guides in session order
    pub fn roots(&self) -> &[GuideId] {
        &self.roots
    }

    /// Children of `id` in session order
    pub fn children(&self, id: GuideId) -> &[GuideId] {
        &self.nodes[id].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World position of a guide
    pub fn position(&self, id: GuideId) -> Vec3 {
        self.nodes[id].xform.position
    }
}
