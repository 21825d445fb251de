//! In-memory robot description
//!
//! Values here are kept in description convention (Z-up, roll-pitch-yaw).
//! Conversion to engine space happens when the tree is built, the one
//! exception being joint axes which are stored permuted but not normalized.

use crate::diagnostics::Diagnostics;
use crate::geometry::Pose;
use glam::Vec3;
use std::collections::HashMap;

/// Joint type that receives an actuation index, rest pose and axis
pub const REVOLUTE: &str = "revolute";

/// RGBA color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Named material
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    pub name: String,
    pub color: Rgba,
}

/// Visual element of a link
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visual {
    pub origin: Pose,
    /// Normalized mesh path, if the geometry is a mesh
    pub mesh_path: Option<String>,
    pub material: Option<Material>,
}

/// Collision geometry; exactly one of the supported shapes
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionGeometry {
    Mesh { path: String },
    Sphere { radius: f32 },
    Cylinder { radius: f32, length: f32 },
}

impl CollisionGeometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            CollisionGeometry::Mesh { .. } => "mesh",
            CollisionGeometry::Sphere { .. } => "sphere",
            CollisionGeometry::Cylinder { .. } => "cylinder",
        }
    }
}

/// Collision element of a link
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collision {
    pub origin: Pose,
    /// `None` when no supported geometry was declared
    pub geometry: Option<CollisionGeometry>,
}

/// Rigid body of the robot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Link {
    pub name: String,
    pub visuals: Vec<Visual>,
    pub collisions: Vec<Collision>,
    /// Scalar inertial properties by name (`mass`, `ixx`, ...)
    pub inertial: HashMap<String, f32>,
    pub inertial_origin: Vec3,
}

impl Link {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn mass(&self) -> Option<f32> {
        self.inertial.get("mass").copied()
    }
}

/// Connection between a parent and a child link
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Joint {
    pub name: String,
    /// Kinematic type as written (`revolute`, `fixed`, `prismatic`, ...)
    pub joint_type: String,
    pub parent_link: String,
    pub child_link: String,
    pub origin: Pose,
    /// Rotation axis, permuted to engine convention but not normalized
    pub axis: Vec3,
    /// Numeric `<limit>` attributes by name
    pub limits: HashMap<String, f32>,
    /// Actuation index, or [`crate::UNMAPPED_JOINT_INDEX`]
    pub index: i32,
}

impl Joint {
    pub fn is_revolute(&self) -> bool {
        self.joint_type == REVOLUTE
    }

    pub fn limit(&self, name: &str) -> Option<f32> {
        self.limits.get(name).copied()
    }
}

/// Output of the description parser
#[derive(Debug, Clone, Default)]
pub struct ParsedDescription {
    /// Value of the root element's `name` attribute, if any
    pub robot_name: Option<String>,
    pub links: HashMap<String, Link>,
    pub joints: HashMap<String, Joint>,
    /// Parent link name to child joint names, in document order
    pub child_joints: HashMap<String, Vec<String>>,
    pub materials: HashMap<String, Material>,
    pub diagnostics: Diagnostics,
}

impl ParsedDescription {
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.get(name)
    }

    /// Child joint names of a link; empty when the link has none
    pub fn children_of(&self, link: &str) -> &[String] {
        self.child_joints
            .get(link)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Links that are never a joint's child, sorted by name
    pub fn root_candidates(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = self
            .links
            .keys()
            .filter(|name| !self.joints.values().any(|j| &j.child_link == *name))
            .map(String::as_str)
            .collect();
        roots.sort_unstable();
        roots
    }
}
