//! Robot description parser
//!
//! Reads URDF-style XML into name-keyed link, joint and material tables plus
//! the parent-link to child-joint adjacency used to build the tree.
//!
//! Only unparsable XML is fatal. Every element and attribute is optional and
//! read through an accessor with a defined default; irregular input is
//! recorded in the returned [`Diagnostics`](crate::Diagnostics).

use crate::description::{
    Collision, CollisionGeometry, Joint, Link, Material, ParsedDescription, Rgba, Visual,
};
use crate::diagnostics::Diagnostic;
use crate::error::RigResult;
use crate::geometry::{convert_position, Pose};
use crate::registry::JointIndexRegistry;
use glam::Vec3;
use roxmltree::{Document, Node};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Attributes read from `<inertia>`
const INERTIA_ATTRIBUTES: [&str; 6] = ["ixx", "ixy", "ixz", "iyy", "iyz", "izz"];

/// Rewrites mesh references from the description's layout to the engine's
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPathRules {
    /// Directory literal removed from every path
    pub dir_prefix: String,
    /// Case-sensitive extension replaced when it ends the path
    pub source_extension: String,
    pub target_extension: String,
}

impl Default for MeshPathRules {
    fn default() -> Self {
        Self {
            dir_prefix: "meshes/".to_string(),
            source_extension: ".STL".to_string(),
            target_extension: ".glb".to_string(),
        }
    }
}

impl MeshPathRules {
    /// Pure string rewrite; no existence check
    pub fn normalize(&self, path: &str) -> String {
        let path = match path.strip_suffix(self.source_extension.as_str()) {
            Some(stem) if !self.source_extension.is_empty() => {
                format!("{}{}", stem, self.target_extension)
            }
            _ => path.to_string(),
        };

        if self.dir_prefix.is_empty() {
            path
        } else {
            path.replace(self.dir_prefix.as_str(), "")
        }
    }
}

/// Parser for a single robot description
pub struct DescriptionParser<'r> {
    registry: &'r JointIndexRegistry,
    mesh_rules: MeshPathRules,
}

impl<'r> DescriptionParser<'r> {
    pub fn new(registry: &'r JointIndexRegistry) -> Self {
        Self {
            registry,
            mesh_rules: MeshPathRules::default(),
        }
    }

    pub fn with_mesh_rules(mut self, rules: MeshPathRules) -> Self {
        self.mesh_rules = rules;
        self
    }

    /// Parse description text into lookup tables
    pub fn parse(&self, text: &str) -> RigResult<ParsedDescription> {
        // roxmltree rejects an XML declaration preceded by whitespace
        let doc = Document::parse(text.trim_start())?;
        let root = doc.root_element();

        let mut parsed = ParsedDescription {
            robot_name: root.attribute("name").map(str::to_string),
            ..Default::default()
        };

        // Materials first so visuals can refer to them by name
        for elem in elements(root, "material") {
            self.parse_global_material(elem, &mut parsed);
        }
        for elem in elements(root, "link") {
            self.parse_link(elem, &mut parsed);
        }
        for elem in elements(root, "joint") {
            self.parse_joint(elem, &mut parsed);
        }

        tracing::debug!(
            "Parsed description '{}': {} links, {} joints, {} materials, {} diagnostics",
            parsed.robot_name.as_deref().unwrap_or("unnamed"),
            parsed.links.len(),
            parsed.joints.len(),
            parsed.materials.len(),
            parsed.diagnostics.len()
        );

        Ok(parsed)
    }

    fn parse_global_material(&self, elem: Node, parsed: &mut ParsedDescription) {
        let Some(name) = non_empty_attr(elem, "name") else {
            parsed
                .diagnostics
                .push(Diagnostic::MissingName { element: "material" });
            return;
        };

        let color = parse_color(elem).unwrap_or_default();
        match parsed.materials.entry(name.to_string()) {
            Entry::Occupied(_) => parsed.diagnostics.push(Diagnostic::DuplicateName {
                element: "material",
                name: name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Material {
                    name: name.to_string(),
                    color,
                });
            }
        }
    }

    fn parse_link(&self, elem: Node, parsed: &mut ParsedDescription) {
        let Some(name) = non_empty_attr(elem, "name") else {
            parsed
                .diagnostics
                .push(Diagnostic::MissingName { element: "link" });
            return;
        };
        if parsed.links.contains_key(name) {
            parsed.diagnostics.push(Diagnostic::DuplicateName {
                element: "link",
                name: name.to_string(),
            });
            return;
        }

        let mut link = Link::new(name);

        if let Some(inertial) = child(elem, "inertial") {
            link.inertial_origin = parse_vec3(child(inertial, "origin").and_then(|o| o.attribute("xyz")));
            if let Some(mass) = child(inertial, "mass") {
                link.inertial.insert("mass".to_string(), attr_f32(mass, "value"));
            }
            if let Some(inertia) = child(inertial, "inertia") {
                for key in INERTIA_ATTRIBUTES {
                    if let Some(value) = inertia.attribute(key).and_then(parse_f32) {
                        link.inertial.insert(key.to_string(), value);
                    }
                }
            }
        }

        for visual in elements(elem, "visual") {
            link.visuals.push(self.parse_visual(visual, &mut parsed.materials));
        }
        for collision in elements(elem, "collision") {
            link.collisions.push(self.parse_collision(collision));
        }

        parsed.links.insert(link.name.clone(), link);
    }

    fn parse_visual(&self, elem: Node, materials: &mut HashMap<String, Material>) -> Visual {
        let mesh_path = child(elem, "geometry")
            .and_then(|g| child(g, "mesh"))
            .and_then(|m| m.attribute("filename"))
            .map(|path| self.mesh_rules.normalize(path));

        let material = child(elem, "material").map(|m| visual_material(m, materials));

        Visual {
            origin: parse_pose(child(elem, "origin")),
            mesh_path,
            material,
        }
    }

    fn parse_collision(&self, elem: Node) -> Collision {
        let geometry = child(elem, "geometry").and_then(|g| {
            if let Some(mesh) = child(g, "mesh") {
                Some(CollisionGeometry::Mesh {
                    path: self
                        .mesh_rules
                        .normalize(mesh.attribute("filename").unwrap_or_default()),
                })
            } else if let Some(sphere) = child(g, "sphere") {
                Some(CollisionGeometry::Sphere {
                    radius: attr_f32(sphere, "radius"),
                })
            } else {
                child(g, "cylinder").map(|cylinder| CollisionGeometry::Cylinder {
                    radius: attr_f32(cylinder, "radius"),
                    length: attr_f32(cylinder, "length"),
                })
            }
        });

        Collision {
            origin: parse_pose(child(elem, "origin")),
            geometry,
        }
    }

    fn parse_joint(&self, elem: Node, parsed: &mut ParsedDescription) {
        let Some(name) = non_empty_attr(elem, "name") else {
            parsed
                .diagnostics
                .push(Diagnostic::MissingName { element: "joint" });
            return;
        };
        if parsed.joints.contains_key(name) {
            parsed.diagnostics.push(Diagnostic::DuplicateName {
                element: "joint",
                name: name.to_string(),
            });
            return;
        }

        let index = self.registry.index_for_joint(name, &mut parsed.diagnostics);

        let link_ref = |tag: &str| {
            child(elem, tag)
                .and_then(|n| n.attribute("link"))
                .unwrap_or_default()
                .to_string()
        };

        let axis = child(elem, "axis")
            .map(|a| convert_position(parse_vec3(a.attribute("xyz"))))
            .unwrap_or(Vec3::ZERO);

        let limits: HashMap<String, f32> = child(elem, "limit")
            .map(|limit| {
                limit
                    .attributes()
                    .filter_map(|attr| parse_f32(attr.value()).map(|v| (attr.name().to_string(), v)))
                    .collect()
            })
            .unwrap_or_default();

        let joint = Joint {
            name: name.to_string(),
            joint_type: elem.attribute("type").unwrap_or_default().to_string(),
            parent_link: link_ref("parent"),
            child_link: link_ref("child"),
            origin: parse_pose(child(elem, "origin")),
            axis,
            limits,
            index,
        };

        if joint.parent_link.is_empty() {
            parsed.diagnostics.push(Diagnostic::MissingParent {
                joint: joint.name.clone(),
            });
        } else {
            parsed
                .child_joints
                .entry(joint.parent_link.clone())
                .or_default()
                .push(joint.name.clone());
        }

        parsed.joints.insert(joint.name.clone(), joint);
    }
}

/// Material of a visual; a bare name takes its color from the table
fn visual_material(elem: Node, materials: &mut HashMap<String, Material>) -> Material {
    let name = elem.attribute("name").unwrap_or_default().to_string();

    match parse_color(elem) {
        Some(color) => {
            if !name.is_empty() {
                materials.entry(name.clone()).or_insert_with(|| Material {
                    name: name.clone(),
                    color,
                });
            }
            Material { name, color }
        }
        None => {
            let color = materials.get(&name).map(|m| m.color).unwrap_or_default();
            Material { name, color }
        }
    }
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(tag))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn non_empty_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).filter(|value| !value.trim().is_empty())
}

fn parse_f32(text: &str) -> Option<f32> {
    text.trim().parse().ok()
}

/// Numeric attribute, `0.0` when absent or unparsable
fn attr_f32(node: Node, name: &str) -> f32 {
    node.attribute(name).and_then(parse_f32).unwrap_or(0.0)
}

/// Space-separated triple; zero when fewer than three values are given,
/// unparsable components read as zero
fn parse_vec3(text: Option<&str>) -> Vec3 {
    let Some(text) = text else {
        return Vec3::ZERO;
    };
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 3 {
        return Vec3::ZERO;
    }
    let component = |i: usize| parse_f32(parts[i]).unwrap_or(0.0);
    Vec3::new(component(0), component(1), component(2))
}

fn parse_pose(origin: Option<Node>) -> Pose {
    origin
        .map(|o| Pose::new(parse_vec3(o.attribute("xyz")), parse_vec3(o.attribute("rpy"))))
        .unwrap_or_default()
}

/// `<color rgba="r g b a"/>` child; all four channels must parse
fn parse_color(material: Node) -> Option<Rgba> {
    let rgba = child(material, "color")?.attribute("rgba")?;
    let channels: Vec<f32> = rgba
        .split_whitespace()
        .map(parse_f32)
        .collect::<Option<Vec<f32>>>()?;

    match channels.as_slice() {
        [r, g, b, a] => Some(Rgba::new(*r, *g, *b, *a)),
        _ => None,
    }
}
