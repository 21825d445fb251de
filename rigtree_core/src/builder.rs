//! Kinematic tree construction
//!
//! Walks the parsed adjacency table depth-first from a root link, converting
//! every transform to engine convention on the way, and records each
//! revolute joint's node, rest orientation and axis in an index-keyed
//! registry for runtime actuation.

use crate::description::{CollisionGeometry, Link, ParsedDescription};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{RigError, RigResult};
use crate::geometry::{convert_position, convert_rotation, normalize_axis, Transform};
use crate::resources::MeshResolver;
use crate::tree::{
    CollisionPrimitive, CollisionShape, KinematicTree, NodeId, NodeKind, VisualPrimitive,
};
use glam::{Quat, Vec3};
use std::collections::{BTreeMap, HashSet};

/// Actuation handle for one revolute joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevoluteJoint {
    /// Joint node in the tree this registry was built with
    pub node: NodeId,
    /// Local rotation of the joint node at rest
    pub rest_orientation: Quat,
    /// Unit rotation axis in engine convention (zero if none was declared)
    pub axis: Vec3,
}

/// Revolute joints keyed by actuation index.
///
/// Joints without a mapping are stored under
/// [`UNMAPPED_JOINT_INDEX`](crate::UNMAPPED_JOINT_INDEX), so at most one of
/// them survives; use [`RevoluteJoints::mapped`] to skip that slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevoluteJoints {
    entries: BTreeMap<i32, RevoluteJoint>,
}

impl RevoluteJoints {
    pub fn get(&self, index: i32) -> Option<&RevoluteJoint> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &RevoluteJoint)> {
        self.entries.iter().map(|(index, joint)| (*index, joint))
    }

    /// Entries with a real actuation index
    pub fn mapped(&self) -> impl Iterator<Item = (i32, &RevoluteJoint)> {
        self.iter().filter(|(index, _)| *index >= 0)
    }

    /// Rotate a joint node by `angle` radians about its axis, relative to
    /// its rest orientation. Returns false for unknown indices.
    pub fn apply_angle(&self, tree: &mut KinematicTree, index: i32, angle: f32) -> bool {
        let Some(joint) = self.entries.get(&index) else {
            return false;
        };
        let rotation = if joint.axis == Vec3::ZERO {
            joint.rest_orientation
        } else {
            joint.rest_orientation * Quat::from_axis_angle(joint.axis, angle)
        };
        tree.set_local_rotation(joint.node, rotation)
    }

    fn insert(&mut self, index: i32, joint: RevoluteJoint) -> Option<RevoluteJoint> {
        self.entries.insert(index, joint)
    }
}

/// Result of building a tree
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub tree: KinematicTree,
    pub revolute_joints: RevoluteJoints,
    /// Findings from tree construction; parse diagnostics are not repeated here
    pub diagnostics: Diagnostics,
}

/// Builds kinematic trees from a parsed description
pub struct KinematicTreeBuilder<'a> {
    parsed: &'a ParsedDescription,
    resolver: &'a dyn MeshResolver,
}

struct BuildState<'t> {
    tree: &'t mut KinematicTree,
    revolute_joints: RevoluteJoints,
    diagnostics: Diagnostics,
    /// Links on the current root-to-node path
    on_path: HashSet<String>,
    /// Links already placed in the tree
    attached: HashSet<String>,
}

/// A link whose child joints are still being placed
struct Frame<'p> {
    link: &'p str,
    node: NodeId,
    child_joints: &'p [String],
    next_child: usize,
}

impl<'a> KinematicTreeBuilder<'a> {
    pub fn new(parsed: &'a ParsedDescription, resolver: &'a dyn MeshResolver) -> Self {
        Self { parsed, resolver }
    }

    /// Build a fresh tree rooted at `root_link`.
    ///
    /// An unknown root link yields an empty tree.
    pub fn build(&self, root_link: &str) -> RigResult<BuildOutput> {
        let mut tree = KinematicTree::new();
        let (revolute_joints, diagnostics) = self.build_under(&mut tree, None, root_link)?;
        Ok(BuildOutput {
            tree,
            revolute_joints,
            diagnostics,
        })
    }

    /// Build the subtree of `root_link` under an existing node of `tree`.
    ///
    /// `parent` must be a node of `tree`, or `None` when `tree` is empty.
    pub fn build_under(
        &self,
        tree: &mut KinematicTree,
        parent: Option<NodeId>,
        root_link: &str,
    ) -> RigResult<(RevoluteJoints, Diagnostics)> {
        match parent {
            Some(id) if tree.node(id).is_none() => {
                return Err(RigError::InvalidAttachment(format!(
                    "node {} is not part of the target tree",
                    id.index()
                )));
            }
            None if tree.root().is_some() => {
                return Err(RigError::InvalidAttachment(
                    "target tree already has a root".to_string(),
                ));
            }
            _ => {}
        }

        let mut state = BuildState {
            tree,
            revolute_joints: RevoluteJoints::default(),
            diagnostics: Diagnostics::new(),
            on_path: HashSet::new(),
            attached: HashSet::new(),
        };

        match self.enter_link(&mut state, root_link, parent) {
            Some(root) => self.descend(&mut state, root)?,
            None => tracing::warn!("Root link '{}' not found, tree is empty", root_link),
        }

        tracing::debug!(
            "Built tree from '{}': {} links, {} revolute joints",
            root_link,
            state.attached.len(),
            state.revolute_joints.len()
        );

        Ok((state.revolute_joints, state.diagnostics))
    }

    /// Depth-first descent with an explicit stack of open links.
    ///
    /// A link stays on the stack until all of its child joints are placed, so
    /// `on_path` holds exactly the links between the root and the current one.
    fn descend(&self, state: &mut BuildState, root: Frame<'a>) -> RigResult<()> {
        let mut stack = vec![root];

        while let Some(frame) = stack.last_mut() {
            let child_joints = frame.child_joints;
            let Some(joint_name) = child_joints.get(frame.next_child) else {
                state.on_path.remove(frame.link);
                stack.pop();
                continue;
            };
            frame.next_child += 1;
            let (link_name, link_node) = (frame.link, frame.node);

            if let Some(child) = self.place_joint(state, link_name, link_node, joint_name)? {
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Create a link node and mark it as open
    fn enter_link(
        &self,
        state: &mut BuildState,
        link_name: &str,
        parent: Option<NodeId>,
    ) -> Option<Frame<'a>> {
        let link: &'a Link = self.parsed.link(link_name)?;

        let kind = NodeKind::Link {
            visuals: self.visual_primitives(link, &mut state.diagnostics),
            collisions: self.collision_primitives(link, &mut state.diagnostics),
        };
        let node = state
            .tree
            .add_node(parent, link.name.as_str(), kind, Transform::IDENTITY);

        state.on_path.insert(link.name.clone());
        state.attached.insert(link.name.clone());

        Some(Frame {
            link: &link.name,
            node,
            child_joints: self.parsed.children_of(&link.name),
            next_child: 0,
        })
    }

    /// Place one child joint under `link_node`; returns the child link to
    /// descend into next, if it can be attached
    fn place_joint(
        &self,
        state: &mut BuildState,
        link_name: &str,
        link_node: NodeId,
        joint_name: &str,
    ) -> RigResult<Option<Frame<'a>>> {
        let Some(joint) = self.parsed.joint(joint_name) else {
            state.diagnostics.push(Diagnostic::MissingJoint {
                parent_link: link_name.to_string(),
                joint: joint_name.to_string(),
            });
            return Ok(None);
        };

        // Revolute joints rest with only their yaw offset baked in
        let rpy = if joint.is_revolute() {
            Vec3::new(0.0, 0.0, joint.origin.rpy.z)
        } else {
            joint.origin.rpy
        };
        let rotation = convert_rotation(rpy);
        let transform = Transform::new(convert_position(joint.origin.position), rotation);

        let joint_node = state.tree.add_node(
            Some(link_node),
            joint.name.as_str(),
            NodeKind::Joint {
                joint_type: joint.joint_type.clone(),
                index: joint.is_revolute().then_some(joint.index),
            },
            transform,
        );

        if joint.is_revolute() {
            let axis = normalize_axis(joint.axis);
            if axis == Vec3::ZERO {
                state.diagnostics.push(Diagnostic::DegenerateAxis {
                    joint: joint.name.clone(),
                });
            }
            let entry = RevoluteJoint {
                node: joint_node,
                rest_orientation: rotation,
                axis,
            };
            if state.revolute_joints.insert(joint.index, entry).is_some() {
                state.diagnostics.push(Diagnostic::DuplicateIndex {
                    index: joint.index,
                    joint: joint.name.clone(),
                });
            }
        }

        let child = joint.child_link.as_str();
        if self.parsed.link(child).is_none() {
            state.diagnostics.push(Diagnostic::MissingLink {
                joint: joint.name.clone(),
                link: child.to_string(),
            });
            Ok(None)
        } else if state.on_path.contains(child) {
            Err(RigError::CyclicDescription {
                link: child.to_string(),
            })
        } else if state.attached.contains(child) {
            state.diagnostics.push(Diagnostic::SharedChildLink {
                link: child.to_string(),
                joint: joint.name.clone(),
            });
            Ok(None)
        } else {
            Ok(self.enter_link(state, child, Some(joint_node)))
        }
    }

    fn visual_primitives(&self, link: &Link, diagnostics: &mut Diagnostics) -> Vec<VisualPrimitive> {
        let mut primitives = Vec::new();

        for visual in &link.visuals {
            let Some(path) = visual.mesh_path.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            let Some(mesh) = self.resolver.resolve(path) else {
                diagnostics.push(Diagnostic::UnresolvedResource {
                    link: link.name.clone(),
                    path: path.to_string(),
                });
                continue;
            };

            primitives.push(VisualPrimitive {
                mesh_path: path.to_string(),
                mesh,
                material: visual.material.clone(),
                transform: visual.origin.to_target(),
            });
        }

        primitives
    }

    fn collision_primitives(
        &self,
        link: &Link,
        diagnostics: &mut Diagnostics,
    ) -> Vec<CollisionPrimitive> {
        let mut primitives = Vec::new();

        for collision in &link.collisions {
            let shape = match &collision.geometry {
                None => continue,
                Some(CollisionGeometry::Mesh { path }) => match self.resolver.resolve(path) {
                    Some(mesh) => CollisionShape::ConvexMesh {
                        mesh_path: path.clone(),
                        mesh,
                    },
                    None => {
                        diagnostics.push(Diagnostic::UnresolvedResource {
                            link: link.name.clone(),
                            path: path.clone(),
                        });
                        continue;
                    }
                },
                Some(CollisionGeometry::Sphere { radius }) => {
                    CollisionShape::Sphere { radius: *radius }
                }
                Some(CollisionGeometry::Cylinder { radius, length }) => CollisionShape::Cylinder {
                    radius: *radius,
                    height: *length,
                },
            };

            primitives.push(CollisionPrimitive {
                name: format!("{}_collision", link.name),
                shape,
                transform: collision.origin.to_target(),
            });
        }

        primitives
    }
}
