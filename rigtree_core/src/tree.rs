//! Kinematic tree of link and joint nodes
//!
//! Nodes live in an arena owned by [`KinematicTree`] and refer to each other
//! through [`NodeId`]. Ids stay valid for the lifetime of the tree, which is
//! what lets the revolute joint registry point at joint nodes without owning
//! them.

use crate::description::Material;
use crate::geometry::Transform;
use crate::resources::MeshHandle;
use glam::Quat;

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Renderable mesh attached to a link
#[derive(Debug, Clone, PartialEq)]
pub struct VisualPrimitive {
    /// Normalized mesh path as written in the description
    pub mesh_path: String,
    pub mesh: MeshHandle,
    pub material: Option<Material>,
    pub transform: Transform,
}

/// Collision shape descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    ConvexMesh { mesh_path: String, mesh: MeshHandle },
    Sphere { radius: f32 },
    Cylinder { radius: f32, height: f32 },
    Capsule { radius: f32, height: f32 },
}

/// Collision shape placed relative to its owning node
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPrimitive {
    pub name: String,
    pub shape: CollisionShape,
    pub transform: Transform,
}

/// What a node represents
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Scene anchor that holds the link tree and whole-body collision
    Anchor { collisions: Vec<CollisionPrimitive> },
    Link {
        visuals: Vec<VisualPrimitive>,
        collisions: Vec<CollisionPrimitive>,
    },
    Joint {
        joint_type: String,
        /// Actuation index, present for revolute joints only
        index: Option<i32>,
    },
}

/// A node in the kinematic tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    /// Transform relative to the parent node
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, NodeKind::Link { .. })
    }

    pub fn is_joint(&self) -> bool {
        matches!(self.kind, NodeKind::Joint { .. })
    }

    pub fn joint_index(&self) -> Option<i32> {
        match &self.kind {
            NodeKind::Joint { index, .. } => *index,
            _ => None,
        }
    }

    pub fn visuals(&self) -> &[VisualPrimitive] {
        match &self.kind {
            NodeKind::Link { visuals, .. } => visuals,
            _ => &[],
        }
    }

    pub fn collisions(&self) -> &[CollisionPrimitive] {
        match &self.kind {
            NodeKind::Link { collisions, .. } | NodeKind::Anchor { collisions } => collisions,
            NodeKind::Joint { .. } => &[],
        }
    }
}

/// Arena-backed tree of nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinematicTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
}

impl KinematicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent`, or as the root when `parent` is `None`.
    ///
    /// Callers check that `parent` belongs to this tree and that a second
    /// root is never added.
    pub(crate) fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        kind: NodeKind,
        transform: Transform,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        match parent {
            Some(parent_id) => self.nodes[parent_id.0].children.push(id),
            None => {
                assert!(self.root.is_none(), "kinematic tree already has a root");
                self.root = Some(id);
            }
        }
        self.nodes.push(TreeNode {
            name: name.into(),
            kind,
            transform,
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TreeNode::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(TreeNode::parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_link()).count()
    }

    pub fn joint_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_joint()).count()
    }

    /// First node with the given name, in depth-first order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.depth_first()
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }

    pub fn find_link(&self, name: &str) -> Option<NodeId> {
        self.find(name).filter(|id| self.nodes[id.0].is_link())
    }

    pub fn find_joint(&self, name: &str) -> Option<NodeId> {
        self.find(name).filter(|id| self.nodes[id.0].is_joint())
    }

    /// Pre-order traversal from the root, children in insertion order
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Transform of a node relative to the tree root's parent space
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let mut transform = self.node(id)?.transform;
        let mut current = self.parent(id);
        while let Some(parent_id) = current {
            let parent = &self.nodes[parent_id.0];
            transform = parent.transform.compose(&transform);
            current = parent.parent;
        }
        Some(transform)
    }

    /// Replace the local rotation of a node, keeping its translation
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn link() -> NodeKind {
        NodeKind::Link {
            visuals: Vec::new(),
            collisions: Vec::new(),
        }
    }

    fn joint(index: Option<i32>) -> NodeKind {
        NodeKind::Joint {
            joint_type: "revolute".to_string(),
            index,
        }
    }

    fn sample_tree() -> KinematicTree {
        let mut tree = KinematicTree::new();
        let base = tree.add_node(None, "base", link(), Transform::IDENTITY);
        let j1 = tree.add_node(
            Some(base),
            "j1",
            joint(Some(3)),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        );
        tree.add_node(Some(j1), "arm", link(), Transform::IDENTITY);
        let j2 = tree.add_node(
            Some(base),
            "j2",
            joint(None),
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
        );
        tree.add_node(
            Some(j2),
            "leg",
            link(),
            Transform::from_translation(Vec3::new(0.0, -0.5, 0.0)),
        );
        tree
    }

    #[test]
    fn test_counts_and_root() {
        let tree = sample_tree();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.link_count(), 3);
        assert_eq!(tree.joint_count(), 2);
        assert_eq!(tree.node(tree.root().unwrap()).unwrap().name, "base");
    }

    #[test]
    fn test_depth_first_order() {
        let tree = sample_tree();
        let names: Vec<&str> = tree
            .depth_first()
            .into_iter()
            .map(|id| tree.node(id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["base", "j1", "arm", "j2", "leg"]);
    }

    #[test]
    fn test_find_by_kind() {
        let tree = sample_tree();
        assert!(tree.find_link("arm").is_some());
        assert!(tree.find_joint("arm").is_none());
        let j1 = tree.find_joint("j1").unwrap();
        assert_eq!(tree.node(j1).unwrap().joint_index(), Some(3));
        assert_eq!(tree.node(tree.find("j2").unwrap()).unwrap().joint_index(), None);
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let tree = sample_tree();
        let leg = tree.find_link("leg").unwrap();
        let world = tree.world_transform(leg).unwrap();
        assert!(world.translation.abs_diff_eq(Vec3::new(1.0, -0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_set_local_rotation() {
        let mut tree = sample_tree();
        let j1 = tree.find_joint("j1").unwrap();
        assert!(tree.set_local_rotation(j1, Quat::from_rotation_y(0.5)));
        let node = tree.node(j1).unwrap();
        assert_eq!(node.transform.translation, Vec3::new(0.0, 1.0, 0.0));
        assert!(node.transform.rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
    }

    #[test]
    fn test_empty_tree() {
        let tree = KinematicTree::new();
        assert!(tree.is_empty());
        assert!(tree.depth_first().is_empty());
        assert!(tree.find("anything").is_none());
    }

    #[test]
    #[should_panic(expected = "already has a root")]
    fn test_second_root_panics() {
        let mut tree = KinematicTree::new();
        tree.add_node(None, "a", link(), Transform::IDENTITY);
        tree.add_node(None, "b", link(), Transform::IDENTITY);
    }
}
