//! Scene assembly
//!
//! Roots the link tree under a named anchor node, gives the anchor a coarse
//! whole-body collision capsule, and places everything at the spawn pose.

use crate::builder::{KinematicTreeBuilder, RevoluteJoints};
use crate::config::RigConfig;
use crate::description::ParsedDescription;
use crate::diagnostics::Diagnostics;
use crate::error::RigResult;
use crate::geometry::Transform;
use crate::resources::MeshResolver;
use crate::tree::{CollisionPrimitive, CollisionShape, KinematicTree, NodeId, NodeKind};
use glam::Vec3;

/// Name of the anchor's whole-body collision shape
pub const BODY_COLLISION_NAME: &str = "BodyCollision";

/// A fully assembled robot
#[derive(Debug, Clone)]
pub struct Scene {
    pub robot_name: Option<String>,
    pub tree: KinematicTree,
    pub anchor: NodeId,
    /// World placement of the anchor
    pub spawn: Transform,
    pub revolute_joints: RevoluteJoints,
    /// Parse diagnostics followed by build diagnostics
    pub diagnostics: Diagnostics,
}

impl Scene {
    /// The link node directly under the anchor, if the root link was found
    pub fn root_link(&self) -> Option<NodeId> {
        self.tree.children(self.anchor).iter().copied().find(|id| {
            self.tree
                .node(*id)
                .map(|node| node.is_link())
                .unwrap_or(false)
        })
    }

    /// World-space transform of a node, including the spawn pose
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        self.tree
            .world_transform(id)
            .map(|local| self.spawn.compose(&local))
    }

    /// Rotate an actuated joint relative to its rest pose
    pub fn set_joint_angle(&mut self, index: i32, angle: f32) -> bool {
        self.revolute_joints.apply_angle(&mut self.tree, index, angle)
    }
}

/// Assembles scenes according to a [`RigConfig`]
pub struct SceneAssembler<'c> {
    config: &'c RigConfig,
}

impl<'c> SceneAssembler<'c> {
    pub fn new(config: &'c RigConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        parsed: &ParsedDescription,
        resolver: &dyn MeshResolver,
    ) -> RigResult<Scene> {
        let mut tree = KinematicTree::new();
        let anchor = tree.add_node(
            None,
            self.config.anchor_name.as_str(),
            NodeKind::Anchor {
                collisions: self.body_collision().into_iter().collect(),
            },
            Transform::IDENTITY,
        );

        let builder = KinematicTreeBuilder::new(parsed, resolver);
        let (revolute_joints, build_diagnostics) =
            builder.build_under(&mut tree, Some(anchor), &self.config.root_link)?;

        let mut diagnostics = parsed.diagnostics.clone();
        diagnostics.merge(build_diagnostics);

        let spawn = Transform::new(self.config.spawn.position(), self.config.spawn.rotation());

        tracing::info!(
            "Assembled '{}': {} links, {} joints, {} actuated, {} diagnostics",
            parsed.robot_name.as_deref().unwrap_or("robot"),
            tree.link_count(),
            tree.joint_count(),
            revolute_joints.mapped().count(),
            diagnostics.len()
        );

        Ok(Scene {
            robot_name: parsed.robot_name.clone(),
            tree,
            anchor,
            spawn,
            revolute_joints,
            diagnostics,
        })
    }

    fn body_collision(&self) -> Option<CollisionPrimitive> {
        let capsule = &self.config.body_collision;
        capsule.enabled.then(|| CollisionPrimitive {
            name: BODY_COLLISION_NAME.to_string(),
            shape: CollisionShape::Capsule {
                radius: capsule.radius,
                height: capsule.height,
            },
            transform: Transform::from_translation(Vec3::from_array(capsule.offset)),
        })
    }
}
