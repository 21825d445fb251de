//! # RigTree Core
//!
//! Turns a URDF-style robot description into a tree of link and joint nodes
//! ready for a rendering or physics engine.
//!
//! - **Geometry**: conversion from the description's Z-up convention to the
//!   engine's Y-up convention
//! - **Parser**: tolerant XML parsing into link, joint and material tables
//! - **Registry**: joint name canonicalization and actuation indices
//! - **Builder**: depth-first tree construction and the revolute joint registry
//! - **Scene**: anchor node, body collision and spawn placement
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rigtree_core::{RigConfig, RobotLoader};
//!
//! let loader = RobotLoader::new(RigConfig::default())?;
//! let mut scene = loader.load_file("robots/g1_29dof.urdf")?;
//!
//! for diagnostic in &scene.diagnostics {
//!     println!("{}", diagnostic);
//! }
//!
//! // Bend the left knee by 0.5 rad
//! scene.set_joint_angle(3, 0.5);
//! ```

pub mod builder;
pub mod config;
pub mod description;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod parser;
pub mod registry;
pub mod resources;
pub mod scene;
pub mod tree;

pub use builder::{BuildOutput, KinematicTreeBuilder, RevoluteJoint, RevoluteJoints};
pub use config::{BodyCollisionConfig, RigConfig, SpawnConfig};
pub use description::{
    Collision, CollisionGeometry, Joint, Link, Material, ParsedDescription, Rgba, Visual,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{RigError, RigResult};
pub use geometry::{convert_axis, convert_position, convert_rotation, Pose, Transform};
pub use loader::RobotLoader;
pub use parser::{DescriptionParser, MeshPathRules};
pub use registry::{canonicalize, JointIndexRegistry, UNMAPPED_JOINT_INDEX};
pub use resources::{FsMeshResolver, MeshHandle, MeshResolver, PathOnlyResolver};
pub use scene::{Scene, SceneAssembler};
pub use tree::{
    CollisionPrimitive, CollisionShape, KinematicTree, NodeId, NodeKind, TreeNode,
    VisualPrimitive,
};
