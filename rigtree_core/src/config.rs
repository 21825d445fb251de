//! Loader configuration
//!
//! All settings have defaults matching a 29-DoF humanoid layout, so an empty
//! TOML file (or no file at all) is a valid configuration.
//!
//! ```toml
//! root_link = "pelvis"
//! mesh_base_path = "robots/meshes"
//!
//! [spawn]
//! position = [0.0, 0.78, 1.0]
//! yaw_degrees = 0.0
//!
//! [body_collision]
//! height = 1.4
//! radius = 0.25
//!
//! [joint_indices]
//! LeftHipPitch = 0
//! ```

use crate::error::{RigError, RigResult};
use crate::parser::MeshPathRules;
use crate::registry::JointIndexRegistry;
use glam::{Quat, Vec3};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where the assembled scene is placed in the world
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub position: [f32; 3],
    /// Rotation about the engine's vertical axis
    pub yaw_degrees: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.78, 1.0],
            yaw_degrees: 0.0,
        }
    }
}

impl SpawnConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw_degrees.to_radians())
    }
}

/// Coarse capsule around the torso, attached to the scene anchor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BodyCollisionConfig {
    pub enabled: bool,
    pub height: f32,
    pub radius: f32,
    pub offset: [f32; 3],
}

impl Default for BodyCollisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 1.4,
            radius: 0.25,
            offset: [0.0, 0.7, 0.0],
        }
    }
}

/// Full loader configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub root_link: String,
    pub anchor_name: String,
    pub mesh_base_path: PathBuf,
    pub mesh_dir_prefix: String,
    pub mesh_source_extension: String,
    pub mesh_target_extension: String,
    pub spawn: SpawnConfig,
    pub body_collision: BodyCollisionConfig,
    /// Canonical joint name to actuation index; built-in table when absent
    pub joint_indices: Option<BTreeMap<String, i64>>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            root_link: "pelvis".to_string(),
            anchor_name: "RobotRoot".to_string(),
            mesh_base_path: PathBuf::from("robots/meshes"),
            mesh_dir_prefix: "meshes/".to_string(),
            mesh_source_extension: ".STL".to_string(),
            mesh_target_extension: ".glb".to_string(),
            spawn: SpawnConfig::default(),
            body_collision: BodyCollisionConfig::default(),
            joint_indices: None,
        }
    }
}

impl RigConfig {
    pub fn from_toml_str(text: &str) -> RigResult<Self> {
        let config: RigConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> RigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RigError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> RigResult<()> {
        if self.root_link.trim().is_empty() {
            return Err(RigError::Config("root_link must not be empty".to_string()));
        }
        if self.anchor_name.trim().is_empty() {
            return Err(RigError::Config("anchor_name must not be empty".to_string()));
        }
        let capsule = &self.body_collision;
        if capsule.enabled && (capsule.height < 0.0 || capsule.radius < 0.0) {
            return Err(RigError::Config(
                "body_collision height and radius must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn mesh_rules(&self) -> MeshPathRules {
        MeshPathRules {
            dir_prefix: self.mesh_dir_prefix.clone(),
            source_extension: self.mesh_source_extension.clone(),
            target_extension: self.mesh_target_extension.clone(),
        }
    }

    /// Index registry from `joint_indices`, or the built-in humanoid table
    pub fn joint_registry(&self) -> RigResult<JointIndexRegistry> {
        match &self.joint_indices {
            Some(table) => JointIndexRegistry::from_pairs(
                table.iter().map(|(name, index)| (name.clone(), *index)),
            ),
            None => Ok(JointIndexRegistry::humanoid()),
        }
    }
}
