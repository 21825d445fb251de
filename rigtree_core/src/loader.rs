//! Description file to assembled scene

use crate::config::RigConfig;
use crate::description::ParsedDescription;
use crate::error::{RigError, RigResult};
use crate::parser::DescriptionParser;
use crate::registry::JointIndexRegistry;
use crate::resources::{FsMeshResolver, MeshResolver};
use crate::scene::{Scene, SceneAssembler};
use std::path::Path;

/// Loads robot descriptions into scenes.
///
/// Each call parses and builds independently, so one loader can serve any
/// number of descriptions.
pub struct RobotLoader {
    config: RigConfig,
    registry: JointIndexRegistry,
    resolver: Box<dyn MeshResolver>,
}

impl RobotLoader {
    /// Loader with the index table and mesh directory from `config`
    pub fn new(config: RigConfig) -> RigResult<Self> {
        config.validate()?;
        let registry = config.joint_registry()?;
        let resolver = Box::new(FsMeshResolver::new(config.mesh_base_path.clone()));
        Ok(Self {
            config,
            registry,
            resolver,
        })
    }

    pub fn with_registry(mut self, registry: JointIndexRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_resolver(mut self, resolver: impl MeshResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn registry(&self) -> &JointIndexRegistry {
        &self.registry
    }

    pub fn parse_str(&self, text: &str) -> RigResult<ParsedDescription> {
        DescriptionParser::new(&self.registry)
            .with_mesh_rules(self.config.mesh_rules())
            .parse(text)
    }

    pub fn load_str(&self, text: &str) -> RigResult<Scene> {
        let parsed = self.parse_str(text)?;
        SceneAssembler::new(&self.config).assemble(&parsed, self.resolver.as_ref())
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> RigResult<Scene> {
        let path = path.as_ref();
        tracing::debug!("Loading robot description: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| RigError::io(path, e))?;
        self.load_str(&text)
    }
}
