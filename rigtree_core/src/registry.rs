//! Joint name canonicalization and actuation index lookup
//!
//! Raw joint names such as `left_hip_pitch_joint` are reduced to a canonical
//! form (`LeftHipPitch`) and looked up in an immutable table of actuation
//! indices. The table is plain configuration: it can come from the built-in
//! humanoid layout, a TOML file, or any list of pairs.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{RigError, RigResult};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Index assigned to joints with no entry in the registry
pub const UNMAPPED_JOINT_INDEX: i32 = -1;

/// Suffix stripped from raw joint names before canonicalization
pub const JOINT_NAME_SUFFIX: &str = "_joint";

/// Segment delimiter in raw joint names
pub const JOINT_NAME_DELIMITER: char = '_';

/// Actuation layout of a 29-DoF humanoid with two three-finger hands
const HUMANOID_JOINT_INDICES: [(&str, i32); 44] = [
    // Left leg
    ("LeftHipPitch", 0),
    ("LeftHipRoll", 1),
    ("LeftHipYaw", 2),
    ("LeftKnee", 3),
    ("LeftAnklePitch", 4),
    ("LeftAnkleRoll", 5),
    // Right leg
    ("RightHipPitch", 6),
    ("RightHipRoll", 7),
    ("RightHipYaw", 8),
    ("RightKnee", 9),
    ("RightAnklePitch", 10),
    ("RightAnkleRoll", 11),
    // Waist
    ("WaistYaw", 12),
    ("WaistRoll", 13),
    ("WaistPitch", 14),
    // Left arm
    ("LeftShoulderPitch", 15),
    ("LeftShoulderRoll", 16),
    ("LeftShoulderYaw", 17),
    ("LeftElbow", 18),
    ("LeftWristRoll", 19),
    ("LeftWristPitch", 20),
    ("LeftWristYaw", 21),
    // Right arm
    ("RightShoulderPitch", 22),
    ("RightShoulderRoll", 23),
    ("RightShoulderYaw", 24),
    ("RightElbow", 25),
    ("RightWristRoll", 26),
    ("RightWristPitch", 27),
    ("RightWristYaw", 28),
    // Reserved slot, carries the weight channel on the controller side
    ("KNotUsedJoint", 29),
    // Left hand
    ("LeftHandThumb0", 30),
    ("LeftHandThumb1", 31),
    ("LeftHandThumb2", 32),
    ("LeftHandMiddle0", 33),
    ("LeftHandMiddle1", 34),
    ("LeftHandIndex0", 35),
    ("LeftHandIndex1", 36),
    // Right hand
    ("RightHandThumb0", 37),
    ("RightHandThumb1", 38),
    ("RightHandThumb2", 39),
    ("RightHandMiddle0", 40),
    ("RightHandMiddle1", 41),
    ("RightHandIndex0", 42),
    ("RightHandIndex1", 43),
];

/// Reduce a raw joint name to its canonical form.
///
/// A trailing `_joint` is stripped, the rest is split on `_`, and each
/// non-empty segment is title-cased before the segments are concatenated.
/// Segments that already mix upper and lower case letters past their first
/// character (`HipPitch`) keep their inner capitals, which makes the function
/// idempotent on its own output.
pub fn canonicalize(raw_name: &str) -> String {
    let stem = raw_name.strip_suffix(JOINT_NAME_SUFFIX).unwrap_or(raw_name);

    stem.split(JOINT_NAME_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(title_case_segment)
        .collect()
}

fn title_case_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str();

    let camel_case =
        rest.chars().any(char::is_lowercase) && rest.chars().any(char::is_uppercase);

    let mut out: String = first.to_uppercase().collect();
    if camel_case {
        out.push_str(rest);
    } else {
        out.push_str(&rest.to_lowercase());
    }
    out
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    joints: HashMap<String, i64>,
}

/// Immutable canonical-name to actuation-index table
#[derive(Debug, Clone, PartialEq)]
pub struct JointIndexRegistry {
    indices: HashMap<String, i32>,
}

impl Default for JointIndexRegistry {
    fn default() -> Self {
        Self::humanoid()
    }
}

impl JointIndexRegistry {
    /// Built-in 44-entry humanoid table
    pub fn humanoid() -> Self {
        Self {
            indices: HUMANOID_JOINT_INDICES
                .iter()
                .map(|(name, index)| (name.to_string(), *index))
                .collect(),
        }
    }

    /// Registry with no entries; every joint resolves to the sentinel
    pub fn empty() -> Self {
        Self {
            indices: HashMap::new(),
        }
    }

    /// Build from canonical-name/index pairs.
    ///
    /// Indices must be non-negative and unique.
    pub fn from_pairs<I, S>(pairs: I) -> RigResult<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut indices = HashMap::new();
        let mut seen = HashSet::new();

        for (name, index) in pairs {
            let name = name.into();
            let index = i32::try_from(index)
                .ok()
                .filter(|i| *i >= 0)
                .ok_or_else(|| {
                    RigError::Config(format!("joint '{}' has invalid index {}", name, index))
                })?;

            if !seen.insert(index) {
                return Err(RigError::Config(format!(
                    "index {} is assigned to more than one joint (last: '{}')",
                    index, name
                )));
            }
            if indices.insert(name.clone(), index).is_some() {
                return Err(RigError::Config(format!("joint '{}' is listed twice", name)));
            }
        }

        Ok(Self { indices })
    }

    /// Parse a TOML document with a `[joints]` table
    pub fn from_toml_str(text: &str) -> RigResult<Self> {
        let file: RegistryFile = toml::from_str(text)?;
        Self::from_pairs(file.joints)
    }

    pub fn from_file(path: impl AsRef<Path>) -> RigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RigError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Exact lookup of a canonical name
    pub fn lookup(&self, canonical_name: &str) -> Option<i32> {
        self.indices.get(canonical_name).copied()
    }

    /// Look up a canonical name, recording a diagnostic and returning
    /// [`UNMAPPED_JOINT_INDEX`] when it has no entry
    pub fn resolve(&self, canonical_name: &str, diagnostics: &mut Diagnostics) -> i32 {
        self.lookup(canonical_name).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::UnmappedJoint {
                joint: canonical_name.to_string(),
                canonical: canonical_name.to_string(),
            });
            UNMAPPED_JOINT_INDEX
        })
    }

    /// Canonicalize a raw joint name and resolve it
    pub fn index_for_joint(&self, raw_name: &str, diagnostics: &mut Diagnostics) -> i32 {
        let canonical = canonicalize(raw_name);
        self.lookup(&canonical).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::UnmappedJoint {
                joint: raw_name.to_string(),
                canonical,
            });
            UNMAPPED_JOINT_INDEX
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Entries sorted by index
    pub fn entries(&self) -> Vec<(&str, i32)> {
        let mut entries: Vec<(&str, i32)> = self
            .indices
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
            .collect();
        entries.sort_by_key(|(_, index)| *index);
        entries
    }
}
