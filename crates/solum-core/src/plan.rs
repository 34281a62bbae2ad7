use crate::resource::{hydrate_list, Hydrate, Resource, WireFormat, Writable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Requirement / ServiceReference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Hydrate for Requirement {
    const KIND: &'static str = "requirement";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Hydrate for ServiceReference {
    const KIND: &'static str = "service reference";
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// Source and runtime settings of one artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unittest_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One buildable unit of a plan.
///
/// Older plan files put `run_cmd`, `unittest_cmd` and `ports` next to
/// `content` rather than inside it, so both placements are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_pack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unittest_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,
    #[serde(default)]
    pub content: ArtifactContent,
    #[serde(
        default,
        deserialize_with = "hydrate_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub requirements: Vec<Requirement>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Hydrate for Artifact {
    const KIND: &'static str = "artifact";
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(
        default,
        deserialize_with = "hydrate_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub artifacts: Vec<Artifact>,
    #[serde(
        default,
        deserialize_with = "hydrate_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub services: Vec<ServiceReference>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Plan {
    /// Deploy keys the service generated for private-repository artifacts,
    /// as `(artifact name, public key)`.
    pub fn public_keys(&self) -> Vec<(String, String)> {
        self.artifacts
            .iter()
            .filter_map(|a| {
                a.content.public_key.as_ref().map(|key| {
                    (
                        a.name.clone().unwrap_or_else(|| "-".to_string()),
                        key.clone(),
                    )
                })
            })
            .collect()
    }
}

impl Hydrate for Plan {
    const KIND: &'static str = "plan";
}

impl Resource for Plan {
    const COLLECTION: &'static str = "plans";
    const KEY: &'static str = "plan";
    const FORMAT: WireFormat = WireFormat::Yaml;

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Writable for Plan {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
