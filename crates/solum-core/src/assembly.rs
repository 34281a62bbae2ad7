use crate::resource::{Hydrate, Resource, Writable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A running instantiation of a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_uri: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Hydrate for Assembly {
    const KIND: &'static str = "assembly";
}

impl Resource for Assembly {
    const COLLECTION: &'static str = "assemblies";
    const KEY: &'static str = "assembly";

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Writable for Assembly {}

/// Body of `POST /v1/assemblies`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyCreate {
    pub name: String,
    pub description: Option<String>,
    pub plan_uri: String,
}
