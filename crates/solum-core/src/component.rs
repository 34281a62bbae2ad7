use crate::resource::{Hydrate, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A sub-unit exposed by an assembly. Read-only through this API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly_uuid: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Hydrate for Component {
    const KIND: &'static str = "component";
}

impl Resource for Component {
    const COLLECTION: &'static str = "components";
    const KEY: &'static str = "component";

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
