use crate::resource::{Hydrate, Resource, Writable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A build/deploy workflow bound to a plan and a workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
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
    pub workbook_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_uri: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Hydrate for Pipeline {
    const KIND: &'static str = "pipeline";
}

impl Resource for Pipeline {
    const COLLECTION: &'static str = "pipelines";
    const KEY: &'static str = "pipeline";

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Writable for Pipeline {}

/// Body of `POST /v1/pipelines`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineCreate {
    pub name: String,
    pub workbook_name: String,
    pub plan_uri: String,
}
