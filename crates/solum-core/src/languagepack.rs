use crate::error::{Result, SolumError};
use crate::manager::{is_uuid_like, Manager};
use crate::resource::{Hydrate, Resource, Writable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Status of a language pack that can be used to build artifacts.
pub const READY: &str = "READY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguagePack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_pack_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_versions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_platform: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LanguagePack {
    pub fn is_ready(&self) -> bool {
        self.status.as_deref() == Some(READY)
    }

    /// Whether `choice` is this pack's name or uuid.
    pub fn answers_to(&self, choice: &str) -> bool {
        self.name.as_deref() == Some(choice) || self.uuid.as_deref() == Some(choice)
    }
}

impl Hydrate for LanguagePack {
    const KIND: &'static str = "languagepack";
}

impl Resource for LanguagePack {
    const COLLECTION: &'static str = "languagepacks";
    const KEY: &'static str = "languagepack";

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Writable for LanguagePack {}

/// Lookup the plan builder resolves `language_pack` against.
pub trait LanguagePackRegistry {
    /// Every registered pack matching `name_or_id`; `NotFound` when none do.
    fn candidates(&self, name_or_id: &str) -> Result<Vec<LanguagePack>>;

    /// Every registered pack.
    fn all(&self) -> Result<Vec<LanguagePack>>;
}

impl LanguagePackRegistry for Manager<'_, LanguagePack> {
    fn candidates(&self, name_or_id: &str) -> Result<Vec<LanguagePack>> {
        if is_uuid_like(name_or_id) {
            return match self.get(name_or_id) {
                Ok(lp) => Ok(vec![lp]),
                Err(e) if e.is_not_found() => Err(not_found(name_or_id)),
                Err(e) => Err(e),
            };
        }
        let found: Vec<LanguagePack> = self
            .find_all(name_or_id)?
            .into_iter()
            .map(|lp| lp.into_inner())
            .collect();
        if found.is_empty() {
            return Err(not_found(name_or_id));
        }
        Ok(found)
    }

    fn all(&self) -> Result<Vec<LanguagePack>> {
        Ok(self.list(&[])?.into_iter().map(|lp| lp.into_inner()).collect())
    }
}

fn not_found(name_or_id: &str) -> SolumError {
    SolumError::NotFound {
        kind: LanguagePack::KIND,
        name: name_or_id.to_string(),
    }
}
