use crate::client::{JSON_CONTENT_TYPE, YAML_CONTENT_TYPE};
use crate::error::{Result, SolumError};
use crate::manager::Manager;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Field names that belong to the client-side model and are never taken
/// from a server payload.
pub const RESERVED_FIELDS: &[&str] = &["human_id", "loaded", "manager"];

// ---------------------------------------------------------------------------
// WireFormat
// ---------------------------------------------------------------------------

/// Body encoding a resource type uses for create and update calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Yaml,
}

impl WireFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            WireFormat::Json => JSON_CONTENT_TYPE,
            WireFormat::Yaml => YAML_CONTENT_TYPE,
        }
    }

    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>> {
        match self {
            WireFormat::Json => Ok(serde_json::to_vec(value)?),
            WireFormat::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
        }
    }

    /// Decode a response body. Failures are reported as
    /// [`SolumError::ResponseParse`] against `resource`.
    pub fn decode(self, resource: &'static str, body: &[u8]) -> Result<Value> {
        let parsed = match self {
            WireFormat::Json => serde_json::from_slice(body).map_err(|e| e.to_string()),
            WireFormat::Yaml => serde_yaml::from_slice(body).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| SolumError::ResponseParse { resource, reason })
    }
}

// ---------------------------------------------------------------------------
// Hydrate / Resource
// ---------------------------------------------------------------------------

/// Typed construction from a decoded payload.
///
/// Known fields land in struct fields, anything else in the type's `extra`
/// map. Keys on the reserved list are dropped before decoding.
pub trait Hydrate: Serialize + DeserializeOwned {
    const KIND: &'static str;

    /// Type-specific names skipped in addition to [`RESERVED_FIELDS`].
    const RESERVED: &'static [&'static str] = &[];

    fn is_reserved(key: &str) -> bool {
        RESERVED_FIELDS.contains(&key) || Self::RESERVED.contains(&key)
    }

    fn from_raw(mut raw: Map<String, Value>) -> Result<Self> {
        raw.retain(|k, _| {
            let keep = !Self::is_reserved(k);
            if !keep {
                debug!(kind = Self::KIND, field = %k, "skipping reserved field");
            }
            keep
        });
        serde_json::from_value(Value::Object(raw)).map_err(|e| SolumError::ResponseParse {
            resource: Self::KIND,
            reason: e.to_string(),
        })
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_raw(map),
            other => Err(SolumError::ResponseParse {
                resource: Self::KIND,
                reason: format!("expected an object, got {}", type_name(&other)),
            }),
        }
    }

    fn to_raw(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Look up one field by its wire name, known or extra.
    fn field(&self, name: &str) -> Option<Value> {
        self.to_raw().remove(name).filter(|v| !v.is_null())
    }
}

/// A top-level API entity addressed by `/v1/{COLLECTION}[/{uuid}]`.
pub trait Resource: Hydrate + Clone + fmt::Debug {
    /// URL segment and list-envelope key, e.g. `plans`.
    const COLLECTION: &'static str;
    /// Single-item envelope key, e.g. `plan`.
    const KEY: &'static str;
    const FORMAT: WireFormat = WireFormat::Json;

    fn uuid(&self) -> Option<&str>;
    fn name(&self) -> Option<&str>;
}

/// Resources the API accepts create, update and delete calls for.
pub trait Writable: Resource {}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `deserialize_with` helper for nested collections (`artifacts`,
/// `services`, `requirements`): each entry goes through
/// [`Hydrate::from_raw`]; `null` becomes an empty list.
pub(crate) fn hydrate_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Hydrate,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .filter(|v| !v.is_null())
        .map(|v| T::from_value(v).map_err(D::Error::custom))
        .collect()
}

// ---------------------------------------------------------------------------
// Lazy
// ---------------------------------------------------------------------------

/// A resource that may only carry summary fields.
///
/// `peek` never touches the network. `ensure_loaded` fetches the full
/// representation by uuid the first time it is called and never again.
pub struct Lazy<'c, R: Resource> {
    manager: Manager<'c, R>,
    value: R,
    loaded: bool,
}

impl<'c, R: Resource> Lazy<'c, R> {
    pub fn new(manager: Manager<'c, R>, value: R, loaded: bool) -> Self {
        Self {
            manager,
            value,
            loaded,
        }
    }

    pub fn peek(&self) -> &R {
        &self.value
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn ensure_loaded(&mut self) -> Result<&R> {
        if !self.loaded {
            let id = self
                .value
                .uuid()
                .ok_or_else(|| SolumError::AttributeNotFound("uuid".to_string()))?
                .to_string();
            self.value = self.manager.get(&id)?;
            self.loaded = true;
        }
        Ok(&self.value)
    }

    /// Load if needed, then read a field by wire name.
    pub fn attribute(&mut self, name: &str) -> Result<Value> {
        self.ensure_loaded()?
            .field(name)
            .ok_or_else(|| SolumError::AttributeNotFound(name.to_string()))
    }

    pub fn into_inner(self) -> R {
        self.value
    }
}

impl<R: Resource> fmt::Debug for Lazy<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("value", &self.value)
            .field("loaded", &self.loaded)
            .finish()
    }
}
