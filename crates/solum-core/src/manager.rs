//! Generic CRUD over one resource collection.

use crate::client::{HttpClient, Method, Request};
use crate::error::{Result, SolumError};
use crate::resource::{Hydrate, Lazy, Resource, WireFormat, Writable};
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

/// Every collection lives under this path; the API has a single version.
pub const BASE_PATH: &str = "/v1";

/// Whether `s` parses as a UUID (hyphenated, simple, braced or URN form).
pub fn is_uuid_like(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok()
}

pub struct Manager<'c, R> {
    http: &'c dyn HttpClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Manager<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Manager<'_, R> {}

impl<'c, R: Resource> Manager<'c, R> {
    pub fn new(http: &'c dyn HttpClient) -> Self {
        Self {
            http,
            _resource: PhantomData,
        }
    }

    pub fn collection_path(&self) -> String {
        format!("{BASE_PATH}/{}", R::COLLECTION)
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{id}", self.collection_path())
    }

    fn send(&self, request: Request) -> Result<Vec<u8>> {
        let resp = self.http.send(request)?.error_for_status()?;
        Ok(resp.body)
    }

    /// `GET /v1/{collection}` with `filters` as query parameters.
    ///
    /// Entries come back unloaded: the list view may omit detail fields.
    pub fn list(&self, filters: &[(&str, &str)]) -> Result<Vec<Lazy<'c, R>>> {
        let query = filters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let request = Request::new(Method::Get, self.collection_path()).with_query(query);
        let body = self.send(request)?;
        let decoded = WireFormat::Json.decode(R::KIND, &body)?;

        let items = match decoded {
            Value::Array(items) => items,
            Value::Object(mut envelope) => match envelope.remove(R::COLLECTION) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(SolumError::ResponseParse {
                        resource: R::KIND,
                        reason: format!("missing '{}' list in response", R::COLLECTION),
                    })
                }
            },
            Value::Null => Vec::new(),
            _ => {
                return Err(SolumError::ResponseParse {
                    resource: R::KIND,
                    reason: "expected a list".to_string(),
                })
            }
        };
        debug!(kind = R::KIND, count = items.len(), "listed");

        items
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| R::from_value(v).map(|r| Lazy::new(*self, r, false)))
            .collect()
    }

    /// `GET /v1/{collection}/{id}`, fully hydrated.
    pub fn get(&self, id: &str) -> Result<R> {
        let body = self.send(Request::new(Method::Get, self.item_path(id)))?;
        let decoded = WireFormat::Json.decode(R::KIND, &body)?;
        R::from_value(unwrap_envelope::<R>(decoded))
    }

    /// Every entry whose name is exactly `name`, from one filtered list call.
    pub fn find_all(&self, name: &str) -> Result<Vec<Lazy<'c, R>>> {
        let found = self.list(&[("name", name)])?;
        Ok(found
            .into_iter()
            .filter(|r| r.peek().name() == Some(name))
            .collect())
    }

    /// Resolve a uuid or a unique name.
    ///
    /// UUID-shaped input is fetched directly. Anything else must name
    /// exactly one entry; zero is `NotFound`, more is `MultipleFound`.
    pub fn find(&self, name_or_id: &str) -> Result<R> {
        if is_uuid_like(name_or_id) {
            return self.get(name_or_id);
        }
        let mut found = self.find_all(name_or_id)?;
        match found.len() {
            0 => Err(SolumError::NotFound {
                kind: R::KIND,
                name: name_or_id.to_string(),
            }),
            1 => Ok(found.remove(0).into_inner()),
            count => Err(SolumError::MultipleFound {
                kind: R::KIND,
                name: name_or_id.to_string(),
                count,
            }),
        }
    }
}

impl<'c, R: Writable> Manager<'c, R> {
    /// `POST /v1/{collection}` with the body encoded in the resource's
    /// wire format. An empty reply is answered with the submitted payload.
    pub fn create<B: Serialize + ?Sized>(&self, payload: &B) -> Result<R> {
        let request = Request::new(Method::Post, self.collection_path())
            .with_body(R::FORMAT.content_type(), R::FORMAT.encode(payload)?);
        let body = self.send(request)?;
        self.decode_written(&body, payload)
    }

    /// `PUT /v1/{collection}/{id}`.
    pub fn update<B: Serialize + ?Sized>(&self, id: &str, patch: &B) -> Result<R> {
        let request = Request::new(Method::Put, self.item_path(id))
            .with_body(R::FORMAT.content_type(), R::FORMAT.encode(patch)?);
        let body = self.send(request)?;
        self.decode_written(&body, patch)
    }

    /// `DELETE /v1/{collection}/{id}`; any 2xx counts as success.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.send(Request::new(Method::Delete, self.item_path(id)))?;
        Ok(())
    }

    fn decode_written<B: Serialize + ?Sized>(&self, body: &[u8], sent: &B) -> Result<R> {
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!(kind = R::KIND, "empty reply, using submitted payload");
            return R::from_value(serde_json::to_value(sent)?);
        }
        let decoded = R::FORMAT.decode(R::KIND, body)?;
        R::from_value(unwrap_envelope::<R>(decoded))
    }
}

/// Strip a `{"<key>": {...}}` single-item envelope if present.
fn unwrap_envelope<R: Resource>(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.get(R::KEY).is_some_and(Value::is_object) => {
            map.remove(R::KEY).unwrap_or_default()
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
