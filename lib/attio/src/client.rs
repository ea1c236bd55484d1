//! HTTP client for the Attio REST API.
//!
//! Three calls, all scoped to one configured Person object: query a
//! record by email, create-or-update a record, and list the select
//! options of one attribute. Credentials and object identifiers come
//! from an explicit [`AttioConfig`] handed to the constructor — nothing
//! is read from ambient process state at call time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::AttioError;
use crate::schema::EMAIL_SLUG;

/// Default Attio API base.
pub const ATTIO_API_BASE: &str = "https://api.attio.com/v2";

/// Connection settings for the CRM, built once at startup.
#[derive(Debug, Clone)]
pub struct AttioConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Identifier of the Person object all calls are scoped to.
    pub object_id: String,
}

impl AttioConfig {
    pub fn new(api_key: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            base_url: ATTIO_API_BASE.to_string(),
            api_key: api_key.into(),
            object_id: object_id.into(),
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────

/// One CRM-resident Person record, as returned by the query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRecord {
    pub id: RecordId,
    /// Per-attribute value wrappers, keyed by slug.
    #[serde(default)]
    pub values: HashMap<String, Vec<ValueEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordId {
    pub record_id: String,
}

/// One entry in a record's value list. Scalar attributes carry `value`,
/// select attributes carry `option`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueEntry {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub option: Option<OptionRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionRef {
    pub id: OptionId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionId {
    pub option_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Vec<PersonRecord>,
}

#[derive(Debug, Deserialize)]
struct OptionsResponse {
    #[serde(default)]
    data: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    id: OptionId,
    title: String,
    #[serde(default)]
    is_archived: bool,
}

/// An enumerated choice for a select attribute, archived entries removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub title: String,
}

/// Outcome of a record lookup.
///
/// "No such record" and "the CRM was unreachable" are distinct arms so
/// the boundary layer decides how to render each, instead of both
/// collapsing into an ambiguous null at this layer.
#[derive(Debug)]
pub enum Lookup {
    Found(PersonRecord),
    NotFound,
    TransportError(String),
}

// ── Client ──────────────────────────────────────────────────────────

/// Client for the three Attio calls this system makes.
#[derive(Debug, Clone)]
pub struct AttioClient {
    http: reqwest::Client,
    config: AttioConfig,
}

impl AttioClient {
    pub fn new(config: AttioConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn object_url(&self, suffix: &str) -> String {
        format!(
            "{}/objects/{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.object_id,
            suffix
        )
    }

    /// Look up the Person record for an email address.
    ///
    /// Issues a filtered query with limit 1; at most one record per email
    /// is assumed (enforced upstream, not here). Never returns an error:
    /// failures are logged and reported as [`Lookup::TransportError`].
    pub async fn find_person_by_email(&self, email: &str) -> Lookup {
        let url = self.object_url("/records/query");
        let payload = serde_json::json!({
            "filter": { EMAIL_SLUG: { "contains": email } },
            "limit": 1,
        });

        let resp = match self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("person query failed: {}", e);
                return Lookup::TransportError(e.to_string());
            }
        };

        if !resp.status().is_success() {
            let status = resp.status();
            warn!("person query returned {}", status);
            return Lookup::TransportError(format!("query returned {}", status));
        }

        let body: QueryResponse = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("person query body decode failed: {}", e);
                return Lookup::TransportError(format!("decode: {}", e));
            }
        };

        match body.data.into_iter().next() {
            Some(record) => Lookup::Found(record),
            None => Lookup::NotFound,
        }
    }

    /// Create or update a Person record.
    ///
    /// With a record id this PATCHes the existing record; without one it
    /// POSTs a new record. Writes are last-writer-wins: the CRM offers no
    /// compare-and-swap on record values, so concurrent saves for one
    /// user are not guarded against.
    ///
    /// A success response whose body is not valid JSON is downgraded to
    /// `{}` rather than treated as a failure.
    pub async fn upsert_person(
        &self,
        record_id: Option<&str>,
        values: &serde_json::Map<String, Value>,
    ) -> Result<Value, AttioError> {
        let (builder, payload) = match record_id {
            Some(id) => (
                self.http.patch(self.object_url(&format!("/records/{}", id))),
                serde_json::json!({ "data": { "values": values } }),
            ),
            None => (
                self.http.post(self.object_url("/records")),
                serde_json::json!({
                    "object_id": self.config.object_id,
                    "data": { "values": values },
                }),
            ),
        };

        let resp = builder
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(AttioError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("upsert response was not valid JSON: {}", e);
                Ok(Value::Object(serde_json::Map::new()))
            }
        }
    }

    /// List the select options of one attribute, archived entries
    /// filtered out, in the CRM's order.
    pub async fn list_select_options(
        &self,
        attribute_slug: &str,
    ) -> Result<Vec<SelectOption>, AttioError> {
        let url = self.object_url(&format!("/attributes/{}/options", attribute_slug));

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AttioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: OptionsResponse = resp
            .json()
            .await
            .map_err(|e| AttioError::Decode(format!("options for '{}': {}", attribute_slug, e)))?;

        Ok(body
            .data
            .into_iter()
            .filter(|opt| !opt.is_archived)
            .map(|opt| SelectOption {
                id: opt.id.option_id,
                title: opt.title,
            })
            .collect())
    }
}
