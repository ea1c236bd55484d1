//! Server configuration.
//!
//! Loaded once at startup from a TOML file. The context name resolves to
//! `/etc/memberhub/<name>.toml`; a value containing `/` or `.` is used
//! as a path directly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use memberhub_attio::FieldDescriptor;

/// Top-level server configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, overridable with `--listen`.
    #[serde(default = "default_listen")]
    pub listen: String,

    pub attio: AttioSection,
    pub auth: AuthSection,

    /// The profile field schema, in display order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// CRM connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AttioSection {
    /// API base URL.
    #[serde(default = "default_attio_base")]
    pub base_url: String,

    /// Bearer credential. Falls back to `ATTIO_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,

    /// Identifier of the Person object.
    pub object_id: String,
}

/// Auth-provider settings.
///
/// The provider owns the OTP email flow and session issuance; this
/// server only validates the session JWTs it mints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    /// Provider base URL, handed to the login page.
    pub url: String,

    /// Public (anonymous) API key, handed to the login page.
    #[serde(default)]
    pub anon_key: String,

    /// Shared secret the provider signs session JWTs with (HS256).
    pub jwt_secret: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_attio_base() -> String {
    memberhub_attio::ATTIO_API_BASE.to_string()
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/memberhub/{}.toml", name_or_path))
        }
    }

    /// Load and parse the config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let mut config: ServerConfig = toml::from_str(&content)?;

        if config.attio.api_key.is_empty() {
            if let Ok(key) = std::env::var("ATTIO_API_KEY") {
                config.attio.api_key = key;
            }
        }

        Ok(config)
    }

    /// Verify the configuration is complete enough to start.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.attio.api_key.is_empty() {
            anyhow::bail!(
                "no Attio API key: set [attio].api_key or the ATTIO_API_KEY environment variable"
            );
        }
        if self.attio.object_id.is_empty() {
            anyhow::bail!("[attio].object_id is empty");
        }
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("[auth].jwt_secret is empty");
        }
        if self.fields.is_empty() {
            anyhow::bail!("no [[fields]] configured — the profile form would be empty");
        }
        Ok(())
    }
}
