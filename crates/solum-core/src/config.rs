use crate::client::{Authenticator, KeystoneAuth, TokenAuth};
use crate::error::{Result, SolumError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Client settings, usually `~/.config/solum/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solum_url: Option<String>,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Values given on the command line or through the environment. Each one
/// that is set replaces the value from the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub solum_url: Option<String>,
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_name: Option<String>,
    pub token: Option<String>,
}

pub fn default_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".config").join("solum").join("config.yaml"))
}

fn set(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *slot = Some(v);
    }
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&data)
            .map_err(|e| SolumError::Config(format!("{}: {e}", path.display())))
    }

    pub fn merge(mut self, overrides: Overrides) -> Self {
        set(&mut self.solum_url, overrides.solum_url);
        set(&mut self.auth.auth_url, overrides.auth_url);
        set(&mut self.auth.username, overrides.username);
        set(&mut self.auth.password, overrides.password);
        set(&mut self.auth.tenant_name, overrides.tenant_name);
        set(&mut self.auth.token, overrides.token);
        self
    }

    /// Pick the authenticator the settings describe. A token with a
    /// service URL wins over Keystone password credentials.
    pub fn authenticator(&self) -> Result<Box<dyn Authenticator>> {
        let auth = &self.auth;
        if let (Some(token), Some(url)) = (&auth.token, &self.solum_url) {
            return Ok(Box::new(TokenAuth::new(token.clone(), url.clone())));
        }
        if let (Some(auth_url), Some(username), Some(password)) =
            (&auth.auth_url, &auth.username, &auth.password)
        {
            return Ok(Box::new(KeystoneAuth::new(
                auth_url.clone(),
                username.clone(),
                password.clone(),
                auth.tenant_name.clone(),
                self.solum_url.clone(),
            )));
        }
        Err(SolumError::Config(
            "no credentials: set OS_AUTH_TOKEN and SOLUM_URL, or OS_AUTH_URL, \
             OS_USERNAME and OS_PASSWORD"
                .to_string(),
        ))
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let auth = &self.auth;

        if auth.token.is_some() && self.solum_url.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "auth token is set but solum_url is not; the token will be ignored"
                    .to_string(),
            });
        }

        let password_fields = [
            ("auth_url", auth.auth_url.is_some()),
            ("username", auth.username.is_some()),
            ("password", auth.password.is_some()),
        ];
        let given = password_fields.iter().filter(|(_, set)| *set).count();
        if given > 0 && given < password_fields.len() {
            let absent: Vec<&str> = password_fields
                .iter()
                .filter(|(_, set)| !*set)
                .map(|(name, _)| *name)
                .collect();
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("incomplete password credentials, missing {}", absent.join(", ")),
            });
        }

        for (field, value) in [("solum_url", &self.solum_url), ("auth.auth_url", &auth.auth_url)] {
            if let Some(url) = value {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("{field} '{url}' is not an http(s) URL"),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
