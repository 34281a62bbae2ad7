//! Building a plan request document from command-line flags, an existing
//! plan file, and user answers.
//!
//! Every field is resolved from the flags first, then the plan file (and
//! its first artifact). The fields the service cannot work without (git
//! URL, run command, language pack) resolve to [`Resolved::Missing`] when
//! neither source has them; the caller asks the user and hands the answer
//! back through the `supply_*` methods before calling
//! [`PlanDefinition::dump`].

use crate::error::{Result, SolumError};
use crate::languagepack::{LanguagePack, LanguagePackRegistry};
use crate::plan::{Artifact, Plan};
use crate::resource::Hydrate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

pub const PLAN_VERSION: u32 = 1;
pub const DEFAULT_ARTIFACT_TYPE: &str = "heroku";
pub const DEFAULT_PORT: u16 = 80;
/// Language pack value that asks the service to detect one.
pub const AUTO_LANGUAGE_PACK: &str = "auto";

pub const NAME_ERROR: &str =
    "Application name must be 1-100 characters and must only contain a-z,A-Z,0-9,-,_";

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();
static LPNAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{1,100}$").unwrap())
}

fn lpname_re() -> &'static Regex {
    LPNAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9_-]{1,100}$").unwrap())
}

pub fn name_is_valid(s: &str) -> bool {
    name_re().is_match(s)
}

/// Language pack names are restricted to lowercase.
pub fn lpname_is_valid(s: &str) -> bool {
    lpname_re().is_match(s)
}

fn validate_name(s: &str) -> Result<()> {
    if name_is_valid(s) {
        Ok(())
    } else {
        Err(SolumError::Validation(NAME_ERROR.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Flags given on the command line. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct PlanArgs {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub git_url: Option<String>,
    pub private: bool,
    pub lp: Option<String>,
    pub param_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub run_cmd: Option<String>,
    pub access_token: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Read a plan file (YAML or JSON) into a [`Plan`].
pub fn load_plan_file(path: &Path) -> Result<Plan> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        SolumError::Command(format!("Could not open plan file {}: {e}", path.display()))
    })?;
    let value: Value = serde_yaml::from_str(&data).map_err(|e| {
        SolumError::Command(format!("Plan file {} was not YAML: {e}", path.display()))
    })?;
    if value.is_null() {
        return Ok(Plan::default());
    }
    Plan::from_value(value).map_err(|e| {
        SolumError::Command(format!("Plan file {} is not a valid plan: {e}", path.display()))
    })
}

// ---------------------------------------------------------------------------
// Resolution results
// ---------------------------------------------------------------------------

/// A field that needs an answer from the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Missing {
    GitUrl,
    RunCmd,
    /// `requested` is the ambiguous value from the plan, or `None` when the
    /// plan named no language pack. `candidates` are READY packs only.
    LanguagePack {
        requested: Option<String>,
        candidates: Vec<LanguagePack>,
    },
}

impl Missing {
    pub fn prompt(&self) -> &'static str {
        match self {
            Missing::GitUrl => "Please specify a git repository URL for your application.",
            Missing::RunCmd => "Please specify start/run command for your application.",
            Missing::LanguagePack { .. } => "Please choose a languagepack from the above list.",
        }
    }

    /// Whether `answer` is acceptable. Language packs must be picked by
    /// one of the listed names or uuids.
    pub fn accepts(&self, answer: &str) -> bool {
        match self {
            Missing::GitUrl | Missing::RunCmd => true,
            Missing::LanguagePack { candidates, .. } => {
                candidates.iter().any(|lp| lp.answers_to(answer))
            }
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Missing::GitUrl => "git_url",
            Missing::RunCmd => "run_cmd",
            Missing::LanguagePack { .. } => "language_pack",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Value(T),
    Missing(Missing),
}

impl<T> Resolved<T> {
    fn require(self) -> Result<T> {
        match self {
            Resolved::Value(v) => Ok(v),
            Resolved::Missing(m) => Err(SolumError::Command(format!(
                "{} is required but was not provided",
                m.field()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Output document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub version: u32,
    pub name: String,
    pub description: String,
    pub parameters: Option<Value>,
    pub artifacts: Vec<ArtifactDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub artifact_type: String,
    pub language_pack: String,
    pub name: Option<String>,
    pub repo_token: Option<String>,
    pub content: ContentDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub href: String,
    pub run_cmd: String,
    pub unittest_cmd: Option<String>,
    pub ports: Vec<u16>,
    pub public_key: Option<String>,
    pub private: bool,
}

// ---------------------------------------------------------------------------
// PlanDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Answers {
    git_url: Option<String>,
    run_cmd: Option<String>,
    language_pack: Option<String>,
}

pub struct PlanDefinition<'r> {
    registry: &'r dyn LanguagePackRegistry,
    plan: Plan,
    artifact: Artifact,
    args: PlanArgs,
    answers: Answers,
    repo_token: OnceCell<Option<String>>,
    language_pack: OnceCell<Resolved<String>>,
}

impl<'r> PlanDefinition<'r> {
    /// Only the first artifact of `plan` is used.
    pub fn new(registry: &'r dyn LanguagePackRegistry, plan: Plan, args: PlanArgs) -> Self {
        if plan.artifacts.len() > 1 {
            warn!(
                count = plan.artifacts.len(),
                "plan defines several artifacts; only the first is used"
            );
        }
        let artifact = plan.artifacts.first().cloned().unwrap_or_default();
        Self {
            registry,
            plan,
            artifact,
            args,
            answers: Answers::default(),
            repo_token: OnceCell::new(),
            language_pack: OnceCell::new(),
        }
    }

    pub fn name(&self) -> Result<String> {
        if let Some(name) = present(&self.args.name) {
            validate_name(name)?;
            return Ok(name.to_string());
        }
        if let Some(name) = present(&self.plan.name) {
            validate_name(name)?;
            return Ok(name.to_string());
        }
        Ok(String::new())
    }

    pub fn artifact_name(&self) -> Result<Option<String>> {
        match present(&self.args.name) {
            Some(name) => {
                validate_name(name)?;
                Ok(Some(name.to_string()))
            }
            None => Ok(None),
        }
    }

    pub fn artifact_type(&self) -> String {
        present(&self.artifact.artifact_type)
            .unwrap_or(DEFAULT_ARTIFACT_TYPE)
            .to_string()
    }

    pub fn description(&self) -> String {
        present(&self.args.desc)
            .or(self.plan.description.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn git_url(&self) -> Resolved<String> {
        present(&self.args.git_url)
            .or(present(&self.artifact.content.href))
            .or(self.answers.git_url.as_deref())
            .map(|s| Resolved::Value(s.to_string()))
            .unwrap_or(Resolved::Missing(Missing::GitUrl))
    }

    pub fn is_private(&self) -> bool {
        self.args.private || self.artifact.content.private.unwrap_or(false)
    }

    pub fn language_pack(&self) -> Result<Resolved<String>> {
        if let Some(answer) = self.answers.language_pack.as_deref() {
            return Ok(Resolved::Value(answer.to_string()));
        }
        if let Some(resolved) = self.language_pack.get() {
            return Ok(resolved.clone());
        }
        let resolved = self.resolve_language_pack()?;
        Ok(self.language_pack.get_or_init(|| resolved).clone())
    }

    fn resolve_language_pack(&self) -> Result<Resolved<String>> {
        if let Some(lp) = present(&self.args.lp) {
            return Ok(Resolved::Value(lp.to_string()));
        }
        let Some(requested) = present(&self.artifact.language_pack) else {
            let ready: Vec<LanguagePack> = self
                .registry
                .all()?
                .into_iter()
                .filter(LanguagePack::is_ready)
                .collect();
            if ready.is_empty() {
                return Err(SolumError::Command(
                    "No languagepacks are READY; register one first".to_string(),
                ));
            }
            return Ok(Resolved::Missing(Missing::LanguagePack {
                requested: None,
                candidates: ready,
            }));
        };

        if requested == AUTO_LANGUAGE_PACK {
            return Ok(Resolved::Value(requested.to_string()));
        }

        let candidates = match self.registry.candidates(requested) {
            Ok(found) => found,
            Err(e) if e.is_not_found() => {
                return Err(SolumError::Command(format!(
                    "Languagepack {requested} not registered"
                )))
            }
            Err(e) => return Err(e),
        };
        let ready: Vec<LanguagePack> = candidates.into_iter().filter(LanguagePack::is_ready).collect();
        match ready.len() {
            0 => Err(SolumError::Command(format!(
                "Languagepack {requested} not READY"
            ))),
            1 => Ok(Resolved::Value(requested.to_string())),
            _ => Ok(Resolved::Missing(Missing::LanguagePack {
                requested: Some(requested.to_string()),
                candidates: ready,
            })),
        }
    }

    pub fn parameters(&self) -> Result<Option<Value>> {
        let Some(ref path) = self.args.param_file else {
            return Ok(None);
        };
        let data = std::fs::read_to_string(path).map_err(|_| {
            SolumError::Command(format!("Could not open param file {}.", path.display()))
        })?;
        let params: Value = serde_yaml::from_str(&data).map_err(|_| {
            SolumError::Command(format!("Param file {} was not YAML.", path.display()))
        })?;
        Ok(Some(params))
    }

    pub fn ports(&self) -> Vec<u16> {
        if let Some(port) = self.args.port {
            return vec![port];
        }
        self.file_ports()
            .map(<[u16]>::to_vec)
            .unwrap_or_else(|| vec![DEFAULT_PORT])
    }

    fn file_ports(&self) -> Option<&[u16]> {
        self.artifact
            .ports
            .as_deref()
            .filter(|p| !p.is_empty())
            .or(self.artifact.content.ports.as_deref().filter(|p| !p.is_empty()))
    }

    pub fn ports_defaulted(&self) -> bool {
        self.args.port.is_none() && self.file_ports().is_none()
    }

    /// Informational messages for the user about defaults that were applied.
    pub fn notices(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if self.ports_defaulted() {
            notices.push("No application port specified in plan file.".to_string());
            notices.push(format!("Defaulting to port {DEFAULT_PORT}."));
        }
        notices
    }

    pub fn public_key(&self) -> Option<String> {
        self.artifact.content.public_key.clone()
    }

    pub fn repo_token(&self) -> Option<String> {
        self.repo_token
            .get_or_init(|| {
                present(&self.args.access_token)
                    .or(present(&self.artifact.repo_token))
                    .map(str::to_string)
            })
            .clone()
    }

    pub fn run_cmd(&self) -> Resolved<String> {
        present(&self.args.run_cmd)
            .or(present(&self.artifact.run_cmd))
            .or(present(&self.artifact.content.run_cmd))
            .or(self.answers.run_cmd.as_deref())
            .map(|s| Resolved::Value(s.to_string()))
            .unwrap_or(Resolved::Missing(Missing::RunCmd))
    }

    pub fn unittest_cmd(&self) -> Option<String> {
        present(&self.artifact.unittest_cmd)
            .or(present(&self.artifact.content.unittest_cmd))
            .map(str::to_string)
    }

    /// Every field that still needs an answer, in prompting order.
    pub fn missing(&self) -> Result<Vec<Missing>> {
        let mut missing = Vec::new();
        if let Resolved::Missing(m) = self.language_pack()? {
            missing.push(m);
        }
        if let Resolved::Missing(m) = self.git_url() {
            missing.push(m);
        }
        if let Resolved::Missing(m) = self.run_cmd() {
            missing.push(m);
        }
        Ok(missing)
    }

    pub fn supply_git_url(&mut self, url: impl Into<String>) {
        self.answers.git_url = Some(url.into());
    }

    pub fn supply_run_cmd(&mut self, cmd: impl Into<String>) {
        self.answers.run_cmd = Some(cmd.into());
    }

    /// Record the user's language pack choice; it must be one of the
    /// listed candidates.
    pub fn supply_language_pack(&mut self, choice: &str) -> Result<()> {
        match self.language_pack()? {
            Resolved::Missing(m) if m.accepts(choice) => {
                self.answers.language_pack = Some(choice.to_string());
                Ok(())
            }
            Resolved::Missing(_) => Err(SolumError::Command(
                "You must choose one of the named language packs.".to_string(),
            )),
            Resolved::Value(lp) => Err(SolumError::Command(format!(
                "language pack already resolved to '{lp}'"
            ))),
        }
    }

    /// Assemble the request document. Fails if a required field is still
    /// missing.
    pub fn dump(&self) -> Result<PlanDocument> {
        let ports = self.ports();
        if self.ports_defaulted() {
            info!(port = DEFAULT_PORT, "no application port specified, using default");
        }
        Ok(PlanDocument {
            version: PLAN_VERSION,
            name: self.name()?,
            description: self.description(),
            parameters: self.parameters()?,
            artifacts: vec![ArtifactDocument {
                artifact_type: self.artifact_type(),
                language_pack: self.language_pack()?.require()?,
                name: self.artifact_name()?,
                repo_token: self.repo_token(),
                content: ContentDocument {
                    href: self.git_url().require()?,
                    run_cmd: self.run_cmd().require()?,
                    unittest_cmd: self.unittest_cmd(),
                    ports,
                    public_key: self.public_key(),
                    private: self.is_private(),
                },
            }],
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
