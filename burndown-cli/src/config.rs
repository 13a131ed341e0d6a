//! Defaults for every request: `~/.burndown/config.toml`, then environment.
//!
//! Read-only. Per-request values (flags, query strings) are layered on top
//! with `RequestConfig::apply` and never written back.

use anyhow::{Context, Result};
use burndown_core::config::{DEFAULT_MILESTONE, DEFAULT_PROJECT, DEFAULT_TIMEZONE};
use burndown_core::{DEFAULT_TASK_MARKER, RepoId, RequestConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GithubSection,
    pub burndown: BurndownSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    /// Prefer GITHUB_TOKEN over storing this in the file.
    pub token: Option<String>,
    /// "owner/name"
    pub repo: Option<String>,
    /// Override for GitHub Enterprise, e.g. "https://ghe.example.com/api"
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurndownSection {
    pub milestone: String,
    pub project: String,
    pub sprint: Option<String>,
    pub iteration_field: Option<String>,
    pub policy: String,
    pub task_marker: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub addr: String,
}

impl Default for BurndownSection {
    fn default() -> Self {
        Self {
            milestone: DEFAULT_MILESTONE.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            sprint: None,
            iteration_field: None,
            policy: "scope-aware".to_string(),
            task_marker: DEFAULT_TASK_MARKER.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
        }
    }
}

pub fn burndown_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".burndown"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(burndown_home()?.join("config.toml"))
}

impl Settings {
    /// File (if present) + process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let p = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };
        let mut settings = Self::from_file(&p)?;
        settings.apply_env(|k| std::env::var(k).ok());
        Ok(settings)
    }

    pub fn from_file(p: &Path) -> Result<Self> {
        if !p.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
    }

    /// Environment wins over the file; empty variables are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let get = |k: &str| var(k).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("GITHUB_REPO") {
            self.github.repo = Some(v);
        }
        if let Some(v) = get("MILESTONE_TITLE") {
            self.burndown.milestone = v;
        }
        if let Some(v) = get("PROJECT_TITLE") {
            self.burndown.project = v;
        }
        if let Some(v) = get("SPRINT_NAME") {
            self.burndown.sprint = Some(v);
        }
        if let Some(v) = get("BURNDOWN_POLICY") {
            self.burndown.policy = v;
        }
    }

    /// Request defaults. The token may still be missing here; requests fail
    /// on it later unless they bring their own.
    pub fn request_config(&self) -> Result<RequestConfig> {
        let repo = self
            .github
            .repo
            .as_deref()
            .context("no repository configured (set GITHUB_REPO=owner/repo or --repo)")?;

        let b = &self.burndown;
        let mut cfg = RequestConfig::new(RepoId::parse(repo)?)
            .with_milestone(b.milestone.as_str())
            .with_project(b.project.as_str())
            .with_policy(b.policy.parse()?)
            .with_timezone(b.timezone.as_str());
        cfg.token = self.github.token.clone();
        cfg.sprint = b.sprint.clone();
        cfg.task_marker = b.task_marker.clone();
        if let Some(field) = &b.iteration_field {
            cfg = cfg.with_iteration_field(field.as_str());
        }
        Ok(cfg)
    }
}
