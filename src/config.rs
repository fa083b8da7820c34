//! Layered configuration (§4.K): built-in defaults → an optional TOML file
//! → `BUILDCORE_*` environment variables → explicit CLI flags, in increasing
//! precedence. Resolved once per invocation and threaded explicitly into
//! the components that need it; no part of it is a process-wide singleton
//! (§9 Global state).

use std::{collections::HashMap, path::PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

const DEFAULT_GIT_HOST: &str = "cos.googlesource.com";
const DEFAULT_CODE_REVIEW_HOST: &str = "cos-review.googlesource.com";
const DEFAULT_MANIFEST_REPO: &str = "cos/manifest-snapshots";
const DEFAULT_REPO_PREFIX: &str = "";

/// A repository's branch-to-release extraction rule (§3 Change, §4.F): a
/// regex applied to the branch name, with a fallback release when the
/// regex has no capture group 1.
#[derive(Debug, Clone)]
pub struct BranchRule {
    pub regex: Regex,
    pub default_release: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub code_review_host: String,
    pub git_host: String,
    pub manifest_repo: String,
    pub repo_prefix: String,
    pub branch_rules: HashMap<String, BranchRule>,
}

/// Overrides supplied on the command line; every field is optional so that
/// `clap`'s `changelog`/`find-build` subcommands can share this loader
/// without forcing every flag onto every invocation.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub code_review_host: Option<String>,
    pub git_host: Option<String>,
    pub manifest_repo: Option<String>,
    pub repo_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawBranchRule {
    pattern: String,
    default_release: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    code_review_host: Option<String>,
    git_host: Option<String>,
    manifest_repo: Option<String>,
    repo_prefix: Option<String>,
    #[serde(default)]
    branch_rules: HashMap<String, RawBranchRule>,
}

impl RawConfig {
    fn merge_env(&mut self) {
        if let Ok(v) = std::env::var("BUILDCORE_CODE_REVIEW_HOST") {
            self.code_review_host = Some(v);
        }
        if let Ok(v) = std::env::var("BUILDCORE_GIT_HOST") {
            self.git_host = Some(v);
        }
        if let Ok(v) = std::env::var("BUILDCORE_MANIFEST_REPO") {
            self.manifest_repo = Some(v);
        }
        if let Ok(v) = std::env::var("BUILDCORE_REPO_PREFIX") {
            self.repo_prefix = Some(v);
        }
    }

    fn merge_cli(&mut self, cli: &CliOverrides) {
        if let Some(v) = &cli.code_review_host {
            self.code_review_host = Some(v.clone());
        }
        if let Some(v) = &cli.git_host {
            self.git_host = Some(v.clone());
        }
        if let Some(v) = &cli.manifest_repo {
            self.manifest_repo = Some(v.clone());
        }
        if let Some(v) = &cli.repo_prefix {
            self.repo_prefix = Some(v.clone());
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("buildcore/config.toml"))
}

/// Resolve configuration for one invocation (§4.K).
pub fn load(cli: &CliOverrides) -> Result<Config> {
    let mut raw = RawConfig::default();

    let config_path = cli.config_path.clone().or_else(default_config_path);
    if let Some(path) = &config_path {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                raw = toml::from_str(&contents)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Config(format!("{}: {e}", path.display())));
            }
        }
    }

    raw.merge_env();
    raw.merge_cli(cli);

    let mut branch_rules = HashMap::with_capacity(raw.branch_rules.len());
    for (repo, rule) in raw.branch_rules {
        let regex = Regex::new(&rule.pattern)
            .map_err(|e| Error::Config(format!("branch rule for {repo:?}: {e}")))?;
        branch_rules.insert(
            repo,
            BranchRule {
                regex,
                default_release: rule.default_release,
            },
        );
    }

    Ok(Config {
        code_review_host: raw
            .code_review_host
            .unwrap_or_else(|| DEFAULT_CODE_REVIEW_HOST.to_string()),
        git_host: raw.git_host.unwrap_or_else(|| DEFAULT_GIT_HOST.to_string()),
        manifest_repo: raw
            .manifest_repo
            .unwrap_or_else(|| DEFAULT_MANIFEST_REPO.to_string()),
        repo_prefix: raw
            .repo_prefix
            .unwrap_or_else(|| DEFAULT_REPO_PREFIX.to_string()),
        branch_rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_builtin_defaults_with_no_overrides() {
        let config = load(&CliOverrides {
            config_path: Some(PathBuf::from("/nonexistent/buildcore/config.toml")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.git_host, DEFAULT_GIT_HOST);
        assert_eq!(config.manifest_repo, DEFAULT_MANIFEST_REPO);
    }

    #[test]
    fn cli_overrides_win_over_defaults() {
        let config = load(&CliOverrides {
            config_path: Some(PathBuf::from("/nonexistent/buildcore/config.toml")),
            git_host: Some("custom.googlesource.com".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.git_host, "custom.googlesource.com");
    }

    #[test]
    fn invalid_branch_rule_regex_is_a_config_error() {
        let toml = "[branch_rules.\"platform/kernel\"]\npattern = \"(\"\ndefault_release = \"main\"\n";
        let dir = std::env::temp_dir().join(format!(
            "buildcore-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, toml).unwrap();

        let result = load(&CliOverrides {
            config_path: Some(path),
            ..Default::default()
        });
        assert!(result.is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
