//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.prism.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PRISM_AUTHOR`, `PRISM_TOKEN`, or legacy
//!    `GITHUB_TOKEN` / `OPENAI_API_KEY`
//! 4. **Command-line arguments** – `--author`/`-a`, `--repos`/`-R`, ...
//!
//! # Configuration File
//!
//! ```toml
//! author = "octocat"
//! repos = "octo/widgets,octo/gadgets"
//! state = "merged"
//! data_dir = "data"
//! page_size = 50
//! max_pages = 20
//! llm_model = "gpt-4o-mini"
//! ```

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::collector::StateFilter;
use crate::generate::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECS, OpenAiConfig,
};
use crate::github::error::IntakeError;
use crate::github::locator::{
    DEFAULT_API_BASE, PullRequestId, PullRequestNumber, RepositorySlug, parse_api_base,
};
use crate::github::pagination::validate_page_size;

const DEFAULT_STATE: &str = "merged";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MAX_PAGES: u32 = 20;
const DEFAULT_PAGE_SIZE: u8 = 50;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PRISM_TOKEN`, `GITHUB_TOKEN`, or `--token`: GitHub token
/// - `PRISM_AUTHOR` or `--author`: Pull request author to collect
/// - `PRISM_REPOS` or `--repos`: Comma-separated `owner/repo` list
/// - `PRISM_DATA_DIR` or `--data-dir`: Artifact store root
/// - `PRISM_LLM_API_KEY`, `OPENAI_API_KEY`, or `--llm-api-key`: LLM key
///
/// # Example
///
/// ```no_run
/// use prism::PrismConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = PrismConfig::load().expect("failed to load configuration");
/// let repositories = config.require_repositories().expect("repositories required");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PRISM",
    discovery(
        dotfile_name = ".prism.toml",
        config_file_name = "prism.toml",
        app_name = "prism"
    )
)]
pub struct PrismConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PRISM_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise or test servers.
    #[ortho_config(cli_short = 'A')]
    pub api_base: String,

    /// Repository owner, combined with `repo`.
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name, combined with `owner`.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Comma-separated `owner/repo` list searched in order.
    #[ortho_config(cli_short = 'R')]
    pub repos: Option<String>,

    /// GitHub login whose pull requests are collected.
    #[ortho_config(cli_short = 'a')]
    pub author: Option<String>,

    /// Lifecycle filter: `open`, `closed`, `merged`, or `all`.
    #[ortho_config(cli_short = 's')]
    pub state: String,

    /// Upper bound on search pages fetched per repository.
    #[ortho_config(cli_short = 'm')]
    pub max_pages: u32,

    /// Search results requested per page (1..=100).
    #[ortho_config(cli_short = 'p')]
    pub page_size: u8,

    /// Root directory of the artifact store.
    #[ortho_config(cli_short = 'd')]
    pub data_dir: String,

    /// Comma-separated pull requests to keep after index collection, as
    /// `owner/repo#number` (or a bare number with a single repository).
    #[ortho_config(cli_short = 'S')]
    pub select: Option<String>,

    /// Language requested for generated text.
    #[ortho_config(cli_short = 'l')]
    pub lang: Option<String>,

    /// Chat-completions base URL.
    #[ortho_config(cli_short = 'b')]
    pub llm_base_url: String,

    /// Chat-completions model identifier.
    #[ortho_config(cli_short = 'M')]
    pub llm_model: String,

    /// API key for the chat-completions endpoint.
    ///
    /// Falls back to `OPENAI_API_KEY` when unset.
    #[ortho_config(cli_short = 'k')]
    pub llm_api_key: Option<String>,

    /// LLM request timeout in seconds.
    #[ortho_config(cli_short = 'w')]
    pub llm_timeout_seconds: u64,

    /// Emits JSONL telemetry events on stderr.
    ///
    /// Note: `PRISM_TELEMETRY` is not read because `ortho_config` does not
    /// load boolean values from the environment.
    #[ortho_config(cli_short = 'T')]
    pub telemetry: bool,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            owner: None,
            repo: None,
            repos: None,
            author: None,
            state: DEFAULT_STATE.to_owned(),
            max_pages: DEFAULT_MAX_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            data_dir: DEFAULT_DATA_DIR.to_owned(),
            select: None,
            lang: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            llm_model: DEFAULT_LLM_MODEL.to_owned(),
            llm_api_key: None,
            llm_timeout_seconds: DEFAULT_LLM_TIMEOUT_SECS,
            telemetry: false,
        }
    }
}

impl PrismConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, IntakeError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or(IntakeError::MissingToken)
    }

    /// Resolves the LLM API key from configuration or `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when no source provides a key.
    pub fn resolve_llm_api_key(&self) -> Result<String, IntakeError> {
        self.llm_api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| IntakeError::Configuration {
                message: concat!(
                    "LLM API key is required (use --llm-api-key, ",
                    "PRISM_LLM_API_KEY, or OPENAI_API_KEY)"
                )
                .to_owned(),
            })
    }

    /// Returns every configured repository, `owner`/`repo` first, then the
    /// `repos` list, without duplicates.
    ///
    /// GitHub names are case-insensitive, so a later entry differing from an
    /// earlier one only in case is dropped and the first spelling is kept.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when no repository is
    /// configured or only one of `owner`/`repo` is set, and
    /// [`IntakeError::InvalidRepository`] for a malformed list entry.
    pub fn require_repositories(&self) -> Result<Vec<RepositorySlug>, IntakeError> {
        let mut slugs: Vec<RepositorySlug> = Vec::new();

        match (self.owner.as_deref(), self.repo.as_deref()) {
            (Some(owner), Some(repo)) => slugs.push(RepositorySlug::new(owner, repo)?),
            (Some(_), None) => {
                return Err(IntakeError::Configuration {
                    message: "repository name is required (use --repo or -r)".to_owned(),
                });
            }
            (None, Some(_)) => {
                return Err(IntakeError::Configuration {
                    message: "repository owner is required (use --owner or -o)".to_owned(),
                });
            }
            (None, None) => {}
        }

        let listed = self
            .repos
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty());
        for item in listed {
            let slug: RepositorySlug = item.parse()?;
            match slugs.iter().find(|known| known.same_repository(&slug)) {
                Some(known) if *known != slug => {
                    warn!(repository = %slug, kept = %known, "ignoring repository differing only in case");
                }
                Some(_) => {}
                None => slugs.push(slug),
            }
        }

        if slugs.is_empty() {
            return Err(IntakeError::Configuration {
                message: "at least one repository is required (use --repos or --owner/--repo)"
                    .to_owned(),
            });
        }
        Ok(slugs)
    }

    /// Returns the author login.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when the author is missing,
    /// blank, or contains whitespace.
    pub fn require_author(&self) -> Result<&str, IntakeError> {
        let author = self.author.as_deref().map(str::trim).unwrap_or_default();
        if author.is_empty() {
            return Err(IntakeError::Configuration {
                message: "author is required (use --author or -a)".to_owned(),
            });
        }
        if author.chars().any(char::is_whitespace) {
            return Err(IntakeError::Configuration {
                message: format!("author must be a single GitHub login: {author}"),
            });
        }
        Ok(author)
    }

    /// Parses the configured lifecycle filter.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] for an unknown state.
    pub fn state_filter(&self) -> Result<StateFilter, IntakeError> {
        StateFilter::parse(&self.state)
    }

    /// Returns the pull requests named by `select`, or `None` when no
    /// selection is configured.
    ///
    /// Items are `owner/repo#number`. A bare number is accepted only when
    /// `repositories` holds a single repository, which it then refers to.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] for a malformed item or for a
    /// bare number while several repositories are configured.
    pub fn selection(
        &self,
        repositories: &[RepositorySlug],
    ) -> Result<Option<BTreeSet<PullRequestId>>, IntakeError> {
        let Some(raw) = self.select.as_deref() else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| selected_identity(item, repositories))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Some)
    }

    /// Checks pagination bounds and URL settings.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPagination`] when `page_size` is outside
    /// `1..=100` or `max_pages` is zero, and [`IntakeError::InvalidUrl`] for
    /// a malformed API base.
    pub fn validate(&self) -> Result<(), IntakeError> {
        validate_page_size(self.page_size)?;
        if self.max_pages == 0 {
            return Err(IntakeError::InvalidPagination {
                message: "max pages must be at least 1".to_owned(),
            });
        }
        self.api_base_url()?;
        Ok(())
    }

    /// Parses the GitHub API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidUrl`] when the value is not an HTTP(S)
    /// URL.
    pub fn api_base_url(&self) -> Result<Url, IntakeError> {
        parse_api_base(&self.api_base)
    }

    /// Artifact store root.
    #[must_use]
    pub fn data_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.data_dir.as_str())
    }

    /// Builds chat-completions settings from the LLM fields.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when no API key is available.
    pub fn openai_config(&self) -> Result<OpenAiConfig, IntakeError> {
        Ok(OpenAiConfig {
            base_url: self.llm_base_url.clone(),
            model: self.llm_model.clone(),
            api_key: self.resolve_llm_api_key()?,
            timeout: Duration::from_secs(self.llm_timeout_seconds),
        })
    }
}

fn selected_identity(
    item: &str,
    repositories: &[RepositorySlug],
) -> Result<PullRequestId, IntakeError> {
    if item.contains('#') {
        return item
            .parse()
            .map_err(|error: IntakeError| IntakeError::Configuration {
                message: format!("select item {item} is not owner/repo#number: {error}"),
            });
    }
    let number = item
        .parse::<u64>()
        .ok()
        .and_then(|value| PullRequestNumber::new(value).ok())
        .ok_or_else(|| IntakeError::Configuration {
            message: format!("select items must be owner/repo#number or a number: {item}"),
        })?;
    match repositories {
        [only] => Ok(only.pull_request(number)),
        _ => Err(IntakeError::Configuration {
            message: format!(
                "select item {item} is ambiguous across {} repositories; use owner/repo#{item}",
                repositories.len()
            ),
        }),
    }
}

#[cfg(test)]
mod tests;
