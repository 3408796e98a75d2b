//! Prompt templates for the generation stages.
//!
//! Templates are rendered with `minijinja`; the wording is free to change
//! as long as the model is asked for a single JSON document.

use minijinja::{Environment, context};
use serde::Serialize;

use crate::github::error::IntakeError;
use crate::github::models::{PullRequestDetail, PullRequestIndexEntry};
use crate::store::{NarrativeKind, PullRequestDiff, StoredFactCard};

use super::reply::{MAX_DIFF_CHARS, truncate_diff};

const FACT_SYSTEM: &str = concat!(
    "You extract verifiable facts from a pull request for a career portfolio. ",
    "Only state what the metadata, description, commits, reviews or diff support. ",
    "Reply with a single JSON object and nothing else."
);

const FACT_TEMPLATE: &str = r#"Pull request {{ entry.owner }}/{{ entry.repo }}#{{ entry.number }}: {{ entry.title }}
URL: {{ entry.url }}
State: {{ entry.state }}{% if entry.mergedAt %} (merged {{ entry.mergedAt }}){% endif %}
Branches: {{ entry.headRefName }} -> {{ entry.baseRefName }}
Size: +{{ entry.additions }} -{{ entry.deletions }} across {{ entry.changedFiles }} files
{% if entry.labels %}Labels: {{ entry.labels | join(", ") }}
{% endif %}
Description:
{{ detail.body or "(none)" }}

Commits:
{% for commit in detail.commits %}- {{ commit.message | trim }}
{% else %}(none)
{% endfor %}
Files:
{% for file in detail.files %}- {{ file.filename }} [{{ file.status }}] +{{ file.additions }} -{{ file.deletions }}
{% else %}(none)
{% endfor %}
Reviews:
{% for review in detail.reviews %}- {{ review.author or "unknown" }}: {{ review.state }}{% if review.body %}: {{ review.body }}{% endif %}
{% else %}(none)
{% endfor %}
Diff{% if truncated %} (truncated){% endif %}:
{{ diff or "(not collected)" }}

Return JSON with the keys "title", "summary", "problem", "solution", "impact",
"technologies" (array of strings), "role" and "metrics" (array of strings).
{% if lang %}Write every string value in {{ lang }}.
{% endif %}"#;

const STAR_SYSTEM: &str = concat!(
    "You write STAR (Situation, Task, Action, Result) narratives from fact cards. ",
    "Group related pull requests into one narrative and never invent results. ",
    "Reply with a single JSON object and nothing else."
);

const CARE_SYSTEM: &str = concat!(
    "You write CARE (Context, Action, Result, Learning) narratives from fact cards. ",
    "Group related pull requests into one narrative and never invent results. ",
    "Reply with a single JSON object and nothing else."
);

const NARRATIVE_TEMPLATE: &str = r#"Fact cards ({{ cards | length }}):
{% for card in cards %}
### {{ card.id }}
{{ card.document }}
{% endfor %}
Return JSON of the form {"narratives": [ ... ]} where each narrative has a
"title", {% for field in fields %}"{{ field }}", {% endfor %}and "sources"
(array of "owner/repo#number" strings).
{% if lang %}Write every string value in {{ lang }}.
{% endif %}"#;

#[derive(Serialize)]
struct CardContext {
    id: String,
    document: String,
}

/// Renders the system instructions and prompts sent to the model.
pub struct PromptRenderer {
    env: Environment<'static>,
    lang: Option<String>,
}

impl PromptRenderer {
    /// Creates a renderer; `lang` asks the model to answer in that language.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when a built-in template fails
    /// to compile.
    pub fn new(lang: Option<String>) -> Result<Self, IntakeError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.add_template("fact", FACT_TEMPLATE)
            .and_then(|()| env.add_template("narrative", NARRATIVE_TEMPLATE))
            .map_err(|error| IntakeError::Configuration {
                message: format!("invalid prompt template: {error}"),
            })?;
        Ok(Self { env, lang })
    }

    /// System instruction for fact generation.
    #[must_use]
    pub const fn fact_system(&self) -> &'static str {
        FACT_SYSTEM
    }

    /// System instruction for one narrative kind.
    #[must_use]
    pub const fn narrative_system(&self, kind: NarrativeKind) -> &'static str {
        match kind {
            NarrativeKind::Star => STAR_SYSTEM,
            NarrativeKind::Care => CARE_SYSTEM,
        }
    }

    /// Renders the fact prompt for one pull request.
    ///
    /// The diff is cut to [`MAX_DIFF_CHARS`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when rendering fails.
    pub fn fact_prompt(
        &self,
        entry: &PullRequestIndexEntry,
        detail: &PullRequestDetail,
        diff: Option<&PullRequestDiff>,
    ) -> Result<String, IntakeError> {
        let (excerpt, truncated) = diff.map_or((None, false), |text| {
            let (cut, was_cut) = truncate_diff(text.as_str(), MAX_DIFF_CHARS);
            (Some(cut), was_cut)
        });
        self.render(
            "fact",
            context! {
                entry => entry,
                detail => detail,
                diff => excerpt,
                truncated => truncated,
                lang => self.lang.as_deref(),
            },
        )
    }

    /// Renders the narrative prompt over every fact card.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when rendering fails or a card
    /// cannot be serialised.
    pub fn narrative_prompt(
        &self,
        kind: NarrativeKind,
        cards: &[StoredFactCard],
    ) -> Result<String, IntakeError> {
        let card_contexts = cards
            .iter()
            .map(|stored| {
                serde_json::to_string_pretty(stored.card.document())
                    .map(|document| CardContext {
                        id: stored.id.to_string(),
                        document,
                    })
                    .map_err(|error| IntakeError::Configuration {
                        message: format!("failed to serialise fact card {}: {error}", stored.id),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let fields: &[&str] = match kind {
            NarrativeKind::Star => &["situation", "task", "action", "result"],
            NarrativeKind::Care => &["context", "action", "result", "learning"],
        };
        self.render(
            "narrative",
            context! {
                cards => card_contexts,
                fields => fields,
                lang => self.lang.as_deref(),
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, IntakeError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|error| IntakeError::Configuration {
                message: format!("prompt rendering failed: {error}"),
            })
    }
}
