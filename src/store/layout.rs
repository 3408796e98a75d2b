//! Deterministic mapping from artifact identity to a path under the data
//! directory.
//!
//! ```text
//! pr_index.jsonl
//! <owner>/<repo>/pr_detail/<number>.json
//! <owner>/<repo>/pr_diff/<number>.diff
//! <owner>/<repo>/fact_cards/<number>.json
//! narratives/<kind>.json
//! ```

use camino::{Utf8Path, Utf8PathBuf};

use crate::github::locator::PullRequestId;

use super::artifact::NarrativeKind;

/// File name of the pull request index.
pub const INDEX_FILE: &str = "pr_index.jsonl";

/// Path of the pull request index.
#[must_use]
pub fn index_path() -> &'static Utf8Path {
    Utf8Path::new(INDEX_FILE)
}

/// Path of a pull request's detail document.
#[must_use]
pub fn detail_path(id: &PullRequestId) -> Utf8PathBuf {
    per_pull_request(id, "pr_detail", "json")
}

/// Path of a pull request's unified diff.
#[must_use]
pub fn diff_path(id: &PullRequestId) -> Utf8PathBuf {
    per_pull_request(id, "pr_diff", "diff")
}

/// Path of a pull request's fact card.
#[must_use]
pub fn fact_card_path(id: &PullRequestId) -> Utf8PathBuf {
    per_pull_request(id, "fact_cards", "json")
}

/// Path of a narrative document.
#[must_use]
pub fn narrative_path(kind: NarrativeKind) -> Utf8PathBuf {
    Utf8Path::new("narratives").join(format!("{}.json", kind.as_str()))
}

fn per_pull_request(id: &PullRequestId, stage_dir: &str, extension: &str) -> Utf8PathBuf {
    Utf8Path::new(id.owner().as_str())
        .join(id.repository().as_str())
        .join(stage_dir)
        .join(format!("{}.{extension}", id.number()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{detail_path, diff_path, fact_card_path, index_path, narrative_path};
    use crate::github::locator::PullRequestId;
    use crate::store::artifact::NarrativeKind;

    #[rstest]
    fn paths_follow_the_persisted_layout() {
        let id = PullRequestId::parse("octo", "widgets", 9).expect("identity should parse");

        assert_eq!(index_path().as_str(), "pr_index.jsonl");
        assert_eq!(detail_path(&id).as_str(), "octo/widgets/pr_detail/9.json");
        assert_eq!(diff_path(&id).as_str(), "octo/widgets/pr_diff/9.diff");
        assert_eq!(fact_card_path(&id).as_str(), "octo/widgets/fact_cards/9.json");
        assert_eq!(narrative_path(NarrativeKind::Star).as_str(), "narratives/star.json");
        assert_eq!(narrative_path(NarrativeKind::Care).as_str(), "narratives/care.json");
    }
}
