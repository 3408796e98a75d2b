//! Tests for the `run-all` pipeline and stage completion handling.

use prism::IntakeError;
use prism::telemetry::TelemetryEvent;
use rstest::{fixture, rstest};

use super::{PipelineOutcome, Services, StageFailure, finish_stage, run_all};
use crate::cli::stage::Stage;
use crate::cli::stages::{StageContext, StageOutcome};
use crate::cli::test_utils::{
    RecordingSink, StubProvider, StubPullRequestGateway, StubSearchGateway, Workspace, block_on,
};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new("octo/widgets")
}

fn search() -> StubSearchGateway {
    StubSearchGateway::default().with_repository("octo/widgets", &[1, 2, 3])
}

fn lines(buffer: Vec<u8>) -> Vec<String> {
    String::from_utf8(buffer)
        .expect("output should be UTF-8")
        .lines()
        .map(str::to_owned)
        .collect()
}

#[rstest]
fn run_all_runs_every_stage_in_order(workspace: Workspace) {
    let search = search();
    let pulls = StubPullRequestGateway::default();
    let provider = StubProvider::default();
    let sink = RecordingSink::default();
    let mut stdout = Vec::new();
    let context = StageContext {
        config: &workspace.config,
        store: &workspace.store,
    };
    let services = Services {
        search: &search,
        pulls: &pulls,
        provider: &provider,
    };

    let outcome = block_on(run_all(context, services, &mut stdout, &mut Vec::new(), &sink))
        .expect("pipeline should complete");

    let PipelineOutcome::Completed(reports) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    let stages: Vec<Stage> = reports.iter().map(|report| report.stage).collect();
    assert_eq!(stages, Stage::PIPELINE.to_vec());
    assert_eq!(
        lines(stdout),
        vec![
            "collect-index: saved 3/3 pull requests to pr_index.jsonl",
            "collect-detail: collected 3 details, skipped 0 of 3",
            "collect-diff: collected 3 diffs, skipped 0 of 3",
            "generate-facts: generated 3 fact cards, skipped 0 of 3",
            "generate-narratives: generated 2 STAR + 2 CARE narratives",
        ]
    );
    assert_eq!(sink.take().len(), 5, "one completion event per stage");
}

#[rstest]
fn run_all_halts_at_first_failing_stage(workspace: Workspace) {
    let search = search();
    let pulls = StubPullRequestGateway {
        failing_diff: Some(2),
        ..StubPullRequestGateway::default()
    };
    let provider = StubProvider::default();
    let sink = RecordingSink::default();
    let mut stdout = Vec::new();
    let context = StageContext {
        config: &workspace.config,
        store: &workspace.store,
    };
    let services = Services {
        search: &search,
        pulls: &pulls,
        provider: &provider,
    };

    let failure = block_on(run_all(context, services, &mut stdout, &mut Vec::new(), &sink))
        .expect_err("diff failure should halt the pipeline");

    assert_eq!(failure.stage, Stage::CollectDiff);
    assert_eq!(
        failure.to_string(),
        "collect-diff failed: GitHub API error: Not Found"
    );
    assert_eq!(provider.calls(), 0, "generation must not run");
    assert_eq!(lines(stdout).len(), 2, "only completed stages print summaries");
    assert_eq!(
        sink.take().last(),
        Some(&TelemetryEvent::PipelineHalted {
            stage: "collect-diff".to_owned(),
            message: "GitHub API error: Not Found".to_owned(),
        })
    );
}

#[rstest]
fn run_all_stops_cleanly_when_selection_is_empty(mut workspace: Workspace) {
    workspace.config.select = Some("99".to_owned());
    let search = search();
    let pulls = StubPullRequestGateway::default();
    let provider = StubProvider::default();
    let sink = RecordingSink::default();
    let context = StageContext {
        config: &workspace.config,
        store: &workspace.store,
    };
    let services = Services {
        search: &search,
        pulls: &pulls,
        provider: &provider,
    };

    let outcome = block_on(run_all(
        context,
        services,
        &mut Vec::new(),
        &mut Vec::new(),
        &sink,
    ))
    .expect("empty selection is a clean stop");

    assert_eq!(outcome, PipelineOutcome::NothingSelected { found: 3 });
    assert!(pulls.requests().is_empty(), "no later stage should run");
}

#[test]
fn finish_stage_wraps_errors_with_stage_name() {
    let sink = RecordingSink::default();
    let error = IntakeError::Validation {
        message: "no fact cards found; run generate-facts first".to_owned(),
    };

    let result = finish_stage(
        Stage::GenerateNarratives,
        Err::<StageOutcome, _>(error.clone()),
        &mut Vec::new(),
        &sink,
    );

    assert_eq!(
        result,
        Err(StageFailure {
            stage: Stage::GenerateNarratives,
            error,
        })
    );
    assert_eq!(sink.take().len(), 1);
}
