//! Prism CLI entrypoint for the pull request collection pipeline.

mod cli;

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use prism::github::{OctocrabPullRequestGateway, OctocrabSearchGateway, PersonalAccessToken};
use prism::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use prism::{ArtifactStore, IntakeError, OpenAiProvider, PrismConfig};
use tracing_subscriber::EnvFilter;

use cli::CliError;
use cli::pipeline::{self, Services, finish_stage};
use cli::stage::{Stage, split_stage};
use cli::stages::{self as stage_handlers, StageContext, StageOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr log subscriber, filtered by `PRISM_LOG` or
/// `RUST_LOG` and defaulting to warnings.
fn init_tracing() {
    let filter = env::var("PRISM_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run() -> Result<(), CliError> {
    let (stage, args) = split_stage(env::args_os())?;
    let config = load_config(args)?;
    config.validate()?;

    let store = ArtifactStore::open(&config.data_dir()).map_err(IntakeError::from)?;
    let context = StageContext {
        config: &config,
        store: &store,
    };
    let telemetry = telemetry_sink(&config);
    let mut stdout = io::stdout();
    let mut progress = io::stderr();

    match stage {
        Stage::CollectIndex => {
            let search = search_gateway(&config)?;
            let result = stage_handlers::collect_index(context, &search, &mut progress).await;
            finish_stage(stage, result, &mut stdout, telemetry.as_ref())?;
        }
        Stage::CollectDetail => {
            let pulls = pull_request_gateway(&config)?;
            let result = stage_handlers::collect_details(context, &pulls, &mut progress)
                .await
                .map(StageOutcome::Completed);
            finish_stage(stage, result, &mut stdout, telemetry.as_ref())?;
        }
        Stage::CollectDiff => {
            let pulls = pull_request_gateway(&config)?;
            let result = stage_handlers::collect_diffs(context, &pulls, &mut progress)
                .await
                .map(StageOutcome::Completed);
            finish_stage(stage, result, &mut stdout, telemetry.as_ref())?;
        }
        Stage::GenerateFacts => {
            let provider = OpenAiProvider::new(config.openai_config()?)?;
            let result = stage_handlers::generate_facts(context, &provider, &mut progress)
                .await
                .map(StageOutcome::Completed);
            finish_stage(stage, result, &mut stdout, telemetry.as_ref())?;
        }
        Stage::GenerateNarratives => {
            let provider = OpenAiProvider::new(config.openai_config()?)?;
            let result = stage_handlers::generate_narratives(context, &provider, &mut progress)
                .await
                .map(StageOutcome::Completed);
            finish_stage(stage, result, &mut stdout, telemetry.as_ref())?;
        }
        Stage::RunAll => {
            let search = search_gateway(&config)?;
            let pulls = pull_request_gateway(&config)?;
            let provider = OpenAiProvider::new(config.openai_config()?)?;
            let services = Services {
                search: &search,
                pulls: &pulls,
                provider: &provider,
            };
            pipeline::run_all(
                context,
                services,
                &mut stdout,
                &mut progress,
                telemetry.as_ref(),
            )
            .await?;
        }
    }
    Ok(())
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`IntakeError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config(args: Vec<OsString>) -> Result<PrismConfig, IntakeError> {
    PrismConfig::load_from_iter(args).map_err(|error| IntakeError::Configuration {
        message: error.to_string(),
    })
}

fn telemetry_sink(config: &PrismConfig) -> Box<dyn TelemetrySink> {
    if config.telemetry {
        Box::new(StderrJsonlTelemetrySink)
    } else {
        Box::new(NoopTelemetrySink)
    }
}

fn github_token(config: &PrismConfig) -> Result<PersonalAccessToken, IntakeError> {
    PersonalAccessToken::new(config.resolve_token()?)
}

fn search_gateway(config: &PrismConfig) -> Result<OctocrabSearchGateway, IntakeError> {
    OctocrabSearchGateway::for_token(&github_token(config)?, &config.api_base_url()?)
}

fn pull_request_gateway(config: &PrismConfig) -> Result<OctocrabPullRequestGateway, IntakeError> {
    OctocrabPullRequestGateway::for_token(&github_token(config)?, &config.api_base_url()?)
}
