//! CLI entrypoint for mods
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use mods_application::{
    ConversationLogger, Dataset, DiscussionProgress, GenerationGateway, NoConversationLogger,
    NoProgress, RunBatchError, RunBatchInput, RunBatchUseCase, RunSessionUseCase,
};
use mods_domain::VariantKey;
use mods_infrastructure::{
    ConfigLoader, FileConfig, FileDatasetConfig, FileVariantConfig, JsonCheckpointStore,
    JsonDataset, JsonlConversationLogger, LexicalRetrieverFactory, OpenAiCompatibleModel,
};
use mods_presentation::{BatchProgressReporter, Cli, OutlineFormatter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Fold command-line overrides into the loaded configuration.
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(name) = &cli.run_name {
        config.run.run_name = name.clone();
    }
    if let Some(n) = cli.num_to_run {
        config.run.num_to_run = n;
    }
    if let Some(dir) = &cli.res_dir {
        config.run.res_dir = dir.clone();
    }
    if !cli.datasets.is_empty() {
        config.run.datasets = cli
            .datasets
            .iter()
            .map(|(name, path)| FileDatasetConfig {
                name: name.clone(),
                path: path.clone(),
            })
            .collect();
    }

    let discussion = &mut config.discussion;
    if let Some(k) = cli.top_k {
        discussion.top_k = k;
    }
    if let Some(n) = cli.num_topics {
        discussion.topic_count = n;
    }
    if let Some(enabled) = cli.use_subtopic_retrieval {
        discussion.use_subtopic_retrieval = enabled;
    }
    if let Some(enabled) = cli.select_agents {
        discussion.select_agents = enabled;
    }
    if cli.parallel_speakers {
        discussion.parallel_speakers = true;
    }
    if let Some((cot, rationale)) = cli.variant_flags() {
        discussion.variants = VariantKey::zip(&cot, &rationale)
            .into_iter()
            .map(|key| FileVariantConfig {
                use_cot: key.use_cot,
                use_rationale: key.use_rationale,
            })
            .collect();
    }

    if cli.print_outlines {
        config.output.print_outlines = true;
    }
}

/// Console logging per verbosity, plus a daily file when `--log-dir` is set.
/// The returned guard flushes the file writer on drop.
fn init_logging(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::new(cli.log_level()))
        .with(console);

    match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "mods.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(cli, &mut config);

    let issues = config.validate();
    if !issues.is_empty() {
        let list = issues
            .iter()
            .map(|issue| format!("  - {}", issue))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Invalid configuration:\n{}", list);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli);

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    if !config.output.color {
        colored::control::set_override(false);
    }
    if config.run.datasets.is_empty() {
        bail!("No datasets given. Use --dataset NAME=PATH or [run].datasets in mods.toml.");
    }

    info!("Starting mods run '{}'", config.run.run_name);

    // === Dependency Injection ===
    let model = OpenAiCompatibleModel::from_config(&config.model)
        .map_err(|e| anyhow!("Failed to set up model client: {}", e))?;
    if config.model.resolve_api_key().is_none() {
        warn!(
            "No API key found in ${} or [model].api_key; requests are unauthenticated",
            config.model.api_key_env
        );
    }

    let logger: Arc<dyn ConversationLogger> = match &config.run.conversation_log {
        Some(path) => Arc::new(JsonlConversationLogger::open(path).with_context(|| {
            format!("Failed to open conversation log {}", path.display())
        })?),
        None => Arc::new(NoConversationLogger),
    };

    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current request");
                token.cancel();
            }
        });
    }

    let gateway = GenerationGateway::new(Arc::new(model))
        .with_logger(logger)
        .with_cancellation(cancellation);
    let params = config.discussion_params();
    let variant_count = params.variants.len();
    let limits = config.retry_limits();
    let session = RunSessionUseCase::new(
        gateway,
        Arc::new(LexicalRetrieverFactory),
        params,
        limits,
    );

    let store = Arc::new(JsonCheckpointStore::new(config.run.checkpoint_path()));
    let location = store.path().display().to_string();
    let batch = RunBatchUseCase::new(session, store, limits.checkpoint_every);

    let mut datasets: Vec<Arc<dyn Dataset>> = Vec::with_capacity(config.run.datasets.len());
    for entry in &config.run.datasets {
        let dataset = JsonDataset::open(entry.name.clone(), &entry.path)
            .with_context(|| format!("Failed to load dataset '{}'", entry.name))?;
        datasets.push(Arc::new(dataset));
    }
    let input = RunBatchInput::new(config.run.run_name.clone(), datasets)
        .with_num_to_run(config.run.num_to_run);

    let progress: Box<dyn DiscussionProgress> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(BatchProgressReporter::new(variant_count))
    };

    let summary = match batch.execute_with_progress(input, progress.as_ref()).await {
        Ok(summary) => summary,
        Err(e) if e.is_cancelled() => {
            bail!("Interrupted; progress saved to {}", location);
        }
        Err(e @ RunBatchError::SettingsMismatch { .. }) => {
            bail!("{}. Pick another --run-name or remove the checkpoint to start over", e);
        }
        Err(e) => return Err(e.into()),
    };

    if config.output.print_outlines {
        println!("{}", OutlineFormatter::format_outlines(&summary));
    }
    println!("{}", OutlineFormatter::format_summary(&summary, &location));

    Ok(())
}
