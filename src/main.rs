use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dispatch_refine::{
    build_engine, parse_request_file, prune_record, render_segments, write_result_json,
    EngineConfig, EngineKind, HumanTranscript, PipelineConfig, RefinePipeline,
};

#[derive(Parser)]
#[command(name = "dispatch-refine")]
#[command(author, version, about = "Emergency dispatch conversation refinement and extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct a call transcript and extract the structured incident record
    Refine {
        /// Request file (JSON with transcription, segments, optional context)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the result (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the corrected transcript (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Completion engine (openai or anthropic)
        #[arg(long, default_value = "openai")]
        engine: EngineKind,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Call context, overrides the one in the request file
        #[arg(long)]
        context: Option<String>,

        /// Correction temperature
        #[arg(long, default_value = "0.3")]
        correction_temperature: f32,

        /// Extraction temperature
        #[arg(long, default_value = "0.1")]
        extraction_temperature: f32,

        /// Skip the vocabulary check on the extracted record
        #[arg(long)]
        no_vocabulary_check: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the speaker-grouped transcript of a request without calling an engine
    Render {
        /// Request file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Remove empty values from a JSON record
    Prune {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report which completion engines are configured
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Refine {
            input,
            output,
            human_readable,
            engine,
            model,
            context,
            correction_temperature,
            extraction_temperature,
            no_vocabulary_check,
            verbose,
        } => {
            setup_logging(verbose);

            let mut config = PipelineConfig::default();
            config.correction.temperature = correction_temperature;
            config.extraction.temperature = extraction_temperature;
            config.extraction.validate_vocabulary = !no_vocabulary_check;

            refine(input, output, human_readable, engine, model, context, config).await
        }
        Commands::Render { input, verbose } => {
            setup_logging(verbose);
            render(input)
        }
        Commands::Prune { input, output } => {
            setup_logging(false);
            prune(input, output)
        }
        Commands::Check => {
            setup_logging(false);
            check();
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn refine(
    input: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    engine: EngineKind,
    model: Option<String>,
    context: Option<String>,
    config: PipelineConfig,
) -> Result<()> {
    info!("Loading request from {:?}", input);
    let mut request = parse_request_file(&input).context("Failed to parse request file")?;
    if context.is_some() {
        request.context = context;
    }

    let engine = build_engine(engine, model.clone()).context("Failed to configure engine")?;
    if model.is_some() {
        request.model = model;
    }

    let pipeline = RefinePipeline::new(Arc::clone(&engine), config);
    let result = pipeline.refine(&request).await;

    write_result_json(&result, &output)?;
    info!("Result written to {:?}", output);

    if let Some(path) = human_readable {
        HumanTranscript::new(&result).write_file(&path)?;
        info!("Corrected transcript written to {:?}", path);
    }

    if !result.success {
        anyhow::bail!(
            "Refinement failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    info!(
        "Complete: {} categories, {} speakers, {:.2}s",
        result.categories().len(),
        result.speaker_count,
        result.processing_time
    );
    if !result.vocabulary_issues.is_empty() {
        info!("{} vocabulary issues flagged", result.vocabulary_issues.len());
    }

    Ok(())
}

fn render(input: PathBuf) -> Result<()> {
    info!("Rendering request from {:?}", input);
    let request = parse_request_file(&input).context("Failed to parse request file")?;

    print!("{}", render_segments(&request.segments));
    Ok(())
}

fn prune(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read file: {:?}", input))?;
    let record: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse JSON")?;

    let pruned = serde_json::to_string_pretty(&prune_record(record))?;
    match output {
        Some(path) => std::fs::write(&path, pruned)
            .with_context(|| format!("Failed to write file: {:?}", path))?,
        None => println!("{}", pruned),
    }
    Ok(())
}

fn check() {
    println!("Completion engines");
    println!("==================");
    for (kind, label) in [(EngineKind::OpenAi, "openai"), (EngineKind::Anthropic, "anthropic")] {
        match EngineConfig::from_env(kind) {
            Ok(config) => println!(
                "{}: configured (model {}, {})",
                label, config.model, config.base_url
            ),
            Err(e) => println!("{}: not configured ({})", label, e),
        }
    }
}
