//! Command-line front end: analyzes one subsidy announcement or a batch of
//! BDNS codes and prints the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subsidy_analyzer::analysis::format_territorial_distribution;
use subsidy_analyzer::config::{default_config_path, load_config, validate_config, Config};
use subsidy_analyzer::{build_model, CompletionModel, Pipeline, PipelineConfig, RunResult};

/// Number of trailing log lines shown in text output.
const LOG_TAIL: usize = 3;

#[derive(Parser)]
#[command(name = "subsidy-analyzer")]
#[command(about = "Extract structured requirements from public subsidy announcements")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model name, overriding the config file
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory for downloaded PDFs and analysis artifacts
    #[arg(long, global = true)]
    download_dir: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print results as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single announcement
    Analyze(AnalyzeArgs),

    /// Analyze several BDNS codes one after another
    Batch {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AnalyzeArgs {
    /// BDNS code of the announcement
    #[arg(long)]
    code: Option<String>,

    /// Announcement URL ending in its BDNS code
    #[arg(long)]
    url: Option<String>,

    /// JSON file with subsidy data (must carry a code or a source_url)
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = resolve_config(&cli)?;
    let model: Arc<dyn CompletionModel> = Arc::from(
        build_model(&config.model)
            .with_context(|| format!("Failed to set up model '{}'", config.model.name))?,
    );
    let pipeline = Pipeline::from_config(Arc::new(PipelineConfig::from_config(&config)), model)
        .context("Failed to build pipeline")?;

    let all_succeeded = match &cli.command {
        Commands::Analyze(args) => {
            let result = run_analyze(&pipeline, args)?;
            if cli.json {
                print_json(&result)?;
            } else {
                display_result(&result);
            }
            result.success
        }
        Commands::Batch { codes } => run_batch(&pipeline, codes, cli.json)?,
    };

    if !all_succeeded {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for results
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Explicit `--config`, else the default location if it exists, else
/// built-in defaults. Command-line overrides are applied last.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using default config file");
                load_config(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            }
            None => Config::default(),
        },
    };

    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(dir) = &cli.download_dir {
        config.download_directory = dir.clone();
    }
    validate_config(&config).context("Invalid command-line override")?;

    Ok(config)
}

fn run_analyze(pipeline: &Pipeline, args: &AnalyzeArgs) -> Result<RunResult> {
    if let Some(code) = &args.code {
        return Ok(pipeline.analyze_identifier(code));
    }
    if let Some(url) = &args.url {
        return Ok(pipeline.analyze_url(url));
    }
    if let Some(path) = &args.data {
        return Ok(pipeline.analyze_data(read_data_file(path)?));
    }

    bail!("One of --code, --url or --data is required")
}

fn read_data_file(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn run_batch(pipeline: &Pipeline, codes: &[String], json: bool) -> Result<bool> {
    let mut results = Vec::with_capacity(codes.len());

    for (index, code) in codes.iter().enumerate() {
        tracing::info!(code = %code, position = index + 1, total = codes.len(), "Batch item");
        let result = pipeline.analyze_identifier(code);
        if !json {
            println!("{}", batch_line(code, &result));
        }
        results.push(result);
    }

    let summary = BatchSummary::from_results(&results);

    if json {
        print_json(&results)?;
    } else {
        println!();
        summary.print();
    }

    Ok(summary.failed == 0)
}

struct BatchSummary {
    total: usize,
    succeeded: usize,
    failed: usize,
    total_time: f64,
    total_documents: usize,
}

impl BatchSummary {
    fn from_results(results: &[RunResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            total_time: results.iter().map(|r| r.processing_time).sum(),
            total_documents: results.iter().map(|r| r.document_count).sum(),
        }
    }

    fn average_time(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.total_time / self.total as f64
        }
    }

    fn print(&self) {
        println!("Batch summary");
        println!("  Total:      {}", self.total);
        println!("  Succeeded:  {}", self.succeeded);
        println!("  Failed:     {}", self.failed);
        println!("  Total time: {:.2}s", self.total_time);
        println!("  Documents:  {}", self.total_documents);
        println!("  Average:    {:.2}s per code", self.average_time());
    }
}

fn batch_line(code: &str, result: &RunResult) -> String {
    if result.success {
        format!(
            "[ok]   {} ({} PDFs, {:.1}s)",
            code, result.document_count, result.processing_time
        )
    } else {
        format!(
            "[fail] {}: {}",
            code,
            result.error.as_deref().unwrap_or("unknown error")
        )
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_result(result: &RunResult) {
    if result.success {
        println!("Analysis succeeded");
    } else {
        println!(
            "Analysis failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!("Processing time: {:.2}s", result.processing_time);
    println!("Documents processed: {}", result.document_count);

    if let Some(analysis) = &result.analysis_result {
        println!();
        println!("Issuing body: {}", analysis.identification.issuing_body);
        println!("Title: {}", analysis.identification.title);
        println!("Total budget: {}", analysis.economic_conditions.total_budget);
        println!(
            "{}",
            format_territorial_distribution(
                analysis.economic_conditions.territorial_distribution.as_ref()
            )
        );
    } else if result.raw_analysis.is_some() {
        println!();
        println!("Model output did not match the expected structure; raw output kept");
    }

    if let Some(path) = &result.artifact_path {
        println!("Saved to: {}", path.display());
    }

    if !result.logs.is_empty() {
        println!();
        println!("Last log entries:");
        let skip = result.logs.len().saturating_sub(LOG_TAIL);
        for line in &result.logs[skip..] {
            println!("  {}", line);
        }
    }
}
