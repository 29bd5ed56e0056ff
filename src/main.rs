// Command-line front end: compresses supply-evidence photos and checks the
// session against the auth service. The library in lib.rs carries all logic.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use abastecimento_lib::commands::{compress_batch_to_target, summarize};
use abastecimento_lib::core::{CompressionConfig, CompressionSummary, ImagePayload, SessionContext, TargetSpec};
use abastecimento_lib::processing::Compressor;
use abastecimento_lib::session::{ApiConfig, HttpAuthService, RouteGuard, UserService};
use abastecimento_lib::utils::{
    format_file_size, load_target_spec, output_paths, read_payload, status_class, validate_config,
    validate_file_size, validate_target_spec, validate_total_size, write_payload,
};

#[derive(Parser, Debug)]
#[command(name = "abastecimento", version, about = "Compress supply photos and check sessions before upload")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress each file once (skipped when already under --max-size-kb)
    Compress {
        #[command(flatten)]
        files: FileArgs,
        #[arg(long, default_value_t = 1920)]
        max_width: u32,
        #[arg(long, default_value_t = 1080)]
        max_height: u32,
        /// Lossy quality in (0, 1]
        #[arg(long, default_value_t = 0.8)]
        quality: f32,
        #[arg(long, default_value_t = 2048.0)]
        max_size_kb: f64,
    },
    /// Compress each file toward a size target
    Target {
        #[command(flatten)]
        files: FileArgs,
        /// Target size per file in KB (overrides the settings file)
        #[arg(long)]
        target_kb: Option<f64>,
        /// JSON file with search settings (targetKB, maxWidth, minQuality, ...)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Print the colour class of a supply status code
    Status { code: Option<String> },
    /// Ask the auth service whether navigation to PATH is allowed
    Guard {
        path: String,
        /// Session cookie sent to the auth service, e.g. `SESSION=...`
        #[arg(long, env = "ABASTECIMENTO_COOKIE")]
        cookie: Option<String>,
        /// Also check access to the management tab
        #[arg(long)]
        management: bool,
    },
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Files to compress
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Directory receiving the compressed files
    #[arg(long, default_value = "compressed")]
    out_dir: PathBuf,
    /// Per-file upload limit in KB
    #[arg(long, default_value_t = 5120.0)]
    max_file_kb: f64,
    /// Combined upload limit in KB
    #[arg(long)]
    max_total_kb: Option<f64>,
    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    debug!("{:?}", cli.command);

    match cli.command {
        Command::Compress {
            files,
            max_width,
            max_height,
            quality,
            max_size_kb,
        } => {
            let config = CompressionConfig::new(max_width, max_height, quality, max_size_kb);
            validate_config(&config)?;
            run_compress(&files, &config).await
        }
        Command::Target {
            files,
            target_kb,
            settings,
        } => {
            let mut spec = match settings {
                Some(path) => load_target_spec(&path)
                    .await
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?,
                None => TargetSpec::default(),
            };
            if target_kb.is_some() {
                spec.target_kb = target_kb;
            }
            validate_target_spec(&spec)?;
            if spec.target_bytes().is_none() {
                warn!("No positive target given; files will be copied unchanged");
            }
            run_target(&files, &spec).await
        }
        Command::Status { code } => {
            println!("{}", status_class(code.as_deref()));
            Ok(())
        }
        Command::Guard {
            path,
            cookie,
            management,
        } => run_guard(&path, cookie.as_deref(), management).await,
    }
}

async fn load_all(paths: &[PathBuf]) -> Result<Vec<ImagePayload>> {
    let mut payloads = Vec::with_capacity(paths.len());
    for path in paths {
        let payload = read_payload(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        payloads.push(payload);
    }
    Ok(payloads)
}

async fn run_compress(files: &FileArgs, config: &CompressionConfig) -> Result<()> {
    let originals = load_all(&files.paths).await?;
    let compressor = Compressor::new();

    let mut handles = Vec::with_capacity(originals.len());
    for payload in originals.iter().cloned() {
        let compressor = compressor.clone();
        let config = *config;
        handles.push(tokio::spawn(async move { compressor.compress(&payload, &config).await }));
    }

    let mut outputs = Vec::with_capacity(handles.len());
    let mut summaries = Vec::with_capacity(handles.len());
    for (original, handle) in originals.iter().zip(handles) {
        let compressed = handle
            .await?
            .with_context(|| format!("Failed to compress {}", original.name()))?;
        let within = compressed.size() as f64 <= config.max_size_bytes();
        summaries.push(CompressionSummary::new(original, &compressed, 1, within));
        outputs.push(compressed);
    }

    finish(files, &outputs, &summaries).await
}

async fn run_target(files: &FileArgs, spec: &TargetSpec) -> Result<()> {
    let originals = load_all(&files.paths).await?;
    let compressor = Compressor::new();

    let outcomes = compress_batch_to_target(&compressor, originals.clone(), spec).await;
    let summaries = summarize(&originals, &outcomes);

    let mut outputs = Vec::with_capacity(outcomes.len());
    for (original, outcome) in originals.iter().zip(outcomes) {
        let outcome = outcome.with_context(|| format!("Failed to compress {}", original.name()))?;
        outputs.push(outcome.payload);
    }

    finish(files, &outputs, &summaries).await
}

/// Prints the report, enforces the upload limits and only then writes outputs.
async fn finish(files: &FileArgs, outputs: &[ImagePayload], summaries: &[CompressionSummary]) -> Result<()> {
    if files.json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
    } else {
        for s in summaries {
            println!(
                "{}: {} -> {} ({:.1}% saved, {} attempt(s))",
                s.name,
                format_file_size(s.original_size),
                format_file_size(s.compressed_size),
                s.compression_ratio,
                s.attempts
            );
        }
    }

    check_limits(outputs, files.max_file_kb, files.max_total_kb)?;

    for (payload, target) in outputs.iter().zip(output_paths(&files.out_dir, outputs)) {
        write_payload(&target, payload)
            .await
            .with_context(|| format!("Cannot write {}", target.display()))?;
        debug!("Wrote {}", target.display());
    }

    info!("{} file(s) ready for upload in {}", outputs.len(), files.out_dir.display());
    Ok(())
}

fn check_limits(outputs: &[ImagePayload], max_file_kb: f64, max_total_kb: Option<f64>) -> Result<()> {
    let oversized: Vec<&str> = outputs
        .iter()
        .filter(|p| !validate_file_size(*p, max_file_kb))
        .map(ImagePayload::name)
        .collect();
    if !oversized.is_empty() {
        bail!("Files above the {} limit: {}", format_file_size((max_file_kb * 1024.0) as u64), oversized.join(", "));
    }

    if let Some(max_total_kb) = max_total_kb {
        if !validate_total_size(outputs, max_total_kb) {
            let total: u64 = outputs.iter().map(ImagePayload::size).sum();
            bail!(
                "Combined size {} exceeds the {} upload limit",
                format_file_size(total),
                format_file_size((max_total_kb * 1024.0) as u64)
            );
        }
    }

    Ok(())
}

async fn run_guard(path: &str, cookie: Option<&str>, management: bool) -> Result<()> {
    let config = ApiConfig::from_env();
    let session = Arc::new(SessionContext::new());
    let auth = Arc::new(HttpAuthService::new(config.clone(), cookie)?);

    let guard = RouteGuard::new(Arc::clone(&auth), Arc::clone(&session), config.clone());
    let navigation = guard.before_each(path).await;
    println!("{}", serde_json::to_string_pretty(&navigation)?);

    if management && navigation.is_allowed() {
        let users = UserService::new(auth, Arc::clone(&session), config);
        let allowed = users.check_management_access().await;
        println!("management access: {allowed}");
    }

    if let Some(driver) = session.current_driver_id().await {
        info!("Signed in as driver {}", driver);
    }
    session.clear().await;
    Ok(())
}
