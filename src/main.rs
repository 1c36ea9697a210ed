//! `image-from-url` CLI - load an image from a URL the way the host node does.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_from_url::{image::save_batch, registry, LoadImageFromUrlNode, NodeInputs};

/// Fetch an image from a URL and report the resulting image and mask batches.
#[derive(Parser, Debug)]
#[command(name = "image-from-url")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image URL (http or https).
    #[arg(value_name = "URL", required_unless_present = "describe")]
    url: Option<String>,

    /// Request timeout in seconds (1-120).
    #[arg(short, long, default_value = "30", value_name = "SECS")]
    timeout: i64,

    /// Proxy used for both HTTP and HTTPS.
    #[arg(short, long, value_name = "URL")]
    proxy: Option<String>,

    /// Directory to write each image frame to as PNG.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the registered node descriptors as JSON and exit.
    #[arg(long)]
    describe: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("image_from_url={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    if args.describe {
        let json = serde_json::to_string_pretty(registry()).context("Failed to encode registry")?;
        println!("{json}");
        return Ok(());
    }

    let inputs = NodeInputs {
        url: args.url.clone().unwrap_or_default(),
        timeout: args.timeout,
        proxy: args.proxy.clone(),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message(format!("Loading {}", inputs.url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = LoadImageFromUrlNode::new().execute(&inputs);
    spinner.finish_and_clear();

    let batch = result.with_context(|| format!("Failed to load image from {}", inputs.url))?;

    println!("frames: {}", batch.len());
    println!("image:  {:?}", batch.image.shape());
    println!("mask:   {:?}", batch.mask.shape());

    if let Some(dir) = &args.output {
        let paths = save_batch(&batch.image, dir).context("Failed to save frames")?;
        for path in paths {
            println!("saved:  {}", path.display());
        }
    }

    Ok(())
}
