use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sd_thumbnailer::{Dispatcher, FileSink, MediaAsset, ThumbnailerConfig, TracingDiagnostics};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
	name = "sd-thumbnailer",
	about = "Generate a fixed-size PNG thumbnail for an image, video, PDF or office document"
)]
struct Cli {
	/// File to generate the thumbnail for
	#[arg(required_unless_present = "list_mime_types")]
	input: Option<PathBuf>,

	/// Where the PNG thumbnail is written
	#[arg(short, long, required_unless_present = "list_mime_types")]
	output: Option<PathBuf>,

	/// Declared MIME type of the input, guessed from its extension when missing
	#[arg(long)]
	mime_type: Option<String>,

	/// JSON configuration file
	#[arg(long)]
	config: Option<PathBuf>,

	/// Thumbnail width, overrides the configuration file
	#[arg(long)]
	width: Option<u32>,

	/// Thumbnail height, overrides the configuration file
	#[arg(long)]
	height: Option<u32>,

	/// Print every MIME type a thumbnailer is registered for and exit
	#[arg(long, default_value_t = false)]
	list_mime_types: bool,
}

async fn load_config(cli: &Cli) -> Result<ThumbnailerConfig> {
	let mut config = match &cli.config {
		Some(path) => {
			let raw = tokio::fs::read(path)
				.await
				.with_context(|| format!("failed to read config file '{}'", path.display()))?;
			serde_json::from_slice(&raw)
				.with_context(|| format!("failed to parse config file '{}'", path.display()))?
		}
		None => ThumbnailerConfig::default(),
	};

	if let Some(width) = cli.width {
		config.width = width;
	}
	if let Some(height) = cli.height {
		config.height = height;
	}

	Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let config = load_config(&cli).await?;
	debug!(?config, "Loaded configuration");

	let dispatcher = Dispatcher::new(&config, Arc::new(TracingDiagnostics))
		.context("invalid thumbnailer configuration")?;

	if cli.list_mime_types {
		for mime_type in dispatcher.accepted_mime_types() {
			println!("{mime_type}");
		}
		dispatcher.release();
		return Ok(());
	}

	let (Some(input), Some(output)) = (cli.input, cli.output) else {
		bail!("both an input file and an output path are required");
	};

	let mime_type = cli.mime_type.or_else(|| {
		mime_guess::from_path(&input)
			.first_raw()
			.map(ToString::to_string)
	});
	let asset = MediaAsset::new(&input, mime_type.as_deref());

	let res = dispatcher
		.generate_into(&asset, &mut FileSink::new(&output))
		.await;
	dispatcher.release();

	let spec = res
		.with_context(|| format!("failed to generate a thumbnail for '{}'", input.display()))?;

	info!(
		input = %input.display(),
		output = %output.display(),
		?mime_type,
		width = spec.width(),
		height = spec.height(),
		"Thumbnail written"
	);

	Ok(())
}
