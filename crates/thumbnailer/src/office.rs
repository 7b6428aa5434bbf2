use crate::{
	config::ThumbnailerConfig,
	diagnostics::Diagnostics,
	error::{Error, FileIOError, Result},
	handler::{Thumbnailer, ThumbnailerBase},
	media::{MediaAsset, RasterFrame},
	media_type::{MediaCategory, MediaType},
	process::ExternalTool,
};

use std::{
	ffi::OsString,
	path::{Path, PathBuf},
	sync::Arc,
};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::{fs, task::spawn_blocking};
use tracing::{instrument, trace};
use uuid::Uuid;

/// Which office engine export filter renders a given family of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeConverter {
	Document,
	Spreadsheet,
	Presentation,
}

impl OfficeConverter {
	pub fn for_media_type(media_type: MediaType) -> Option<Self> {
		match media_type.category() {
			MediaCategory::WordProcessing => Some(Self::Document),
			MediaCategory::Spreadsheet => Some(Self::Spreadsheet),
			MediaCategory::Presentation => Some(Self::Presentation),
			_ => None,
		}
	}

	#[must_use]
	pub const fn export_filter(self) -> &'static str {
		match self {
			Self::Document => "png:writer_png_Export",
			Self::Spreadsheet => "png:calc_png_Export",
			Self::Presentation => "png:impress_png_Export",
		}
	}
}

/// Renders Microsoft Office documents through a headless office engine (`soffice`).
#[derive(Debug)]
pub struct OfficeThumbnailer {
	base: ThumbnailerBase,
	accepted: Vec<String>,
	soffice: ExternalTool,
	scratch_dir: Option<PathBuf>,
}

impl OfficeThumbnailer {
	pub fn new(config: &ThumbnailerConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			base: ThumbnailerBase::new(diagnostics),
			accepted: [
				MediaCategory::WordProcessing,
				MediaCategory::Spreadsheet,
				MediaCategory::Presentation,
			]
			.into_iter()
			.flat_map(MediaType::of_category)
			.map(|media_type| media_type.as_str().to_string())
			.collect(),
			soffice: ExternalTool::new(&config.soffice_path, config.tool_timeout()),
			scratch_dir: config.scratch_dir.clone(),
		}
	}

	fn working_dir(&self) -> Result<TempDir> {
		let mut builder = tempfile::Builder::new();
		builder.prefix("sd-office-");

		match &self.scratch_dir {
			Some(dir) => builder
				.tempdir_in(dir)
				.map_err(|e| FileIOError::from((dir, e, "creating office working directory")).into()),
			None => builder.tempdir().map_err(|e| {
				FileIOError::from((std::env::temp_dir(), e, "creating office working directory"))
					.into()
			}),
		}
	}

	async fn convert(
		&self,
		converter: OfficeConverter,
		source: &Path,
		working_dir: &Path,
	) -> Result<Vec<u8>> {
		// The engine names its output after the input, so the copy gets a name we control
		let stem = Uuid::new_v4().to_string();
		let mut copy_name = OsString::from(&stem);
		if let Some(extension) = source.extension() {
			copy_name.push(".");
			copy_name.push(extension);
		}
		let copy = working_dir.join(copy_name);

		fs::copy(source, &copy)
			.await
			.map_err(|e| FileIOError::from((source, e, "copying office document")))?;

		let profile = OsString::from(format!(
			"-env:UserInstallation=file://{}",
			working_dir.join("profile").display()
		));

		let args: Vec<OsString> = vec![
			profile,
			"--headless".into(),
			"--norestore".into(),
			"--convert-to".into(),
			converter.export_filter().into(),
			"--outdir".into(),
			working_dir.into(),
			copy.into(),
		];

		trace!(?converter, "Converting office document");
		self.soffice.run(args).await?;

		let rendition = working_dir.join(format!("{stem}.png"));
		match fs::read(&rendition).await {
			Ok(data) if !data.is_empty() => Ok(data),
			Ok(_) => Err(Error::external_tool(
				self.soffice.program(),
				"produced an empty rendition",
			)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::external_tool(
				self.soffice.program(),
				"did not produce a rendition",
			)),
			Err(e) => Err(FileIOError::from((rendition, e, "reading office rendition")).into()),
		}
	}
}

#[async_trait]
impl Thumbnailer for OfficeThumbnailer {
	fn name(&self) -> &'static str {
		"office"
	}

	fn base(&self) -> &ThumbnailerBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ThumbnailerBase {
		&mut self.base
	}

	fn accepted_mime_types(&self) -> &[String] {
		&self.accepted
	}

	#[instrument(skip_all, fields(path = %asset.path().display()))]
	async fn generate(&self, asset: &MediaAsset) -> Result<RasterFrame> {
		let converter = asset
			.mime_type()
			.and_then(|mime| MediaType::lookup(mime).ok())
			.and_then(OfficeConverter::for_media_type)
			.ok_or_else(|| Error::UnsupportedMimeType(asset.mime_type().map(ToString::to_string)))?;

		// Removed with everything the engine wrote into it when dropped
		let working_dir = self.working_dir()?;

		let data = self
			.convert(converter, asset.path(), working_dir.path())
			.await?;

		spawn_blocking(move || {
			RasterFrame::decode(&data).map_err(|e| match e {
				Error::Image(e) => Error::decode("office rendition", e.to_string()),
				other => other,
			})
		})
		.await?
	}
}
