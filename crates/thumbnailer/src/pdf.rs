use crate::{
	config::ThumbnailerConfig,
	consts::PDF_POINTS_PER_INCH,
	diagnostics::Diagnostics,
	error::{Error, Result},
	handler::{Thumbnailer, ThumbnailerBase},
	media::{MediaAsset, RasterFrame},
	media_type::{MediaCategory, MediaType},
};

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use async_trait::async_trait;
use image::RgbaImage;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};
use tokio::task::spawn_blocking;
use tracing::{error, instrument, trace};

/// Bound once per process, by the first render that needs it.
static PDFIUM: OnceCell<Option<Pdfium>> = OnceCell::new();

fn pdfium(library_dir: Option<&Path>) -> Option<&'static Pdfium> {
	PDFIUM
		.get_or_init(|| {
			library_dir
				.map_or_else(
					Pdfium::bind_to_system_library,
					|dir| {
						let dir = dir.to_string_lossy().into_owned();
						Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
							.or_else(|_| Pdfium::bind_to_system_library())
					},
				)
				.map(Pdfium::new)
				.map_err(|err| error!("Failed to bind to pdfium: {err:#?}"))
				.ok()
		})
		.as_ref()
}

/// Rasterizes the first page of a PDF with pdfium.
#[derive(Debug)]
pub struct PdfThumbnailer {
	base: ThumbnailerBase,
	accepted: Vec<String>,
	library_dir: Option<PathBuf>,
	dpi: u16,
}

impl PdfThumbnailer {
	pub fn new(config: &ThumbnailerConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			base: ThumbnailerBase::new(diagnostics),
			accepted: MediaType::of_category(MediaCategory::Pdf)
				.map(|media_type| media_type.as_str().to_string())
				.collect(),
			library_dir: config.pdfium_library_dir.clone(),
			dpi: config.pdf_render_dpi,
		}
	}
}

fn render_first_page(library_dir: Option<&Path>, path: &Path, dpi: u16) -> Result<RasterFrame> {
	let pdfium = pdfium(library_dir).ok_or(Error::RendererUnavailable)?;

	// Page sizes are in points, so this gives us `dpi` pixels per inch
	let render_config =
		PdfRenderConfig::new().scale_page_by_factor(f32::from(dpi) / PDF_POINTS_PER_INCH);

	// Pdfium will only load the portions of the document it actually needs into memory.
	let document = pdfium.load_pdf_from_file(path, None)?;
	let page = document.pages().first()?;

	trace!(width = ?page.width(), height = ?page.height(), "Rendering first page");

	let bitmap = page.render_with_config(&render_config)?;

	frame_from_rgba(bitmap.width(), bitmap.height(), bitmap.as_bytes().to_vec())
}

/// Pdfium hands back plain RGBA rows, we wrap them without going through its `image` types.
fn frame_from_rgba<D>(width: D, height: D, pixels: Vec<u8>) -> Result<RasterFrame>
where
	u32: TryFrom<D>,
{
	let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
		return Err(Error::decode("pdf page", "rendered bitmap has negative dimensions"));
	};

	RgbaImage::from_raw(width, height, pixels)
		.ok_or_else(|| Error::decode("pdf page", "rendered bitmap is smaller than its dimensions"))
		.and_then(RasterFrame::new)
}

#[async_trait]
impl Thumbnailer for PdfThumbnailer {
	fn name(&self) -> &'static str {
		"pdf"
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
		let library_dir = self.library_dir.clone();
		let path = asset.path().to_path_buf();
		let dpi = self.dpi;

		spawn_blocking(move || render_first_page(library_dir.as_deref(), &path, dpi)).await?
	}
}
