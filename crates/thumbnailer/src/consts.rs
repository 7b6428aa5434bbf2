use std::time::Duration;

pub const THUMBNAIL_DEFAULT_WIDTH: u32 = 400;

pub const THUMBNAIL_DEFAULT_HEIGHT: u32 = 300;

/// Where in the video we grab the frame used as thumbnail.
pub const VIDEO_SEEK_OFFSET: Duration = Duration::from_secs(3);

/// Resolution used when rasterizing the first page of a PDF.
///
/// Lowering it helps when rendering huge pages runs out of memory.
pub const PDF_RENDER_DPI: u16 = 100;

/// PDF user space unit, 1/72 of an inch.
pub(crate) const PDF_POINTS_PER_INCH: f32 = 72.0;

/// How much time we allow an external tool (transcoder, office engine) to run before we give up.
pub const EXTERNAL_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// The maximum file size that a source can be in order to be decoded in memory.
///
/// This value is in MiB.
pub const GENERIC_MAXIMUM_FILE_SIZE: u64 = MIB * 24;

/// Entry holding the pre-rendered preview inside OpenDocument/StarOffice packages.
pub const EMBEDDED_THUMBNAIL_ENTRY: &str = "Thumbnails/thumbnail.png";

pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

pub const DEFAULT_FFPROBE_PATH: &str = "ffprobe";

pub const DEFAULT_SOFFICE_PATH: &str = "soffice";

/// The size of 1MiB in bytes
const MIB: u64 = 1_048_576;
