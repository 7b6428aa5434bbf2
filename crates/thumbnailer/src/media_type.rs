//! Closed table of the literal MIME type strings the thumbnailers are registered for.
//!
//! Vendor types show up both truncated and fully qualified
//! (`...wordprocessingml` vs `...wordprocessingml.document`), they are kept as
//! separate entries and no prefix matching is ever done.

use std::str::FromStr;

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
	Pdf,
	WordProcessing,
	Spreadsheet,
	Presentation,
	Video,
	OpenDocument,
	Archive,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("unknown media type: '{0}'")]
pub struct UnknownMediaType(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, strum::EnumString)]
pub enum MediaType {
	#[strum(serialize = "application/pdf")]
	ApplicationPdf,

	#[strum(serialize = "application/msword")]
	MsWord,
	#[strum(serialize = "application/vnd.openxmlformats-officedocument.wordprocessingml")]
	OpenXmlWord,
	#[strum(serialize = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
	OpenXmlWordDocument,
	#[strum(serialize = "application/vnd.ms-excel")]
	MsExcel,
	#[strum(serialize = "application/vnd.openxmlformats-officedocument.spreadsheetml")]
	OpenXmlSpreadsheet,
	#[strum(serialize = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")]
	OpenXmlSpreadsheetSheet,
	#[strum(serialize = "application/vnd.openxmlformats-officedocument.presentationml")]
	OpenXmlPresentation,
	#[strum(
		serialize = "application/vnd.openxmlformats-officedocument.presentationml.presentation"
	)]
	OpenXmlPresentationPresentation,

	#[strum(serialize = "application/vnd.ms-asf")]
	MsAdvancedSystemsFormat,
	#[strum(serialize = "application/ffmpeg")]
	FfMpeg,
	#[strum(serialize = "video/x-msvideo")]
	VideoMsVideo,
	#[strum(serialize = "video/x-flv")]
	VideoFlv,
	#[strum(serialize = "video/webm")]
	VideoWebm,
	#[strum(serialize = "video/mpeg")]
	VideoMpeg,
	#[strum(serialize = "video/x-m4v")]
	VideoM4v,
	#[strum(serialize = "video/mp4")]
	VideoMp4,
	#[strum(serialize = "video/ogg")]
	VideoOgg,
	#[strum(serialize = "video/x-matroska")]
	VideoMatroska,
	#[strum(serialize = "video/quicktime")]
	VideoQuicktime,

	#[strum(serialize = "application/vnd.sun.xml.writer")]
	SunXmlWriter,
	#[strum(serialize = "application/vnd.sun.xml.writer.template")]
	SunXmlWriterTemplate,
	#[strum(serialize = "application/vnd.sun.xml.writer.global")]
	SunXmlWriterGlobal,
	#[strum(serialize = "application/vnd.sun.xml.calc")]
	SunXmlCalc,
	#[strum(serialize = "application/vnd.sun.xml.calc.template")]
	SunXmlCalcTemplate,
	#[strum(serialize = "application/vnd.stardivision.calc")]
	StarDivisionCalc,
	#[strum(serialize = "application/vnd.sun.xml.impress")]
	SunXmlImpress,
	#[strum(serialize = "application/vnd.sun.xml.impress.template")]
	SunXmlImpressTemplate,
	#[strum(serialize = "application/vnd.stardivision.impress")]
	StarDivisionImpress,
	#[strum(serialize = "application/vnd.sun.xml.draw")]
	SunXmlDraw,
	#[strum(serialize = "application/vnd.sun.xml.draw.template")]
	SunXmlDrawTemplate,
	#[strum(serialize = "application/vnd.stardivision.draw")]
	StarDivisionDraw,
	#[strum(serialize = "application/vnd.sun.xml.math")]
	SunXmlMath,
	#[strum(serialize = "application/vnd.stardivision.math")]
	StarDivisionMath,
	#[strum(serialize = "application/vnd.oasis.opendocument.text")]
	OpenDocumentText,
	#[strum(serialize = "application/vnd.oasis.opendocument.text-template")]
	OpenDocumentTextTemplate,
	#[strum(serialize = "application/vnd.oasis.opendocument.text-web")]
	OpenDocumentTextWeb,
	#[strum(serialize = "application/vnd.oasis.opendocument.text-master")]
	OpenDocumentTextMaster,
	#[strum(serialize = "application/vnd.oasis.opendocument.graphics")]
	OpenDocumentGraphics,
	#[strum(serialize = "application/vnd.oasis.opendocument.graphics-template")]
	OpenDocumentGraphicsTemplate,
	#[strum(serialize = "application/vnd.oasis.opendocument.presentation")]
	OpenDocumentPresentation,
	#[strum(serialize = "application/vnd.oasis.opendocument.presentation-template")]
	OpenDocumentPresentationTemplate,
	#[strum(serialize = "application/vnd.oasis.opendocument.spreadsheet")]
	OpenDocumentSpreadsheet,
	#[strum(serialize = "application/vnd.oasis.opendocument.spreadsheet-template")]
	OpenDocumentSpreadsheetTemplate,
	#[strum(serialize = "application/vnd.oasis.opendocument.chart")]
	OpenDocumentChart,
	#[strum(serialize = "application/vnd.oasis.opendocument.formula")]
	OpenDocumentFormula,
	#[strum(serialize = "application/vnd.oasis.opendocument.database")]
	OpenDocumentDatabase,
	#[strum(serialize = "application/vnd.oasis.opendocument.image")]
	OpenDocumentImage,

	// Could be an OpenOffice file, so the archive thumbnailer takes it as a last resort
	#[strum(serialize = "application/zip")]
	Zip,
}

impl MediaType {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		self.into()
	}

	/// Every media type of `category`, in table order.
	pub fn of_category(category: MediaCategory) -> impl Iterator<Item = Self> {
		Self::iter().filter(move |media_type| media_type.category() == category)
	}

	#[must_use]
	pub const fn category(self) -> MediaCategory {
		use MediaType::*;

		match self {
			ApplicationPdf => MediaCategory::Pdf,
			MsWord | OpenXmlWord | OpenXmlWordDocument => MediaCategory::WordProcessing,
			MsExcel | OpenXmlSpreadsheet | OpenXmlSpreadsheetSheet => MediaCategory::Spreadsheet,
			OpenXmlPresentation | OpenXmlPresentationPresentation => MediaCategory::Presentation,
			MsAdvancedSystemsFormat | FfMpeg | VideoMsVideo | VideoFlv | VideoWebm | VideoMpeg
			| VideoM4v | VideoMp4 | VideoOgg | VideoMatroska | VideoQuicktime => MediaCategory::Video,
			Zip => MediaCategory::Archive,
			SunXmlWriter
			| SunXmlWriterTemplate
			| SunXmlWriterGlobal
			| SunXmlCalc
			| SunXmlCalcTemplate
			| StarDivisionCalc
			| SunXmlImpress
			| SunXmlImpressTemplate
			| StarDivisionImpress
			| SunXmlDraw
			| SunXmlDrawTemplate
			| StarDivisionDraw
			| SunXmlMath
			| StarDivisionMath
			| OpenDocumentText
			| OpenDocumentTextTemplate
			| OpenDocumentTextWeb
			| OpenDocumentTextMaster
			| OpenDocumentGraphics
			| OpenDocumentGraphicsTemplate
			| OpenDocumentPresentation
			| OpenDocumentPresentationTemplate
			| OpenDocumentSpreadsheet
			| OpenDocumentSpreadsheetTemplate
			| OpenDocumentChart
			| OpenDocumentFormula
			| OpenDocumentDatabase
			| OpenDocumentImage => MediaCategory::OpenDocument,
		}
	}

	/// Exact, case-sensitive lookup.
	pub fn lookup(mime_type: &str) -> Result<Self, UnknownMediaType> {
		Self::from_str(mime_type).map_err(|_| UnknownMediaType(mime_type.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_the_literal_table() {
		for media_type in MediaType::iter() {
			assert_eq!(MediaType::lookup(media_type.as_str()), Ok(media_type));
		}
	}

	#[test]
	fn every_literal_is_registered_once() {
		let mut seen = std::collections::HashSet::new();
		for media_type in MediaType::iter() {
			assert!(seen.insert(media_type.as_str()), "{}", media_type.as_str());
		}

		assert_eq!(
			MediaType::of_category(MediaCategory::Video)
				.filter(|media_type| media_type.as_str() == "video/mpeg")
				.count(),
			1
		);
	}

	#[test]
	fn truncated_and_full_vendor_types_are_distinct() {
		let truncated =
			MediaType::lookup("application/vnd.openxmlformats-officedocument.wordprocessingml")
				.unwrap();
		let full = MediaType::lookup(
			"application/vnd.openxmlformats-officedocument.wordprocessingml.document",
		)
		.unwrap();

		assert_ne!(truncated, full);
		assert_eq!(truncated.category(), full.category());
	}

	#[test]
	fn lookup_is_exact() {
		assert!(MediaType::lookup("APPLICATION/PDF").is_err());
		assert!(MediaType::lookup("application/pdf ").is_err());
		assert_eq!(
			MediaType::lookup("application/octet-stream"),
			Err(UnknownMediaType("application/octet-stream".into()))
		);
	}

	#[test]
	fn categories_partition_the_table() {
		assert_eq!(MediaType::of_category(MediaCategory::Pdf).count(), 1);
		assert_eq!(MediaType::of_category(MediaCategory::Video).count(), 11);
		assert_eq!(MediaType::of_category(MediaCategory::OpenDocument).count(), 28);
		assert_eq!(
			MediaType::of_category(MediaCategory::Archive).collect::<Vec<_>>(),
			vec![MediaType::Zip]
		);
	}
}
