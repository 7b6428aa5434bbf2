//! Fits any decoded frame onto a fixed-size white canvas.
//!
//! The frame is scaled down (never up) keeping its aspect ratio, centered, and the
//! remaining area is left opaque white. Every thumbnailer output goes through here,
//! so thumbnails share the same geometry whatever the source orientation was.

use crate::{
	error::{Error, Result},
	media::{RasterFrame, Thumbnail, ThumbnailSpec},
};

use std::io::Cursor;

use image::{
	imageops::{self, FilterType},
	DynamicImage, ImageFormat, Rgba, RgbaImage,
};

const CANVAS_BACKGROUND: Rgba<u8> = Rgba([u8::MAX, u8::MAX, u8::MAX, u8::MAX]);

/// Placement of a scaled frame inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
	pub scaled_width: u32,
	pub scaled_height: u32,
	pub offset_x: u32,
	pub offset_y: u32,
}

impl Scale {
	#[allow(
		clippy::cast_possible_truncation,
		clippy::cast_sign_loss,
		clippy::as_conversions
	)]
	#[must_use]
	pub fn compute((frame_width, frame_height): (u32, u32), spec: ThumbnailSpec) -> Self {
		let (target_width, target_height) = spec.dimensions();

		let ratio = (f64::from(target_width) / f64::from(frame_width))
			.min(f64::from(target_height) / f64::from(frame_height))
			.min(1.0);

		// Clamped so very thin sources still get a visible line of pixels
		let scaled_width = ((f64::from(frame_width) * ratio).round() as u32).clamp(1, target_width);
		let scaled_height =
			((f64::from(frame_height) * ratio).round() as u32).clamp(1, target_height);

		Self {
			scaled_width,
			scaled_height,
			offset_x: (target_width - scaled_width) / 2,
			offset_y: (target_height - scaled_height) / 2,
		}
	}
}

/// Turns `frame` into a PNG of exactly `spec` dimensions.
///
/// A frame that already has the target dimensions is encoded as is.
pub fn fit(frame: RasterFrame, spec: ThumbnailSpec) -> Result<Thumbnail> {
	let canvas = if frame.dimensions() == spec.dimensions() {
		frame.into_pixels()
	} else {
		paint(frame.pixels(), Scale::compute(frame.dimensions(), spec), spec)
	};

	encode_png(canvas, spec)
}

fn paint(source: &RgbaImage, scale: Scale, spec: ThumbnailSpec) -> RgbaImage {
	let mut canvas = RgbaImage::from_pixel(spec.width(), spec.height(), CANVAS_BACKGROUND);

	let scaled = if (scale.scaled_width, scale.scaled_height) == source.dimensions() {
		source.clone()
	} else {
		// Triangle is the bilinear filter
		imageops::resize(
			source,
			scale.scaled_width,
			scale.scaled_height,
			FilterType::Triangle,
		)
	};

	imageops::overlay(
		&mut canvas,
		&scaled,
		i64::from(scale.offset_x),
		i64::from(scale.offset_y),
	);

	canvas
}

fn encode_png(canvas: RgbaImage, spec: ThumbnailSpec) -> Result<Thumbnail> {
	let mut png = Vec::new();
	DynamicImage::ImageRgba8(canvas)
		.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
		.map_err(Error::Encode)?;

	Ok(Thumbnail::new(png, spec))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn spec(width: u32, height: u32) -> ThumbnailSpec {
		ThumbnailSpec::new(width, height).unwrap()
	}

	fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterFrame {
		RasterFrame::new(RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
	}

	fn decode(thumbnail: &Thumbnail) -> RgbaImage {
		image::load_from_memory(thumbnail.as_png())
			.unwrap()
			.into_rgba8()
	}

	#[test]
	fn exact_downscale_leaves_no_border() {
		let scale = Scale::compute((800, 600), spec(400, 300));
		assert_eq!(
			scale,
			Scale {
				scaled_width: 400,
				scaled_height: 300,
				offset_x: 0,
				offset_y: 0
			}
		);

		let out = decode(&fit(solid(800, 600, [10, 20, 30, 255]), spec(400, 300)).unwrap());
		assert_eq!(out.dimensions(), (400, 300));
		assert_eq!(out.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
		assert_eq!(out.get_pixel(399, 299), &Rgba([10, 20, 30, 255]));
	}

	#[test]
	fn small_sources_are_centered_not_upscaled() {
		let scale = Scale::compute((100, 50), spec(400, 300));
		assert_eq!(
			scale,
			Scale {
				scaled_width: 100,
				scaled_height: 50,
				offset_x: 150,
				offset_y: 125
			}
		);

		let out = decode(&fit(solid(100, 50, [0, 0, 0, 255]), spec(400, 300)).unwrap());
		assert_eq!(out.dimensions(), (400, 300));
		assert_eq!(out.get_pixel(0, 0), &CANVAS_BACKGROUND);
		assert_eq!(out.get_pixel(149, 125), &CANVAS_BACKGROUND);
		assert_eq!(out.get_pixel(150, 125), &Rgba([0, 0, 0, 255]));
		assert_eq!(out.get_pixel(249, 174), &Rgba([0, 0, 0, 255]));
		assert_eq!(out.get_pixel(250, 174), &CANVAS_BACKGROUND);
		assert_eq!(out.get_pixel(249, 175), &CANVAS_BACKGROUND);
	}

	#[test]
	fn matching_frames_pass_through_unchanged() {
		let mut pixels = RgbaImage::new(400, 300);
		for (x, y, pixel) in pixels.enumerate_pixels_mut() {
			*pixel = Rgba([(x % 256) as u8, (y % 256) as u8, 7, 128]);
		}
		let frame = RasterFrame::new(pixels.clone()).unwrap();

		let out = decode(&fit(frame, spec(400, 300)).unwrap());
		assert_eq!(out, pixels);
	}

	#[test]
	fn output_always_matches_target() {
		let targets = [spec(400, 300), spec(64, 64), spec(1, 1), spec(37, 91)];
		let frames = [(1, 1), (3000, 10), (10, 3000), (399, 301), (640, 480), (37, 91)];

		for target in targets {
			for (width, height) in frames {
				let scale = Scale::compute((width, height), target);
				assert!(scale.scaled_width <= width && scale.scaled_height <= height);
				assert!(scale.scaled_width <= target.width());
				assert!(scale.scaled_height <= target.height());

				let right = target.width() - scale.offset_x - scale.scaled_width;
				let bottom = target.height() - scale.offset_y - scale.scaled_height;
				assert!(right.abs_diff(scale.offset_x) <= 1);
				assert!(bottom.abs_diff(scale.offset_y) <= 1);

				let thumbnail = fit(solid(width, height, [1, 2, 3, 255]), target).unwrap();
				assert_eq!(decode(&thumbnail).dimensions(), target.dimensions());
				assert_eq!(thumbnail.spec(), target);
			}
		}
	}

	#[test]
	fn transparent_sources_are_flattened_on_white() {
		let out = decode(&fit(solid(10, 10, [0, 0, 0, 0]), spec(20, 20)).unwrap());
		assert!(out.pixels().all(|pixel| pixel == &CANVAS_BACKGROUND));
	}

	#[test]
	fn thin_sources_keep_at_least_one_pixel() {
		let scale = Scale::compute((10_000, 1), spec(400, 300));
		assert_eq!(scale.scaled_width, 400);
		assert_eq!(scale.scaled_height, 1);
		assert_eq!(scale.offset_y, 149);
	}
}
