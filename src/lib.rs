//! # metaclean
//!
//! Metadata sanitizer — strip EXIF, ICC profiles, XMP, IPTC and text chunks
//! from images by rebuilding them from pixel data alone.
//!
//! The source file is never edited. Its pixels are decoded, copied into a
//! fresh image that never saw the original container, and encoded to a new
//! file (`photo.jpg` → `photo_cleaned.jpg` by default).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metaclean::config::Config;
//! use metaclean::pipeline::collect_directory_images;
//! use metaclean::report::status_line;
//! use metaclean::scrub::scrub_image;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("metaclean.json".as_ref()))?;
//!
//!     // Non-recursive listing filtered by the extension allow-list
//!     let images = collect_directory_images(Path::new("./photos"), &config.scan.extensions)?;
//!
//!     for path in &images {
//!         let result = scrub_image(path, None, &config.output);
//!         println!("{}", status_line(&result));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Extensions | Blocks that are dropped |
//! |--------|-----------|-------------------------|
//! | JPEG | `.jpg`, `.jpeg` | APP1 EXIF/XMP, APP2 ICC, APP13 IPTC, comments |
//! | PNG | `.png` | `eXIf`, `iCCP`, `tEXt`, `iTXt`, `zTXt` |
//! | WebP | `.webp` | `EXIF`, `ICCP`, `XMP ` |
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`metadata`] — EXIF tag reading and metadata block detection
//! - [`pipeline`] — Image kind detection and directory collection
//! - [`report`] — Banner and status line formatting
//! - [`scrub`] — Rebuilding an image from its pixels and writing the clean copy

pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod scrub;
