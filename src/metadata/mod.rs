//! Metadata reading and detection.
//!
//! This module provides two entry points:
//!
//! - [`read_metadata`] — Read the interesting EXIF tags (camera, software,
//!   author, GPS) so they can be shown before cleaning
//! - [`detect_blocks`] — Report which metadata blocks (EXIF, ICC, XMP, IPTC,
//!   text) a JPEG, PNG or WebP container carries
//!
//! The scrubber uses [`detect_blocks`] to verify that a cleaned file came out
//! clean.

mod blocks;
mod reader;

pub use blocks::{MetadataBlocks, detect_blocks, detect_blocks_in};
pub use reader::{MetadataSummary, read_metadata};
