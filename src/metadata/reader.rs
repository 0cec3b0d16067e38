use anyhow::{Context, Result};
use nom_exif::*;
use serde::Serialize;
use std::path::Path;

// IFD0 / Exif IFD tag IDs
const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_X_RESOLUTION: u16 = 0x011A;
const TAG_Y_RESOLUTION: u16 = 0x011B;
const TAG_SOFTWARE: u16 = 0x0131;
const TAG_DATE_TIME: u16 = 0x0132;
const TAG_ARTIST: u16 = 0x013B;
const TAG_COPYRIGHT: u16 = 0x8298;
const TAG_EXIF_VERSION: u16 = 0x9000;

/// The identifying EXIF tags found in an image.
///
/// Only the tags that tend to leak something about the photographer or the
/// device are collected. Everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub date_time: Option<String>,
    pub artist: Option<String>,
    pub copyright: Option<String>,
    pub exif_version: Option<String>,
    pub x_resolution: Option<String>,
    pub y_resolution: Option<String>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

impl MetadataSummary {
    /// True when none of the tags were found.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// The tags that were found, as `(tag name, display value)` pairs in a
    /// fixed order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let text_fields = [
            ("Make", &self.make),
            ("Model", &self.model),
            ("Software", &self.software),
            ("DateTime", &self.date_time),
            ("Artist", &self.artist),
            ("Copyright", &self.copyright),
            ("ExifVersion", &self.exif_version),
            ("XResolution", &self.x_resolution),
            ("YResolution", &self.y_resolution),
        ];

        let mut entries: Vec<(&'static str, String)> = text_fields
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name, v.clone())))
            .collect();

        if let Some(lat) = self.gps_latitude {
            entries.push(("GPSLatitude", format!("{lat:.6}")));
        }
        if let Some(lon) = self.gps_longitude {
            entries.push(("GPSLongitude", format!("{lon:.6}")));
        }

        entries
    }
}

/// Read the identifying EXIF tags from an image file.
///
/// An image without EXIF, or in a container nom-exif does not recognize,
/// yields an empty summary. Only a missing or unreadable file is an error.
pub fn read_metadata(path: &Path) -> Result<MetadataSummary> {
    std::fs::metadata(path).context("Failed to open image file")?;

    let ms = match MediaSource::file_path(path) {
        Ok(ms) => ms,
        Err(e) => {
            log::debug!("Unrecognized container for EXIF in {}: {e}", path.display());
            return Ok(MetadataSummary::default());
        }
    };

    let mut parser = MediaParser::new();
    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(e) => {
            log::debug!("No EXIF data found in {}: {e}", path.display());
            return Ok(MetadataSummary::default());
        }
    };

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let tag = |code: u16| exif.get_by_ifd_tag_code(0, code).and_then(entry_to_string);

    let mut summary = MetadataSummary {
        make: tag(TAG_MAKE),
        model: tag(TAG_MODEL),
        software: tag(TAG_SOFTWARE),
        date_time: tag(TAG_DATE_TIME),
        artist: tag(TAG_ARTIST),
        copyright: tag(TAG_COPYRIGHT),
        exif_version: tag(TAG_EXIF_VERSION),
        x_resolution: tag(TAG_X_RESOLUTION),
        y_resolution: tag(TAG_Y_RESOLUTION),
        ..MetadataSummary::default()
    };

    if let Some(gps) = gps_info {
        summary.gps_latitude = Some(latlng_to_decimal(&gps.latitude, gps.latitude_ref));
        summary.gps_longitude = Some(latlng_to_decimal(&gps.longitude, gps.longitude_ref));
    }

    Ok(summary)
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').trim_end_matches('\0').trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    dms_to_decimal(
        latlng.0.as_float(),
        latlng.1.as_float(),
        latlng.2.as_float(),
        reference,
    )
}

/// Degrees, minutes and seconds to signed decimal degrees. South and west
/// references are negative.
fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, reference: char) -> f64 {
    let coord = degrees + minutes / 60.0 + seconds / 3600.0;
    match reference.to_ascii_uppercase() {
        'S' | 'W' => -coord,
        _ => coord,
    }
}
