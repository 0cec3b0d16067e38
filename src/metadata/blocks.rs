use anyhow::{Context, Result};
use img_parts::jpeg::{Jpeg, markers};
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF, ImageICC};
use serde::Serialize;
use std::path::Path;

use crate::pipeline::ImageKind;

const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const XMP_EXTENSION_HEADER: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";
const IPTC_HEADER: &[u8] = b"Photoshop 3.0\0";
const PNG_XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp\0";

const PNG_TEXT_CHUNKS: [[u8; 4]; 3] = [*b"tEXt", *b"iTXt", *b"zTXt"];
const WEBP_XMP_CHUNK: [u8; 4] = *b"XMP ";

/// Which metadata blocks an image container carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetadataBlocks {
    /// JPEG APP1 `Exif`, PNG `eXIf`, WebP `EXIF`.
    pub exif: bool,
    /// JPEG APP2 `ICC_PROFILE`, PNG `iCCP`, WebP `ICCP`.
    pub icc_profile: bool,
    /// JPEG APP1 XMP packets, PNG `iTXt` with the XMP keyword, WebP `XMP `.
    pub xmp: bool,
    /// JPEG APP13 Photoshop/IPTC.
    pub iptc: bool,
    /// JPEG comments, PNG `tEXt`/`iTXt`/`zTXt` other than XMP.
    pub text: bool,
}

impl MetadataBlocks {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the blocks that are present.
    pub fn present(&self) -> Vec<&'static str> {
        [
            ("EXIF", self.exif),
            ("ICC", self.icc_profile),
            ("XMP", self.xmp),
            ("IPTC", self.iptc),
            ("text", self.text),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Report which metadata blocks the image at `path` carries.
///
/// The container is chosen from the file extension.
pub fn detect_blocks(path: &Path) -> Result<MetadataBlocks> {
    let kind = ImageKind::from_path(path)
        .with_context(|| format!("Unsupported container: {}", path.display()))?;
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    let blocks = detect_blocks_in(Bytes::from(bytes), kind)?;
    log::debug!(
        "{} ({}): metadata blocks [{}]",
        path.display(),
        kind.as_str(),
        blocks.present().join(", ")
    );
    Ok(blocks)
}

/// Report which metadata blocks an in-memory encoded image carries.
pub fn detect_blocks_in(bytes: Bytes, kind: ImageKind) -> Result<MetadataBlocks> {
    match kind {
        ImageKind::Jpeg => {
            let jpeg = Jpeg::from_bytes(bytes)
                .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;
            Ok(jpeg_blocks(&jpeg))
        }
        ImageKind::Png => {
            let png = Png::from_bytes(bytes)
                .map_err(|e| anyhow::anyhow!("Failed to parse PNG: {e}"))?;
            Ok(png_blocks(&png))
        }
        ImageKind::WebP => {
            let webp = WebP::from_bytes(bytes)
                .map_err(|e| anyhow::anyhow!("Failed to parse WebP: {e}"))?;
            Ok(webp_blocks(&webp))
        }
    }
}

fn jpeg_blocks(jpeg: &Jpeg) -> MetadataBlocks {
    let mut blocks = MetadataBlocks {
        exif: jpeg.exif().is_some(),
        icc_profile: jpeg.icc_profile().is_some(),
        ..MetadataBlocks::default()
    };

    for segment in jpeg.segments() {
        let contents = segment.contents();
        match segment.marker() {
            markers::APP1 if is_xmp_packet(contents) => blocks.xmp = true,
            markers::APP13 if contents.starts_with(IPTC_HEADER) => blocks.iptc = true,
            markers::COM => blocks.text = true,
            _ => {}
        }
    }

    blocks
}

fn is_xmp_packet(contents: &[u8]) -> bool {
    contents.starts_with(XMP_HEADER) || contents.starts_with(XMP_EXTENSION_HEADER)
}

fn png_blocks(png: &Png) -> MetadataBlocks {
    let mut blocks = MetadataBlocks {
        exif: png.exif().is_some(),
        icc_profile: png.icc_profile().is_some(),
        ..MetadataBlocks::default()
    };

    for chunk in png.chunks() {
        let kind = chunk.kind();
        if !PNG_TEXT_CHUNKS.contains(&kind) {
            continue;
        }
        if &kind == b"iTXt" && chunk.contents().starts_with(PNG_XMP_KEYWORD) {
            blocks.xmp = true;
        } else {
            blocks.text = true;
        }
    }

    blocks
}

fn webp_blocks(webp: &WebP) -> MetadataBlocks {
    MetadataBlocks {
        exif: webp.exif().is_some(),
        icc_profile: webp.icc_profile().is_some(),
        xmp: webp.chunk_by_id(WEBP_XMP_CHUNK).is_some(),
        ..MetadataBlocks::default()
    }
}
