use anyhow::{Context, Result};
use img_parts::{Bytes, DynImage, ImageEXIF};
use nom_exif::*;
use std::path::Path;

/// Identifier that opens an EXIF APP1 payload.
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// A few EXIF fields worth showing before a conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub taken_at: Option<String>,
    pub has_gps: bool,
}

impl ExifSummary {
    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Extract the raw EXIF block of an encoded image as an APP1 payload.
///
/// The container is detected from its content (JPEG, PNG or WebP). Containers
/// that store bare TIFF data get the `Exif\0\0` identifier prepended so the
/// result can be written into a JPEG APP1 segment verbatim. Returns `None` for
/// unrecognised containers and images without EXIF.
///
/// Takes the encoded image by value so an owned buffer is shared, not copied.
pub fn extract_exif(bytes: impl Into<Bytes>) -> Option<Vec<u8>> {
    let image = match DynImage::from_bytes(bytes.into()) {
        Ok(Some(image)) => image,
        Ok(None) => {
            log::debug!("Unrecognised container, no EXIF extracted");
            return None;
        }
        Err(e) => {
            log::debug!("Could not parse container: {e}");
            return None;
        }
    };

    let exif = image.exif()?;
    if exif.is_empty() {
        return None;
    }
    Some(to_app1_payload(&exif))
}

/// Read a file and extract its EXIF block. See [`extract_exif`].
pub fn extract_exif_from_path(path: &Path) -> Result<Option<Vec<u8>>> {
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    Ok(extract_exif(bytes))
}

/// Prefix bare TIFF data with the EXIF identifier, leave complete payloads alone.
pub(crate) fn to_app1_payload(exif: &[u8]) -> Vec<u8> {
    if exif.starts_with(EXIF_HEADER) {
        return exif.to_vec();
    }
    let mut payload = Vec::with_capacity(EXIF_HEADER.len() + exif.len());
    payload.extend_from_slice(EXIF_HEADER);
    payload.extend_from_slice(exif);
    payload
}

/// Read camera make, model, capture time and GPS presence from an image file.
pub fn read_summary(path: &Path) -> Result<ExifSummary> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).context("Failed to open image file")?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(ExifSummary::default());
        }
    };

    // Parse GPS info before converting to Exif (consumes the iterator)
    let has_gps = matches!(iter.parse_gps_info(), Ok(Some(_)));
    let exif: Exif = iter.into();

    Ok(ExifSummary {
        make: exif.get(ExifTag::Make).and_then(entry_to_string),
        model: exif.get(ExifTag::Model).and_then(entry_to_string),
        taken_at: exif.get(ExifTag::DateTimeOriginal).and_then(entry_to_string),
        has_gps,
    })
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}
