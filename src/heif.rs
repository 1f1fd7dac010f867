//! HEIC/HEIF sources through libheif.
//!
//! The `image` crate cannot read HEIF containers, so these are decoded with
//! libheif and handed to the encoder as an RGB buffer. The EXIF block is read
//! from the primary image's metadata items.

use anyhow::{Context, Result};
use image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::exif::to_app1_payload;

/// Major brands of ISO-BMFF files that libheif decodes as still images.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

/// True when `bytes` start with an `ftyp` box naming a HEIF brand.
pub fn is_heif(bytes: &[u8]) -> bool {
    match (bytes.get(4..8), bytes.get(8..12)) {
        (Some(b"ftyp"), Some(brand)) => HEIF_BRANDS.iter().any(|b| b.as_slice() == brand),
        _ => false,
    }
}

/// Extract the primary image's EXIF block as an APP1 payload.
///
/// Returns `Ok(None)` when the image carries no EXIF item.
pub fn extract_exif(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    let ctx = HeifContext::read_from_bytes(bytes).context("Failed to read HEIF container")?;
    let handle = ctx
        .primary_image_handle()
        .context("HEIF container has no primary image")?;

    let Some(id) = handle.metadata_block_ids(b"Exif").first().copied() else {
        return Ok(None);
    };
    let block = handle.metadata(id).context("Failed to read HEIF EXIF item")?;
    Ok(tiff_from_exif_item(&block).map(to_app1_payload))
}

/// Strip the offset header of a HEIF `Exif` item.
///
/// The item starts with a big-endian u32 giving the distance from the end of
/// that field to the TIFF header. Whatever sits in between (normally
/// `Exif\0\0`) is dropped.
fn tiff_from_exif_item(item: &[u8]) -> Option<&[u8]> {
    let offset: [u8; 4] = item.get(..4)?.try_into().ok()?;
    let start = usize::try_from(u32::from_be_bytes(offset)).ok()?.checked_add(4)?;
    let tiff = item.get(start..)?;
    if tiff.is_empty() { None } else { Some(tiff) }
}

/// Decode the primary image to 8-bit RGB.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).context("Failed to read HEIF container")?;
    let handle = ctx
        .primary_image_handle()
        .context("HEIF container has no primary image")?;
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .context("Failed to decode HEIF image")?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .context("Decoded HEIF image has no interleaved plane")?;

    // Rows may be padded past width * 3
    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 3;
    let mut rgb = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        let row = row
            .get(..row_len)
            .context("Decoded HEIF row is shorter than the image width")?;
        rgb.extend_from_slice(row);
    }

    let image = RgbImage::from_raw(width, height, rgb)
        .context("Decoded HEIF buffer does not match its dimensions")?;
    Ok(DynamicImage::ImageRgb8(image))
}
