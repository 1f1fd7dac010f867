//! # exif-carry
//!
//! Convert images to JPEG without losing their EXIF metadata.
//!
//! A stock JPEG encoder writes a fresh stream that starts with the
//! start-of-image marker and knows nothing about the source's metadata.
//! [`exif::embed_exif`] writes that marker plus an APP1 segment holding the
//! original EXIF block up front, then hands back a writer that swallows the
//! encoder's own marker. The encoder streams straight through it; nothing is
//! buffered or re-parsed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_carry::config::Config;
//! use exif_carry::pipeline::{collect_images, convert_all, BatchSummary};
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!
//!     // Collect supported image files from paths (files or directories)
//!     let images = collect_images(&[PathBuf::from("./photos")]);
//!
//!     let results = convert_all(&images, Path::new("./converted"), &config);
//!     for result in &results {
//!         if let Some(ref err) = result.error {
//!             eprintln!("Error converting {}: {err}", result.input.display());
//!         }
//!     }
//!
//!     let summary = BatchSummary::from_results(&results);
//!     println!("{} converted, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! Any encoder that writes a complete JPEG to an [`std::io::Write`] can be
//! pointed at the writer returned by [`exif::embed_exif`]:
//!
//! ```rust,no_run
//! use exif_carry::exif::{embed_exif, extract_exif, Bytes};
//! use image::codecs::jpeg::JpegEncoder;
//! use std::fs::File;
//! use std::io::BufWriter;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = Bytes::from(std::fs::read("photo.png")?);
//!     let exif = extract_exif(source.clone());
//!     let image = image::load_from_memory(&source)?;
//!
//!     let mut out = BufWriter::new(File::create("photo.jpeg")?);
//!     let mut sink = embed_exif(&mut out, exif.as_deref())?;
//!     JpegEncoder::new_with_quality(&mut sink, 90).encode_image(&image.to_rgb8())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`exif`]: EXIF extraction, APP1 embedding, and the prefix-skipping writer
//! - [`pipeline`]: Per-file conversion and batch drivers
//! - [`pickers`]: Input/output providers for batches (including native dialogs)
//! - [`config`]: Configuration types and loading/saving
//! - `heif`: HEIC/HEIF decoding and EXIF extraction (`heic` feature)

pub mod config;
pub mod exif;
#[cfg(feature = "heic")]
pub mod heif;
pub mod pickers;
pub mod pipeline;
