//! EXIF extraction and JPEG embedding.
//!
//! - [`extract_exif`]: Pull the raw EXIF block out of a source image
//! - [`embed_exif`]: Start a JPEG stream with that block in an APP1 segment
//! - [`SkipWriter`]: The writer `embed_exif` hands back, which drops the
//!   encoder's own start-of-image marker
//! - [`read_summary`]: Camera make/model/time for display
//!
//! `embed_exif` never buffers the encoded image: the header goes straight to
//! the sink and everything the encoder writes afterwards is forwarded as it
//! arrives.

mod reader;
mod skip;
mod writer;

pub use reader::{extract_exif, extract_exif_from_path, read_summary, ExifSummary, EXIF_HEADER};
#[cfg(feature = "heic")]
pub(crate) use reader::to_app1_payload;
pub use img_parts::Bytes;
pub use skip::{skip_prefix, SkipWriter};
pub use writer::{embed_exif, EmbedError, APP1, MAX_EXIF_LEN, MAX_SEGMENT_LEN, SOI};
