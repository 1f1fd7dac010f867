use std::io::{self, Write};
use thiserror::Error;

use super::skip::SkipWriter;

/// Start-of-image marker. Every JPEG stream begins with it.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// APP1 marker, the segment that carries EXIF.
pub const APP1: [u8; 2] = [0xFF, 0xE1];
/// Largest value a segment length field can hold (it counts its own 2 bytes).
pub const MAX_SEGMENT_LEN: usize = 0xFFFF;
/// Largest payload that fits in one segment.
pub const MAX_EXIF_LEN: usize = MAX_SEGMENT_LEN - 2;

/// Errors that can occur while preparing an EXIF-embedding writer.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The underlying writer failed
    #[error("failed to write JPEG header: {0}")]
    Io(#[from] io::Error),

    /// The payload does not fit in a single APP1 segment
    #[error("EXIF payload of {len} bytes exceeds the {max}-byte segment limit", max = MAX_EXIF_LEN)]
    SegmentTooLarge { len: usize },
}

/// Start a JPEG stream on `sink` with `exif` spliced in after the SOI marker.
///
/// Writes SOI and, when `exif` is present, an APP1 segment holding it
/// verbatim. The returned writer drops the first two bytes it receives, so a
/// JPEG encoder can write its complete output (including its own SOI) into it
/// and the result is a single well-formed stream:
///
/// ```text
/// FF D8 | FF E1 <len:u16 BE> <exif> | <encoder output without its SOI>
/// ```
///
/// `exif` is expected to be an APP1 payload (`Exif\0\0` followed by TIFF
/// data) but its content is not inspected. Payloads longer than
/// [`MAX_EXIF_LEN`] are rejected with [`EmbedError::SegmentTooLarge`] after
/// SOI has been written and before anything else is.
///
/// # Example
///
/// ```
/// use exif_carry::exif::embed_exif;
/// use std::io::Write;
///
/// let mut out = Vec::new();
/// let mut w = embed_exif(&mut out, Some(b"TEST".as_slice())).unwrap();
/// w.write_all(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
///
/// assert_eq!(
///     out,
///     [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x06, b'T', b'E', b'S', b'T', 0xFF, 0xD9]
/// );
/// ```
pub fn embed_exif<W: Write>(mut sink: W, exif: Option<&[u8]>) -> Result<SkipWriter<W>, EmbedError> {
    sink.write_all(&SOI)?;

    if let Some(exif) = exif {
        let segment_len = segment_len(exif.len())?;
        let [hi, lo] = segment_len.to_be_bytes();
        sink.write_all(&[APP1[0], APP1[1], hi, lo])?;
        sink.write_all(exif)?;
        log::debug!("Embedded {} byte(s) of EXIF", exif.len());
    }

    Ok(SkipWriter::new(sink, SOI.len()))
}

/// Length field for a segment carrying `payload_len` bytes.
fn segment_len(payload_len: usize) -> Result<u16, EmbedError> {
    payload_len
        .checked_add(2)
        .and_then(|len| u16::try_from(len).ok())
        .ok_or(EmbedError::SegmentTooLarge { len: payload_len })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: stream = SOI + APP1(exif) + encoder output minus its SOI, for any chunking.
        #[test]
        fn prop_embedded_stream_layout(
            exif in prop::option::of(prop::collection::vec(any::<u8>(), 0..128)),
            body in prop::collection::vec(any::<u8>(), 0..256),
            chunk in 1usize..17,
        ) {
            let mut encoded = SOI.to_vec();
            encoded.extend_from_slice(&body);

            let mut out = Vec::new();
            let mut w = embed_exif(&mut out, exif.as_deref()).unwrap();
            for piece in encoded.chunks(chunk) {
                w.write_all(piece).unwrap();
            }

            let mut expected = SOI.to_vec();
            if let Some(ref exif) = exif {
                expected.extend_from_slice(&APP1);
                expected.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
                expected.extend_from_slice(exif);
            }
            expected.extend_from_slice(&body);
            prop_assert_eq!(out, expected);
        }
    }
}
