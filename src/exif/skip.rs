use std::io::{self, Write};

/// Advance the skip state by one chunk.
///
/// Returns the bytes still to discard after `chunk` and the tail of `chunk`
/// that should be forwarded. Once `remaining` reaches zero every chunk is
/// forwarded whole.
pub fn skip_prefix(remaining: usize, chunk: &[u8]) -> (usize, &[u8]) {
    let skipped = remaining.min(chunk.len());
    (remaining - skipped, &chunk[skipped..])
}

/// A writer that drops the first `n` bytes of everything written through it.
///
/// The count spans write calls, so the result does not depend on how the
/// producer splits its output. After the prefix is gone the writer is a
/// plain passthrough.
#[derive(Debug)]
pub struct SkipWriter<W> {
    inner: W,
    remaining: usize,
}

impl<W: Write> SkipWriter<W> {
    pub fn new(inner: W, skip: usize) -> Self {
        Self {
            inner,
            remaining: skip,
        }
    }

    /// Bytes still to be discarded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for SkipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return self.inner.write(buf);
        }

        let (remaining, forward) = skip_prefix(self.remaining, buf);
        let skipped = buf.len() - forward.len();
        if forward.is_empty() {
            self.remaining = remaining;
            return Ok(skipped);
        }

        // An error means nothing was accepted, so the prefix stays pending
        // and a retry of the same buffer is still correct.
        let written = self.inner.write(forward)?;
        self.remaining = remaining;
        Ok(skipped + written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that accepts at most `limit` bytes per call.
    struct ShortWriter {
        out: Vec<u8>,
        limit: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink that fails the first `failures` calls.
    struct FlakyWriter {
        out: Vec<u8>,
        failures: usize,
        kind: io::ErrorKind,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(self.kind, "flaky"));
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ── skip_prefix ──────────────────────────────────────────────────

    #[test]
    fn skip_prefix_passthrough_at_zero() {
        assert_eq!(skip_prefix(0, b"abc"), (0, &b"abc"[..]));
    }

    #[test]
    fn skip_prefix_short_chunk() {
        assert_eq!(skip_prefix(5, b"abc"), (2, &b""[..]));
    }

    #[test]
    fn skip_prefix_exact_chunk() {
        assert_eq!(skip_prefix(3, b"abc"), (0, &b""[..]));
    }

    #[test]
    fn skip_prefix_long_chunk() {
        assert_eq!(skip_prefix(2, b"abcd"), (0, &b"cd"[..]));
    }

    #[test]
    fn skip_prefix_empty_chunk() {
        assert_eq!(skip_prefix(2, b""), (2, &b""[..]));
    }

    // ── SkipWriter ───────────────────────────────────────────────────

    #[test]
    fn split_across_skip_boundary() {
        let mut split = SkipWriter::new(Vec::new(), 2);
        assert_eq!(split.write(&[0x01]).unwrap(), 1);
        assert_eq!(split.write(&[0x02, 0x03, 0x04, 0x05, 0x06]).unwrap(), 5);

        let mut whole = SkipWriter::new(Vec::new(), 2);
        assert_eq!(whole.write(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]).unwrap(), 6);

        assert_eq!(split.get_ref(), &[0x03, 0x04, 0x05, 0x06]);
        assert_eq!(split.into_inner(), whole.into_inner());
    }

    #[test]
    fn short_chunk_does_not_touch_inner() {
        let mut w = SkipWriter::new(ShortWriter { out: Vec::new(), limit: 0 }, 4);
        assert_eq!(w.write(b"ab").unwrap(), 2);
        assert_eq!(w.remaining(), 2);
        assert!(w.get_ref().out.is_empty());
    }

    #[test]
    fn zero_skip_is_identity() {
        let mut w = SkipWriter::new(Vec::new(), 0);
        w.write_all(b"hello").unwrap();
        assert_eq!(w.into_inner(), b"hello");
    }

    #[test]
    fn stream_shorter_than_skip_yields_nothing() {
        let mut w = SkipWriter::new(Vec::new(), 10);
        w.write_all(b"abc").unwrap();
        w.write_all(b"def").unwrap();
        assert_eq!(w.remaining(), 4);
        assert!(w.into_inner().is_empty());
    }

    #[test]
    fn passthrough_is_permanent() {
        let mut w = SkipWriter::new(Vec::new(), 2);
        w.write_all(&[0xFF, 0xD8]).unwrap();
        assert_eq!(w.remaining(), 0);
        w.write_all(&[0xFF, 0xD8]).unwrap();
        w.write_all(&[0x00]).unwrap();
        w.write_all(&[0xFF, 0xD9]).unwrap();
        assert_eq!(w.into_inner(), [0xFF, 0xD8, 0x00, 0xFF, 0xD9]);
    }

    #[test]
    fn short_inner_write_counts_skipped_prefix() {
        let mut w = SkipWriter::new(ShortWriter { out: Vec::new(), limit: 1 }, 2);
        // 2 skipped + 1 accepted by the inner writer
        assert_eq!(w.write(b"abcd").unwrap(), 3);
        assert_eq!(w.remaining(), 0);
        assert_eq!(w.get_ref().out, b"c");
    }

    #[test]
    fn write_all_over_short_writer() {
        let mut w = SkipWriter::new(ShortWriter { out: Vec::new(), limit: 3 }, 2);
        w.write_all(b"0123456789").unwrap();
        assert_eq!(w.into_inner().out, b"23456789");
    }

    #[test]
    fn inner_error_is_propagated() {
        let mut w = SkipWriter::new(
            FlakyWriter { out: Vec::new(), failures: 1, kind: io::ErrorKind::BrokenPipe },
            2,
        );
        let err = w.write(b"abcd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(w.remaining(), 2);
    }

    #[test]
    fn interrupted_write_is_retried_without_leaking_prefix() {
        let mut w = SkipWriter::new(
            FlakyWriter { out: Vec::new(), failures: 1, kind: io::ErrorKind::Interrupted },
            2,
        );
        w.write_all(b"abcd").unwrap();
        assert_eq!(w.into_inner().out, b"cd");
    }

    #[test]
    fn error_in_passthrough_is_verbatim() {
        let mut w = SkipWriter::new(
            FlakyWriter { out: Vec::new(), failures: 1, kind: io::ErrorKind::Other },
            0,
        );
        assert_eq!(w.write(b"x").unwrap_err().kind(), io::ErrorKind::Other);
        assert_eq!(w.write(b"y").unwrap(), 1);
        assert_eq!(w.into_inner().out, b"y");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
