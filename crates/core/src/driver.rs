//! Multi-resolution rendering.
//!
//! Renders one drawing script at each requested size, encodes every canvas
//! as PNG and hands the bytes to an [`IconSink`]. Sizes are independent: a
//! failure at one size is recorded and the remaining sizes are still
//! attempted.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::artwork::{self, DrawOp};
use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::png::{Compressor, PngEncoder};

/// Sizes rendered when the caller does not ask for specific ones.
pub const DEFAULT_SIZES: &[u32] = &[16, 24, 32, 48, 64, 128, 256, 512];

/// Destination for encoded images, keyed by size.
pub trait IconSink {
    fn accept(&mut self, size: u32, png: Vec<u8>) -> Result<()>;
}

/// In-memory sink. Rendering the same size twice keeps the last image.
impl IconSink for BTreeMap<u32, Vec<u8>> {
    fn accept(&mut self, size: u32, png: Vec<u8>) -> Result<()> {
        self.insert(size, png);
        Ok(())
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Sizes handed to the sink, in request order
    pub written: Vec<u32>,
    /// Sizes that failed, with the reason
    pub failed: Vec<(u32, Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Render and encode a single size.
pub fn render_one<C: Compressor>(size: u32, ops: &[DrawOp], encoder: &PngEncoder<C>) -> Result<Vec<u8>> {
    let mut canvas = Canvas::new(size)?;
    artwork::render(ops, &mut canvas);
    encoder.encode(size, size, canvas.pixels())
}

/// Render `ops` at every size in `sizes`, in order, feeding `sink`.
pub fn render_sizes<C, S>(sizes: &[u32], ops: &[DrawOp], encoder: &PngEncoder<C>, sink: &mut S) -> BatchReport
where
    C: Compressor,
    S: IconSink + ?Sized,
{
    let mut report = BatchReport::default();
    for &size in sizes {
        let result = render_one(size, ops, encoder).and_then(|png| {
            let len = png.len();
            sink.accept(size, png)?;
            Ok(len)
        });
        match result {
            Ok(len) => {
                debug!(size, bytes = len, "rendered icon");
                report.written.push(size);
            }
            Err(e) => {
                warn!(size, error = %e, "failed to render icon");
                report.failed.push((size, e));
            }
        }
    }
    report
}

/// Render the built-in artwork at `sizes` into memory.
pub fn render_all(sizes: &[u32]) -> (BTreeMap<u32, Vec<u8>>, BatchReport) {
    let mut out = BTreeMap::new();
    let report = render_sizes(sizes, artwork::MONITOR, &PngEncoder::new(), &mut out);
    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::decode_png;

    /// Fails for one size, records the rest.
    struct PickySink {
        reject: u32,
        seen: Vec<u32>,
    }

    impl IconSink for PickySink {
        fn accept(&mut self, size: u32, _png: Vec<u8>) -> Result<()> {
            if size == self.reject {
                return Err(Error::Sink { size, message: "disk full".into() });
            }
            self.seen.push(size);
            Ok(())
        }
    }

    #[test]
    fn test_two_sizes_decode_independently() {
        let (out, report) = render_all(&[16, 512]);
        assert!(report.is_success());
        assert_eq!(report.written, [16, 512]);

        let small = decode_png(&out[&16]).unwrap();
        let large = decode_png(&out[&512]).unwrap();
        assert_eq!((small.width(), small.height()), (16, 16));
        assert_eq!((large.width(), large.height()), (512, 512));

        assert_eq!(small.opaque_bounds(), Some((1, 1, 15, 15)));
        assert_eq!(large.opaque_bounds(), Some((32, 32, 480, 480)));
    }

    #[test]
    fn test_zero_size_does_not_stop_batch() {
        let (out, report) = render_all(&[0, 32]);
        assert_eq!(report.written, [32]);
        assert_eq!(report.failed, [(0, Error::InvalidSize(0))]);
        assert!(!report.is_success());
        assert!(out.contains_key(&32));
    }

    #[test]
    fn test_oversized_size_does_not_stop_batch() {
        let (out, report) = render_all(&[u32::MAX, 16]);
        assert_eq!(report.written, [16]);
        assert_eq!(report.failed, [(u32::MAX, Error::InvalidSize(u32::MAX))]);
        assert!(decode_png(&out[&16]).is_ok());
    }

    #[test]
    fn test_sink_failure_is_isolated() {
        let mut sink = PickySink { reject: 24, seen: Vec::new() };
        let report = render_sizes(&[16, 24, 32], artwork::MONITOR, &PngEncoder::new(), &mut sink);
        assert_eq!(sink.seen, [16, 32]);
        assert_eq!(report.written, [16, 32]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 24);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let (a, _) = render_all(&[48]);
        let (b, _) = render_all(&[48]);
        assert_eq!(a[&48], b[&48]);
    }

    #[test]
    fn test_render_one_matches_compose_icon() {
        let png = render_one(64, artwork::MONITOR, &PngEncoder::new()).unwrap();
        let img = decode_png(&png).unwrap();
        assert_eq!(img.rgba, artwork::compose_icon(64).unwrap().into_pixels());
    }
}
