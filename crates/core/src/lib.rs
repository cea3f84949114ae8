//! # bevelicon-core
//!
//! Procedural icon rasterizer with a self-contained RGBA PNG encoder.
//!
//! Artwork is a list of axis-aligned draw commands (filled rectangles and
//! two-tone bevel borders) expressed in a fixed 512×512 logical space. The
//! same script is rasterized at any output size and written as a minimal
//! PNG: signature, `IHDR`, one zlib-compressed `IDAT`, `IEND`.
//!
//! ## Architecture
//!
//! - [`crc32`] — table-driven CRC-32 for chunk trailers
//! - [`png`] — chunk framing, [`png::PngEncoder`], and a reader for verification
//! - [`canvas`] — [`Canvas`], the scaled RGBA drawing surface
//! - [`artwork`] — [`artwork::DrawOp`] scripts and the built-in monitor icon
//! - [`driver`] — renders one file per requested size into an [`driver::IconSink`]
//! - [`ico`] — packs several PNG sizes into a Windows `.ico`

pub mod crc32;
pub mod error;
pub mod png;
pub mod canvas;
pub mod artwork;
pub mod driver;
pub mod ico;

pub use canvas::{BevelColors, Canvas, Color};
pub use error::{Error, Result};
pub use png::{encode_png, PngEncoder};

/// Edge length of the logical coordinate space used by all artwork.
pub const LOGICAL_SIZE: u32 = 512;
