//! Minimal RGBA PNG encoder and a matching reader.
//!
//! Writes the smallest conforming file layout: signature, one `IHDR`,
//! one `IDAT` holding the zlib-compressed scanline stream, and `IEND`.
//! Every scanline uses filter type 0 (None), which keeps the encoder simple
//! at the cost of somewhat larger files. Icons are tiny, so that is fine.
//!
//! The reader only understands what the encoder produces (8-bit RGBA,
//! non-interlaced, filter type 0). It exists so output can be verified and
//! inspected without an external decoder.

use crate::crc32::Crc32;
use crate::error::{Error, Result};
use tracing::debug;

/// PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Default zlib compression level (0 = stored, 10 = best).
pub const DEFAULT_LEVEL: u8 = 6;

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
/// Scanline filter type 0: bytes stored as-is.
const FILTER_NONE: u8 = 0;

/// Largest width or height PNG allows (`2^31 - 1`).
pub const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Byte length of a `width × height` RGBA buffer, or `None` when a
/// dimension is 0, exceeds [`MAX_DIMENSION`], or the product overflows.
pub(crate) fn buffer_len(width: u32, height: u32) -> Option<usize> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return None;
    }
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

// ─── Compression ────────────────────────────────────────────────────────────

/// Turns the raw scanline stream into a zlib stream for the `IDAT` chunk.
pub trait Compressor {
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>>;
}

/// zlib compressor backed by `miniz_oxide`.
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: u8,
}

impl ZlibCompressor {
    /// `level` is clamped to miniz's 0..=10 range.
    pub fn new(level: u8) -> Self {
        ZlibCompressor { level: level.min(10) }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        ZlibCompressor::new(DEFAULT_LEVEL)
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        Ok(miniz_oxide::deflate::compress_to_vec_zlib(raw, self.level))
    }
}

// ─── Header ─────────────────────────────────────────────────────────────────

/// Decoded `IHDR` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression: u8,
    pub filter: u8,
    pub interlace: u8,
}

impl Header {
    /// Header for an 8-bit truecolor-with-alpha, non-interlaced image.
    pub fn rgba8(width: u32, height: u32) -> Self {
        Header {
            width,
            height,
            bit_depth: BIT_DEPTH,
            color_type: COLOR_TYPE_RGBA,
            compression: 0,
            filter: 0,
            interlace: 0,
        }
    }

    /// Serialize to the fixed 13-byte `IHDR` layout.
    pub fn to_bytes(&self) -> [u8; 13] {
        let mut out = [0u8; 13];
        out[0..4].copy_from_slice(&self.width.to_be_bytes());
        out[4..8].copy_from_slice(&self.height.to_be_bytes());
        out[8] = self.bit_depth;
        out[9] = self.color_type;
        out[10] = self.compression;
        out[11] = self.filter;
        out[12] = self.interlace;
        out
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != 13 {
            return Err(Error::Malformed(format!("IHDR is {} bytes, expected 13", data.len())));
        }
        Ok(Header {
            width: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            height: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            bit_depth: data[8],
            color_type: data[9],
            compression: data[10],
            filter: data[11],
            interlace: data[12],
        })
    }

    /// Length of the unfiltered scanline stream for this header (RGBA8),
    /// or `None` if it does not fit in `usize`.
    fn stream_len(&self) -> Option<usize> {
        let row = (self.width as usize).checked_mul(4)?.checked_add(1)?;
        row.checked_mul(self.height as usize)
    }
}

// ─── Chunks ─────────────────────────────────────────────────────────────────

/// Validate a chunk type tag: exactly four ASCII letters.
///
/// Framing itself only needs four ASCII bytes; digits and punctuation are
/// refused here as well because PNG decoders reject such chunk types.
pub fn chunk_tag(tag: &str) -> Result<[u8; 4]> {
    let bytes = tag.as_bytes();
    if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::InvalidChunkType(tag.to_string()));
    }
    Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Frame a single chunk: `length ‖ type ‖ payload ‖ crc32(type ‖ payload)`.
pub fn frame_chunk(tag: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let kind = chunk_tag(tag)?;
    let mut out = Vec::with_capacity(payload.len() + 12);
    write_chunk(&mut out, &kind, payload);
    Ok(out)
}

/// Append a framed chunk to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    let len = data.len() as u32;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    // CRC over type + data
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    out.extend_from_slice(&crc.finish().to_be_bytes());
}

/// A chunk parsed back out of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: [u8; 4],
    pub data: Vec<u8>,
    /// CRC stored in the file (already verified against the contents)
    pub crc: u32,
}

impl Chunk {
    pub fn kind_str(&self) -> &str {
        // Tags are checked to be ASCII letters while reading
        std::str::from_utf8(&self.kind).unwrap_or("????")
    }
}

/// Split a PNG file into its chunks, verifying the signature, framing and
/// every CRC. Nothing may follow `IEND`.
pub fn read_chunks(bytes: &[u8]) -> Result<Vec<Chunk>> {
    if bytes.len() < SIGNATURE.len() || bytes[..8] != SIGNATURE {
        return Err(Error::Malformed("missing PNG signature".into()));
    }

    let mut chunks = Vec::new();
    let mut pos = SIGNATURE.len();
    while pos < bytes.len() {
        if bytes.len() - pos < 12 {
            return Err(Error::Malformed(format!("truncated chunk at offset {}", pos)));
        }
        let len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]) as usize;
        let kind = [bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]];
        if !kind.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(Error::Malformed(format!("invalid chunk type at offset {}", pos + 4)));
        }
        let data_start = pos + 8;
        let data_end = data_start
            .checked_add(len)
            .filter(|&end| end + 4 <= bytes.len())
            .ok_or_else(|| Error::Malformed(format!("chunk at offset {} overruns the file", pos)))?;
        let data = &bytes[data_start..data_end];
        let stored = u32::from_be_bytes([
            bytes[data_end],
            bytes[data_end + 1],
            bytes[data_end + 2],
            bytes[data_end + 3],
        ]);

        let mut crc = Crc32::new();
        crc.update(&kind);
        crc.update(data);
        if crc.finish() != stored {
            return Err(Error::Malformed(format!(
                "CRC mismatch in {} chunk",
                String::from_utf8_lossy(&kind)
            )));
        }

        chunks.push(Chunk { kind, data: data.to_vec(), crc: stored });
        pos = data_end + 4;

        if &kind == b"IEND" && pos != bytes.len() {
            return Err(Error::Malformed(format!("{} bytes after IEND", bytes.len() - pos)));
        }
    }
    Ok(chunks)
}

// ─── Encoder ────────────────────────────────────────────────────────────────

/// RGBA PNG encoder with a pluggable compressor.
#[derive(Debug, Clone, Default)]
pub struct PngEncoder<C = ZlibCompressor> {
    compressor: C,
}

impl PngEncoder {
    pub fn new() -> Self {
        PngEncoder { compressor: ZlibCompressor::default() }
    }

    pub fn with_level(level: u8) -> Self {
        PngEncoder { compressor: ZlibCompressor::new(level) }
    }
}

impl<C: Compressor> PngEncoder<C> {
    pub fn with_compressor(compressor: C) -> Self {
        PngEncoder { compressor }
    }

    /// Encode an RGBA pixel buffer as a PNG file.
    ///
    /// `rgba` must hold exactly `width * height * 4` bytes in row-major RGBA
    /// order. Either the whole file is returned or an error, never a prefix.
    pub fn encode(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize(0));
        }
        let expected = buffer_len(width, height)
            .ok_or(Error::InvalidSize(if width > MAX_DIMENSION { width } else { height }))?;
        if rgba.len() != expected {
            return Err(Error::BufferSize { expected, actual: rgba.len() });
        }

        let header = Header::rgba8(width, height);
        let raw = scanlines(&header, rgba)?;
        let zlib_data = self.compressor.compress(&raw)?;

        let mut png = Vec::with_capacity(zlib_data.len() + 64);
        png.extend_from_slice(&SIGNATURE);
        write_chunk(&mut png, b"IHDR", &header.to_bytes());
        write_chunk(&mut png, b"IDAT", &zlib_data);
        write_chunk(&mut png, b"IEND", &[]);

        debug!(width, height, raw = raw.len(), bytes = png.len(), "encoded PNG");
        Ok(png)
    }
}

/// Encode with the default zlib compressor.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
    PngEncoder::new().encode(width, height, rgba)
}

/// Build the raw filtered data: filter byte (0 = None) + RGBA per row.
fn scanlines(header: &Header, rgba: &[u8]) -> Result<Vec<u8>> {
    let row_bytes = header.width as usize * 4;
    let len = header.stream_len().ok_or(Error::InvalidSize(header.width))?;
    let mut raw = Vec::new();
    raw.try_reserve_exact(len).map_err(|_| Error::InvalidSize(header.width))?;
    for row in rgba.chunks_exact(row_bytes) {
        raw.push(FILTER_NONE);
        raw.extend_from_slice(row);
    }
    Ok(raw)
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Pixels recovered from a PNG written by [`PngEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub header: Header,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    /// RGBA value at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.header.width || y >= self.header.height {
            return None;
        }
        let i = (y as usize * self.header.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    /// Half-open bounding box `(x1, y1, x2, y2)` of all pixels with non-zero
    /// alpha, or `None` for a fully transparent image.
    pub fn opaque_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let w = self.header.width as usize;
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (i, px) in self.rgba.chunks_exact(4).enumerate() {
            if px[3] == 0 { continue; }
            let (x, y) = ((i % w) as u32, (i / w) as u32);
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x + 1), y2.max(y + 1)),
            });
        }
        bounds
    }
}

/// Decode an 8-bit RGBA, non-interlaced PNG whose scanlines use filter 0.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage> {
    let chunks = read_chunks(bytes)?;

    let first = chunks.first().ok_or_else(|| Error::Malformed("no chunks".into()))?;
    if &first.kind != b"IHDR" {
        return Err(Error::Malformed(format!("first chunk is {}, expected IHDR", first.kind_str())));
    }
    match chunks.last() {
        Some(last) if &last.kind == b"IEND" && chunks.len() > 1 => {}
        _ => return Err(Error::Malformed("missing IEND".into())),
    }

    let header = Header::parse(&first.data)?;
    if header.width == 0 || header.height == 0 {
        return Err(Error::Malformed("zero image dimension".into()));
    }
    if header.width > MAX_DIMENSION || header.height > MAX_DIMENSION {
        return Err(Error::Malformed(format!(
            "image dimension {}x{} exceeds 2^31-1",
            header.width, header.height
        )));
    }
    if header.bit_depth != BIT_DEPTH || header.color_type != COLOR_TYPE_RGBA {
        return Err(Error::Malformed(format!(
            "unsupported format: bit depth {}, color type {}",
            header.bit_depth, header.color_type
        )));
    }
    if header.compression != 0 || header.filter != 0 || header.interlace != 0 {
        return Err(Error::Malformed("unsupported compression, filter or interlace method".into()));
    }

    let zlib_data: Vec<u8> = chunks
        .iter()
        .filter(|c| &c.kind == b"IDAT")
        .flat_map(|c| c.data.iter().copied())
        .collect();
    if zlib_data.is_empty() {
        return Err(Error::Malformed("no IDAT data".into()));
    }
    let expected = header
        .stream_len()
        .ok_or_else(|| Error::Malformed("image too large for this platform".into()))?;
    // Never inflate past what the header promises
    let raw = miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(&zlib_data, expected)
        .map_err(|e| Error::Malformed(format!("inflate error: {:?}", e.status)))?;
    if raw.len() != expected {
        return Err(Error::Malformed(format!(
            "scanline stream is {} bytes, expected {}",
            raw.len(),
            expected
        )));
    }

    let row_bytes = header.width as usize * 4;
    let mut rgba = Vec::with_capacity(row_bytes * header.height as usize);
    for (y, line) in raw.chunks_exact(row_bytes + 1).enumerate() {
        if line[0] != FILTER_NONE {
            return Err(Error::Malformed(format!("unsupported filter type {} on row {}", line[0], y)));
        }
        rgba.extend_from_slice(&line[1..]);
    }

    Ok(DecodedImage { header, rgba })
}
