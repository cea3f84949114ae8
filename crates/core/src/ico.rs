//! Windows `.ico` packer.
//!
//! Bundles already-encoded PNG images into one ICO container. Modern Windows
//! accepts PNG payloads directly in ICO entries, so no BMP conversion is
//! needed.
//!
//! ```text
//! ICONDIR       reserved u16 = 0, type u16 = 1, count u16
//! ICONDIRENTRY  width u8, height u8 (0 = 256), colors u8 = 0, reserved u8 = 0,
//!               planes u16 = 1, bpp u16 = 32, size u32, offset u32   (× count)
//! payloads      PNG bytes, in directory order
//! ```
//!
//! All integers are little-endian.

use crate::error::{Error, Result};

const ICONDIR_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
/// Largest edge an ICO directory entry can describe.
pub const MAX_ICO_SIZE: u32 = 256;

/// Pack `(size, png_bytes)` images into an ICO file.
pub fn encode_ico(images: &[(u32, Vec<u8>)]) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(Error::IcoSize(0));
    }
    if let Some(&(size, _)) = images.iter().find(|(s, _)| *s == 0 || *s > MAX_ICO_SIZE) {
        return Err(Error::IcoSize(size));
    }

    let payload_len: usize = images.iter().map(|(_, png)| png.len()).sum();
    let mut ico = Vec::with_capacity(ICONDIR_LEN + ENTRY_LEN * images.len() + payload_len);

    ico.extend_from_slice(&0u16.to_le_bytes()); // reserved
    ico.extend_from_slice(&1u16.to_le_bytes()); // type = ICO
    ico.extend_from_slice(&(images.len() as u16).to_le_bytes());

    let mut offset = (ICONDIR_LEN + ENTRY_LEN * images.len()) as u32;
    for (size, png) in images {
        let edge = if *size == MAX_ICO_SIZE { 0 } else { *size as u8 };
        ico.push(edge); // width
        ico.push(edge); // height
        ico.push(0); // palette
        ico.push(0); // reserved
        ico.extend_from_slice(&1u16.to_le_bytes()); // color planes
        ico.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
        ico.extend_from_slice(&(png.len() as u32).to_le_bytes());
        ico.extend_from_slice(&offset.to_le_bytes());
        offset += png.len() as u32;
    }

    for (_, png) in images {
        ico.extend_from_slice(png);
    }
    Ok(ico)
}
