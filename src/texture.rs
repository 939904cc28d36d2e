//! TGA image loader (auxiliary, §6): type-10 RLE true-color, 24 or 32 bit
//! pixels, no colormap. Grounded in `original_source/include/qtga.h`.

use std::fs;
use std::path::Path;

use crate::error::RenderError;

const DATATYPE_RLE_TRUECOLOR: i8 = 10;

/// Decoded image: row-major, top-to-bottom, BGR(A) per pixel.
#[derive(Clone, Debug)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u8,
    pub data: Vec<u8>,
}

impl Image {
    /// Nearest-sample a pixel as BGR(A) bytes; `u`/`v` in `[0, 1]`, `v = 0`
    /// at the top row.
    pub fn sample(&self, u: f32, v: f32) -> &[u8] {
        let x = ((u.clamp(0.0, 1.0) * self.width as f32) as u32).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as u32).min(self.height - 1);
        let bpp = self.bytes_per_pixel as usize;
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        &self.data[idx..idx + bpp]
    }
}

struct Header {
    colourmaptype: i8,
    datatypecode: i8,
    width: u16,
    height: u16,
    bitsperpixel: i8,
}

fn read_header(bytes: &[u8]) -> Result<Header, RenderError> {
    if bytes.len() < 18 {
        return Err(RenderError::TruncatedTga);
    }
    Ok(Header {
        colourmaptype: bytes[1] as i8,
        datatypecode: bytes[2] as i8,
        width: u16::from_le_bytes([bytes[12], bytes[13]]),
        height: u16::from_le_bytes([bytes[14], bytes[15]]),
        bitsperpixel: bytes[16] as i8,
    })
}

pub fn load_tga(path: &Path) -> Result<Image, RenderError> {
    let bytes = fs::read(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let header = read_header(&bytes)?;
    if header.colourmaptype != 0 {
        return Err(RenderError::UnsupportedTgaColormap);
    }
    if header.datatypecode != DATATYPE_RLE_TRUECOLOR {
        return Err(RenderError::UnsupportedTgaDatatype(header.datatypecode));
    }
    let bpp = match header.bitsperpixel {
        24 => 3usize,
        32 => 4usize,
        other => return Err(RenderError::UnsupportedTgaDatatype(other as i8)),
    };

    let id_length = bytes[0] as usize;
    let mut cursor = 18 + id_length;

    let width = header.width as usize;
    let height = header.height as usize;
    let pixel_count = width * height;
    let mut data = Vec::with_capacity(pixel_count * bpp);

    while data.len() < pixel_count * bpp {
        let packet = *bytes.get(cursor).ok_or(RenderError::TruncatedTga)?;
        cursor += 1;
        let run_length = (packet & 0x7f) as usize + 1;

        if packet & 0x80 != 0 {
            // Run-length packet: one pixel repeated `run_length` times.
            let pixel = bytes
                .get(cursor..cursor + bpp)
                .ok_or(RenderError::TruncatedTga)?;
            for _ in 0..run_length {
                data.extend_from_slice(pixel);
            }
            cursor += bpp;
        } else {
            // Raw packet: `run_length` distinct pixels.
            let raw = bytes
                .get(cursor..cursor + run_length * bpp)
                .ok_or(RenderError::TruncatedTga)?;
            data.extend_from_slice(raw);
            cursor += run_length * bpp;
        }
    }
    data.truncate(pixel_count * bpp);

    // TGA scanlines are bottom-to-top by default (imagedescriptor top bit
    // unset); flip so row 0 is the top row, matching the color buffer
    // convention described in §6.
    let row_bytes = width * bpp;
    let mut flipped = vec![0u8; data.len()];
    for y in 0..height {
        let src = &data[y * row_bytes..(y + 1) * row_bytes];
        let dst_row = height - 1 - y;
        flipped[dst_row * row_bytes..(dst_row + 1) * row_bytes].copy_from_slice(src);
    }

    Ok(Image {
        width: width as u32,
        height: height as u32,
        bytes_per_pixel: bpp as u8,
        data: flipped,
    })
}
