use image::{Rgb, RgbImage};
use qrcode::{EcLevel, QrCode};
use std::io;
use std::path::Path;

use crate::error::PipelineError;

pub const DEFAULT_SYMBOL_SIZE: u32 = 1024;

/// Renders one chunk payload as a QR symbol. Medium error correction
/// throughout; `size` is the minimum edge length of the image in pixels.
pub fn render_symbol(payload: &[u8], size: u32) -> Result<RgbImage, PipelineError> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M).map_err(|e| {
        PipelineError::Symbol {
            reason: e.to_string(),
        }
    })?;

    Ok(code
        .render::<Rgb<u8>>()
        .min_dimensions(size, size)
        .quiet_zone(true)
        .build())
}

pub fn write_symbol(payload: &[u8], size: u32, dest: &Path) -> Result<(), PipelineError> {
    let image = render_symbol(payload, size)?;
    image.save(dest).map_err(|e| PipelineError::Io {
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::Other, e),
    })
}
