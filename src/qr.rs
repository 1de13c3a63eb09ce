//! QR artifact generation for boletos.
//!
//! The scannable proof of purchase is a QR code encoding the server-side
//! validation URL, returned as a self-contained PNG data URI so it can be
//! embedded directly in a JSON payload or an `<img>` tag.

use std::io::Cursor;

use base64::Engine;
use image::Luma;
use qrcode::{EcLevel, QrCode};

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Pixels per QR module.
const MODULE_SIZE: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum EncodeArtifactError {
    #[error("validation URL does not fit in a QR code: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("failed to encode QR image as PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// Encode a validation URL as a black-on-white QR code with a quiet zone,
/// at error-correction level M so a moderately degraded print still scans.
///
/// Pure computation: same URL in, byte-identical data URI out.
pub fn encode_validation_url(url: &str) -> Result<String, EncodeArtifactError> {
    let code = QrCode::with_error_correction_level(url, EcLevel::M)?;

    let qr_image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .quiet_zone(true)
        .build();

    let mut png_bytes = Vec::new();
    qr_image.write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&png_bytes);
    Ok(format!("{DATA_URI_PREFIX}{encoded}"))
}
