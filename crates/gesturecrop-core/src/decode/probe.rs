//! Header-only probing of encoded image bytes.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{ImageError, ImageReader};

use super::{DecodeError, ImageInfo, Orientation};

/// Read the stored dimensions and EXIF orientation without decoding pixels.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized,
/// `DecodeError::CorruptedFile` if the header is damaged.
pub fn probe_image(bytes: &[u8]) -> Result<ImageInfo, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Io(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let (width, height) = reader.into_dimensions().map_err(map_image_error)?;
    if width == 0 || height == 0 {
        return Err(DecodeError::CorruptedFile(format!(
            "empty image {width}x{height}"
        )));
    }

    let orientation = extract_orientation(bytes);
    log::debug!("probe: {width}x{height}, orientation {orientation:?}");
    Ok(ImageInfo {
        width,
        height,
        orientation,
    })
}

/// Returns `Orientation::Normal` if no EXIF data is found.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        ImageError::IoError(e) => DecodeError::Io(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}
