use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::AuthError;

pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

const SUPPORTED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Accepts an `https://` URL or a base64 image data URL in a supported format.
pub fn validate_profile_picture(picture: &str) -> Result<(), AuthError> {
    let picture = picture.trim();

    if picture.starts_with("https://") {
        return Ok(());
    }

    let Some(rest) = picture.strip_prefix("data:") else {
        return Err(invalid("Please select an image file"));
    };

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("Please select an image file"))?;

    let Some(mime) = header.strip_suffix(";base64") else {
        return Err(invalid("Profile picture must be base64 encoded"));
    };
    let mime = mime.to_ascii_lowercase();

    if !mime.starts_with("image/") {
        return Err(invalid("Please select an image file"));
    }
    if !SUPPORTED_TYPES.contains(&mime.as_str()) {
        return Err(invalid("Supported formats: JPEG, PNG, GIF, WebP"));
    }

    // base64 inflates by 4/3; skip decoding payloads that are clearly too large
    if payload.len() / 4 * 3 > MAX_PICTURE_BYTES + 3 {
        return Err(invalid("Image size must be less than 5MB"));
    }

    let decoded = STANDARD
        .decode(payload)
        .map_err(|_| invalid("Profile picture is not valid base64"))?;

    if decoded.len() > MAX_PICTURE_BYTES {
        return Err(invalid("Image size must be less than 5MB"));
    }

    Ok(())
}

fn invalid(message: &str) -> AuthError {
    AuthError::InvalidProfile(message.to_string())
}
