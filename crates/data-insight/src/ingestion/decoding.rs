//! Byte-level validation and text decoding of uploaded files.

use crate::error::{InsightError, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;

/// Decode raw upload bytes into text.
///
/// Files starting with a UTF-8 or UTF-16 byte order mark are decoded with the
/// matching encoding; everything else must be valid UTF-8. Bytes that contain
/// NUL characters outside a UTF-16 stream are treated as binary data.
pub(crate) fn decode_bytes(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(InsightError::EmptyDataset(
            "uploaded file is empty".to_string(),
        ));
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(InsightError::UnsupportedEncoding(format!(
                "file declares {} but contains invalid byte sequences",
                encoding.name()
            )));
        }
        return Ok(text);
    }

    if bytes.contains(&0) {
        return Err(InsightError::InvalidInput(
            "file contains binary data and is not CSV text".to_string(),
        ));
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(e) => Err(InsightError::UnsupportedEncoding(format!(
            "file is not valid UTF-8 (first invalid byte at offset {})",
            e.valid_up_to()
        ))),
    }
}
