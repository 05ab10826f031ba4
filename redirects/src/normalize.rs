//! Canonical form for redirect sources, destinations and request paths.

use percent_encoding::percent_decode_str;

use crate::error::DecodeError;
use crate::target::is_internal;

/// Decode and trim, then give internal paths a leading and trailing slash.
pub fn normalize(raw: &str) -> Result<String, DecodeError> {
    let decoded = decode(raw)?;
    let trimmed = decoded.trim();
    if is_internal(trimmed) {
        Ok(ensure_ending_slash(&ensure_leading_slash(trimmed)))
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Like [`normalize`], but the input is always treated as internal.
pub fn normalize_request_path(raw: &str) -> Result<String, DecodeError> {
    let decoded = decode(raw)?;
    Ok(ensure_ending_slash(&ensure_leading_slash(decoded.trim())))
}

fn decode(raw: &str) -> Result<String, DecodeError> {
    // percent_decode_str leaves broken escapes in place; reject them instead.
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(DecodeError::Malformed {
                    input: raw.to_owned(),
                    offset: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8 {
            input: raw.to_owned(),
        })
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

fn ensure_ending_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}
