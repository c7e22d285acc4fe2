//! Base64 and PEM framing.

use base64ct::{Base64, Encoding};
use pem_rfc7468::LineEnding;

use crate::errors::{Error, Result};

/// Start of a PEM pre-encapsulation boundary.
const PEM_BEGIN: &str = "-----BEGIN ";
/// Start of a PEM post-encapsulation boundary.
const PEM_END: &str = "-----END ";
/// Closes either boundary.
const PEM_BOUNDARY_DELIMITER: &str = "-----";

/// Encode `bytes` with the standard padded Base64 alphabet.
pub fn encode_base64(bytes: &[u8]) -> String {
    Base64::encode_string(bytes)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// Decode standard padded Base64. Line breaks and other ASCII whitespace
/// inside `text` are skipped.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Base64::decode_vec(&strip_whitespace(text))
        .map_err(|err| Error::Encoding(format!("invalid base64: {err}")))
}

/// Split a PEM document into its type label and DER payload.
///
/// The body may be wrapped at any width, or not at all, with LF or CRLF
/// line endings. Header and footer labels must agree.
pub fn pem_to_der(pem: &str) -> Result<(String, Vec<u8>)> {
    parse_pem(pem.trim()).map_err(|err| {
        tracing::warn!(%err, "rejected malformed PEM document");
        err
    })
}

fn parse_pem(pem: &str) -> Result<(String, Vec<u8>)> {
    let (label, rest) = pem
        .strip_prefix(PEM_BEGIN)
        .and_then(|rest| rest.split_once(PEM_BOUNDARY_DELIMITER))
        .ok_or_else(|| Error::InvalidKeyFormat("missing PEM header".into()))?;

    let valid_label = !label.is_empty()
        && label
            .chars()
            .all(|c| c == ' ' || (c.is_ascii_graphic() && c != '-'));
    if !valid_label {
        return Err(Error::InvalidKeyFormat(format!("invalid PEM label {label:?}")));
    }

    let footer = format!("{PEM_END}{label}{PEM_BOUNDARY_DELIMITER}");
    let body = rest
        .strip_suffix(footer.as_str())
        .ok_or_else(|| Error::InvalidKeyFormat(format!("missing PEM footer for {label:?}")))?;

    let der = Base64::decode_vec(&strip_whitespace(body))
        .map_err(|err| Error::InvalidKeyFormat(format!("invalid PEM base64: {err}")))?;

    Ok((label.to_owned(), der))
}

/// Wrap `der` in a PEM document with the given type label, LF line endings
/// and 64 column lines.
pub fn der_to_pem(label: &str, der: &[u8]) -> Result<String> {
    Ok(pem_rfc7468::encode_string(label, LineEnding::LF, der)?)
}
