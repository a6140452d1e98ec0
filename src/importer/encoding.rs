// ==========================================
// Logistics Sync - encoding normalizer
// ==========================================
// Extracts arrive as UTF-8 / UTF-16 with BOM or as legacy
// windows-1251 without one. Detection never fails: worst
// case is mojibake, which schema resolution then rejects by
// failing to find the required columns.
// ==========================================

use encoding_rs::{Encoding, WINDOWS_1251};
use std::borrow::Cow;

/// Decode a raw extract byte stream into text.
///
/// Order of attempts:
/// 1. BOM present (UTF-8 / UTF-16LE / UTF-16BE): decode with
///    that encoding, BOM stripped.
/// 2. No BOM: decode as windows-1251 and validate that the
///    header line carries at least one expected token.
/// 3. Strict UTF-8.
/// 4. Lossy windows-1251.
///
/// The returned text never begins with U+FEFF.
pub fn decode_extract(bytes: &[u8], expected_tokens: &[&str]) -> String {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        let (text, _, _) = encoding.decode(bytes);
        return without_bom(text);
    }

    let (text, had_errors) = WINDOWS_1251.decode_without_bom_handling(bytes);
    if !had_errors && header_has_expected_token(&text, expected_tokens) {
        return text.into_owned();
    }

    if let Ok(utf8) = std::str::from_utf8(bytes) {
        return utf8.to_string();
    }

    let (lossy, _) = WINDOWS_1251.decode_without_bom_handling(bytes);
    lossy.into_owned()
}

/// Check the first line for any of the kind's known header tokens.
fn header_has_expected_token(text: &str, expected_tokens: &[&str]) -> bool {
    let header = text.lines().next().unwrap_or("");
    expected_tokens.iter().any(|token| header.contains(token))
}

fn without_bom(text: Cow<'_, str>) -> String {
    match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text.into_owned(),
    }
}
