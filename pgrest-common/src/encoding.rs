//! URL decoding shared by the server's filter parser and the client's
//! `Content-Location` handling.

use percent_encoding::percent_decode_str;

/// Decode an `application/x-www-form-urlencoded` component as UTF-8.
///
/// `+` decodes to a space and `%XX` escapes decode to bytes. Returns `None`
/// when the decoded bytes are not valid UTF-8.
pub fn url_decode(input: &str) -> Option<String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
