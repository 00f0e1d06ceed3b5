//! Small helpers shared by the decoding, extraction and logging call sites.

/// Decode HTML and XML character references in raw markup bytes.
///
/// Handles the XML predefined entities as well as HTML named (`&nbsp;`,
/// `&hellip;`) and numeric (`&#8217;`) references. Invalid UTF-8 is replaced
/// lossily.
///
/// # Arguments
///
/// * `raw` - Text or attribute bytes exactly as they appear in the document
///
/// # Returns
///
/// The literal text those bytes stand for.
pub fn decode_entities(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    html_escape::decode_html_entities(&text).into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
