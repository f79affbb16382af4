use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Control characters that spreadsheet XML cannot hold. Tab, line feed and
/// carriage return are allowed.
static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B-\x0C\x0E-\x1F]").expect("valid regex"));

/// Removes every illegal control character from `text`.
#[must_use]
pub fn strip_illegal_chars(text: &str) -> Cow<'_, str> {
    ILLEGAL_CHARS.replace_all(text, "")
}
