//! Text decoding with an ordered encoding fallback, and header cleanup.

use defis_core::TextEncoding;
use unicode_normalization::UnicodeNormalization;

const BOM: char = '\u{feff}';
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded text and the encoding that produced it. `encoding` is `None`
/// when every configured encoding failed and a lossy decode was used.
#[derive(Debug)]
pub struct Decoded {
    pub text: String,
    pub encoding: Option<TextEncoding>,
}

fn try_decode(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
        TextEncoding::Utf8Sig => {
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            std::str::from_utf8(body).ok().map(str::to_owned)
        }
        TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Decodes `bytes` with the first encoding in `encodings` that accepts them.
///
/// Never fails: the last resort is a UTF-8 decode with replacement
/// characters.
#[must_use]
pub fn decode_text(bytes: &[u8], encodings: &[TextEncoding]) -> Decoded {
    for (attempt, &encoding) in encodings.iter().enumerate() {
        if let Some(text) = try_decode(bytes, encoding) {
            if attempt > 0 {
                tracing::info!(%encoding, attempt, "decoded dataset with fallback encoding");
            }
            return Decoded {
                text,
                encoding: Some(encoding),
            };
        }
    }

    tracing::warn!(
        tried = encodings.len(),
        "no configured encoding accepted the dataset; decoding lossily"
    );
    Decoded {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: None,
    }
}

/// Canonical form of a column header.
///
/// Typographic quotes, backticks and acute accents become `'`, non-breaking
/// spaces become spaces, en and em dashes become `-`; the result is NFKC
/// normalized with any byte-order mark and surrounding whitespace removed.
#[must_use]
pub fn clean_column_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .filter(|&c| c != BOM)
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02bc}' | '`' | '\u{00b4}' => '\'',
            '\u{00a0}' => ' ',
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect();
    replaced.nfkc().collect::<String>().trim().to_owned()
}
