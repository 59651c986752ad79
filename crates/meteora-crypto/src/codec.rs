use std::io;

use meteora_types::Content;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed content: {0}")]
    MalformedContent(#[from] serde_json::Error),

    #[error("failed to encode content: {0}")]
    Encode(serde_json::Error),
}

/// Compact JSON that additionally writes `<`, `>`, `&`, U+2028 and U+2029 as
/// `\u` escapes, the byte form existing clients sign.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escape = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(&fragment.as_bytes()[start..i])?;
            writer.write_all(escape.as_bytes())?;
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Canonical bytes of `content`: `{"timestamp":<n>,"text":"<s>"}` with no
/// whitespace, keys in `Content`'s declaration order. Signers and verifiers
/// both hash and sign exactly these bytes.
pub fn encode(content: &Content) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(content.text.len() + 32);
    {
        let mut ser = Serializer::with_formatter(&mut buf, CanonicalFormatter);
        content.serialize(&mut ser).map_err(CodecError::Encode)?;
    }
    Ok(buf)
}

/// Standalone inverse of [`encode`], for clients and tooling holding bare
/// content bytes. The relay reads content as part of a whole submit frame
/// instead. Accepts any JSON spelling of the same object but rejects unknown
/// keys, missing keys and trailing data.
pub fn decode(bytes: &[u8]) -> Result<Content, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}
