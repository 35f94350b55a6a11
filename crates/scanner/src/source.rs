use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::Serialize;

/// Source text recovered from raw file bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSource {
    pub text: String,

    /// Encoding label the bytes were decoded with
    pub encoding: &'static str,

    /// True when undecodable bytes were replaced
    pub lossy: bool,
}

/// Decode file bytes as UTF-8, falling back to a detected encoding.
///
/// Never fails: bytes the detected encoding cannot map are replaced with
/// U+FFFD.
pub fn decode_source(bytes: &[u8]) -> DecodedSource {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedSource {
            text: text.into_owned(),
            encoding: encoding.name(),
            lossy: had_errors,
        };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedSource {
            text: text.to_string(),
            encoding: "UTF-8",
            lossy: false,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, actual, had_errors) = encoding.decode(bytes);

    log::debug!(
        "Decoded non UTF-8 source as {} (replacements: {had_errors})",
        actual.name()
    );

    DecodedSource {
        text: text.into_owned(),
        encoding: actual.name(),
        lossy: had_errors,
    }
}

/// Split text into lines the way the structural tree stores them.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        let decoded = decode_source("x = 'héllo'\n".as_bytes());
        assert_eq!(decoded.text, "x = 'héllo'\n");
        assert_eq!(decoded.encoding, "UTF-8");
        assert!(!decoded.lossy);
    }

    #[test]
    fn bom_is_stripped() {
        let decoded = decode_source(b"\xef\xbb\xbfx = 1\n");
        assert_eq!(decoded.text, "x = 1\n");
        assert_eq!(decoded.encoding, "UTF-8");

        let utf16 = decode_source(b"\xff\xfex\x00\n\x00");
        assert_eq!(utf16.text, "x\n");
        assert_eq!(utf16.encoding, "UTF-16LE");
    }

    #[test]
    fn latin1_bytes_are_recovered() {
        // "café" encoded as Latin-1 is not valid UTF-8
        let decoded = decode_source(b"name = 'caf\xe9'\n");
        assert_ne!(decoded.encoding, "UTF-8");
        assert!(decoded.text.starts_with("name = 'caf"));
        assert!(decoded.text.ends_with("'\n"));
    }

    #[test]
    fn split_lines_drops_terminators() {
        assert_eq!(split_lines("a\r\nb\n"), vec!["a".to_string(), "b".to_string()]);
    }
}
