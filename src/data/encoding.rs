use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, warn};

/// Input text after charset detection and decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
    pub had_errors: bool,
}

/// Picks the encoding of `bytes`: a byte order mark wins, otherwise a statistical guess.
pub fn detect(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        debug!("Detected {} from byte order mark", encoding.name());
        return encoding;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!("Guessed input encoding {}", encoding.name());
    encoding
}

/// Decodes raw file contents to text.
///
/// Malformed sequences are replaced with U+FFFD and reported in `had_errors`;
/// this never fails.
pub fn decode(bytes: &[u8]) -> DecodedText {
    let (text, encoding, had_errors) = detect(bytes).decode(bytes);
    if had_errors {
        warn!(
            "Input contained byte sequences invalid in {}; replaced with U+FFFD",
            encoding.name()
        );
    }
    DecodedText {
        text: text.into_owned(),
        encoding: encoding.name(),
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("SchemeName,DateValued\n".as_bytes());
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.text, "SchemeName,DateValued\n");
        assert!(!decoded.had_errors);
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Scheme Name".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, "UTF-16LE");
        assert_eq!(decoded.text, "Scheme Name");
    }

    #[test]
    fn test_decode_utf8_multibyte() {
        let text = "SchemeName,Remarks\nUmoja Fund,Mfuko wa Umoja – gawio lililolipwa\n";
        let decoded = decode(text.as_bytes());
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.text, text);
    }

    #[test]
    fn test_decode_single_byte_legacy_text() {
        // "é" and "è" as single bytes are not valid UTF-8
        let bytes = b"Le caf\xe9 est tr\xe8s bon, la cr\xe8me br\xfbl\xe9e aussi, d\xe9j\xe0 vu \xe0 l'\xe9cole".to_vec();
        let decoded = decode(&bytes);
        assert_ne!(decoded.encoding, "UTF-8");
        assert!(decoded.text.starts_with("Le caf"));
        assert!(!decoded.text.contains('\u{FFFD}'));
    }
}
