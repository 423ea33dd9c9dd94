//! `data:image/<subtype>;base64,<data>` payloads.

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine,
};

use crate::error::MediaError;

pub const EMBEDDED_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub subtype: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    pub fn extension(&self) -> &str {
        extension_for_subtype(&self.subtype)
    }
}

pub fn is_embedded(value: &str) -> bool {
    value.starts_with(EMBEDDED_PREFIX)
}

pub fn decode(payload: &str) -> Result<DecodedImage, MediaError> {
    let (subtype, data) = split(payload).ok_or(MediaError::InvalidPayload)?;
    let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT
        .decode(data.as_bytes())
        .map_err(|_| MediaError::InvalidPayload)?;
    Ok(DecodedImage {
        subtype: subtype.to_string(),
        bytes,
    })
}

pub fn encode(subtype: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        EMBEDDED_PREFIX,
        subtype,
        BASE64_MARKER,
        STANDARD.encode(bytes)
    )
}

pub fn extension_for_subtype(subtype: &str) -> &str {
    match subtype {
        "jpeg" => "jpg",
        other => other,
    }
}

pub fn subtype_for_filename(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "jpeg",
    };
    match ext.as_str() {
        "jpg" | "jpeg" => "jpeg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        _ => "jpeg",
    }
}

fn split(payload: &str) -> Option<(&str, &str)> {
    let rest = payload.strip_prefix(EMBEDDED_PREFIX)?;
    let (subtype, data) = rest.split_once(BASE64_MARKER)?;
    if subtype.is_empty() || data.is_empty() || !subtype.chars().all(is_subtype_char) {
        return None;
    }
    Some((subtype, data))
}

fn is_subtype_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '/')
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_decode_matches_plain_base64() {
        let decoded = decode(PNG).unwrap();
        assert_eq!("png", decoded.subtype);
        assert_eq!(STANDARD.decode("iVBORw0KGgo=").unwrap(), decoded.bytes);
        assert_eq!("png", decoded.extension());
    }

    #[test]
    fn test_encode_then_decode() {
        let bytes = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
        let payload = encode("jpeg", &bytes);
        let decoded = decode(&payload).unwrap();
        assert_eq!("jpeg", decoded.subtype);
        assert_eq!(bytes, decoded.bytes);
        assert_eq!("jpg", decoded.extension());
    }

    #[test]
    fn test_decode_tolerates_missing_padding() {
        let decoded = decode("data:image/gif;base64,R0lGOD").unwrap();
        assert_eq!(b"GIF8".to_vec(), decoded.bytes[..4].to_vec());
    }

    #[test]
    fn test_subtype_charset() {
        assert_eq!("svg+xml", decode("data:image/svg+xml;base64,PHN2Zz4=").unwrap().subtype);
        assert_eq!("x-icon", decode("data:image/x-icon;base64,AAAB").unwrap().subtype);
        assert!(decode("data:image/pn g;base64,AAAB").is_err());
        assert!(decode("data:image/png.;base64,AAAB").is_err());
    }

    #[test]
    fn test_invalid_payloads() {
        for input in [
            "https://example.com/a.png",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,iVBORw0KGgo=",
            "data:image/;base64,iVBORw0KGgo=",
            "data:image/png;base64,",
            "data:image/png;base64,@@@@",
        ] {
            assert!(
                matches!(decode(input), Err(MediaError::InvalidPayload)),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_is_embedded() {
        assert!(is_embedded(PNG));
        assert!(!is_embedded("http://localhost:3004/uploads/1-icon.png"));
    }

    #[test]
    fn test_extension_and_subtype_guess() {
        assert_eq!("jpg", extension_for_subtype("jpeg"));
        assert_eq!("webp", extension_for_subtype("webp"));
        assert_eq!("jpeg", subtype_for_filename("1-thumbnail.JPG"));
        assert_eq!("png", subtype_for_filename("1-icon.png"));
        assert_eq!("gif", subtype_for_filename("1-icon.gif"));
        assert_eq!("webp", subtype_for_filename("1-icon.webp"));
        assert_eq!("jpeg", subtype_for_filename("1-icon.bmp"));
        assert_eq!("jpeg", subtype_for_filename("noext"));
    }
}
