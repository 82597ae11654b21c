//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Anything else is an error; no DTD-declared entities are expanded.

use super::unicode::is_xml_char;

/// Why a reference could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// Named reference outside the predefined five
    Unknown,
    /// Numeric reference that is unparsable or not an XML `Char`
    InvalidCharRef,
}

/// Decode the body of a reference (the part between `&` and `;`)
pub fn decode_entity(entity: &str) -> Result<char, EntityError> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "amp" => Ok('&'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        _ => Err(EntityError::Unknown),
    }
}

/// Decode a numeric character reference (without the leading `#`)
fn decode_numeric_entity(entity: &str) -> Result<char, EntityError> {
    let codepoint = if let Some(hex) = entity.strip_prefix('x') {
        // Hexadecimal: &#xHHHH;
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EntityError::InvalidCharRef);
        }
        u32::from_str_radix(hex, 16).map_err(|_| EntityError::InvalidCharRef)?
    } else {
        // Decimal: &#DDDD;
        if entity.is_empty() || !entity.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EntityError::InvalidCharRef);
        }
        entity.parse::<u32>().map_err(|_| EntityError::InvalidCharRef)?
    };

    char::from_u32(codepoint)
        .filter(|&c| is_xml_char(c))
        .ok_or(EntityError::InvalidCharRef)
}
