//! XML Attributes
//!
//! Attribute values arrive from the tokenizer already decoded; this module
//! owns the attribute type, qualified-name splitting and the
//! per-start-tag uniqueness check.

use memchr::memchr;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (may include namespace prefix)
    pub name: String,
    /// Attribute value (entities decoded, whitespace normalized)
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &str {
        split_name(&self.name).1
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&str> {
        split_name(&self.name).0
    }
}

/// Split a qualified name into prefix and local name at the first colon
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match memchr(b':', name.as_bytes()) {
        Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
        None => (None, name),
    }
}

/// Ordered attributes of one start tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attrs: Vec<Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `name` is already present on this tag
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Append an attribute. Hands the attribute back if its name is taken.
    pub fn push(&mut self, attr: Attribute) -> Result<(), Attribute> {
        if self.contains(&attr.name) {
            return Err(attr);
        }
        self.attrs.push(attr);
        Ok(())
    }

    pub fn into_vec(self) -> Vec<Attribute> {
        self.attrs
    }
}

/// Find an attribute value by name
pub fn get_attribute_value<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
}

/// Parse the pseudo-attributes of an XML declaration body, e.g.
/// `version="1.0" encoding='UTF-8'`. No entity decoding applies.
pub fn parse_pseudo_attributes(input: &str) -> Result<Vec<(String, String)>, &'static str> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        if pos == ws_start && !attrs.is_empty() {
            return Err("whitespace required between pseudo-attributes");
        }

        let name_start = pos;
        while pos < bytes.len() && is_pseudo_name_char(bytes[pos]) {
            pos += 1;
        }
        if pos == name_start {
            return Err("expected pseudo-attribute name");
        }
        let name = &input[name_start..pos];

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            return Err("expected '=' after pseudo-attribute name");
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let quote = match bytes.get(pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Err("pseudo-attribute value must be quoted"),
        };
        pos += 1;
        let value_len = match memchr(quote, &bytes[pos..]) {
            Some(len) => len,
            None => return Err("unterminated pseudo-attribute value"),
        };
        attrs.push((name.to_string(), input[pos..pos + value_len].to_string()));
        pos += value_len + 1;
    }

    Ok(attrs)
}

#[inline]
fn is_pseudo_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_attribute() {
        let attr = Attribute::new("xmlns:xlink", "http://www.w3.org/1999/xlink");
        assert_eq!(attr.prefix(), Some("xmlns"));
        assert_eq!(attr.local_name(), "xlink");

        let plain = Attribute::new("id", "1");
        assert_eq!(plain.prefix(), None);
        assert_eq!(plain.local_name(), "id");
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut list = AttributeList::new();
        assert!(list.push(Attribute::new("x", "1")).is_ok());
        let rejected = list.push(Attribute::new("x", "2")).unwrap_err();
        assert_eq!(rejected.value, "2");
        let attrs = list.into_vec();
        assert_eq!(attrs.len(), 1);
        assert_eq!(get_attribute_value(&attrs, "x"), Some("1"));
    }

    #[test]
    fn test_prefixed_names_are_distinct() {
        let mut list = AttributeList::new();
        assert!(list.push(Attribute::new("a:x", "1")).is_ok());
        assert!(list.push(Attribute::new("b:x", "2")).is_ok());
        assert_eq!(list.into_vec().len(), 2);
    }

    #[test]
    fn test_pseudo_attributes() {
        let attrs =
            parse_pseudo_attributes(" version=\"1.0\" encoding='UTF-8' standalone=\"yes\"")
                .unwrap();
        assert_eq!(
            attrs,
            vec![
                ("version".to_string(), "1.0".to_string()),
                ("encoding".to_string(), "UTF-8".to_string()),
                ("standalone".to_string(), "yes".to_string()),
            ]
        );
    }

    #[test]
    fn test_pseudo_attribute_errors() {
        assert!(parse_pseudo_attributes("version=1.0").is_err());
        assert!(parse_pseudo_attributes("version=\"1.0").is_err());
        assert!(parse_pseudo_attributes("version=\"1.0\"encoding=\"x\"").is_err());
        assert!(parse_pseudo_attributes("version \"1.0\"").is_err());
    }
}
