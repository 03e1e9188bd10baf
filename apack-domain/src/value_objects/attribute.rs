//! Entry metadata attributes — a `(key, tagged-value)` pair, keys unique per
//! entry, values limited to the three variants the trailer's attribute
//! record can encode.

use crate::constants::{ATTR_TYPE_BOOL, ATTR_TYPE_LONG, ATTR_TYPE_STRING};
use crate::error::ArchiveError;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Long(i64),
    Bool(bool),
}

impl AttributeValue {
    pub fn type_tag(&self) -> u8 {
        match self {
            AttributeValue::String(_) => ATTR_TYPE_STRING,
            AttributeValue::Long(_) => ATTR_TYPE_LONG,
            AttributeValue::Bool(_) => ATTR_TYPE_BOOL,
        }
    }

    pub fn from_tag_and_bytes(tag: u8, bytes: &[u8]) -> Result<Self, ArchiveError> {
        match tag {
            ATTR_TYPE_STRING => String::from_utf8(bytes.to_vec())
                .map(AttributeValue::String)
                .map_err(|e| ArchiveError::format(format!("attribute value is not valid UTF-8: {e}"))),
            ATTR_TYPE_LONG => {
                let arr: [u8; 8] = bytes
                    .try_into()
                    .map_err(|_| ArchiveError::format("long attribute value must be 8 bytes"))?;
                Ok(AttributeValue::Long(i64::from_le_bytes(arr)))
            }
            ATTR_TYPE_BOOL => {
                let b = *bytes
                    .first()
                    .ok_or_else(|| ArchiveError::format("bool attribute value must be 1 byte"))?;
                Ok(AttributeValue::Bool(b != 0))
            }
            other => Err(ArchiveError::format(format!("unknown attribute type tag {other}"))),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            AttributeValue::String(s) => s.as_bytes().to_vec(),
            AttributeValue::Long(v) => v.to_le_bytes().to_vec(),
            AttributeValue::Bool(b) => vec![if *b { 1 } else { 0 }],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: AttributeValue) -> Self {
        Attribute { key: key.into(), value }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute::new(key, AttributeValue::String(value.into()))
    }

    pub fn long(key: impl Into<String>, value: i64) -> Self {
        Attribute::new(key, AttributeValue::Long(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Attribute::new(key, AttributeValue::Bool(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_value_roundtrips() {
        let v = AttributeValue::String("héllo".to_string());
        let bytes = v.to_bytes();
        let back = AttributeValue::from_tag_and_bytes(v.type_tag(), &bytes).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn long_value_roundtrips() {
        let v = AttributeValue::Long(-42);
        let bytes = v.to_bytes();
        let back = AttributeValue::from_tag_and_bytes(v.type_tag(), &bytes).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn bool_value_roundtrips() {
        let v = AttributeValue::Bool(true);
        let bytes = v.to_bytes();
        let back = AttributeValue::from_tag_and_bytes(v.type_tag(), &bytes).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!(AttributeValue::from_tag_and_bytes(99, &[]).is_err());
    }
}
