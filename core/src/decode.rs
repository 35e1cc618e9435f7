//! Decoding of dictionary field descriptors into [`FieldType`].
//!
//! The dictionary stores every column, domain and parameter type as a
//! `(type code, sub-type, byte length, character length, scale)` tuple.
//! [`decode`] maps that tuple to the declaration the engine's own DDL
//! generator would print. Decoding is total: codes outside the table map to
//! [`FieldType::Unknown`] instead of failing, so one exotic column never
//! aborts a whole export.
//!
//! Two encodings need care:
//!
//! - Scale is stored as a non-positive magnitude (`-2` for two decimals) and
//!   is shown as its absolute value.
//! - NUMERIC/DECIMAL precision is the storage byte length divided by 4
//!   (integer division), reproducing the engine's storage unit.

use serde::{Deserialize, Serialize};

use crate::FieldType;

const SMALLINT: i64 = 7;
const INTEGER: i64 = 8;
const FLOAT: i64 = 10;
const DATE: i64 = 12;
const TIME: i64 = 13;
const CHAR: i64 = 14;
const INT64: i64 = 16;
const DOUBLE: i64 = 27;
const TIMESTAMP: i64 = 35;
const VARCHAR: i64 = 37;
const BLOB: i64 = 261;

const SUB_TYPE_NUMERIC: i64 = 1;
const SUB_TYPE_DECIMAL: i64 = 2;
const SUB_TYPE_TEXT: i64 = 1;

/// Raw field descriptor as stored in the dictionary.
///
/// Every member except the type code may be NULL in the dictionary; NULL
/// lengths and scale read as `0`, a NULL sub-type matches no sub-type rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub field_type: Option<i64>,
    pub sub_type: Option<i64>,
    pub length: Option<i64>,
    pub char_length: Option<i64>,
    pub scale: Option<i64>,
}

impl RawField {
    /// Creates a descriptor with only the type code set.
    pub fn of_type(code: i64) -> Self {
        Self {
            field_type: Some(code),
            ..Self::default()
        }
    }

    /// Decodes this descriptor. See [`decode`].
    pub fn decode(&self) -> FieldType {
        match self.field_type {
            Some(code) => decode(
                code,
                self.sub_type,
                self.length.unwrap_or(0),
                self.char_length.unwrap_or(0),
                self.scale.unwrap_or(0),
            ),
            None => FieldType::Unknown { code: None },
        }
    }
}

/// Maps a dictionary type tuple to its canonical [`FieldType`].
///
/// # Examples
///
/// ```
/// use dbmeta_core::decode;
///
/// assert_eq!(decode(7, None, 2, 0, 0).to_string(), "SMALLINT");
/// assert_eq!(decode(16, Some(1), 40, 0, -2).to_string(), "NUMERIC(10, 2)");
/// assert_eq!(decode(37, Some(0), 200, 50, 0).to_string(), "VARCHAR(50)");
/// assert_eq!(decode(261, Some(2), 8, 0, 0).to_string(), "BLOB");
/// assert_eq!(decode(9999, None, 0, 0, 0).to_string(), "UNKNOWN");
/// ```
pub fn decode(
    field_type: i64,
    sub_type: Option<i64>,
    length: i64,
    char_length: i64,
    scale: i64,
) -> FieldType {
    let scale = scale.abs();
    match field_type {
        SMALLINT => FieldType::SmallInt,
        INTEGER => FieldType::Integer,
        FLOAT => FieldType::Float,
        DATE => FieldType::Date,
        TIME => FieldType::Time,
        TIMESTAMP => FieldType::Timestamp,
        CHAR => FieldType::Char(char_length),
        VARCHAR => FieldType::Varchar(char_length),
        INT64 => match sub_type {
            Some(SUB_TYPE_NUMERIC) => FieldType::Numeric {
                precision: length / 4,
                scale,
            },
            Some(SUB_TYPE_DECIMAL) => FieldType::Decimal {
                precision: length / 4,
                scale,
            },
            _ => FieldType::BigInt,
        },
        DOUBLE => FieldType::DoublePrecision,
        BLOB => match sub_type {
            Some(SUB_TYPE_TEXT) => FieldType::BlobText,
            _ => FieldType::Blob,
        },
        other => FieldType::Unknown { code: Some(other) },
    }
}
