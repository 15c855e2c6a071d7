//! Asset number codec.
//!
//! An asset number is a fixed 12-character identifier:
//!
//! ```text
//! DD YY B AAA SSSS
//! |  |  | |   +-- sequence number, zero-padded to 4 digits
//! |  |  | +------ asset type code, zero-padded to 3 digits
//! |  |  +-------- building letter (A-D)
//! |  +----------- last two digits of the acquisition year
//! +-------------- department code (ST, KM, PD, SK, IT)
//! ```
//!
//! Encoding validates field widths and fails with [`ValidationError`];
//! decoding validates each segment and fails with [`FormatError`]. For every
//! valid field tuple `decode(encode(fields)) == fields`, with the year
//! reconstructed through the century window described on [`full_year`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::department::{Building, Department};
use crate::error::CoreError;
use crate::types::{current_year, YEAR_RANGE};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Total length of an encoded asset number.
pub const ASSET_NUMBER_LEN: usize = 12;
/// Width of the asset type segment.
pub const ASSET_TYPE_WIDTH: usize = 3;
/// Width of the sequence segment.
pub const SEQUENCE_WIDTH: usize = 4;
/// Highest sequence number that fits in [`SEQUENCE_WIDTH`] digits.
pub const MAX_SEQUENCE: u32 = 9999;
/// Two-digit years more than this many years ahead of today are read as 19xx.
pub const CENTURY_WINDOW_YEARS: i32 = 10;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The part of an asset number an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Length,
    Department,
    Year,
    Building,
    AssetType,
    Sequence,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Length => "length",
            Self::Department => "department code",
            Self::Year => "year",
            Self::Building => "building code",
            Self::AssetType => "asset type code",
            Self::Sequence => "sequence number",
        })
    }
}

/// A field supplied for encoding violates its width or character class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} '{value}': {reason}")]
pub struct ValidationError {
    pub field: Segment,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: Segment, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// An asset number string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid asset number format: {reason}")]
pub struct FormatError {
    pub segment: Segment,
    pub value: String,
    pub reason: String,
}

impl FormatError {
    fn new(segment: Segment, value: &str, reason: String) -> Self {
        Self {
            segment,
            value: value.to_string(),
            reason,
        }
    }
}

// ---------------------------------------------------------------------------
// AssetIdentifier
// ---------------------------------------------------------------------------

/// Decoded, validated form of an asset number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetIdentifier {
    #[serde(rename = "department_code", serialize_with = "serialize_department_code")]
    pub department: Department,
    pub year: i32,
    #[serde(rename = "building_code")]
    pub building: Building,
    pub asset_type_code: String,
    pub sequence_number: String,
}

fn serialize_department_code<S: Serializer>(d: &Department, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(d.code())
}

impl AssetIdentifier {
    /// Build an identifier from typed parts, zero-padding the numeric segments.
    pub fn new(
        department: Department,
        year: i32,
        building: Building,
        asset_type_code: &str,
        sequence_number: &str,
    ) -> Result<Self, ValidationError> {
        validate_year(year)?;
        Ok(Self {
            department,
            year,
            building,
            asset_type_code: pad_numeric(asset_type_code, ASSET_TYPE_WIDTH, Segment::AssetType)?,
            sequence_number: pad_numeric(sequence_number, SEQUENCE_WIDTH, Segment::Sequence)?,
        })
    }

    /// Encode into the 12-character wire form.
    pub fn encode(&self) -> String {
        format!(
            "{}{:02}{}{}{}",
            self.department.code(),
            self.year.rem_euclid(100),
            self.building,
            self.asset_type_code,
            self.sequence_number
        )
    }

    /// The first eight characters: everything except the sequence.
    pub fn prefix(&self) -> String {
        let mut encoded = self.encode();
        encoded.truncate(ASSET_NUMBER_LEN - SEQUENCE_WIDTH);
        encoded
    }
}

impl fmt::Display for AssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode raw field values into an asset number.
///
/// `department_code` and `building_code` are trimmed and upper-cased before
/// validation. The building code must be a single letter from A to D so the
/// result always decodes.
///
/// ```
/// use assetreg_core::asset_number::encode;
///
/// assert_eq!(encode("ST", 2023, "A", "001", "0001").unwrap(), "ST23A0010001");
/// assert_eq!(encode("PD", 2023, "B", "2", "2").unwrap(), "PD23B0020002");
/// ```
pub fn encode(
    department_code: &str,
    year: i32,
    building_code: &str,
    asset_type_code: &str,
    sequence_number: &str,
) -> Result<String, ValidationError> {
    let code = department_code.trim().to_ascii_uppercase();
    let department = Department::from_code(&code).ok_or_else(|| {
        ValidationError::new(
            Segment::Department,
            &code,
            format!("must be one of: {}", Department::known_codes()),
        )
    })?;

    let building_code = building_code.trim().to_ascii_uppercase();
    let mut chars = building_code.chars();
    let building = match (chars.next(), chars.next()) {
        (Some(c), None) => Building::from_char(c).ok_or_else(|| {
            ValidationError::new(Segment::Building, &building_code, "must be A, B, C, or D")
        })?,
        _ => {
            return Err(ValidationError::new(
                Segment::Building,
                &building_code,
                "must be a single character",
            ))
        }
    };

    AssetIdentifier::new(department, year, building, asset_type_code, sequence_number)
        .map(|id| id.encode())
}

fn validate_year(year: i32) -> Result<(), ValidationError> {
    if YEAR_RANGE.contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::new(Segment::Year, year, "must be a 4-digit year"))
    }
}

fn pad_numeric(value: &str, width: usize, field: Segment) -> Result<String, ValidationError> {
    let value = value.trim();
    if !DIGITS_RE.is_match(value) {
        return Err(ValidationError::new(field, value, "must be numeric"));
    }
    if value.len() > width {
        return Err(ValidationError::new(
            field,
            value,
            format!("must be at most {width} digits"),
        ));
    }
    Ok(format!("{value:0>width$}"))
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode an asset number relative to today's calendar year.
pub fn decode(asset_number: &str) -> Result<AssetIdentifier, FormatError> {
    decode_at(asset_number, current_year())
}

/// Decode an asset number, resolving the two-digit year against `current_year`.
///
/// Segments are checked in wire order (department, year, building, asset
/// type, sequence) and the first violation is reported.
pub fn decode_at(asset_number: &str, current_year: i32) -> Result<AssetIdentifier, FormatError> {
    let clean = asset_number.trim().to_uppercase();
    let chars: Vec<char> = clean.chars().collect();

    if chars.len() != ASSET_NUMBER_LEN {
        return Err(FormatError::new(
            Segment::Length,
            &clean,
            format!(
                "asset number must be exactly {ASSET_NUMBER_LEN} characters long (got {})",
                chars.len()
            ),
        ));
    }

    let segment = |range: std::ops::Range<usize>| -> String { chars[range].iter().collect() };
    let department_code = segment(0..2);
    let year_part = segment(2..4);
    let building_code = segment(4..5);
    let asset_type_code = segment(5..8);
    let sequence_number = segment(8..12);

    let department = Department::from_code(&department_code).ok_or_else(|| {
        FormatError::new(
            Segment::Department,
            &department_code,
            format!(
                "invalid department code '{department_code}', must be one of: {}",
                Department::known_codes()
            ),
        )
    })?;

    if !DIGITS_RE.is_match(&year_part) {
        return Err(FormatError::new(
            Segment::Year,
            &year_part,
            format!("invalid year part '{year_part}', must be numeric"),
        ));
    }
    let two_digit: i32 = year_part.parse().map_err(|_| {
        FormatError::new(
            Segment::Year,
            &year_part,
            format!("invalid year part '{year_part}', must be numeric"),
        )
    })?;

    let building = building_code
        .chars()
        .next()
        .and_then(Building::from_char)
        .ok_or_else(|| {
            FormatError::new(
                Segment::Building,
                &building_code,
                format!("invalid building code '{building_code}', must be A, B, C, or D"),
            )
        })?;

    if !DIGITS_RE.is_match(&asset_type_code) {
        return Err(FormatError::new(
            Segment::AssetType,
            &asset_type_code,
            format!("invalid asset type code '{asset_type_code}', must be {ASSET_TYPE_WIDTH} digits"),
        ));
    }

    if !DIGITS_RE.is_match(&sequence_number) {
        return Err(FormatError::new(
            Segment::Sequence,
            &sequence_number,
            format!("invalid sequence number '{sequence_number}', must be {SEQUENCE_WIDTH} digits"),
        ));
    }

    Ok(AssetIdentifier {
        department,
        year: full_year(two_digit, current_year),
        building,
        asset_type_code,
        sequence_number,
    })
}

/// Expand a two-digit year.
///
/// Years more than [`CENTURY_WINDOW_YEARS`] ahead of the current two-digit
/// year are placed in the 1900s, everything else in the 2000s. Numbers
/// issued for acquisitions more than ten years in the future, or more than
/// ninety years in the past, decode into the wrong century.
pub fn full_year(two_digit: i32, current_year: i32) -> i32 {
    let current_two_digit = current_year.rem_euclid(100);
    if two_digit > current_two_digit + CENTURY_WINDOW_YEARS {
        1900 + two_digit
    } else {
        2000 + two_digit
    }
}

// ---------------------------------------------------------------------------
// Sequence allocation
// ---------------------------------------------------------------------------

/// Next free sequence number for the given prefix fields.
///
/// Scans `existing` for numbers sharing the department/year/building/type
/// prefix and returns `max + 1`, zero-padded. Malformed entries are ignored.
pub fn next_sequence_number<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    department: Department,
    year: i32,
    building: Building,
    asset_type_code: &str,
) -> Result<String, CoreError> {
    let prefix = AssetIdentifier::new(department, year, building, asset_type_code, "0")?.prefix();
    next_sequence_for_prefix(existing, &prefix)
}

/// Next free sequence number among `existing` numbers starting with the
/// 8-character `prefix`.
pub fn next_sequence_for_prefix<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    prefix: &str,
) -> Result<String, CoreError> {
    let highest = existing
        .into_iter()
        .filter(|n| n.len() == ASSET_NUMBER_LEN && n.starts_with(prefix))
        .filter_map(|n| n[prefix.len()..].parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    if highest >= MAX_SEQUENCE {
        return Err(CoreError::Conflict(format!(
            "No sequence numbers left for prefix {prefix}"
        )));
    }

    Ok(format!("{:0>width$}", highest + 1, width = SEQUENCE_WIDTH))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
