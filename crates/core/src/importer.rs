//! Spreadsheet import validation.
//!
//! Rows arrive keyed by the Indonesian column headers used in the register's
//! spreadsheets (English snake_case aliases are accepted too). Every row is
//! validated and all failures are collected; the caller inserts the batch
//! only when no row failed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::asset::{NewAsset, DEFAULT_BRAND};
use crate::asset_number::decode_at;
use crate::department::Category;
use crate::depreciation::{find_group_by_name, DepreciationGroup};
use crate::nfc::{generate_nfc_uid, normalize_nfc_uid, validate_nfc_uid};

/// Placeholder used in spreadsheets for an empty cell.
pub const EMPTY_CELL: &str = "-";

/// Attempts at drawing an NFC UID not used by stored assets or the batch.
const MAX_UID_ATTEMPTS: usize = 64;

// ---------------------------------------------------------------------------
// Row shape
// ---------------------------------------------------------------------------

/// A spreadsheet cell that may hold a number or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric value of the cell; text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One imported row.
///
/// `Tahun` and `Bidang` are informational: year and department are taken
/// from the asset number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    #[serde(rename = "Nomor Asset", alias = "asset_number", default)]
    pub asset_number: Option<String>,
    #[serde(rename = "NFC UID", alias = "nfc_uid", default)]
    pub nfc_uid: Option<String>,
    #[serde(rename = "Tahun", alias = "year", default)]
    pub year: Option<Cell>,
    #[serde(rename = "Nama", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Brand", alias = "brand", default)]
    pub brand: Option<String>,
    #[serde(rename = "Nilai Perolehan", alias = "acquisition_value", default)]
    pub acquisition_value: Option<Cell>,
    #[serde(rename = "Bidang", alias = "department", default)]
    pub department: Option<String>,
    #[serde(rename = "Kategori", alias = "category", default)]
    pub category: Option<String>,
    #[serde(rename = "Grup Depresiasi", alias = "depreciation_group", default)]
    pub depreciation_group: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// State the batch is validated against.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    pub groups: &'a [DepreciationGroup],
    /// Asset numbers already registered.
    pub existing_numbers: &'a HashSet<String>,
    /// NFC UIDs already registered, upper-cased.
    pub existing_nfc_uids: &'a HashSet<String>,
    pub current_year: i32,
}

/// A failed row. `row` is 1-based over the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Outcome of validating a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub accepted: Vec<NewAsset>,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All row errors as one newline-separated message.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Validate every row of an import batch.
pub fn validate_import(rows: &[ImportRow], ctx: &ImportContext<'_>) -> ImportReport {
    let mut seen_numbers: HashSet<String> = HashSet::new();
    let mut batch_uids: HashSet<String> = HashSet::new();
    let mut accepted = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match validate_row(row, ctx, &mut seen_numbers, &mut batch_uids) {
            Ok(asset) => accepted.push(asset),
            Err(message) => errors.push(RowError {
                row: index + 1,
                message,
            }),
        }
    }

    ImportReport {
        total_rows: rows.len(),
        accepted,
        errors,
    }
}

fn validate_row(
    row: &ImportRow,
    ctx: &ImportContext<'_>,
    seen_numbers: &mut HashSet<String>,
    batch_uids: &mut HashSet<String>,
) -> Result<NewAsset, String> {
    let raw_number = row.asset_number.as_deref().unwrap_or_default();
    let identifier = decode_at(raw_number, ctx.current_year).map_err(|e| e.to_string())?;
    let asset_number = identifier.encode();

    if ctx.existing_numbers.contains(&asset_number) {
        return Err(format!("Asset number {asset_number} already exists"));
    }
    if !seen_numbers.insert(asset_number.clone()) {
        return Err(format!("Duplicate asset number {asset_number} in file"));
    }

    let department = identifier.department;
    let category = match non_empty(row.category.as_deref()) {
        None => None,
        Some(label) => Some(Category::from_label(department, label).ok_or_else(|| {
            let valid: Vec<&str> = department.categories().iter().map(|c| c.label()).collect();
            format!(
                "Invalid category \"{label}\" for department \"{}\". Valid categories are: {}",
                department.label(),
                valid.join(", ")
            )
        })?),
    };

    let name = non_empty(row.name.as_deref()).ok_or("Name is required")?;

    let acquisition_value = row
        .acquisition_value
        .as_ref()
        .and_then(Cell::as_number)
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or("Acquisition value must be a valid number")?;

    let group_name = row.depreciation_group.as_deref().unwrap_or_default();
    let group = find_group_by_name(ctx.groups, group_name)
        .ok_or_else(|| format!("Invalid depreciation group: {}", group_name.trim()))?;

    let nfc_uid = match non_empty(row.nfc_uid.as_deref()) {
        Some(uid) => {
            validate_nfc_uid(uid).map_err(|e| e.to_string())?;
            let uid = normalize_nfc_uid(uid);
            if ctx.existing_nfc_uids.contains(&uid) || batch_uids.contains(&uid) {
                return Err(format!("NFC UID {uid} is already in use"));
            }
            uid
        }
        None => fresh_uid(ctx.existing_nfc_uids, batch_uids)?,
    };
    batch_uids.insert(nfc_uid.clone());

    let asset = NewAsset {
        department,
        category,
        year: identifier.year,
        building: identifier.building,
        asset_type_code: identifier.asset_type_code,
        sequence_number: Some(identifier.sequence_number),
        name: name.to_string(),
        brand: Some(
            non_empty(row.brand.as_deref())
                .unwrap_or(DEFAULT_BRAND)
                .to_string(),
        ),
        acquisition_value,
        depreciation_group_id: Some(group.id),
        nfc_uid: Some(nfc_uid),
        condition: None,
        location: None,
        description: None,
        image_url: None,
        purchase_date: None,
    };
    asset.check(ctx.groups).map_err(|e| e.to_string())?;
    Ok(asset)
}

/// Trimmed cell text, treating blanks and `-` as empty.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != EMPTY_CELL)
}

fn fresh_uid(existing: &HashSet<String>, batch: &HashSet<String>) -> Result<String, String> {
    std::iter::repeat_with(generate_nfc_uid)
        .take(MAX_UID_ATTEMPTS)
        .find(|uid| !existing.contains(uid) && !batch.contains(uid))
        .ok_or_else(|| "Could not generate a unique NFC UID".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::{Building, Department};
    use crate::depreciation::GroupType;
    use crate::export::import_template;
    use crate::nfc::NFC_UID_LEN;

    fn groups() -> Vec<DepreciationGroup> {
        vec![
            DepreciationGroup {
                id: 1,
                code: "K1".into(),
                name: "Kelompok 1".into(),
                group_type: GroupType::NonBuilding,
                years: 4,
                rate: 0.25,
            },
            DepreciationGroup {
                id: 2,
                code: "K2".into(),
                name: "Kelompok 2".into(),
                group_type: GroupType::NonBuilding,
                years: 8,
                rate: 0.125,
            },
        ]
    }

    fn row(number: &str) -> ImportRow {
        ImportRow {
            asset_number: Some(number.into()),
            name: Some("Laptop".into()),
            acquisition_value: Some(Cell::Number(15_000_000.0)),
            depreciation_group: Some("Kelompok 1".into()),
            ..Default::default()
        }
    }

    fn run(rows: &[ImportRow]) -> ImportReport {
        run_with(rows, &HashSet::new(), &HashSet::new())
    }

    fn run_with(
        rows: &[ImportRow],
        numbers: &HashSet<String>,
        uids: &HashSet<String>,
    ) -> ImportReport {
        let groups = groups();
        let ctx = ImportContext {
            groups: &groups,
            existing_numbers: numbers,
            existing_nfc_uids: uids,
            current_year: 2024,
        };
        validate_import(rows, &ctx)
    }

    #[test]
    fn template_rows_validate() {
        let report = run(&import_template());
        assert!(report.is_valid(), "{}", report.error_summary());
        assert_eq!(report.accepted.len(), 2);

        let second = &report.accepted[1];
        assert_eq!(second.department, Department::Education);
        assert_eq!(second.category, Some(Category::Tki));
        assert_eq!(second.building, Building::B);
        assert_eq!(second.asset_type_code, "002");
        assert_eq!(second.sequence_number.as_deref(), Some("0002"));
        assert_eq!(second.depreciation_group_id, Some(2));
        assert_eq!(second.nfc_uid.as_deref(), Some("DEF456GH"));
    }

    #[test]
    fn parses_spreadsheet_headers() {
        let json = r#"[{
            "Nomor Asset": "st23a0010001",
            "NFC UID": "-",
            "Tahun": 2023,
            "Nama": "Laptop",
            "Nilai Perolehan": "15000000",
            "Bidang": "Sekretariat",
            "Kategori": "Aset Tetap",
            "Grup Depresiasi": "Kelompok 1"
        }]"#;
        let rows: Vec<ImportRow> = serde_json::from_str(json).unwrap();
        let report = run(&rows);
        assert!(report.is_valid(), "{}", report.error_summary());

        let asset = &report.accepted[0];
        assert_eq!(asset.year, 2023);
        assert_eq!(asset.brand.as_deref(), Some(DEFAULT_BRAND));
        assert_eq!(asset.acquisition_value, 15_000_000.0);
        assert_eq!(asset.nfc_uid.as_ref().map(String::len), Some(NFC_UID_LEN));
    }

    #[test]
    fn english_aliases_are_accepted() {
        let json = r#"{"asset_number":"IT24D0010001","name":"Router","acquisition_value":900000,"depreciation_group":"Kelompok 2"}"#;
        let row: ImportRow = serde_json::from_str(json).unwrap();
        assert!(run(&[row]).is_valid());
    }

    #[test]
    fn errors_are_collected_per_row() {
        let mut bad_name = row("ST23A0010002");
        bad_name.name = None;
        let mut bad_value = row("ST23A0010003");
        bad_value.acquisition_value = Some(Cell::Text("abc".into()));

        let report = run(&[
            row("ST23A0010001"),
            bad_name,
            row("ST23A001001"),
            bad_value,
        ]);

        assert!(!report.is_valid());
        assert_eq!(report.total_rows, 4);
        let rows: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, [2, 3, 4]);
        assert_eq!(report.errors[0].to_string(), "Row 2: Name is required");
        assert!(report.errors[1].message.starts_with("Invalid asset number format"));
        assert_eq!(report.errors[2].message, "Acquisition value must be a valid number");
    }

    #[test]
    fn zero_value_is_rejected() {
        let mut r = row("ST23A0010001");
        r.acquisition_value = Some(Cell::Number(0.0));
        assert!(!run(&[r]).is_valid());
    }

    #[test]
    fn unknown_category_names_the_valid_ones() {
        let mut r = row("ST23A0010001");
        r.category = Some("TKI".into());
        let report = run(&[r]);
        let msg = &report.errors[0].message;
        assert!(msg.contains("Invalid category \"TKI\""));
        assert!(msg.contains("Aset Tetap, Inventaris Aset"));
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut r = row("ST23A0010001");
        r.depreciation_group = Some("Kelompok 9".into());
        let report = run(&[r]);
        assert_eq!(report.errors[0].message, "Invalid depreciation group: Kelompok 9");
    }

    #[test]
    fn duplicate_numbers_are_rejected() {
        let existing: HashSet<String> = ["ST23A0010001".to_string()].into();
        let report = run_with(
            &[row("ST23A0010001"), row("ST23A0010002"), row("st23a0010002")],
            &existing,
            &HashSet::new(),
        );
        let rows: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, [1, 3]);
    }

    #[test]
    fn supplied_uid_must_be_unused() {
        let uids: HashSet<String> = ["ABC123DE".to_string()].into();
        let mut r = row("ST23A0010001");
        r.nfc_uid = Some("abc123de".into());
        let report = run_with(&[r], &HashSet::new(), &uids);
        assert!(report.errors[0].message.contains("already in use"));
    }

    #[test]
    fn generated_uids_are_distinct_within_batch() {
        let rows: Vec<ImportRow> = (1..=20)
            .map(|n| row(&format!("ST23A001{n:04}")))
            .collect();
        let report = run(&rows);
        assert!(report.is_valid());
        let uids: HashSet<&str> = report
            .accepted
            .iter()
            .filter_map(|a| a.nfc_uid.as_deref())
            .collect();
        assert_eq!(uids.len(), 20);
    }
}
