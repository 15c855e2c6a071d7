//! Flat export rows and the import template.
//!
//! Rendering to a spreadsheet or PDF happens outside this crate; these rows
//! serialize with the same column headers the importer reads.

use serde::Serialize;

use crate::asset::Asset;
use crate::depreciation::{find_group, rate_label, DepreciationGroup};
use crate::importer::{Cell, ImportRow, EMPTY_CELL};
use crate::types::Money;

/// One exported asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Nomor Asset")]
    pub asset_number: String,
    #[serde(rename = "NFC UID")]
    pub nfc_uid: String,
    #[serde(rename = "Tahun")]
    pub year: i32,
    #[serde(rename = "Nama")]
    pub name: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Nilai Perolehan")]
    pub acquisition_value: Money,
    #[serde(rename = "Depresiasi")]
    pub depreciation: String,
    #[serde(rename = "Nilai Buku")]
    pub book_value: Money,
    #[serde(rename = "Bidang")]
    pub department: String,
    #[serde(rename = "Kategori")]
    pub category: String,
    #[serde(rename = "Tanggal Pembelian")]
    pub purchase_date: String,
    #[serde(rename = "Grup Depresiasi")]
    pub depreciation_group: String,
}

/// Build export rows, one per asset, in input order.
pub fn export_rows(assets: &[&Asset], groups: &[DepreciationGroup]) -> Vec<ExportRow> {
    assets
        .iter()
        .map(|asset| {
            let group = asset.depreciation_group_id.and_then(|id| find_group(groups, id));
            ExportRow {
                asset_number: asset.asset_number.clone(),
                nfc_uid: asset.nfc_uid.clone().unwrap_or_else(|| EMPTY_CELL.into()),
                year: asset.year,
                name: asset.name.clone(),
                brand: asset.brand.clone(),
                acquisition_value: asset.acquisition_value,
                depreciation: group.map_or_else(|| EMPTY_CELL.into(), rate_label),
                book_value: asset.book_value,
                department: asset.department.label().into(),
                category: asset
                    .category
                    .map_or(EMPTY_CELL, |c| c.label())
                    .into(),
                purchase_date: asset
                    .purchase_date
                    .map_or_else(|| EMPTY_CELL.into(), |d| d.format("%d/%m/%Y").to_string()),
                depreciation_group: group.map_or(EMPTY_CELL, |g| g.name.as_str()).into(),
            }
        })
        .collect()
}

/// The two sample rows offered as an import template.
pub fn import_template() -> Vec<ImportRow> {
    vec![
        ImportRow {
            asset_number: Some("ST23A0010001".into()),
            nfc_uid: Some("ABC123DE".into()),
            year: Some(Cell::Number(2023.0)),
            name: Some("Laptop Dell XPS".into()),
            brand: Some("Dell".into()),
            acquisition_value: Some(Cell::Number(15_000_000.0)),
            department: Some("Sekretariat".into()),
            category: Some("Aset Tetap".into()),
            depreciation_group: Some("Kelompok 1".into()),
        },
        ImportRow {
            asset_number: Some("PD23B0020002".into()),
            nfc_uid: Some("DEF456GH".into()),
            year: Some(Cell::Number(2023.0)),
            name: Some("Proyektor".into()),
            brand: Some("Epson".into()),
            acquisition_value: Some(Cell::Number(8_000_000.0)),
            department: Some("Bidang Pendidikan".into()),
            category: Some("TKI".into()),
            depreciation_group: Some("Kelompok 2".into()),
        },
    ]
}
