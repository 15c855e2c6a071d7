//! Dashboard aggregation over a filtered set of assets.
//!
//! Totals use the stored book values; the `valuation` field is the
//! depreciation engine folded across the same assets as of the current year.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::asset::Asset;
use crate::department::Department;
use crate::depreciation::{AssetValuation, DepreciationGroup};
use crate::types::Money;

/// Group key for assets without a category when grouping by category.
pub const UNCATEGORIZED_KEY: &str = "uncategorized";

const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Per-department or per-category subtotal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub acquisition_value: Money,
    pub book_value: Money,
    pub nfc_count: usize,
}

/// Cumulative totals of all assets acquired up to and including `year`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTrendPoint {
    pub year: i32,
    pub acquisition_value: Money,
    pub book_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_assets: usize,
    pub total_acquisition_value: Money,
    pub total_book_value: Money,
    pub active_nfc_tags: usize,
    pub groups: Vec<GroupStat>,
    pub valuation: AssetValuation,
    pub value_trend: Vec<YearTrendPoint>,
}

/// Aggregate `assets` for the dashboard.
///
/// Groups are per department, or per category of `selected_department` when
/// one is given. Groups come back ordered by key.
pub fn dashboard_stats(
    assets: &[&Asset],
    groups: &[DepreciationGroup],
    selected_department: Option<Department>,
    current_year: i32,
) -> DashboardStats {
    let mut by_group: BTreeMap<String, GroupStat> = BTreeMap::new();
    for asset in assets {
        let (key, label) = group_key(asset, selected_department);
        let stat = by_group.entry(key.clone()).or_insert_with(|| GroupStat {
            key,
            label,
            count: 0,
            acquisition_value: 0.0,
            book_value: 0.0,
            nfc_count: 0,
        });
        stat.count += 1;
        stat.acquisition_value += asset.acquisition_value;
        stat.book_value += asset.book_value;
        if asset.nfc_uid.is_some() {
            stat.nfc_count += 1;
        }
    }

    DashboardStats {
        total_assets: assets.len(),
        total_acquisition_value: assets.iter().map(|a| a.acquisition_value).sum(),
        total_book_value: assets.iter().map(|a| a.book_value).sum(),
        active_nfc_tags: assets.iter().filter(|a| a.nfc_uid.is_some()).count(),
        groups: by_group.into_values().collect(),
        valuation: assets
            .iter()
            .map(|a| a.valuation(groups, current_year))
            .sum(),
        value_trend: value_trend(assets),
    }
}

fn group_key(asset: &Asset, selected_department: Option<Department>) -> (String, String) {
    match selected_department {
        None => (
            asset.department.as_str().to_string(),
            asset.department.label().to_string(),
        ),
        Some(_) => match asset.category {
            Some(c) => (c.as_str().to_string(), c.label().to_string()),
            None => (UNCATEGORIZED_KEY.to_string(), UNCATEGORIZED_LABEL.to_string()),
        },
    }
}

/// Running totals by acquisition year, ascending.
pub fn value_trend(assets: &[&Asset]) -> Vec<YearTrendPoint> {
    let mut per_year: BTreeMap<i32, (Money, Money)> = BTreeMap::new();
    for asset in assets {
        let entry = per_year.entry(asset.year).or_default();
        entry.0 += asset.acquisition_value;
        entry.1 += asset.book_value;
    }

    let mut acquisition_value = 0.0;
    let mut book_value = 0.0;
    per_year
        .into_iter()
        .map(|(year, (acq, book))| {
            acquisition_value += acq;
            book_value += book;
            YearTrendPoint {
                year,
                acquisition_value,
                book_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::Category;
    use chrono::{TimeZone, Utc};

    fn asset(department: Department, category: Option<Category>, year: i32, value: f64) -> Asset {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Asset {
            id: 1,
            nfc_uid: None,
            asset_number: String::new(),
            year,
            name: "x".into(),
            brand: "y".into(),
            acquisition_value: value,
            book_value: value / 2.0,
            department,
            category,
            depreciation_group_id: None,
            condition: None,
            location: None,
            description: None,
            image_url: None,
            purchase_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Asset> {
        let mut a = asset(Department::Education, Some(Category::Tki), 2022, 100.0);
        a.nfc_uid = Some("AB".into());
        vec![
            a,
            asset(Department::Education, None, 2020, 50.0),
            asset(Department::Ict, None, 2022, 20.0),
        ]
    }

    #[test]
    fn empty_input_yields_zero_totals() {
        let stats = dashboard_stats(&[], &[], None, 2024);
        assert_eq!(stats.total_assets, 0);
        assert_eq!(stats.total_acquisition_value, 0.0);
        assert!(stats.groups.is_empty());
        assert!(stats.value_trend.is_empty());
        assert_eq!(stats.valuation, AssetValuation::default());
    }

    #[test]
    fn totals_and_department_groups() {
        let assets = sample();
        let refs: Vec<&Asset> = assets.iter().collect();
        let stats = dashboard_stats(&refs, &[], None, 2024);

        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.total_acquisition_value, 170.0);
        assert_eq!(stats.total_book_value, 85.0);
        assert_eq!(stats.active_nfc_tags, 1);

        let keys: Vec<&str> = stats.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["education", "ict"]);
        assert_eq!(stats.groups[0].count, 2);
        assert_eq!(stats.groups[0].label, "Bidang Pendidikan");
        assert_eq!(stats.groups[0].nfc_count, 1);
    }

    #[test]
    fn selected_department_groups_by_category() {
        let assets = sample();
        let refs: Vec<&Asset> = assets.iter().take(2).collect();
        let stats = dashboard_stats(&refs, &[], Some(Department::Education), 2024);

        let keys: Vec<&str> = stats.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["tki", UNCATEGORIZED_KEY]);
    }

    #[test]
    fn ungrouped_valuation_is_undepreciated() {
        let assets = sample();
        let refs: Vec<&Asset> = assets.iter().collect();
        let stats = dashboard_stats(&refs, &[], None, 2024);
        assert_eq!(stats.valuation.acquisition_value, 170.0);
        assert_eq!(stats.valuation.accumulated_depreciation, 0.0);
    }

    #[test]
    fn trend_is_cumulative_by_year() {
        let assets = sample();
        let refs: Vec<&Asset> = assets.iter().collect();
        let trend = value_trend(&refs);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].year, 2020);
        assert_eq!(trend[0].acquisition_value, 50.0);
        assert_eq!(trend[1].year, 2022);
        assert_eq!(trend[1].acquisition_value, 170.0);
        assert_eq!(trend[1].book_value, 85.0);
    }
}
