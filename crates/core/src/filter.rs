//! Asset listing: filtering, search, sorting and pagination.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::department::{Category, Department};
use crate::depreciation::{find_group, DepreciationGroup};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: usize = 50;

/// Maximum number of rows per page.
pub const MAX_PER_PAGE: usize = 1000;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Restriction on the acquisition year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum YearFilter {
    #[default]
    All,
    Single { year: i32 },
    Multiple { years: Vec<i32> },
    /// Inclusive on both ends.
    Range { start: i32, end: i32 },
    /// The given year and everything older.
    Before { year: i32 },
}

impl YearFilter {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            Self::All => true,
            Self::Single { year: y } => year == *y,
            // An empty selection means nothing was picked yet.
            Self::Multiple { years } => years.is_empty() || years.contains(&year),
            Self::Range { start, end } => (*start..=*end).contains(&year),
            Self::Before { year: y } => year <= *y,
        }
    }
}

/// Combined listing filter. `None` fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    pub department: Option<Department>,
    pub category: Option<Category>,
    #[serde(default)]
    pub year: YearFilter,
    pub search: Option<String>,
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        if self.department.is_some_and(|d| d != asset.department) {
            return false;
        }
        if self.category.is_some() && self.category != asset.category {
            return false;
        }
        if !self.year.matches(asset.year) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => matches_search(asset, term),
            _ => true,
        }
    }

    /// Assets matching the filter, in input order.
    pub fn apply<'a>(&self, assets: impl IntoIterator<Item = &'a Asset>) -> Vec<&'a Asset> {
        assets.into_iter().filter(|a| self.matches(a)).collect()
    }
}

/// Case-insensitive substring search over name, asset number and brand.
pub fn matches_search(asset: &Asset, term: &str) -> bool {
    let needle = term.to_lowercase();
    [&asset.name, &asset.asset_number, &asset.brand]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    AssetNumber,
    Year,
    Name,
    Brand,
    AcquisitionValue,
    /// Depreciation rate of the asset's group; ungrouped assets sort as 0.
    Depreciation,
    BookValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Stable sort of `assets` by `field`.
pub fn sort_assets(
    assets: &mut [&Asset],
    field: SortField,
    direction: SortDirection,
    groups: &[DepreciationGroup],
) {
    let rate = |a: &Asset| {
        a.depreciation_group_id
            .and_then(|id| find_group(groups, id))
            .map_or(0.0, |g| g.rate)
    };

    assets.sort_by(|a, b| {
        let ordering = match field {
            SortField::AssetNumber => a.asset_number.cmp(&b.asset_number),
            SortField::Year => a.year.cmp(&b.year),
            SortField::Name => compare_text(&a.name, &b.name),
            SortField::Brand => compare_text(&a.brand, &b.brand),
            SortField::AcquisitionValue => a.acquisition_value.total_cmp(&b.acquisition_value),
            SortField::Depreciation => rate(a).total_cmp(&rate(b)),
            SortField::BookValue => a.book_value.total_cmp(&b.book_value),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    /// 1-based page number actually served.
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Clamp a user-provided page size to `1..=MAX_PER_PAGE`.
pub fn clamp_per_page(per_page: Option<usize>) -> usize {
    per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
}

/// Slice `items` into the requested page. Pages past the end come back
/// empty; page 0 is treated as page 1.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> Page<T> {
    let per_page = clamp_per_page(per_page);
    let page = page.unwrap_or(1).max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page {
        items,
        total,
        page,
        per_page,
        total_pages,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depreciation::GroupType;
    use chrono::{TimeZone, Utc};

    fn asset(id: i64, number: &str, year: i32, name: &str, brand: &str, value: f64) -> Asset {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Asset {
            id,
            nfc_uid: None,
            asset_number: number.into(),
            year,
            name: name.into(),
            brand: brand.into(),
            acquisition_value: value,
            book_value: value,
            department: Department::Secretariat,
            category: Some(Category::Fixed),
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
        vec![
            asset(1, "ST23A0010002", 2023, "Printer", "Canon", 3_000_000.0),
            asset(2, "ST21A0010001", 2021, "laptop", "Dell", 15_000_000.0),
            asset(3, "ST19B0020001", 2019, "Desk", "IKEA", 1_000_000.0),
        ]
    }

    // -- YearFilter ----------------------------------------------------------

    #[test]
    fn year_filter_variants() {
        assert!(YearFilter::All.matches(1990));
        assert!(YearFilter::Single { year: 2023 }.matches(2023));
        assert!(!YearFilter::Single { year: 2023 }.matches(2022));
        assert!(YearFilter::Multiple { years: vec![2019, 2021] }.matches(2021));
        assert!(!YearFilter::Multiple { years: vec![2019, 2021] }.matches(2023));
        assert!(YearFilter::Multiple { years: vec![] }.matches(2023));
        assert!(YearFilter::Range { start: 2019, end: 2021 }.matches(2019));
        assert!(YearFilter::Range { start: 2019, end: 2021 }.matches(2021));
        assert!(!YearFilter::Range { start: 2019, end: 2021 }.matches(2022));
        assert!(YearFilter::Before { year: 2021 }.matches(2021));
        assert!(!YearFilter::Before { year: 2021 }.matches(2022));
    }

    #[test]
    fn year_filter_json_shape() {
        let f: YearFilter = serde_json::from_str(r#"{"type":"range","start":2019,"end":2021}"#).unwrap();
        assert_eq!(f, YearFilter::Range { start: 2019, end: 2021 });
    }

    // -- AssetFilter ---------------------------------------------------------

    #[test]
    fn search_is_case_insensitive_over_three_fields() {
        let assets = sample();
        let by_name = AssetFilter {
            search: Some("LAPTOP".into()),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&assets).len(), 1);

        let by_number = AssetFilter {
            search: Some("a001".into()),
            ..Default::default()
        };
        assert_eq!(by_number.apply(&assets).len(), 2);

        let by_brand = AssetFilter {
            search: Some("ikea".into()),
            ..Default::default()
        };
        assert_eq!(by_brand.apply(&assets)[0].id, 3);
    }

    #[test]
    fn blank_search_matches_everything() {
        let assets = sample();
        let filter = AssetFilter {
            search: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&assets).len(), 3);
    }

    #[test]
    fn department_and_category_restrict() {
        let mut assets = sample();
        assets[0].department = Department::Ict;
        assets[0].category = None;

        let filter = AssetFilter {
            department: Some(Department::Secretariat),
            ..Default::default()
        };
        assert_eq!(filter.apply(&assets).len(), 2);

        let filter = AssetFilter {
            category: Some(Category::Inventory),
            ..Default::default()
        };
        assert!(filter.apply(&assets).is_empty());
    }

    // -- Sorting -------------------------------------------------------------

    #[test]
    fn sort_by_name_ignores_case() {
        let assets = sample();
        let mut refs: Vec<&Asset> = assets.iter().collect();
        sort_assets(&mut refs, SortField::Name, SortDirection::Asc, &[]);
        let names: Vec<&str> = refs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Desk", "laptop", "Printer"]);
    }

    #[test]
    fn sort_by_value_descending() {
        let assets = sample();
        let mut refs: Vec<&Asset> = assets.iter().collect();
        sort_assets(&mut refs, SortField::AcquisitionValue, SortDirection::Desc, &[]);
        assert_eq!(refs[0].id, 2);
        assert_eq!(refs[2].id, 3);
    }

    #[test]
    fn sort_by_depreciation_uses_group_rate() {
        let mut assets = sample();
        assets[1].depreciation_group_id = Some(1);
        let groups = vec![DepreciationGroup {
            id: 1,
            code: "K1".into(),
            name: "Kelompok 1".into(),
            group_type: GroupType::NonBuilding,
            years: 4,
            rate: 0.25,
        }];
        let mut refs: Vec<&Asset> = assets.iter().collect();
        sort_assets(&mut refs, SortField::Depreciation, SortDirection::Desc, &groups);
        assert_eq!(refs[0].id, 2);
    }

    // -- Pagination ----------------------------------------------------------

    #[test]
    fn clamp_per_page_bounds() {
        assert_eq!(clamp_per_page(None), DEFAULT_PER_PAGE);
        assert_eq!(clamp_per_page(Some(0)), 1);
        assert_eq!(clamp_per_page(Some(5000)), MAX_PER_PAGE);
        assert_eq!(clamp_per_page(Some(100)), 100);
    }

    #[test]
    fn paginate_slices_and_counts() {
        let page = paginate((1..=7).collect::<Vec<_>>(), Some(2), Some(3));
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);

        let last = paginate((1..=7).collect::<Vec<_>>(), Some(3), Some(3));
        assert_eq!(last.items, vec![7]);
    }

    #[test]
    fn paginate_past_end_is_empty() {
        let page = paginate(vec![1, 2], Some(5), Some(10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn paginate_page_zero_is_first_page() {
        let page = paginate(vec![1, 2, 3], Some(0), Some(2));
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec![1, 2]);
    }
}
