//! Shared query parameter types for API handlers.
//!
//! Department and category arrive as plain strings and are parsed through
//! their `FromStr` impls so an unknown key is a 400, not an empty result.

use assetreg_core::department::{Building, Category, Department};
use assetreg_core::error::CoreError;
use assetreg_core::filter::{AssetFilter, SortDirection, SortField, YearFilter};
use serde::Deserialize;

/// Filtering, sorting and pagination for `GET /assets`.
///
/// Year selection, in order of precedence:
/// `years=2021,2023` > `year_from`/`year_to` > `year_before` > `year`.
#[derive(Debug, Default, Deserialize)]
pub struct AssetListParams {
    pub department: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub years: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub year_before: Option<i32>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub direction: SortDirection,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl AssetListParams {
    pub fn to_filter(&self) -> Result<AssetFilter, CoreError> {
        let department = parse_department(self.department.as_deref())?;
        let category = parse_category(self.category.as_deref())?;
        if let (Some(d), Some(_)) = (department, category) {
            Category::check_pairing(d, category)?;
        }

        Ok(AssetFilter {
            department,
            category,
            year: self.year_filter()?,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }

    fn year_filter(&self) -> Result<YearFilter, CoreError> {
        if let Some(raw) = self.years.as_deref() {
            let years = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<i32>()
                        .map_err(|_| CoreError::Validation(format!("Invalid year: '{s}'")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(YearFilter::Multiple { years });
        }

        match (self.year_from, self.year_to) {
            (Some(start), Some(end)) if start > end => {
                return Err(CoreError::Validation(format!(
                    "year_from ({start}) is after year_to ({end})"
                )));
            }
            (Some(start), Some(end)) => return Ok(YearFilter::Range { start, end }),
            (Some(start), None) => {
                return Ok(YearFilter::Range {
                    start,
                    end: i32::MAX,
                })
            }
            (None, Some(end)) => return Ok(YearFilter::Before { year: end }),
            (None, None) => {}
        }

        if let Some(year) = self.year_before {
            return Ok(YearFilter::Before { year });
        }
        Ok(self
            .year
            .map_or(YearFilter::All, |year| YearFilter::Single { year }))
    }
}

/// Department scope for `GET /dashboard`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub department: Option<String>,
}

impl DashboardParams {
    pub fn department(&self) -> Result<Option<Department>, CoreError> {
        parse_department(self.department.as_deref())
    }
}

/// `?dry_run=true` validates an import without storing anything.
#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub dry_run: bool,
}

/// Scan history page size (`?limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct ScanListParams {
    pub limit: Option<usize>,
}

/// Prefix fields for `GET /asset-numbers/next`.
#[derive(Debug, Deserialize)]
pub struct NextSequenceParams {
    pub department: String,
    pub year: i32,
    pub building: Building,
    pub asset_type_code: String,
}

pub fn parse_department(raw: Option<&str>) -> Result<Option<Department>, CoreError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .transpose()
}

pub fn parse_category(raw: Option<&str>) -> Result<Option<Category>, CoreError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .transpose()
}
