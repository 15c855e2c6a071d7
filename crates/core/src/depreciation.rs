//! Straight-line depreciation with a one-unit floor.
//!
//! [`compute_valuation`] derives accumulated depreciation, the current
//! year's charge and the book value of a single asset as of a given year.
//! Once an asset has started depreciating its book value never drops below
//! one currency unit, so fully written-off assets stay visible as non-zero
//! line items.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Money, YEAR_RANGE};

/// Lowest book value an asset depreciates to.
pub const FLOOR_VALUE: Money = 1.0;

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Whether a depreciation group applies to buildings or to movable assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Building,
    NonBuilding,
}

/// A class of assets sharing a yearly depreciation rate and useful life.
///
/// Supplied externally and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationGroup {
    pub id: DbId,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    /// Useful life in years.
    pub years: u32,
    /// Fraction of acquisition value written off per year.
    pub rate: f64,
}

/// Find a group by id.
pub fn find_group(groups: &[DepreciationGroup], id: DbId) -> Option<&DepreciationGroup> {
    groups.iter().find(|g| g.id == id)
}

/// Find a group by its display name (as used in spreadsheets).
pub fn find_group_by_name<'a>(
    groups: &'a [DepreciationGroup],
    name: &str,
) -> Option<&'a DepreciationGroup> {
    let name = name.trim();
    groups.iter().find(|g| g.name == name)
}

/// Rate formatted for exports, e.g. `"25.00% / year"`.
pub fn rate_label(group: &DepreciationGroup) -> String {
    format!("{:.2}% / year", group.rate * 100.0)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Inputs for a single valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    pub acquisition_value: Money,
    pub acquisition_year: i32,
    /// Previously stored book value. `0` marks an asset as fully written off
    /// and `1` as sitting at the floor; any other value is ignored.
    #[serde(default)]
    pub stored_book_value: Option<Money>,
}

/// Derived valuation of an asset. All fields are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetValuation {
    pub acquisition_value: Money,
    pub accumulated_depreciation: Money,
    pub current_year_depreciation: Money,
    pub book_value: Money,
}

impl AssetValuation {
    /// Valuation of an asset that does not depreciate.
    pub fn undepreciated(acquisition_value: Money) -> Self {
        Self {
            acquisition_value,
            accumulated_depreciation: 0.0,
            current_year_depreciation: 0.0,
            book_value: acquisition_value,
        }
    }
}

impl Add for AssetValuation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            acquisition_value: self.acquisition_value + rhs.acquisition_value,
            accumulated_depreciation: self.accumulated_depreciation + rhs.accumulated_depreciation,
            current_year_depreciation: self.current_year_depreciation
                + rhs.current_year_depreciation,
            book_value: self.book_value + rhs.book_value,
        }
    }
}

impl Sum for AssetValuation {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Reject inputs the engine is not defined for.
///
/// [`compute_valuation`] clamps instead of failing; callers run this first
/// to turn bad user input into a validation error.
pub fn validate_valuation_input(input: &ValuationInput) -> Result<(), CoreError> {
    if !input.acquisition_value.is_finite() || input.acquisition_value < 0.0 {
        return Err(CoreError::Validation(format!(
            "Acquisition value must be a non-negative number (got {})",
            input.acquisition_value
        )));
    }
    validate_year("Acquisition year", input.acquisition_year)?;
    if let Some(stored) = input.stored_book_value {
        if !stored.is_finite() || stored < 0.0 {
            return Err(CoreError::Validation(format!(
                "Stored book value must be a non-negative number (got {stored})"
            )));
        }
    }
    Ok(())
}

/// Reject a year outside [`YEAR_RANGE`]; `what` names the field.
pub fn validate_year(what: &str, year: i32) -> Result<(), CoreError> {
    if YEAR_RANGE.contains(&year) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{what} must be a 4-digit year (got {year})"
        )))
    }
}

/// Compute the valuation of one asset as of `current_year`.
///
/// Without a group the asset is reported undepreciated. Prior years are
/// charged only when the asset is more than a year old, capped so the
/// current-year step still has room; the current year is charged whenever
/// the asset is at least a year old and never pushes the book value below
/// the floor.
pub fn compute_valuation(
    input: &ValuationInput,
    group: Option<&DepreciationGroup>,
    current_year: i32,
) -> AssetValuation {
    let acquisition_value = input.acquisition_value.max(0.0);

    let Some(group) = group else {
        return AssetValuation::undepreciated(acquisition_value);
    };

    if acquisition_value == 0.0 {
        return AssetValuation::default();
    }

    // Assets cheaper than one unit floor at their own cost.
    let floor = FLOOR_VALUE.min(acquisition_value);
    let age = current_year.saturating_sub(input.acquisition_year).max(0);
    let yearly = acquisition_value * group.rate.max(0.0);

    let (accumulated, current) = match input.stored_book_value {
        Some(v) if v == 0.0 => (acquisition_value, 0.0),
        Some(v) if v == FLOOR_VALUE => (acquisition_value - floor, 0.0),
        _ => {
            let accumulated = if age > 1 {
                (yearly * f64::from(age - 1)).min(acquisition_value - floor)
            } else {
                0.0
            };

            let current = if age > 0 {
                let remaining = acquisition_value - accumulated;
                if remaining > yearly + floor {
                    yearly
                } else if remaining > floor {
                    remaining - floor
                } else {
                    0.0
                }
            } else {
                0.0
            };

            (accumulated, current)
        }
    };

    AssetValuation {
        acquisition_value,
        accumulated_depreciation: accumulated,
        current_year_depreciation: current,
        book_value: (acquisition_value - accumulated - current).max(floor),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn group(rate: f64, years: u32) -> DepreciationGroup {
        DepreciationGroup {
            id: 1,
            code: "K1".into(),
            name: "Kelompok 1".into(),
            group_type: GroupType::NonBuilding,
            years,
            rate,
        }
    }

    fn input(value: Money, year: i32) -> ValuationInput {
        ValuationInput {
            acquisition_value: value,
            acquisition_year: year,
            stored_book_value: None,
        }
    }

    #[test]
    fn no_group_is_undepreciated() {
        let v = compute_valuation(&input(5_000_000.0, 2010), None, 2024);
        assert_eq!(v, AssetValuation::undepreciated(5_000_000.0));
    }

    #[test]
    fn four_year_group_reaches_floor_in_fourth_year() {
        let g = group(0.25, 4);
        let v = compute_valuation(&input(15_000_000.0, 2020), Some(&g), 2024);
        assert_eq!(v.accumulated_depreciation, 11_250_000.0);
        assert_eq!(v.current_year_depreciation, 3_749_999.0);
        assert_eq!(v.book_value, 1.0);
    }

    #[test]
    fn same_year_asset_has_no_depreciation() {
        let g = group(0.25, 4);
        let v = compute_valuation(&input(8_000_000.0, 2024), Some(&g), 2024);
        assert_eq!(v.accumulated_depreciation, 0.0);
        assert_eq!(v.current_year_depreciation, 0.0);
        assert_eq!(v.book_value, 8_000_000.0);
    }

    #[test]
    fn future_dated_asset_is_treated_as_new() {
        let g = group(0.25, 4);
        let v = compute_valuation(&input(8_000_000.0, 2030), Some(&g), 2024);
        assert_eq!(v.book_value, 8_000_000.0);
    }

    #[test]
    fn first_year_charges_current_year_only() {
        let g = group(0.125, 8);
        let v = compute_valuation(&input(8_000_000.0, 2023), Some(&g), 2024);
        assert_eq!(v.accumulated_depreciation, 0.0);
        assert_eq!(v.current_year_depreciation, 1_000_000.0);
        assert_eq!(v.book_value, 7_000_000.0);
    }

    #[test]
    fn long_past_useful_life_stays_at_floor() {
        let g = group(0.25, 4);
        let v = compute_valuation(&input(1_000.0, 1990), Some(&g), 2024);
        assert_eq!(v.accumulated_depreciation, 999.0);
        assert_eq!(v.current_year_depreciation, 0.0);
        assert_eq!(v.book_value, 1.0);
    }

    #[test]
    fn stored_zero_means_fully_written_off() {
        let g = group(0.25, 4);
        let mut i = input(2_000.0, 2023);
        i.stored_book_value = Some(0.0);
        let v = compute_valuation(&i, Some(&g), 2024);
        assert_eq!(v.accumulated_depreciation, 2_000.0);
        assert_eq!(v.current_year_depreciation, 0.0);
        assert_eq!(v.book_value, 1.0);
    }

    #[test]
    fn stored_floor_is_idempotent() {
        let g = group(0.25, 4);
        let mut i = input(2_000.0, 2023);
        i.stored_book_value = Some(1.0);
        let v = compute_valuation(&i, Some(&g), 2024);
        assert_eq!(v.accumulated_depreciation, 1_999.0);
        assert_eq!(v.current_year_depreciation, 0.0);
        assert_eq!(v.book_value, 1.0);
    }

    #[test]
    fn other_stored_values_are_ignored() {
        let g = group(0.25, 4);
        let mut i = input(2_000.0, 2023);
        i.stored_book_value = Some(1_500.0);
        let with_hint = compute_valuation(&i, Some(&g), 2024);
        let without = compute_valuation(&input(2_000.0, 2023), Some(&g), 2024);
        assert_eq!(with_hint, without);
    }

    #[test]
    fn zero_acquisition_value_is_all_zero() {
        let g = group(0.5, 2);
        for year in [1990, 2020, 2024, 2030] {
            let v = compute_valuation(&input(0.0, year), Some(&g), 2024);
            assert_eq!(v, AssetValuation::default());
        }
        let mut i = input(0.0, 2020);
        i.stored_book_value = Some(1.0);
        assert_eq!(compute_valuation(&i, Some(&g), 2024), AssetValuation::default());
    }

    #[test]
    fn sub_unit_asset_never_exceeds_cost() {
        let g = group(0.25, 4);
        let v = compute_valuation(&input(0.5, 2010), Some(&g), 2024);
        assert_eq!(v.book_value, 0.5);
        assert_eq!(v.accumulated_depreciation, 0.0);
    }

    #[test]
    fn book_value_is_non_increasing_with_age_and_floored() {
        for rate in [0.05, 0.0625, 0.1, 0.125, 0.25, 0.5, 1.0] {
            let g = group(rate, 4);
            let mut previous = f64::INFINITY;
            for age in 0..40 {
                let v = compute_valuation(&input(1_234_567.0, 2024 - age), Some(&g), 2024);
                assert!(v.book_value <= previous, "rate {rate} age {age}");
                assert!(v.book_value >= 1.0, "rate {rate} age {age}");
                assert!(v.accumulated_depreciation >= 0.0);
                assert!(v.current_year_depreciation >= 0.0);
                previous = v.book_value;
            }
        }
    }

    #[test]
    fn valuations_sum_fieldwise() {
        let g = group(0.25, 4);
        let a = compute_valuation(&input(15_000_000.0, 2020), Some(&g), 2024);
        let b = compute_valuation(&input(8_000_000.0, 2023), Some(&g), 2024);
        let total: AssetValuation = [a, b].into_iter().sum();
        assert_eq!(total.acquisition_value, 23_000_000.0);
        assert_eq!(
            total.accumulated_depreciation,
            a.accumulated_depreciation + b.accumulated_depreciation
        );
        assert_eq!(total.book_value, a.book_value + b.book_value);
    }

    #[test]
    fn empty_sum_is_zero() {
        let total: AssetValuation = std::iter::empty().sum();
        assert_eq!(total, AssetValuation::default());
    }

    #[test]
    fn validation_rejects_negative_and_nan() {
        assert_matches!(
            validate_valuation_input(&input(-1.0, 2020)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_valuation_input(&input(f64::NAN, 2020)),
            Err(CoreError::Validation(_))
        );
        assert!(validate_valuation_input(&input(0.0, 2020)).is_ok());
    }

    #[test]
    fn validation_rejects_out_of_range_years() {
        assert_matches!(
            validate_valuation_input(&input(1000.0, i32::MIN)),
            Err(CoreError::Validation(msg)) if msg.contains("Acquisition year")
        );
        assert_matches!(
            validate_valuation_input(&input(1000.0, 10_000)),
            Err(CoreError::Validation(_))
        );
        assert!(validate_year("As-of year", 2024).is_ok());
        assert_matches!(validate_year("As-of year", 999), Err(CoreError::Validation(_)));
    }

    #[test]
    fn extreme_years_clamp_instead_of_overflowing() {
        let g = group(0.25, 4);

        // Acquired "infinitely" long ago: fully depreciated down to the floor.
        let ancient = compute_valuation(&input(1000.0, i32::MIN), Some(&g), 2024);
        assert_eq!(ancient.book_value, FLOOR_VALUE);
        assert_eq!(ancient.accumulated_depreciation + ancient.current_year_depreciation, 999.0);

        // Acquired far in the future: not yet depreciating.
        let future = compute_valuation(&input(1000.0, i32::MAX), Some(&g), i32::MIN);
        assert_eq!(future, AssetValuation::undepreciated(1000.0));
    }

    #[test]
    fn group_lookup_and_label() {
        let groups = vec![group(0.25, 4)];
        assert!(find_group(&groups, 1).is_some());
        assert!(find_group(&groups, 2).is_none());
        assert!(find_group_by_name(&groups, " Kelompok 1").is_some());
        assert_eq!(rate_label(&groups[0]), "25.00% / year");
    }

    #[test]
    fn group_type_serializes_as_type_field() {
        let json = serde_json::to_value(group(0.25, 4)).unwrap();
        assert_eq!(json["type"], "non_building");
    }
}
