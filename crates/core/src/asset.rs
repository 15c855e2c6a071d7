//! Asset records and their lifecycle rules.
//!
//! Storage is external; this module defines the record shapes and the pure
//! transitions between them (create, update, archive on delete).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::asset_number::AssetIdentifier;
use crate::department::{Building, Category, Department};
use crate::depreciation::{
    compute_valuation, find_group, AssetValuation, DepreciationGroup, ValuationInput,
};
use crate::error::CoreError;
use crate::nfc::{normalize_nfc_uid, validate_nfc_uid};
use crate::types::{DbId, Money, Timestamp};

/// Brand recorded when none is supplied.
pub const DEFAULT_BRAND: &str = "No Brand";

// ---------------------------------------------------------------------------
// Entity structs
// ---------------------------------------------------------------------------

/// A registered fixed asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: DbId,
    pub nfc_uid: Option<String>,
    pub asset_number: String,
    /// Acquisition year.
    pub year: i32,
    pub name: String,
    pub brand: String,
    pub acquisition_value: Money,
    /// Book value as last computed and stored.
    pub book_value: Money,
    pub department: Department,
    pub category: Option<Category>,
    pub depreciation_group_id: Option<DbId>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Snapshot of a deleted asset, kept for the deletion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedAsset {
    pub id: DbId,
    pub asset_id: DbId,
    pub name: String,
    pub asset_number: String,
    pub brand: String,
    pub department: Department,
    pub category: Option<Category>,
    pub acquisition_value: Money,
    pub book_value: Money,
    pub year: i32,
    pub condition: Option<String>,
    pub image_url: Option<String>,
    pub deleted_at: Timestamp,
    pub deleted_by: String,
    pub deletion_reason: String,
}

/// One NFC tag scan of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: DbId,
    pub asset_id: DbId,
    pub scanned_at: Timestamp,
    pub device_id: Option<String>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Input for registering a new asset.
///
/// When `sequence_number` is omitted the register allocates the next free
/// one for the number prefix.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAsset {
    pub department: Department,
    #[serde(default)]
    pub category: Option<Category>,
    #[validate(range(min = 1000, max = 9999))]
    pub year: i32,
    pub building: Building,
    #[validate(length(min = 1, max = 3))]
    pub asset_type_code: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 4))]
    pub sequence_number: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[validate(range(min = 0.0))]
    pub acquisition_value: Money,
    #[serde(default)]
    pub depreciation_group_id: Option<DbId>,
    #[serde(default)]
    pub nfc_uid: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

impl NewAsset {
    /// Field and domain validation that does not depend on stored state.
    pub fn check(&self, groups: &[DepreciationGroup]) -> Result<(), CoreError> {
        self.validate()?;
        if !self.acquisition_value.is_finite() {
            return Err(CoreError::Validation(
                "Acquisition value must be a valid number".into(),
            ));
        }
        Category::check_pairing(self.department, self.category)?;
        check_group(groups, self.depreciation_group_id)?;
        if let Some(uid) = &self.nfc_uid {
            validate_nfc_uid(uid)?;
        }
        Ok(())
    }

    /// Build the asset identifier once a sequence number is known.
    pub fn identifier(&self, sequence_number: &str) -> Result<AssetIdentifier, CoreError> {
        Ok(AssetIdentifier::new(
            self.department,
            self.year,
            self.building,
            &self.asset_type_code,
            sequence_number,
        )?)
    }
}

/// Partial update of an asset's descriptive and valuation fields.
///
/// The asset number and the fields encoded in it are immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<Category>,
    #[validate(range(min = 0.0))]
    pub acquisition_value: Option<Money>,
    pub depreciation_group_id: Option<DbId>,
    pub nfc_uid: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub purchase_date: Option<NaiveDate>,
}

fn check_group(groups: &[DepreciationGroup], id: Option<DbId>) -> Result<(), CoreError> {
    match id {
        Some(id) if find_group(groups, id).is_none() => Err(CoreError::Validation(format!(
            "Unknown depreciation group: {id}"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

impl Asset {
    /// Materialize a new asset, computing its initial book value.
    pub fn create(
        id: DbId,
        input: NewAsset,
        identifier: &AssetIdentifier,
        groups: &[DepreciationGroup],
        current_year: i32,
        now: Timestamp,
    ) -> Self {
        let group = input.depreciation_group_id.and_then(|g| find_group(groups, g));
        let valuation = compute_valuation(
            &ValuationInput {
                acquisition_value: input.acquisition_value,
                acquisition_year: identifier.year,
                stored_book_value: None,
            },
            group,
            current_year,
        );

        Self {
            id,
            nfc_uid: input.nfc_uid.as_deref().map(normalize_nfc_uid),
            asset_number: identifier.encode(),
            year: identifier.year,
            name: input.name.trim().to_string(),
            brand: input
                .brand
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_BRAND.to_string()),
            acquisition_value: input.acquisition_value,
            book_value: valuation.book_value,
            department: input.department,
            category: input.category,
            depreciation_group_id: input.depreciation_group_id,
            condition: input.condition,
            location: input.location,
            description: input.description,
            image_url: input.image_url,
            purchase_date: input.purchase_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. The stored book value is recomputed from
    /// scratch when the acquisition value or depreciation group changes.
    pub fn apply_update(
        &mut self,
        update: UpdateAsset,
        groups: &[DepreciationGroup],
        current_year: i32,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        update.validate()?;
        if let Some(category) = update.category {
            Category::check_pairing(self.department, Some(category))?;
        }
        check_group(groups, update.depreciation_group_id)?;
        if let Some(uid) = &update.nfc_uid {
            validate_nfc_uid(uid)?;
        }

        let revalue = update.acquisition_value.is_some() || update.depreciation_group_id.is_some();

        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if update.category.is_some() {
            self.category = update.category;
        }
        if let Some(value) = update.acquisition_value {
            self.acquisition_value = value;
        }
        if update.depreciation_group_id.is_some() {
            self.depreciation_group_id = update.depreciation_group_id;
        }
        if let Some(uid) = update.nfc_uid {
            self.nfc_uid = Some(normalize_nfc_uid(&uid));
        }
        if update.condition.is_some() {
            self.condition = update.condition;
        }
        if update.location.is_some() {
            self.location = update.location;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.image_url.is_some() {
            self.image_url = update.image_url;
        }
        if update.purchase_date.is_some() {
            self.purchase_date = update.purchase_date;
        }

        if revalue {
            let group = self.depreciation_group_id.and_then(|g| find_group(groups, g));
            self.book_value = compute_valuation(
                &ValuationInput {
                    acquisition_value: self.acquisition_value,
                    acquisition_year: self.year,
                    stored_book_value: None,
                },
                group,
                current_year,
            )
            .book_value;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Valuation as of `current_year`, trusting the stored book value as a
    /// written-off / at-floor marker.
    pub fn valuation(&self, groups: &[DepreciationGroup], current_year: i32) -> AssetValuation {
        let group = self.depreciation_group_id.and_then(|g| find_group(groups, g));
        compute_valuation(
            &ValuationInput {
                acquisition_value: self.acquisition_value,
                acquisition_year: self.year,
                stored_book_value: Some(self.book_value),
            },
            group,
            current_year,
        )
    }

    /// Build the deletion-history snapshot. A reason is mandatory.
    pub fn archive(
        &self,
        archive_id: DbId,
        reason: &str,
        deleted_by: &str,
        now: Timestamp,
    ) -> Result<DeletedAsset, CoreError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CoreError::Validation("A deletion reason is required".into()));
        }
        Ok(DeletedAsset {
            id: archive_id,
            asset_id: self.id,
            name: self.name.clone(),
            asset_number: self.asset_number.clone(),
            brand: self.brand.clone(),
            department: self.department,
            category: self.category,
            acquisition_value: self.acquisition_value,
            book_value: self.book_value,
            year: self.year,
            condition: self.condition.clone(),
            image_url: self.image_url.clone(),
            deleted_at: now,
            deleted_by: deleted_by.to_string(),
            deletion_reason: reason.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
