//! Asset persistence.
//!
//! Handlers depend on the [`AssetRepository`] trait only; the concrete store
//! is injected through [`AppState`](crate::state::AppState). The bundled
//! [`MemoryAssetRepository`] keeps everything in process memory and enforces
//! the same uniqueness rules a relational store would (asset number and NFC
//! UID are unique).

use std::collections::{BTreeMap, HashSet};

use assetreg_core::asset::{Asset, DeletedAsset, ScanRecord};
use assetreg_core::asset_number::{next_sequence_for_prefix, ASSET_NUMBER_LEN, SEQUENCE_WIDTH};
use assetreg_core::error::CoreError;
use assetreg_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Storage operations the register needs.
///
/// Ids are assigned by the store: the `id` of an asset passed to
/// [`insert`](Self::insert) is ignored.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Asset>, CoreError>;

    async fn find(&self, id: DbId) -> Result<Option<Asset>, CoreError>;

    /// Look up by upper-cased NFC UID.
    async fn find_by_nfc_uid(&self, uid: &str) -> Result<Option<Asset>, CoreError>;

    /// Insert one asset. Fails with `Conflict` on a duplicate asset number
    /// or NFC UID.
    async fn insert(&self, asset: Asset) -> Result<Asset, CoreError>;

    /// Insert one asset under the next free sequence number of its prefix.
    ///
    /// The sequence segment of `asset.asset_number` is replaced; allocation
    /// and insertion happen atomically so concurrent creates never collide.
    async fn insert_next_in_sequence(&self, asset: Asset) -> Result<Asset, CoreError>;

    /// Insert a batch atomically: either every asset is stored or none is.
    async fn insert_batch(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, CoreError>;

    /// Replace a stored asset. The asset number must not change.
    async fn update(&self, asset: Asset) -> Result<Asset, CoreError>;

    /// Archive and delete an asset in one step.
    async fn delete(
        &self,
        id: DbId,
        reason: &str,
        deleted_by: &str,
        now: Timestamp,
    ) -> Result<DeletedAsset, CoreError>;

    /// Deletion history, newest first.
    async fn list_deleted(&self) -> Result<Vec<DeletedAsset>, CoreError>;

    async fn record_scan(
        &self,
        asset_id: DbId,
        scanned_at: Timestamp,
        device_id: Option<String>,
    ) -> Result<ScanRecord, CoreError>;

    /// Scan history, newest first.
    async fn list_scans(&self, limit: usize) -> Result<Vec<ScanRecord>, CoreError>;

    /// Remove one scan record.
    async fn delete_scan(&self, id: DbId) -> Result<(), CoreError>;

    /// Remove the whole scan history, returning how many records went.
    async fn clear_scans(&self) -> Result<usize, CoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    assets: BTreeMap<DbId, Asset>,
    deleted: Vec<DeletedAsset>,
    scans: Vec<ScanRecord>,
    last_asset_id: DbId,
    last_deleted_id: DbId,
    last_scan_id: DbId,
}

impl Inner {
    /// Check `asset` against stored assets other than `except`.
    fn check_unique(&self, asset: &Asset, except: Option<DbId>) -> Result<(), CoreError> {
        for other in self.assets.values().filter(|a| Some(a.id) != except) {
            if other.asset_number == asset.asset_number {
                return Err(CoreError::Conflict(format!(
                    "Asset number {} already exists",
                    asset.asset_number
                )));
            }
            if asset.nfc_uid.is_some() && other.nfc_uid == asset.nfc_uid {
                return Err(CoreError::Conflict(format!(
                    "NFC UID {} is already assigned to asset {}",
                    asset.nfc_uid.as_deref().unwrap_or_default(),
                    other.asset_number
                )));
            }
        }
        Ok(())
    }

    fn store(&mut self, mut asset: Asset) -> Asset {
        self.last_asset_id += 1;
        asset.id = self.last_asset_id;
        self.assets.insert(asset.id, asset.clone());
        asset
    }
}

/// Validate a whole batch before anything is stored.
fn check_batch(inner: &Inner, assets: &[Asset]) -> Result<(), CoreError> {
    let mut numbers = HashSet::new();
    let mut uids = HashSet::new();
    for asset in assets {
        inner.check_unique(asset, None)?;
        if !numbers.insert(asset.asset_number.as_str()) {
            return Err(CoreError::Conflict(format!(
                "Asset number {} appears twice in the batch",
                asset.asset_number
            )));
        }
        if let Some(uid) = asset.nfc_uid.as_deref() {
            if !uids.insert(uid) {
                return Err(CoreError::Conflict(format!(
                    "NFC UID {uid} appears twice in the batch"
                )));
            }
        }
    }
    Ok(())
}

/// Process-local [`AssetRepository`].
#[derive(Default)]
pub struct MemoryAssetRepository {
    inner: RwLock<Inner>,
}

impl MemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn list(&self) -> Result<Vec<Asset>, CoreError> {
        Ok(self.inner.read().await.assets.values().cloned().collect())
    }

    async fn find(&self, id: DbId) -> Result<Option<Asset>, CoreError> {
        Ok(self.inner.read().await.assets.get(&id).cloned())
    }

    async fn find_by_nfc_uid(&self, uid: &str) -> Result<Option<Asset>, CoreError> {
        Ok(self
            .inner
            .read()
            .await
            .assets
            .values()
            .find(|a| a.nfc_uid.as_deref() == Some(uid))
            .cloned())
    }

    async fn insert(&self, asset: Asset) -> Result<Asset, CoreError> {
        let mut inner = self.inner.write().await;
        inner.check_unique(&asset, None)?;
        Ok(inner.store(asset))
    }

    async fn insert_next_in_sequence(&self, mut asset: Asset) -> Result<Asset, CoreError> {
        let prefix_len = ASSET_NUMBER_LEN - SEQUENCE_WIDTH;
        let prefix = asset
            .asset_number
            .get(..prefix_len)
            .filter(|_| asset.asset_number.len() == ASSET_NUMBER_LEN)
            .ok_or_else(|| {
                CoreError::Validation(format!("Malformed asset number: {}", asset.asset_number))
            })?
            .to_string();

        let mut inner = self.inner.write().await;
        let sequence = next_sequence_for_prefix(
            inner.assets.values().map(|a| a.asset_number.as_str()),
            &prefix,
        )?;
        asset.asset_number = format!("{prefix}{sequence}");
        inner.check_unique(&asset, None)?;
        Ok(inner.store(asset))
    }

    async fn insert_batch(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, CoreError> {
        let mut inner = self.inner.write().await;

        check_batch(&inner, &assets)?;

        Ok(assets.into_iter().map(|a| inner.store(a)).collect())
    }

    async fn update(&self, asset: Asset) -> Result<Asset, CoreError> {
        let mut inner = self.inner.write().await;
        let current = inner.assets.get(&asset.id).ok_or(CoreError::NotFound {
            entity: "Asset",
            id: asset.id,
        })?;
        if current.asset_number != asset.asset_number {
            return Err(CoreError::Validation(
                "The asset number cannot be changed".into(),
            ));
        }
        inner.check_unique(&asset, Some(asset.id))?;
        inner.assets.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn delete(
        &self,
        id: DbId,
        reason: &str,
        deleted_by: &str,
        now: Timestamp,
    ) -> Result<DeletedAsset, CoreError> {
        let mut inner = self.inner.write().await;
        let asset = inner
            .assets
            .get(&id)
            .ok_or(CoreError::NotFound { entity: "Asset", id })?;

        let archived = asset.archive(inner.last_deleted_id + 1, reason, deleted_by, now)?;
        inner.last_deleted_id = archived.id;
        inner.assets.remove(&id);
        inner.scans.retain(|s| s.asset_id != id);
        inner.deleted.push(archived.clone());
        Ok(archived)
    }

    async fn list_deleted(&self) -> Result<Vec<DeletedAsset>, CoreError> {
        let mut deleted = self.inner.read().await.deleted.clone();
        deleted.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at).then(b.id.cmp(&a.id)));
        Ok(deleted)
    }

    async fn record_scan(
        &self,
        asset_id: DbId,
        scanned_at: Timestamp,
        device_id: Option<String>,
    ) -> Result<ScanRecord, CoreError> {
        let mut inner = self.inner.write().await;
        if !inner.assets.contains_key(&asset_id) {
            return Err(CoreError::NotFound {
                entity: "Asset",
                id: asset_id,
            });
        }
        inner.last_scan_id += 1;
        let scan = ScanRecord {
            id: inner.last_scan_id,
            asset_id,
            scanned_at,
            device_id,
        };
        inner.scans.push(scan.clone());
        Ok(scan)
    }

    async fn list_scans(&self, limit: usize) -> Result<Vec<ScanRecord>, CoreError> {
        let mut scans = self.inner.read().await.scans.clone();
        scans.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at).then(b.id.cmp(&a.id)));
        scans.truncate(limit);
        Ok(scans)
    }

    async fn delete_scan(&self, id: DbId) -> Result<(), CoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.scans.len();
        inner.scans.retain(|s| s.id != id);
        if inner.scans.len() == before {
            return Err(CoreError::NotFound {
                entity: "Scan record",
                id,
            });
        }
        Ok(())
    }

    async fn clear_scans(&self) -> Result<usize, CoreError> {
        let mut inner = self.inner.write().await;
        let removed = inner.scans.len();
        inner.scans.clear();
        Ok(removed)
    }
}
