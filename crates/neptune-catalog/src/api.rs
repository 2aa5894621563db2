//! Remote catalog collaborator.

use std::future::Future;

use crate::accounts::AccountRecord;
use crate::cascade::DeviceItem;
use crate::dashboard::{BulkInventory, Marketshare, SavingsMonth};
use crate::discount::ProductDiscounts;
use crate::error::LookupError;
use crate::index::DeviceRecord;
use crate::pricing::{RebatableEntry, RebateTargetKind};

/// Staff endpoints the entry form reads from.
pub trait CatalogApi {
    /// Devices sold to a client.
    fn devices_for_client(
        &self,
        client_id: i64,
    ) -> impl Future<Output = Result<Vec<DeviceRecord>, LookupError>> + Send;

    /// Identifiers in stock for a device.
    fn items_for_device(
        &self,
        device_id: i64,
    ) -> impl Future<Output = Result<Vec<DeviceItem>, LookupError>> + Send;

    fn discounts_for_client(
        &self,
        client_id: i64,
    ) -> impl Future<Output = Result<Vec<ProductDiscounts>, LookupError>> + Send;

    fn accounts_for_client(
        &self,
        client_id: i64,
    ) -> impl Future<Output = Result<Vec<AccountRecord>, LookupError>> + Send;

    /// Products, categories or specialties a manufacturer offers rebates on.
    fn rebatable_entries(
        &self,
        manufacturer_id: i64,
        kind: RebateTargetKind,
    ) -> impl Future<Output = Result<Vec<RebatableEntry>, LookupError>> + Send;
}

/// Admin endpoints behind the client dashboard.
pub trait DashboardApi {
    /// Year-to-date spend per vendor.
    fn marketshare(
        &self,
        client_id: i64,
    ) -> impl Future<Output = Result<Marketshare, LookupError>> + Send;

    /// Monthly savings for `year`, or the current year when `None`.
    fn savings(
        &self,
        client_id: i64,
        year: Option<i32>,
    ) -> impl Future<Output = Result<Vec<SavingsMonth>, LookupError>> + Send;

    fn bulk_inventory(
        &self,
        client_id: i64,
    ) -> impl Future<Output = Result<BulkInventory, LookupError>> + Send;
}
