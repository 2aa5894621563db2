//! Device catalog and cascading selection for Neptune rep-case entry.
//!
//! A rep case lists devices used in a procedure. Each row narrows a device
//! down through four dependent selects:
//!
//! ```text
//! specialty ──► category ──► manufacturer ──► device ──► identifier ──► cost type
//!                                               │                          │
//!                                               └──────── discounts ◄──────┘
//! ```
//!
//! Changing a select re-derives the options of everything to its right.
//! Values that are still offered survive; the rest are cleared.
//!
//! # Architecture
//!
//! - [`index`]: builds the specialty/category/manufacturer tree from flat records
//! - [`cascade`]: pure per-row handlers
//! - [`form`]: [`EntryForm`], the owner of all rows and lookups
//! - [`request`]: generation tickets that keep late responses from landing
//! - [`discount`], [`accounts`], [`pricing`]: option builders for the rest of the form
//! - [`dashboard`]: marketshare, savings and bulk inventory figures

pub mod accounts;
pub mod api;
pub mod cascade;
pub mod dashboard;
pub mod discount;
pub mod error;
pub mod field;
pub mod form;
pub mod index;
pub mod option;
pub mod pricing;
pub mod request;
pub mod row;

pub use accounts::{
    AccountRecord, OwnerSelection, owner_options, parse_client_id, physician_options,
};
pub use api::{CatalogApi, DashboardApi};
pub use cascade::{
    DeviceItem, IdentifierUpdate, apply_identifier_items, on_ancestor_change,
    on_identifier_change, on_purchase_type_or_device_change, reconcile_row,
};
pub use dashboard::{
    Amount, BulkInventory, ExpiryWindow, Marketshare, MarketshareEntry, MarketshareRow,
    SavingsMetric, SavingsMonth, SavingsPoint, SavingsSummary, format_currency, format_percent,
    marketshare_rows, percent_of, summarize_savings,
};
pub use discount::{Discount, DiscountOffer, DiscountTable, ProductDiscounts};
pub use error::{FormError, LookupError, Result};
pub use field::{AncestorValues, CascadeField};
pub use form::EntryForm;
pub use index::{CatalogIndex, DeviceDescriptor, DeviceRecord, build_catalog_index, options_for};
pub use option::{MultiSelectField, SelectField, SelectOption};
pub use pricing::{
    DiscountField, DiscountType, RebatableEntry, RebateTargetKind, RebateTargets,
    rebate_target_options,
};
pub use request::{LookupKey, LookupSlot, LookupTicket, RequestTracker};
pub use row::{CostType, FieldChanged, PurchaseType, RowField, RowId, SelectionRow};
