//! One line item of a rep-case entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::{AncestorValues, CascadeField};
use crate::index::CatalogIndex;
use crate::option::{MultiSelectField, SelectField};

/// Stable identity of a row within a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the devices on a row were purchased.
///
/// Bulk purchases draw serial identifiers from the device's stock;
/// consignment identifiers are typed in freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseType {
    #[default]
    Bulk,
    Consignment,
}

impl PurchaseType {
    pub const fn code(self) -> u8 {
        match self {
            Self::Bulk => 1,
            Self::Consignment => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Bulk),
            2 => Some(Self::Consignment),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bulk => "Bulk",
            Self::Consignment => "Consignment",
        }
    }
}

/// Pricing basis of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CostType {
    #[default]
    Unit,
    System,
}

impl CostType {
    /// Used whenever the selected identifier carries no cost type.
    pub const FALLBACK: CostType = CostType::Unit;

    pub const fn code(self) -> u8 {
        match self {
            Self::Unit => 1,
            Self::System => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Unit),
            2 => Some(Self::System),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unit => "Unit cost",
            Self::System => "System cost",
        }
    }
}

/// Every observable field of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowField {
    Specialty,
    Category,
    Manufacturer,
    Device,
    PurchaseType,
    Identifier,
    CostType,
    Discounts,
}

impl From<CascadeField> for RowField {
    fn from(field: CascadeField) -> Self {
        match field {
            CascadeField::Specialty => Self::Specialty,
            CascadeField::Category => Self::Category,
            CascadeField::Manufacturer => Self::Manufacturer,
            CascadeField::Device => Self::Device,
        }
    }
}

/// Emitted whenever a row field changes, including programmatic changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChanged {
    pub row: RowId,
    pub field: RowField,
}

/// Selection state of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRow {
    id: RowId,
    pub specialty: SelectField,
    pub category: SelectField,
    pub manufacturer: SelectField,
    pub device: SelectField,
    pub purchase_type: PurchaseType,
    pub identifier: SelectField,
    pub cost_type: CostType,
    pub discounts: MultiSelectField,
}

impl SelectionRow {
    /// Blank row with the specialty options populated.
    pub fn new(id: RowId, index: &CatalogIndex) -> Self {
        Self {
            id,
            specialty: SelectField::new(
                index.options_for(CascadeField::Specialty, AncestorValues::default()),
            ),
            category: SelectField::default(),
            manufacturer: SelectField::default(),
            device: SelectField::default(),
            purchase_type: PurchaseType::default(),
            identifier: SelectField::default(),
            cost_type: CostType::default(),
            discounts: MultiSelectField::default(),
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn field(&self, field: CascadeField) -> &SelectField {
        match field {
            CascadeField::Specialty => &self.specialty,
            CascadeField::Category => &self.category,
            CascadeField::Manufacturer => &self.manufacturer,
            CascadeField::Device => &self.device,
        }
    }

    pub fn field_mut(&mut self, field: CascadeField) -> &mut SelectField {
        match field {
            CascadeField::Specialty => &mut self.specialty,
            CascadeField::Category => &mut self.category,
            CascadeField::Manufacturer => &mut self.manufacturer,
            CascadeField::Device => &mut self.device,
        }
    }

    pub fn ancestors(&self) -> AncestorValues<'_> {
        AncestorValues::new(
            self.specialty.value(),
            self.category.value(),
            self.manufacturer.value(),
        )
    }

    /// Selected device id, if the device value is a valid id.
    pub fn device_id(&self) -> Option<i64> {
        self.device.value().and_then(|v| v.parse().ok())
    }

    /// Product of the selected device, read from the option's attribute.
    pub fn product_id(&self) -> Option<i64> {
        self.device
            .selected()
            .and_then(|option| option.attribute("product"))
            .and_then(|v| v.parse().ok())
    }
}
