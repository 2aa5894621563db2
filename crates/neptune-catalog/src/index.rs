//! Hierarchical catalog index.
//!
//! Flat device records are grouped specialty → category → manufacturer →
//! devices. Group keys are held in ordered maps so option lists come out in
//! lexicographic order; devices keep the order the server returned them in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::{AncestorValues, CascadeField};
use crate::option::SelectOption;

/// A device as returned by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Product the device belongs to; keys the discount table.
    #[serde(default)]
    pub product: Option<i64>,
}

/// Leaf of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub id: i64,
    pub name: String,
    pub product_id: Option<i64>,
}

impl DeviceDescriptor {
    /// Select option: value is the id, label the name, plus a `product`
    /// attribute when the product is known.
    pub fn to_option(&self) -> SelectOption {
        let option = SelectOption::new(self.id.to_string(), self.name.clone());
        match self.product_id {
            Some(product) => option.with_attribute("product", product),
            None => option,
        }
    }
}

type Manufacturers = BTreeMap<String, Vec<DeviceDescriptor>>;
type Categories = BTreeMap<String, Manufacturers>;

/// Catalog grouped for cascading lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    specialties: BTreeMap<String, Categories>,
    device_count: usize,
}

/// Build the index from flat records.
///
/// A record is grouped under as many leading keys as it has: one with a
/// specialty and category but no manufacturer adds those two keys and no
/// device. Records without a specialty have nowhere to go. A device id seen
/// twice keeps its first record.
pub fn build_catalog_index(records: &[DeviceRecord]) -> CatalogIndex {
    let mut index = CatalogIndex::default();
    let mut seen = std::collections::HashSet::new();
    let mut partial = 0usize;

    for record in records {
        if !seen.insert(record.id) {
            tracing::debug!(device_id = record.id, "Duplicate device record ignored");
            continue;
        }
        let Some(specialty) = non_empty(record.specialty.as_deref()) else {
            partial += 1;
            continue;
        };
        let categories = index.specialties.entry(specialty.to_string()).or_default();

        let Some(category) = non_empty(record.category.as_deref()) else {
            partial += 1;
            continue;
        };
        let manufacturers = categories.entry(category.to_string()).or_default();

        let Some(manufacturer) = non_empty(record.manufacturer.as_deref()) else {
            partial += 1;
            continue;
        };
        manufacturers
            .entry(manufacturer.to_string())
            .or_default()
            .push(DeviceDescriptor {
                id: record.id,
                name: record.name.clone(),
                product_id: record.product,
            });
        index.device_count += 1;
    }

    if partial > 0 {
        tracing::debug!(partial, "Device records without a full hierarchy were not selectable");
    }
    tracing::debug!(
        devices = index.device_count,
        specialties = index.specialties.len(),
        "Catalog index built"
    );
    index
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl CatalogIndex {
    pub fn is_empty(&self) -> bool {
        self.device_count == 0
    }

    /// Number of indexed devices.
    pub fn device_count(&self) -> usize {
        self.device_count
    }

    pub fn specialties(&self) -> impl Iterator<Item = &str> {
        self.specialties.keys().map(String::as_str)
    }

    pub fn categories(&self, specialty: &str) -> impl Iterator<Item = &str> {
        self.specialties
            .get(specialty)
            .into_iter()
            .flat_map(|categories| categories.keys().map(String::as_str))
    }

    pub fn manufacturers(&self, specialty: &str, category: &str) -> impl Iterator<Item = &str> {
        self.specialties
            .get(specialty)
            .and_then(|categories| categories.get(category))
            .into_iter()
            .flat_map(|manufacturers| manufacturers.keys().map(String::as_str))
    }

    pub fn devices(
        &self,
        specialty: &str,
        category: &str,
        manufacturer: &str,
    ) -> &[DeviceDescriptor] {
        self.specialties
            .get(specialty)
            .and_then(|categories| categories.get(category))
            .and_then(|manufacturers| manufacturers.get(manufacturer))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find a device anywhere in the tree.
    pub fn find_device(&self, id: i64) -> Option<&DeviceDescriptor> {
        self.specialties
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .flatten()
            .find(|device| device.id == id)
    }

    /// Options for `field` given the ancestor values.
    ///
    /// Empty whenever a required ancestor is unset or not present.
    pub fn options_for(
        &self,
        field: CascadeField,
        ancestors: AncestorValues<'_>,
    ) -> Vec<SelectOption> {
        match field {
            CascadeField::Specialty => self.specialties().map(SelectOption::named).collect(),
            CascadeField::Category => ancestors
                .specialty
                .map(|s| self.categories(s).map(SelectOption::named).collect())
                .unwrap_or_default(),
            CascadeField::Manufacturer => match (ancestors.specialty, ancestors.category) {
                (Some(s), Some(c)) => self.manufacturers(s, c).map(SelectOption::named).collect(),
                _ => Vec::new(),
            },
            CascadeField::Device => {
                match (ancestors.specialty, ancestors.category, ancestors.manufacturer) {
                    (Some(s), Some(c), Some(m)) => self
                        .devices(s, c, m)
                        .iter()
                        .map(DeviceDescriptor::to_option)
                        .collect(),
                    _ => Vec::new(),
                }
            }
        }
    }
}

/// Free-function form of [`CatalogIndex::options_for`].
pub fn options_for(
    index: &CatalogIndex,
    field: CascadeField,
    ancestors: AncestorValues<'_>,
) -> Vec<SelectOption> {
    index.options_for(field, ancestors)
}
