//! Rebate targets and discount entry helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::option::{MultiSelectField, SelectOption};

/// What a manufacturer rebate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebateTargetKind {
    Product,
    Category,
    Specialty,
}

impl RebateTargetKind {
    pub const ALL: [RebateTargetKind; 3] = [Self::Product, Self::Category, Self::Specialty];

    /// Endpoint path segment under `/api/staff/manufacturers/{id}/`.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
            Self::Specialty => "specialty",
        }
    }
}

impl fmt::Display for RebateTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for RebateTargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.path_segment().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown rebate target: {s}"))
    }
}

/// A product, category or specialty a manufacturer offers rebates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebatableEntry {
    pub id: i64,
    pub name: String,
}

pub fn rebate_target_options(entries: &[RebatableEntry]) -> Vec<SelectOption> {
    entries
        .iter()
        .map(|entry| SelectOption::new(entry.id.to_string(), entry.name.clone()))
        .collect()
}

/// The rebate target picker: a kind plus the entries fetched for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebateTargets {
    kind: Option<RebateTargetKind>,
    pub targets: MultiSelectField,
}

impl RebateTargets {
    pub fn kind(&self) -> Option<RebateTargetKind> {
        self.kind
    }

    /// Switch kind. Returns the kind to fetch entries for, if any. Without a
    /// kind there is nothing to pick from.
    pub fn set_kind(&mut self, kind: Option<RebateTargetKind>) -> Option<RebateTargetKind> {
        if kind != self.kind {
            self.kind = kind;
            self.targets.clear();
        }
        self.kind
    }

    /// Apply entries fetched for `kind`; ignored if the kind changed since.
    pub fn apply(&mut self, kind: RebateTargetKind, entries: &[RebatableEntry]) -> bool {
        if self.kind != Some(kind) {
            return false;
        }
        self.targets.set_options(rebate_target_options(entries));
        true
    }
}

/// How a discount amount is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountType {
    #[default]
    Percent,
    Value,
}

/// The two amount inputs of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountField {
    Percent,
    Value,
}

impl DiscountType {
    pub const fn code(self) -> u8 {
        match self {
            Self::Percent => 1,
            Self::Value => 2,
        }
    }

    /// Code 1 is a percent discount; any other code is a value discount.
    pub fn from_code(code: u8) -> Self {
        if code == 1 { Self::Percent } else { Self::Value }
    }

    /// The input that must not be edited for this type.
    pub const fn readonly_field(self) -> DiscountField {
        match self {
            Self::Percent => DiscountField::Value,
            Self::Value => DiscountField::Percent,
        }
    }

    pub const fn editable_field(self) -> DiscountField {
        match self {
            Self::Percent => DiscountField::Percent,
            Self::Value => DiscountField::Value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readonly_field() {
        assert_eq!(DiscountType::Percent.readonly_field(), DiscountField::Value);
        assert_eq!(DiscountType::Value.readonly_field(), DiscountField::Percent);
        assert_eq!(DiscountType::from_code(1), DiscountType::Percent);
        assert_eq!(DiscountType::from_code(2).editable_field(), DiscountField::Value);
    }

    #[test]
    fn test_rebate_target_options() {
        let options = rebate_target_options(&[RebatableEntry {
            id: 4,
            name: "Leads".to_string(),
        }]);
        assert_eq!(options, vec![SelectOption::new("4", "Leads")]);
        assert!(rebate_target_options(&[]).is_empty());
    }

    #[test]
    fn test_rebate_targets_follow_kind() {
        let entries = [RebatableEntry {
            id: 4,
            name: "Leads".to_string(),
        }];
        let mut targets = RebateTargets::default();
        assert_eq!(targets.set_kind(None), None);
        assert!(!targets.apply(RebateTargetKind::Product, &entries));
        assert!(targets.targets.options().is_empty());

        assert_eq!(
            targets.set_kind(Some(RebateTargetKind::Category)),
            Some(RebateTargetKind::Category)
        );
        assert!(targets.apply(RebateTargetKind::Category, &entries));
        targets.targets.set_values(["4"]);
        assert_eq!(targets.targets.values(), ["4"]);

        targets.set_kind(None);
        assert!(targets.targets.options().is_empty());
        assert!(targets.targets.values().is_empty());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Category".parse(), Ok(RebateTargetKind::Category));
        assert!("device".parse::<RebateTargetKind>().is_err());
    }
}
