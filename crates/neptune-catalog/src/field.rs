//! The four-level cascade: specialty, category, manufacturer, device.

use std::fmt;
use std::str::FromStr;

/// A level of the catalog cascade, ordered root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CascadeField {
    Specialty,
    Category,
    Manufacturer,
    Device,
}

impl CascadeField {
    /// All levels, root first.
    pub const CHAIN: [CascadeField; 4] = [
        CascadeField::Specialty,
        CascadeField::Category,
        CascadeField::Manufacturer,
        CascadeField::Device,
    ];

    /// Levels strictly below this one, nearest first.
    pub fn descendants(self) -> &'static [CascadeField] {
        let position = self as usize;
        &Self::CHAIN[position + 1..]
    }

    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Specialty => None,
            Self::Category => Some(Self::Specialty),
            Self::Manufacturer => Some(Self::Category),
            Self::Device => Some(Self::Manufacturer),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Specialty => "specialty",
            Self::Category => "category",
            Self::Manufacturer => "manufacturer",
            Self::Device => "device",
        }
    }
}

impl fmt::Display for CascadeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CascadeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "specialty" => Ok(Self::Specialty),
            "category" => Ok(Self::Category),
            "manufacturer" => Ok(Self::Manufacturer),
            "device" => Ok(Self::Device),
            other => Err(format!("unknown cascade field: {other}")),
        }
    }
}

/// Currently selected values of the three ancestor levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AncestorValues<'a> {
    pub specialty: Option<&'a str>,
    pub category: Option<&'a str>,
    pub manufacturer: Option<&'a str>,
}

impl<'a> AncestorValues<'a> {
    pub fn new(
        specialty: Option<&'a str>,
        category: Option<&'a str>,
        manufacturer: Option<&'a str>,
    ) -> Self {
        Self {
            specialty,
            category,
            manufacturer,
        }
    }
}
