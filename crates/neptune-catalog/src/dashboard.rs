//! Dashboard figures for a client: vendor marketshare, monthly savings and
//! bulk inventory expiry.
//!
//! The server sends raw totals. Shares and percent-of-total values are
//! derived here so every front end shows the same numbers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Money or percentage as sent by the server: a decimal string such as
/// `"1250.00"` or a plain number.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(pub f64);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| serde::de::Error::custom(format!("invalid amount: {text:?}"))),
        }
    }
}

/// Share of `part` in `total`, in percent. Zero when there is no total.
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

/// One vendor's year-to-date spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketshareEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub units: i64,
    pub spend: Amount,
}

/// Marketshare payload: a period label plus one entry per vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marketshare {
    pub name: String,
    #[serde(default)]
    pub marketshare: Vec<MarketshareEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketshareRow {
    pub id: i64,
    pub name: String,
    pub units: i64,
    pub spend: f64,
    /// Vendor spend as a percentage of all vendors' spend.
    pub share: f64,
}

pub fn marketshare_rows(entries: &[MarketshareEntry]) -> Vec<MarketshareRow> {
    let total: f64 = entries.iter().map(|entry| entry.spend.0).sum();
    entries
        .iter()
        .map(|entry| MarketshareRow {
            id: entry.id,
            name: entry.name.clone(),
            units: entry.units,
            spend: entry.spend.0,
            share: percent_of(entry.spend.0, total),
        })
        .collect()
}

/// Which monthly series the savings chart plots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsMetric {
    #[default]
    Savings,
    Spend,
    Percent,
}

impl SavingsMetric {
    pub const ALL: [SavingsMetric; 3] = [Self::Savings, Self::Spend, Self::Percent];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Spend => "spend",
            Self::Percent => "percent",
        }
    }
}

impl fmt::Display for SavingsMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SavingsMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown savings metric: {s}"))
    }
}

/// Savings figures for one month (1 = January).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsMonth {
    pub month: u32,
    pub savings: Amount,
    pub spend: Amount,
    #[serde(default)]
    pub percent: Amount,
}

impl SavingsMonth {
    pub fn value(&self, metric: SavingsMetric) -> f64 {
        match metric {
            SavingsMetric::Savings => self.savings.0,
            SavingsMetric::Spend => self.spend.0,
            SavingsMetric::Percent => self.percent.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsPoint {
    pub month: u32,
    pub value: f64,
    /// This month's value as a percentage of the year-to-date sum.
    pub percent_of_sum: f64,
}

/// The savings chart and its two headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub metric: SavingsMetric,
    pub points: Vec<SavingsPoint>,
    pub year_to_date: f64,
    /// Value for `current_month`, or zero when the server has no row for it.
    pub current_month: f64,
}

pub fn summarize_savings(
    months: &[SavingsMonth],
    metric: SavingsMetric,
    current_month: u32,
) -> SavingsSummary {
    let year_to_date: f64 = months.iter().map(|month| month.value(metric)).sum();
    let points = months
        .iter()
        .map(|month| SavingsPoint {
            month: month.month,
            value: month.value(metric),
            percent_of_sum: percent_of(month.value(metric), year_to_date),
        })
        .collect();
    let current = months
        .iter()
        .find(|month| month.month == current_month)
        .map_or(0.0, |month| month.value(metric));

    SavingsSummary {
        metric,
        points,
        year_to_date,
        current_month: current,
    }
}

/// Where an unused bulk item's expiry date falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryWindow {
    Expired,
    Within30Days,
    Within60Days,
    Later,
}

impl ExpiryWindow {
    pub fn classify(expires: NaiveDate, today: NaiveDate) -> Self {
        match expires.signed_duration_since(today).num_days() {
            i64::MIN..0 => Self::Expired,
            0..30 => Self::Within30Days,
            30..60 => Self::Within60Days,
            _ => Self::Later,
        }
    }
}

/// Counters for a client's unused bulk stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkInventory {
    pub available: u32,
    pub expiring60: u32,
    pub expiring30: u32,
    pub expired: u32,
}

impl BulkInventory {
    /// Count expiry dates of unused bulk items into the dashboard windows.
    pub fn tally<I>(expiry_dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut inventory = Self::default();
        for expires in expiry_dates {
            inventory.available += 1;
            match ExpiryWindow::classify(expires, today) {
                ExpiryWindow::Expired => inventory.expired += 1,
                ExpiryWindow::Within30Days => inventory.expiring30 += 1,
                ExpiryWindow::Within60Days => inventory.expiring60 += 1,
                ExpiryWindow::Later => {}
            }
        }
        inventory
    }
}

/// `12.3%`
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// `$1,234.5`: grouped thousands, at most two decimals, trailing zeros
/// dropped.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let fraction = fraction.trim_end_matches('0');
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{fraction}")
    }
}
