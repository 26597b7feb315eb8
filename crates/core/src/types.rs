use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The seven input columns every campaign export must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Channel,
    Impressions,
    Clicks,
    Conversions,
    TotalSpend,
    RevenueGenerated,
    EndDate,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Channel,
        Field::Impressions,
        Field::Clicks,
        Field::Conversions,
        Field::TotalSpend,
        Field::RevenueGenerated,
        Field::EndDate,
    ];

    /// Column header as it appears in the source spreadsheet.
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::Channel => "Marketing_Channel",
            Field::Impressions => "Impressions",
            Field::Clicks => "Clicks",
            Field::Conversions => "Conversions",
            Field::TotalSpend => "Total_Spend",
            Field::RevenueGenerated => "Revenue_Generated",
            Field::EndDate => "End_Date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A single spreadsheet cell as handed over by the loader.
///
/// `Blank` is an empty cell in a column that exists; `Absent` means the
/// column itself is missing from the row and is never produced by
/// deserialization of a present key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Blank,
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    #[serde(skip)]
    Absent,
}

impl CellValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Blank, or text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank | CellValue::Absent => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Blank, Into::into)
    }
}

/// One uncleaned input row, keyed by the spreadsheet column names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCampaignRow {
    #[serde(rename = "Marketing_Channel", default, skip_serializing_if = "CellValue::is_absent")]
    pub channel: CellValue,
    #[serde(rename = "Impressions", default, skip_serializing_if = "CellValue::is_absent")]
    pub impressions: CellValue,
    #[serde(rename = "Clicks", default, skip_serializing_if = "CellValue::is_absent")]
    pub clicks: CellValue,
    #[serde(rename = "Conversions", default, skip_serializing_if = "CellValue::is_absent")]
    pub conversions: CellValue,
    #[serde(rename = "Total_Spend", default, skip_serializing_if = "CellValue::is_absent")]
    pub total_spend: CellValue,
    #[serde(rename = "Revenue_Generated", default, skip_serializing_if = "CellValue::is_absent")]
    pub revenue_generated: CellValue,
    #[serde(rename = "End_Date", default, skip_serializing_if = "CellValue::is_absent")]
    pub end_date: CellValue,
}

impl RawCampaignRow {
    pub fn cell(&self, field: Field) -> &CellValue {
        match field {
            Field::Channel => &self.channel,
            Field::Impressions => &self.impressions,
            Field::Clicks => &self.clicks,
            Field::Conversions => &self.conversions,
            Field::TotalSpend => &self.total_spend,
            Field::RevenueGenerated => &self.revenue_generated,
            Field::EndDate => &self.end_date,
        }
    }
}

/// A cleaned campaign row. `None` is the missing marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub channel: Option<String>,
    pub impressions: Option<u64>,
    pub clicks: Option<u64>,
    pub conversions: Option<u64>,
    pub total_spend: Option<f64>,
    pub revenue_generated: Option<f64>,
    pub end_date: Option<NaiveDate>,
}

impl From<CampaignRecord> for RawCampaignRow {
    fn from(record: CampaignRecord) -> Self {
        Self {
            channel: record.channel.into(),
            impressions: record.impressions.into(),
            clicks: record.clicks.into(),
            conversions: record.conversions.into(),
            total_spend: record.total_spend.into(),
            revenue_generated: record.revenue_generated.into(),
            end_date: record
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .into(),
        }
    }
}

/// Calendar month truncation of a date, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in {s:?}"))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid month in {s:?}"))?;
        MonthPeriod::new(year, month).ok_or_else(|| format!("month out of range in {s:?}"))
    }
}

impl Serialize for MonthPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A cleaned record plus its per-row ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub record: CampaignRecord,
    /// conversions / clicks × 100
    pub conversion_rate: Option<f64>,
    /// total_spend / clicks
    pub cpc: Option<f64>,
    /// total_spend / conversions
    pub cpa: Option<f64>,
    /// revenue_generated / total_spend
    pub roas: Option<f64>,
    pub month_period: Option<MonthPeriod>,
}
