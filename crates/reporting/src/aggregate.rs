//! Grouped aggregation into per-channel and per-month tables.
//!
//! Ratio metrics are averaged over the records of a group (mean of
//! per-record ratios); volume metrics are summed. Channel rows also carry a
//! CTR computed from the group's summed clicks and impressions.

use campaign_core::types::{DerivedRecord, MonthPeriod};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use tracing::debug;

use crate::derive::percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ConversionRate,
    Cpc,
    Cpa,
    Roas,
    TotalSpend,
    RevenueGenerated,
    Impressions,
    Clicks,
    Conversions,
    Ctr,
}

impl Metric {
    /// Metrics aggregated as a mean over the group.
    pub const MEANS: [Metric; 4] = [Metric::ConversionRate, Metric::Cpc, Metric::Cpa, Metric::Roas];

    /// Metrics aggregated as a sum over the group.
    pub const SUMS: [Metric; 5] = [
        Metric::TotalSpend,
        Metric::RevenueGenerated,
        Metric::Impressions,
        Metric::Clicks,
        Metric::Conversions,
    ];

    /// Per-record value. `Ctr` only exists after aggregation.
    pub fn value_of(&self, record: &DerivedRecord) -> Option<f64> {
        let r = &record.record;
        match self {
            Metric::ConversionRate => record.conversion_rate,
            Metric::Cpc => record.cpc,
            Metric::Cpa => record.cpa,
            Metric::Roas => record.roas,
            Metric::TotalSpend => r.total_spend,
            Metric::RevenueGenerated => r.revenue_generated,
            Metric::Impressions => r.impressions.map(|v| v as f64),
            Metric::Clicks => r.clicks.map(|v| v as f64),
            Metric::Conversions => r.conversions.map(|v| v as f64),
            Metric::Ctr => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Channel,
    Month,
}

/// One group of an aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Channel name, or month period as `YYYY-MM`.
    pub key: String,
    pub values: BTreeMap<Metric, Option<f64>>,
}

impl AggregateRow {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied().flatten()
    }
}

/// Running sum and count of present values for one field.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    pub(crate) fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    pub(crate) fn total(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }

    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct GroupTotals {
    means: [Accumulator; 4],
    sums: [Accumulator; 5],
}

impl GroupTotals {
    fn push(&mut self, record: &DerivedRecord) {
        for (acc, metric) in self.means.iter_mut().zip(Metric::MEANS) {
            acc.push(metric.value_of(record));
        }
        for (acc, metric) in self.sums.iter_mut().zip(Metric::SUMS) {
            acc.push(metric.value_of(record));
        }
    }

    fn into_row(self, key: String, with_ctr: bool) -> AggregateRow {
        let mut values = BTreeMap::new();
        for (acc, metric) in self.means.iter().zip(Metric::MEANS) {
            values.insert(metric, acc.mean());
        }
        for (acc, metric) in self.sums.iter().zip(Metric::SUMS) {
            values.insert(metric, acc.total());
        }
        if with_ctr {
            let ctr = percentage(values[&Metric::Clicks], values[&Metric::Impressions]);
            values.insert(Metric::Ctr, ctr);
        }
        AggregateRow { key, values }
    }
}

/// Channel label of a record, unless missing or blank.
pub(crate) fn channel_key(record: &DerivedRecord) -> Option<&str> {
    record
        .record
        .channel
        .as_deref()
        .filter(|c| !c.trim().is_empty())
}

/// Groups records by key in order of first appearance. Records without a key
/// are skipped.
pub(crate) fn group_in_order<'a, K, F>(records: &'a [DerivedRecord], key_of: F) -> Vec<(K, Vec<&'a DerivedRecord>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&'a DerivedRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a DerivedRecord>)> = Vec::new();

    for record in records {
        let Some(key) = key_of(record) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }
    groups
}

pub fn aggregate_by(records: &[DerivedRecord], group_by: GroupBy) -> Vec<AggregateRow> {
    let rows: Vec<AggregateRow> = match group_by {
        GroupBy::Channel => group_in_order(records, channel_key)
            .into_iter()
            .map(|(channel, members)| {
                let mut totals = GroupTotals::default();
                members.into_iter().for_each(|r| totals.push(r));
                totals.into_row(channel.to_string(), true)
            })
            .collect(),
        GroupBy::Month => {
            let mut months: BTreeMap<MonthPeriod, GroupTotals> = BTreeMap::new();
            for record in records {
                if let Some(month) = record.month_period {
                    months.entry(month).or_default().push(record);
                }
            }
            months
                .into_iter()
                .map(|(month, totals)| totals.into_row(month.to_string(), false))
                .collect()
        }
    };

    debug!(group_by = ?group_by, groups = rows.len(), "Aggregated campaign records");
    rows
}
