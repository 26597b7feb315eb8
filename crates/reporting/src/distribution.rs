//! Distribution views: channel × month ROAS matrix, per-channel CPA spread,
//! per-record spend against revenue, and the impressions histogram.

use campaign_core::types::{DerivedRecord, MonthPeriod};
use campaign_core::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::aggregate::{channel_key, group_in_order, Accumulator};

/// Mean ROAS per (month, channel). `cells[m][c]` lines up with
/// `months[m]` and `channels[c]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoasMatrix {
    pub months: Vec<MonthPeriod>,
    pub channels: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl RoasMatrix {
    pub fn get(&self, month: MonthPeriod, channel: &str) -> Option<f64> {
        let m = self.months.iter().position(|p| *p == month)?;
        let c = self.channels.iter().position(|name| name == channel)?;
        self.cells[m][c]
    }
}

pub fn roas_matrix(records: &[DerivedRecord]) -> RoasMatrix {
    let keyed = group_in_order(records, |r| Some((channel_key(r)?, r.month_period?)));

    let mut channels: Vec<String> = Vec::new();
    let mut column: HashMap<&str, usize> = HashMap::new();
    let mut by_month: BTreeMap<MonthPeriod, HashMap<usize, Accumulator>> = BTreeMap::new();

    for ((channel, month), members) in keyed {
        let c = *column.entry(channel).or_insert_with(|| {
            channels.push(channel.to_string());
            channels.len() - 1
        });
        let acc = by_month.entry(month).or_default().entry(c).or_default();
        members.iter().for_each(|r| acc.push(r.roas));
    }

    let months: Vec<MonthPeriod> = by_month.keys().copied().collect();
    let cells: Vec<Vec<Option<f64>>> = by_month
        .values()
        .map(|row| {
            (0..channels.len())
                .map(|c| row.get(&c).and_then(Accumulator::mean))
                .collect()
        })
        .collect();

    RoasMatrix {
        months,
        channels,
        cells,
    }
}

/// Box-plot statistics of one channel's CPA values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub channel: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Lowest value within `q1 - 1.5 × IQR`.
    pub whisker_low: f64,
    /// Highest value within `q3 + 1.5 × IQR`.
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    fn from_values(channel: String, mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = || values.iter().copied().filter(move |v| *v >= low_fence && *v <= high_fence);
        let whisker_low = inside().next().unwrap_or(q1);
        let whisker_high = inside().last().unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            channel,
            count: values.len(),
            min: values[0],
            q1,
            median: quantile(&values, 0.5),
            q3,
            max: values[values.len() - 1],
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Channels with no present CPA are left out.
pub fn cpa_distribution(records: &[DerivedRecord]) -> Vec<BoxStats> {
    group_in_order(records, channel_key)
        .into_iter()
        .filter_map(|(channel, members)| {
            let values = members.iter().filter_map(|r| r.cpa).collect();
            BoxStats::from_values(channel.to_string(), values)
        })
        .collect()
}

/// One record's spend and revenue, tagged with its channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRevenuePoint {
    pub channel: Option<String>,
    pub total_spend: f64,
    pub revenue_generated: f64,
}

/// One point per record, in input order. Records missing either amount are
/// left out; a missing channel is kept as `None`.
pub fn spend_revenue(records: &[DerivedRecord]) -> Vec<SpendRevenuePoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(SpendRevenuePoint {
                channel: channel_key(r).map(str::to_string),
                total_spend: r.record.total_spend?,
                revenue_generated: r.record.revenue_generated?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Equal-width histogram of present impressions. The last bin is closed on
/// the right.
pub fn impressions_histogram(records: &[DerivedRecord], bins: usize) -> CampaignResult<Histogram> {
    if bins == 0 {
        return Err(CampaignError::InvalidArgument(
            "histogram needs at least one bin".to_string(),
        ));
    }

    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.record.impressions)
        .map(|v| v as f64)
        .collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Ok(Histogram::default());
    };

    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0u64; bins];
    for v in values {
        let i = (((v - lo) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }

    Ok(Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
                count,
            })
            .collect(),
    })
}
