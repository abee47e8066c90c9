use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::percent;
use crate::error::Result;
use crate::types::{ElectionTiming, PublishedElection, RiskSlot};

/// One bar of the upcoming-election chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub date: NaiveDate,
    pub status: String,
    pub country: String,
    pub pred_vio: RiskSlot,
    /// `pred_vio * 100`, left unrounded for the renderer to format.
    pub pred_vio_pct: RiskSlot,
}

/// Published rows dated strictly after `now`, sorted ascending by date.
/// Rows sharing a date keep their published order.
pub fn chart_rows(published: &[PublishedElection], now: NaiveDate) -> Vec<ChartBar> {
    let mut bars: Vec<ChartBar> = published
        .iter()
        .filter(|e| ElectionTiming::of(e.date, now) == ElectionTiming::Upcoming)
        .map(|e| ChartBar {
            date: e.date,
            status: e.status.clone(),
            country: e.country.clone(),
            pred_vio: RiskSlot::from(e.pred_vio),
            pred_vio_pct: RiskSlot::from(e.pred_vio.map(percent)),
        })
        .collect();
    bars.sort_by_key(|b| b.date);
    debug!("{} of {} published elections are upcoming", bars.len(), published.len());
    bars
}

pub fn chart_json(bars: &[ChartBar]) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(bars)?;
    bytes.push(b'\n');
    Ok(bytes)
}
