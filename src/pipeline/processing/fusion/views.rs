use tracing::debug;

use super::join::{left_join, unmatched};
use super::latest::dedup_by_key;
use crate::observability::metrics;
use crate::types::{
    CountryRiskRow, ElectionDate, ElectionSlot, MonthlyRow, RegimeRecord, RiskSlot, ScoredRecord,
    UpcomingElectionRow,
};

/// Latest scored row per country LEFT JOIN each country's next election.
///
/// `latest` must already hold one row per country and `next_elections` one
/// election per country.
pub fn country_view(latest: &[ScoredRecord], next_elections: &[ElectionDate]) -> Vec<CountryRiskRow> {
    let joined = left_join(
        latest,
        next_elections,
        |s| s.record.country.clone(),
        |e| e.country.clone(),
    );
    record_join("country", joined.len(), unmatched(&joined));

    joined
        .into_iter()
        .map(|(scored, election)| CountryRiskRow {
            country: scored.record.country.clone(),
            period: scored.record.period,
            covariates: scored.record.covariates.clone(),
            pred_vio: scored.pred_vio,
            next_election: election
                .map(|e| ElectionSlot::Scheduled(e.date))
                .unwrap_or(ElectionSlot::NoUpcomingElection),
        })
        .collect()
}

/// Upcoming schedule (driving) LEFT JOIN the country view's score.
pub fn upcoming_election_view(
    schedule: &[ElectionDate],
    countries: &[CountryRiskRow],
) -> Vec<UpcomingElectionRow> {
    let joined = left_join(schedule, countries, |e| e.country.clone(), |c| c.country.clone());
    record_join("upcoming", joined.len(), unmatched(&joined));

    joined
        .into_iter()
        .map(|(election, country)| UpcomingElectionRow {
            date: election.date,
            status: election.status.clone(),
            country: election.country.clone(),
            pred_vio: RiskSlot::from(country.map(|c| c.pred_vio)),
        })
        .collect()
}

/// REIGN months of `year` (driving) LEFT JOIN scored ELVIS on (country, year, month).
pub fn monthly_panel(reign: &[RegimeRecord], scored: &[ScoredRecord], year: i32) -> Vec<MonthlyRow> {
    let in_year: Vec<RegimeRecord> = reign
        .iter()
        .filter(|r| r.period.year == year)
        .cloned()
        .collect();
    let keyed: Vec<&ScoredRecord> = scored.iter().filter(|s| s.record.period.is_some()).collect();
    let joined = left_join(
        &in_year,
        &keyed,
        |r| (r.country.clone(), Some(r.period)),
        |s| (s.record.country.clone(), s.record.period),
    );
    record_join("monthly", joined.len(), unmatched(&joined));

    joined
        .into_iter()
        .map(|(regime, matched)| MonthlyRow {
            country: regime.country.clone(),
            period: regime.period,
            leader: regime.leader.clone(),
            tenure_months: regime.tenure_months,
            government: regime.government.clone(),
            anticipation: regime.anticipation,
            election: matched
                .and_then(|s| s.record.date)
                .map(ElectionSlot::Scheduled)
                .unwrap_or(ElectionSlot::NoElection),
            pred_vio: RiskSlot::from(matched.map(|s| s.pred_vio)),
        })
        .collect()
}

/// One row per country for the static map: any month with an election
/// first, otherwise the row for `display_month`.
pub fn static_map_view(panel: &[MonthlyRow], display_month: u32) -> Vec<MonthlyRow> {
    let key = |r: &MonthlyRow| (r.country.clone(), r.period, r.election);
    let with_election = dedup_by_key(
        panel
            .iter()
            .filter(|r| r.election.date().is_some())
            .cloned()
            .collect(),
        key,
    );
    let without_election = dedup_by_key(
        panel
            .iter()
            .filter(|r| r.election.date().is_none() && r.period.month == display_month)
            .cloned()
            .collect(),
        key,
    );
    debug!(
        "Static view: {} election rows, {} month-{} rows without election",
        with_election.len(),
        without_election.len(),
        display_month
    );

    let combined: Vec<MonthlyRow> = with_election.into_iter().chain(without_election).collect();
    let view = dedup_by_key(combined, |r| r.country.clone());
    metrics::fusion::rows_out("static_map", view.len());
    view
}

/// Rows of a single calendar month.
pub fn month_view(panel: &[MonthlyRow], month: u32) -> Vec<MonthlyRow> {
    let view: Vec<MonthlyRow> = panel
        .iter()
        .filter(|r| r.period.month == month)
        .cloned()
        .collect();
    metrics::fusion::rows_out("month_map", view.len());
    view
}

fn record_join(view: &'static str, rows: usize, unmatched_rows: usize) {
    debug!(view, rows, unmatched = unmatched_rows, "left join complete");
    metrics::fusion::rows_out(view, rows);
    metrics::fusion::unmatched_rows(view, unmatched_rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Covariate, Covariates, ElvisRecord, Period};
    use chrono::NaiveDate;

    fn ymd(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn scored(country: &str, date: Option<&str>, period: Option<(i32, u32)>, tenure: f64, p: f64) -> ScoredRecord {
        let mut covariates = Covariates::default();
        covariates.set(Covariate::RegimeTenure, Some(tenure));
        ScoredRecord {
            record: ElvisRecord {
                row: 1,
                country: country.to_string(),
                date: date.map(ymd),
                period: period.map(|(y, m)| Period::new(y, m)),
                outcome: Some(0.0),
                covariates,
            },
            pred_vio: p,
        }
    }

    fn election(country: &str, date: &str) -> ElectionDate {
        ElectionDate {
            row: 1,
            country: country.to_string(),
            date: ymd(date),
            status: "General".to_string(),
        }
    }

    fn regime(country: &str, year: i32, month: u32) -> RegimeRecord {
        RegimeRecord {
            row: 1,
            country: country.to_string(),
            period: Period::new(year, month),
            leader: format!("{country} leader"),
            tenure_months: Some(12.0),
            government: "Dominant Party".to_string(),
            anticipation: false,
        }
    }

    #[test]
    fn country_view_attaches_election_or_sentinel() {
        let latest = vec![scored("Chad", Some("2020-06-01"), None, 9.0, 0.3), scored("Mali", None, None, 2.0, 0.1)];
        let next = vec![election("Chad", "2021-01-01"), election("Narnia", "2021-02-01")];
        let view = country_view(&latest, &next);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].next_election, ElectionSlot::Scheduled(ymd("2021-01-01")));
        assert_eq!(view[0].covariates.get(Covariate::RegimeTenure), Some(9.0));
        assert_eq!(view[1].next_election, ElectionSlot::NoUpcomingElection);
        assert!(view.iter().all(|r| r.country != "Narnia"));
    }

    #[test]
    fn upcoming_view_uses_no_estimate_sentinel() {
        let schedule = vec![election("Chad", "2021-01-01"), election("Peru", "2021-04-11")];
        let countries = country_view(&[scored("Chad", None, None, 9.0, 0.3)], &[]);
        let view = upcoming_election_view(&schedule, &countries);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].pred_vio, RiskSlot::Scored(0.3));
        assert_eq!(view[1].pred_vio, RiskSlot::Unscored);
        assert_eq!(view[1].pred_vio.to_string(), "No risk estimate");
    }

    #[test]
    fn monthly_panel_joins_on_country_and_period() {
        let reign = vec![regime("Chad", 2018, 9), regime("Chad", 2018, 10), regime("Chad", 2017, 9)];
        let scored = vec![scored("Chad", Some("2018-10-14"), Some((2018, 10)), 5.0, 0.6)];
        let panel = monthly_panel(&reign, &scored, 2018);
        assert_eq!(panel.len(), 2);
        assert_eq!(panel[0].election, ElectionSlot::NoElection);
        assert_eq!(panel[0].pred_vio, RiskSlot::Unscored);
        assert_eq!(panel[1].election, ElectionSlot::Scheduled(ymd("2018-10-14")));
        assert_eq!(panel[1].pred_vio, RiskSlot::Scored(0.6));
    }

    #[test]
    fn static_view_prefers_election_rows() {
        let reign = vec![
            regime("Chad", 2018, 9),
            regime("Chad", 2018, 10),
            regime("Mali", 2018, 8),
            regime("Mali", 2018, 9),
            regime("Peru", 2018, 1),
        ];
        let scored = vec![scored("Chad", Some("2018-10-14"), Some((2018, 10)), 5.0, 0.6)];
        let panel = monthly_panel(&reign, &scored, 2018);
        let view = static_map_view(&panel, 9);
        let countries: Vec<(&str, u32)> = view.iter().map(|r| (r.country.as_str(), r.period.month)).collect();
        // Peru has no election and no September row, so it drops out
        assert_eq!(countries, vec![("Chad", 10), ("Mali", 9)]);
    }

    #[test]
    fn month_view_filters_single_month() {
        let reign = vec![regime("Chad", 2018, 9), regime("Chad", 2018, 10)];
        let panel = monthly_panel(&reign, &[], 2018);
        let view = month_view(&panel, 10);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].period, Period::new(2018, 10));
    }

    #[test]
    fn empty_inputs_give_empty_views() {
        assert!(country_view(&[], &[]).is_empty());
        assert!(upcoming_election_view(&[], &[]).is_empty());
        assert!(monthly_panel(&[], &[], 2018).is_empty());
        assert!(static_map_view(&[], 9).is_empty());
    }
}
