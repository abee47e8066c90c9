// Risk pipeline: ingestion, processing (normalize, fusion, scoring) and output

pub mod ingestion;
pub mod processing;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::app::ports::{ArtifactOutputPort, SourceFetcherPort};
use crate::config::Config;
use crate::constants;
use crate::error::Result;
use crate::types::{ElvisTable, ScoredRecord};
use processing::fusion;
use processing::normalize::{month_ahead, CountryCanonicalizer, UnmappedReport};
use processing::output::{self, WrittenArtifact};
use processing::scoring::{RiskScorer, ScoringReport};

/// Values fixed once per invocation and shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Processing date; "upcoming" means strictly after this.
    pub now: NaiveDate,
    pub run_id: Uuid,
}

impl RunContext {
    pub fn new(now: NaiveDate) -> Self {
        Self {
            now,
            run_id: Uuid::new_v4(),
        }
    }
}

/// Which rows of the monthly panel the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapView {
    /// One row per country: a month with an election, else the configured month.
    Static,
    /// A single month, `months_ahead` after the current month.
    Monthly { months_ahead: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRunResult {
    pub run_id: String,
    pub as_of: NaiveDate,
    pub elvis_rows: usize,
    pub registry_rows: usize,
    pub upcoming_elections: usize,
    pub countries: usize,
    pub scoring: ScoringReport,
    pub unmapped: Vec<UnmappedReport>,
    pub artifacts: Vec<WrittenArtifact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartRunResult {
    pub run_id: String,
    pub as_of: NaiveDate,
    pub published_rows: usize,
    pub bars: usize,
    pub artifacts: Vec<WrittenArtifact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapRunResult {
    pub run_id: String,
    pub as_of: NaiveDate,
    pub view: MapView,
    pub year: i32,
    /// Calendar month shown by a monthly view.
    pub month: Option<u32>,
    pub panel_rows: usize,
    pub view_rows: usize,
    pub features: usize,
    pub scoring: ScoringReport,
    pub unmapped: Vec<UnmappedReport>,
    pub artifacts: Vec<WrittenArtifact>,
}

/// Runs one subcommand end to end against the given ports.
///
/// Every source is fetched and parsed before anything is written, so a
/// failure before the write step leaves no output behind.
/// Artifacts are then written one at a time: if a later write fails, the
/// earlier artifacts of that run stay in place and the run returns
/// [`RiskError::Output`](crate::error::RiskError::Output).
pub struct Pipeline<'a> {
    config: &'a Config,
    fetcher: &'a dyn SourceFetcherPort,
    output: &'a dyn ArtifactOutputPort,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn SourceFetcherPort,
        output: &'a dyn ArtifactOutputPort,
    ) -> Self {
        Self {
            config,
            fetcher,
            output,
        }
    }

    fn fetch(&self, source_name: &str, location: &str) -> Result<Vec<u8>> {
        ingestion::fetch_source(self.fetcher, source_name, location)
    }

    fn canonicalizer<'n, I>(&self, vocabulary: I) -> CountryCanonicalizer
    where
        I: IntoIterator<Item = &'n str>,
    {
        CountryCanonicalizer::new(vocabulary).with_aliases(&self.config.countries.aliases)
    }

    fn score(&self, elvis: &ElvisTable) -> Result<(Vec<ScoredRecord>, ScoringReport)> {
        let outcome = RiskScorer::new(&self.config.model).score_table(elvis)?;
        info!(
            "🎯 Scored {} ELVIS rows (trained on {}, {} Newton iterations)",
            outcome.report.total_rows, outcome.report.training_rows, outcome.report.iterations
        );
        Ok((outcome.scored, outcome.report))
    }

    /// Score ELVIS and publish the country and upcoming-election tables.
    pub fn run_score(&self, ctx: &RunContext) -> Result<ScoreRunResult> {
        let span = info_span!("score_run", run_id = %ctx.run_id, as_of = %ctx.now);
        let _enter = span.enter();
        info!("🚀 Starting score run as of {}", ctx.now);

        let sources = &self.config.sources;
        let elvis_bytes = self.fetch(constants::ELVIS_SOURCE, &sources.elvis)?;
        let registry_bytes = self.fetch(constants::ELECTION_DATES_SOURCE, &sources.election_dates)?;
        let mut elvis = ingestion::parse_elvis(&elvis_bytes)?;
        let mut registry = ingestion::parse_election_dates(&registry_bytes)?;

        let canonicalizer = self.canonicalizer(elvis.records.iter().map(|r| r.country.as_str()));
        let unmapped = vec![
            canonicalizer.canonicalize_in_place(
                constants::ELVIS_SOURCE,
                elvis.records.iter_mut().map(|r| &mut r.country),
            ),
            canonicalizer.canonicalize_in_place(
                constants::ELECTION_DATES_SOURCE,
                registry.iter_mut().map(|e| &mut e.country),
            ),
        ];

        let (scored, scoring) = self.score(&elvis)?;
        let latest = fusion::latest_per_country(&scored);
        let schedule = fusion::upcoming_schedule(&registry, ctx.now);
        let next = fusion::next_election_per_country(&schedule);
        let countries = fusion::country_view(&latest, &next);
        let upcoming = fusion::upcoming_election_view(&schedule, &countries);

        let upcoming_bytes = output::upcoming_csv(&upcoming)?;
        let country_bytes = output::country_csv(&countries)?;
        let artifacts = vec![
            output::write_artifact(self.output, constants::UPCOMING_OUTPUT_FILE, &upcoming_bytes)?,
            output::write_artifact(self.output, constants::COUNTRY_OUTPUT_FILE, &country_bytes)?,
        ];

        info!(
            "✅ Score run complete: {} countries, {} upcoming elections",
            countries.len(),
            upcoming.len()
        );
        Ok(ScoreRunResult {
            run_id: ctx.run_id.to_string(),
            as_of: ctx.now,
            elvis_rows: elvis.records.len(),
            registry_rows: registry.len(),
            upcoming_elections: upcoming.len(),
            countries: countries.len(),
            scoring,
            unmapped,
            artifacts,
        })
    }

    /// Build the bar-chart feed from a published upcoming-election table.
    pub fn run_upcoming_chart(&self, ctx: &RunContext) -> Result<ChartRunResult> {
        let span = info_span!("chart_run", run_id = %ctx.run_id, as_of = %ctx.now);
        let _enter = span.enter();

        let bytes = self.fetch(constants::UPCOMING_SOURCE, &self.config.sources.upcoming)?;
        let published = ingestion::parse_published_upcoming(&bytes)?;
        let bars = output::chart_rows(&published, ctx.now);
        let chart = output::chart_json(&bars)?;
        let artifacts = vec![output::write_artifact(
            self.output,
            constants::CHART_OUTPUT_FILE,
            &chart,
        )?];

        info!("✅ Chart feed complete: {} of {} rows upcoming", bars.len(), published.len());
        Ok(ChartRunResult {
            run_id: ctx.run_id.to_string(),
            as_of: ctx.now,
            published_rows: published.len(),
            bars: bars.len(),
            artifacts,
        })
    }

    /// Join REIGN with scored ELVIS, pick the display rows and attach them to
    /// the world boundaries.
    pub fn run_map(&self, ctx: &RunContext, view: MapView) -> Result<MapRunResult> {
        let span = info_span!("map_run", run_id = %ctx.run_id, as_of = %ctx.now, view = ?view);
        let _enter = span.enter();

        let sources = &self.config.sources;
        let reign_bytes = self.fetch(constants::REIGN_SOURCE, &sources.reign)?;
        let elvis_bytes = self.fetch(constants::ELVIS_SOURCE, &sources.elvis)?;
        let boundary_bytes = self.fetch(constants::BOUNDARIES_SOURCE, &sources.boundaries)?;
        let mut reign = ingestion::parse_reign(&reign_bytes)?;
        let mut elvis = ingestion::parse_elvis(&elvis_bytes)?;
        let mut boundaries = ingestion::parse_boundaries(&boundary_bytes)?;

        // REIGN is the driving table, so its names are the vocabulary
        let canonicalizer = self.canonicalizer(reign.iter().map(|r| r.country.as_str()));
        let unmapped = vec![
            canonicalizer.canonicalize_in_place(
                constants::REIGN_SOURCE,
                reign.iter_mut().map(|r| &mut r.country),
            ),
            canonicalizer.canonicalize_in_place(
                constants::ELVIS_SOURCE,
                elvis.records.iter_mut().map(|r| &mut r.country),
            ),
            canonicalizer.canonicalize_in_place(
                constants::BOUNDARIES_SOURCE,
                boundaries.iter_mut().map(|b| &mut b.country),
            ),
        ];

        let (scored, scoring) = self.score(&elvis)?;
        let year = self.config.map.year;
        let panel = fusion::monthly_panel(&reign, &scored, year);
        let (rows, month) = match view {
            MapView::Static => (fusion::static_map_view(&panel, self.config.map.static_month), None),
            MapView::Monthly { months_ahead } => {
                let month = month_ahead(ctx.now.month(), months_ahead);
                (fusion::month_view(&panel, month), Some(month))
            }
        };

        let collection = output::map_features(&boundaries, &rows);
        let geojson = output::map_geojson(&collection)?;
        let artifacts = vec![output::write_artifact(
            self.output,
            constants::MAP_OUTPUT_FILE,
            &geojson,
        )?];

        info!(
            "✅ Map complete: {} features from {} view rows ({} panel rows in {})",
            collection.features.len(),
            rows.len(),
            panel.len(),
            year
        );
        Ok(MapRunResult {
            run_id: ctx.run_id.to_string(),
            as_of: ctx.now,
            view,
            year,
            month,
            panel_rows: panel.len(),
            view_rows: rows.len(),
            features: collection.features.len(),
            scoring,
            unmapped,
            artifacts,
        })
    }
}
