use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info};

use election_risk::config::Config;
use election_risk::infra::file_output_adapter::FileOutputAdapter;
use election_risk::infra::http_client::ReqwestFetcher;
use election_risk::observability::init_logging;
use election_risk::pipeline::processing::normalize::UnmappedReport;
use election_risk::pipeline::processing::output::WrittenArtifact;
use election_risk::{MapView, Pipeline, RunContext};

#[derive(Parser)]
#[command(name = "election_risk")]
#[command(about = "Election violence risk scoring and dashboard feeds")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (falls back to RISK_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Processing date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Directory for output artifacts; overrides [output] dir
    #[arg(long, global = true)]
    output_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the risk model, score ELVIS and publish the upcoming-election table
    Score,
    /// Build the bar-chart feed from the published upcoming-election table
    Upcoming,
    /// Build the choropleth GeoJSON
    Map {
        #[arg(long, value_enum, default_value_t = ViewArg::Static)]
        view: ViewArg,
        /// Months after the current month to show (monthly view)
        #[arg(long, default_value_t = 1)]
        months_ahead: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Static,
    Monthly,
}

fn print_artifacts(artifacts: &[WrittenArtifact]) {
    for artifact in artifacts {
        println!("   Output file: {} ({} bytes)", artifact.path.display(), artifact.bytes);
        println!("   sha256: {}", artifact.sha256);
    }
}

fn print_unmapped(reports: &[UnmappedReport]) {
    for report in reports.iter().filter(|r| !r.is_empty()) {
        println!("\n⚠️  Unmapped country names in {}:", report.source);
        for name in &report.names {
            println!("   - {}", name);
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    // Captured once; every stage compares against this date
    let now = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let ctx = RunContext::new(now);

    let config_path = cli
        .config
        .or_else(|| std::env::var("RISK_CONFIG").ok().map(PathBuf::from));
    let mut config = Config::load(config_path.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    info!(run_id = %ctx.run_id, as_of = %now, "Configuration loaded");

    let fetcher = ReqwestFetcher::new(&config.http).context("failed to build HTTP client")?;
    let output = FileOutputAdapter::new(config.output.dir.clone());
    let pipeline = Pipeline::new(&config, &fetcher, &output);

    match cli.command {
        Commands::Score => {
            println!("🔄 Running score pipeline as of {}...", now);
            let result = pipeline.run_score(&ctx).map_err(|e| {
                error!("Score run failed: {}", e);
                e
            })?;
            println!("\n📊 Score Results:");
            println!("   ELVIS rows scored: {}", result.scoring.total_rows);
            println!("   Training rows: {}", result.scoring.training_rows);
            println!("   Converged: {}", result.scoring.converged);
            println!("   Countries: {}", result.countries);
            println!("   Upcoming elections: {}", result.upcoming_elections);
            print_artifacts(&result.artifacts);
            print_unmapped(&result.unmapped);
        }
        Commands::Upcoming => {
            println!("📊 Building upcoming-election chart feed as of {}...", now);
            let result = pipeline.run_upcoming_chart(&ctx).map_err(|e| {
                error!("Chart run failed: {}", e);
                e
            })?;
            println!("\n📊 Chart Results:");
            println!("   Published rows: {}", result.published_rows);
            println!("   Upcoming bars: {}", result.bars);
            print_artifacts(&result.artifacts);
        }
        Commands::Map { view, months_ahead } => {
            let view = match view {
                ViewArg::Static => MapView::Static,
                ViewArg::Monthly => MapView::Monthly { months_ahead },
            };
            println!("🗺️  Building risk map ({:?}) as of {}...", view, now);
            let result = pipeline.run_map(&ctx, view).map_err(|e| {
                error!("Map run failed: {}", e);
                e
            })?;
            println!("\n📊 Map Results:");
            println!("   Year: {}", result.year);
            if let Some(month) = result.month {
                println!("   Month: {}", month);
            }
            println!("   Panel rows: {}", result.panel_rows);
            println!("   View rows: {}", result.view_rows);
            println!("   Features: {}", result.features);
            print_artifacts(&result.artifacts);
            print_unmapped(&result.unmapped);
        }
    }

    println!("✅ Done");
    Ok(())
}
