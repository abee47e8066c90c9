//! Risk scorer: fit on a seeded subsample of ELVIS, then score every row.

pub mod features;
pub mod logistic;
pub mod split;

pub use logistic::{LogisticConfig, LogisticModel, RiskModel};

use serde::Serialize;
use tracing::info;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::observability::metrics;
use crate::types::{ElvisRecord, ElvisTable, ScoredRecord};

/// What the fit looked like, for the run summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoringReport {
    pub total_rows: usize,
    pub training_rows: usize,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub scored: Vec<ScoredRecord>,
    pub report: ScoringReport,
}

pub struct RiskScorer {
    config: ModelConfig,
}

impl RiskScorer {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn logistic_config(&self) -> LogisticConfig {
        LogisticConfig {
            c: self.config.regularization_c,
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
        }
    }

    /// Fit on the seeded training split of `table`.
    pub fn fit(&self, table: &ElvisTable) -> Result<LogisticModel> {
        features::validate(table)?;
        let train_idx = split::train_indices(
            table.records.len(),
            self.config.test_size,
            self.config.seed,
        );
        let train: Vec<ElvisRecord> = train_idx
            .iter()
            .map(|i| table.records[*i].clone())
            .collect();
        features::validate_labels(&train)?;
        metrics::scoring::training_rows(train.len());
        info!(
            "Fitting logistic model on {} of {} rows (seed {}, C = {})",
            train.len(),
            table.records.len(),
            self.config.seed,
            self.config.regularization_c
        );

        let x = features::design_matrix(&train)?;
        let y = features::outcome_vector(&train)?;
        let model = LogisticModel::fit(&x, &y, &self.logistic_config())?;
        metrics::scoring::iterations(model.iterations);
        Ok(model)
    }

    /// Fit, then apply the model to every row of the table (not only the
    /// held-out rows). An empty table scores to an empty result.
    pub fn score_table(&self, table: &ElvisTable) -> Result<ScoringOutcome> {
        if table.records.is_empty() {
            info!("ELVIS table is empty; nothing to score");
            return Ok(ScoringOutcome {
                scored: Vec::new(),
                report: ScoringReport {
                    total_rows: 0,
                    training_rows: 0,
                    iterations: 0,
                    converged: false,
                },
            });
        }

        let model = self.fit(table)?;
        let scored = score_records(&model, &table.records)?;
        metrics::scoring::rows_scored(scored.len());

        let training_rows = split::train_size(table.records.len(), self.config.test_size);
        Ok(ScoringOutcome {
            scored,
            report: ScoringReport {
                total_rows: table.records.len(),
                training_rows,
                iterations: model.iterations,
                converged: model.converged,
            },
        })
    }
}

/// Attach `model`'s probability to each record.
pub fn score_records(model: &dyn RiskModel, records: &[ElvisRecord]) -> Result<Vec<ScoredRecord>> {
    let x = features::design_matrix(records)?;
    let probs = model.predict_proba(&x);
    Ok(records
        .iter()
        .zip(probs.iter())
        .map(|(record, p)| ScoredRecord {
            record: record.clone(),
            pred_vio: *p,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use crate::types::{Covariate, Covariates};

    /// Deterministic synthetic panel: risk rises with political violence,
    /// falls with polity, with label noise so classes overlap.
    fn panel(n: usize) -> ElvisTable {
        let records = (0..n)
            .map(|i| {
                let mut values = [Some(0.0); Covariate::COUNT];
                for (j, v) in values.iter_mut().enumerate() {
                    *v = Some(((i * (j + 3)) % 17) as f64 / 4.0);
                }
                let violence = (i % 5) as f64;
                let polity = ((i * 7) % 11) as f64 - 5.0;
                values[Covariate::PoliticalViolence.index()] = Some(violence);
                values[Covariate::Polity.index()] = Some(polity);
                let signal = violence - 0.3 * polity;
                let outcome = if (signal + ((i * 13) % 7) as f64 - 3.0) > 2.0 { 1.0 } else { 0.0 };
                ElvisRecord {
                    row: i + 1,
                    country: format!("C{}", i % 20),
                    date: None,
                    period: None,
                    outcome: Some(outcome),
                    covariates: Covariates::new(values),
                }
            })
            .collect();
        ElvisTable {
            records,
            missing_columns: Vec::new(),
        }
    }

    fn model_config() -> ModelConfig {
        ModelConfig {
            test_size: 0.5,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn scores_every_row_strictly_inside_unit_interval() {
        let table = panel(400);
        let outcome = RiskScorer::new(&model_config()).score_table(&table).unwrap();
        assert_eq!(outcome.scored.len(), 400);
        assert_eq!(outcome.report.training_rows, 200);
        for s in &outcome.scored {
            assert!(s.pred_vio > 0.0 && s.pred_vio < 1.0, "row {} scored {}", s.record.row, s.pred_vio);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let table = panel(300);
        let scorer = RiskScorer::new(&model_config());
        let a = scorer.score_table(&table).unwrap();
        let b = scorer.score_table(&table).unwrap();
        let pa: Vec<f64> = a.scored.iter().map(|s| s.pred_vio).collect();
        let pb: Vec<f64> = b.scored.iter().map(|s| s.pred_vio).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn empty_table_scores_to_empty() {
        let outcome = RiskScorer::new(&ModelConfig::default())
            .score_table(&ElvisTable::default())
            .unwrap();
        assert!(outcome.scored.is_empty());
    }

    #[test]
    fn unlabelled_held_out_row_is_still_scored() {
        let mut table = panel(41);
        let train = split::train_indices(41, 0.5, model_config().seed);
        let held_out = (0..41).rev().find(|i| !train.contains(i)).unwrap();
        table.records[held_out].country = "Chad".to_string();
        table.records[held_out].outcome = None;

        let outcome = RiskScorer::new(&model_config()).score_table(&table).unwrap();
        assert_eq!(outcome.scored.len(), 41);
        let chad = &outcome.scored[held_out];
        assert_eq!(chad.record.outcome, None);
        assert!(chad.pred_vio > 0.0 && chad.pred_vio < 1.0);
    }

    #[test]
    fn unlabelled_training_row_fails_naming_it() {
        let mut table = panel(41);
        let first_train = split::train_indices(41, 0.5, model_config().seed)[0];
        table.records[first_train].outcome = None;

        match RiskScorer::new(&model_config()).score_table(&table).unwrap_err() {
            RiskError::ScoringPrecondition { columns, rows, .. } => {
                assert_eq!(columns, vec!["l.elecViolence2"]);
                assert_eq!(rows, vec![first_train + 1]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_covariate_column_fails_loudly() {
        let mut table = panel(50);
        table.missing_columns.push("SPI".to_string());
        let err = RiskScorer::new(&model_config()).score_table(&table).unwrap_err();
        assert!(matches!(err, RiskError::ScoringPrecondition { .. }));
        assert!(err.to_string().contains("SPI"));
    }
}
