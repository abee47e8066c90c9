use nalgebra::{DMatrix, DVector};

use crate::constants::COL_OUTCOME;
use crate::error::{Result, RiskError};
use crate::types::{Covariate, ElvisRecord, ElvisTable};

/// Check that every row can be scored.
///
/// Fails when a covariate (or the outcome) column is absent or has no numeric
/// value at all, then when any row has a covariate gap, naming the columns
/// and the source rows involved. Outcomes are only needed on training rows
/// and are checked by [`validate_labels`].
pub fn validate(table: &ElvisTable) -> Result<()> {
    if !table.missing_columns.is_empty() {
        return Err(RiskError::ScoringPrecondition {
            message: "required columns are absent".to_string(),
            columns: table.missing_columns.clone(),
            rows: Vec::new(),
        });
    }

    let records = &table.records;
    let mut non_numeric: Vec<String> = Covariate::ALL
        .iter()
        .filter(|c| records.iter().all(|r| r.covariates.get(**c).is_none()))
        .map(|c| c.column().to_string())
        .collect();
    if records.iter().all(|r| r.outcome.is_none()) {
        non_numeric.push(COL_OUTCOME.to_string());
    }
    if !non_numeric.is_empty() {
        return Err(RiskError::ScoringPrecondition {
            message: "columns contain no numeric values".to_string(),
            columns: non_numeric,
            rows: Vec::new(),
        });
    }

    let mut gap_columns: Vec<String> = Vec::new();
    let mut gap_rows: Vec<usize> = Vec::new();
    for record in records {
        let mut row_has_gap = false;
        for c in Covariate::ALL {
            if record.covariates.get(c).is_none() {
                row_has_gap = true;
                push_unique(&mut gap_columns, c.column());
            }
        }
        if row_has_gap {
            gap_rows.push(record.row);
        }
    }
    if !gap_rows.is_empty() {
        return Err(RiskError::ScoringPrecondition {
            message: "rows have missing or non-numeric covariates".to_string(),
            columns: gap_columns,
            rows: gap_rows,
        });
    }
    Ok(())
}

/// Every training row needs an outcome in [0, 1].
pub fn validate_labels(train: &[ElvisRecord]) -> Result<()> {
    let bad_rows: Vec<usize> = train
        .iter()
        .filter(|r| !matches!(r.outcome, Some(y) if (0.0..=1.0).contains(&y)))
        .map(|r| r.row)
        .collect();
    if !bad_rows.is_empty() {
        return Err(RiskError::ScoringPrecondition {
            message: "training rows need an outcome in [0, 1]".to_string(),
            columns: vec![COL_OUTCOME.to_string()],
            rows: bad_rows,
        });
    }
    Ok(())
}

fn push_unique(columns: &mut Vec<String>, column: &str) {
    if !columns.iter().any(|c| c == column) {
        columns.push(column.to_string());
    }
}

/// n x 13 covariate matrix in model column order. Rows must be complete.
pub fn design_matrix(records: &[ElvisRecord]) -> Result<DMatrix<f64>> {
    let mut x = DMatrix::zeros(records.len(), Covariate::COUNT);
    for (i, record) in records.iter().enumerate() {
        let values = record.covariates.complete().ok_or_else(|| RiskError::ScoringPrecondition {
            message: "row has missing covariates".to_string(),
            columns: Vec::new(),
            rows: vec![record.row],
        })?;
        for (j, v) in values.iter().enumerate() {
            x[(i, j)] = *v;
        }
    }
    Ok(x)
}

pub fn outcome_vector(records: &[ElvisRecord]) -> Result<DVector<f64>> {
    let mut y = DVector::zeros(records.len());
    for (i, record) in records.iter().enumerate() {
        y[i] = record.outcome.ok_or_else(|| RiskError::ScoringPrecondition {
            message: "row has no outcome".to_string(),
            columns: vec![COL_OUTCOME.to_string()],
            rows: vec![record.row],
        })?;
    }
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Covariates;

    fn record(row: usize, values: [Option<f64>; Covariate::COUNT], outcome: Option<f64>) -> ElvisRecord {
        ElvisRecord {
            row,
            country: "Chad".to_string(),
            date: None,
            period: None,
            outcome,
            covariates: Covariates::new(values),
        }
    }

    #[test]
    fn complete_table_passes() {
        let table = ElvisTable {
            records: vec![record(1, [Some(1.0); 13], Some(0.0)), record(2, [Some(2.0); 13], Some(1.0))],
            missing_columns: Vec::new(),
        };
        assert!(validate(&table).is_ok());
        let x = design_matrix(&table.records).unwrap();
        assert_eq!(x.shape(), (2, 13));
        assert_eq!(x[(1, 12)], 2.0);
        assert_eq!(outcome_vector(&table.records).unwrap()[1], 1.0);
    }

    #[test]
    fn absent_columns_fail_loudly() {
        let table = ElvisTable {
            records: vec![record(1, [Some(1.0); 13], Some(0.0))],
            missing_columns: vec!["SPI".to_string()],
        };
        match validate(&table).unwrap_err() {
            RiskError::ScoringPrecondition { columns, .. } => assert_eq!(columns, vec!["SPI"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn entirely_non_numeric_column_fails() {
        let mut values = [Some(1.0); 13];
        values[Covariate::Growth.index()] = None;
        let table = ElvisTable {
            records: vec![record(1, values, Some(0.0)), record(2, values, Some(1.0))],
            missing_columns: Vec::new(),
        };
        match validate(&table).unwrap_err() {
            RiskError::ScoringPrecondition { columns, rows, .. } => {
                assert_eq!(columns, vec!["growth"]);
                assert!(rows.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_gaps_name_rows() {
        let mut gappy = [Some(1.0); 13];
        gappy[Covariate::Polity.index()] = None;
        let table = ElvisTable {
            records: vec![
                record(1, [Some(1.0); 13], Some(0.0)),
                record(2, gappy, Some(1.0)),
                record(3, gappy, None),
            ],
            missing_columns: Vec::new(),
        };
        match validate(&table).unwrap_err() {
            RiskError::ScoringPrecondition { columns, rows, .. } => {
                assert_eq!(columns, vec!["lpolity2"]);
                assert_eq!(rows, vec![2, 3]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unlabelled_rows_still_validate_for_scoring() {
        let table = ElvisTable {
            records: vec![
                record(1, [Some(1.0); 13], Some(0.0)),
                record(2, [Some(2.0); 13], Some(1.0)),
                record(3, [Some(3.0); 13], None),
            ],
            missing_columns: Vec::new(),
        };
        assert!(validate(&table).is_ok());
    }

    #[test]
    fn training_labels_must_lie_in_unit_interval() {
        let train = vec![
            record(1, [Some(1.0); 13], Some(0.0)),
            record(4, [Some(1.0); 13], None),
            record(7, [Some(1.0); 13], Some(2.0)),
        ];
        match validate_labels(&train).unwrap_err() {
            RiskError::ScoringPrecondition { columns, rows, .. } => {
                assert_eq!(columns, vec!["l.elecViolence2"]);
                assert_eq!(rows, vec![4, 7]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
