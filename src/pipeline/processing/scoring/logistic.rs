//! L2-regularized logistic regression fitted by damped Newton iterations.
//!
//! Objective: `0.5 * ||w||^2 + C * sum(logloss)` with an unpenalized
//! intercept. Features are standardized with the training mean and standard
//! deviation before fitting; the same transform is applied at prediction.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{Result, RiskError};

/// Diagonal jitter that keeps the Newton system solvable when a column is
/// constant in the training rows.
const HESSIAN_JITTER: f64 = 1e-10;
const MIN_STEP: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
pub struct LogisticConfig {
    pub c: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

/// Anything that turns a feature matrix into per-row probabilities.
pub trait RiskModel {
    fn predict_proba(&self, x: &DMatrix<f64>) -> DVector<f64>;
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    mean: DVector<f64>,
    scale: DVector<f64>,
    /// Intercept first, then one weight per standardized feature.
    beta: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticModel {
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>, config: &LogisticConfig) -> Result<Self> {
        let (n, p) = x.shape();
        if n == 0 {
            return Err(RiskError::DegenerateTraining("no training rows".to_string()));
        }
        if y.len() != n {
            return Err(RiskError::DegenerateTraining(format!(
                "{} outcomes for {} rows",
                y.len(),
                n
            )));
        }
        let first = y[0];
        if y.iter().all(|v| *v == first) {
            return Err(RiskError::DegenerateTraining(format!(
                "every training outcome equals {first}; need both classes"
            )));
        }

        let (mean, scale) = standardization(x);
        let z = augmented(x, &mean, &scale);
        let inv_c = 1.0 / config.c;

        let mut beta = DVector::zeros(p + 1);
        let mut loss = objective(&z, y, &beta, inv_c);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iterations {
            iterations += 1;
            let probs = sigmoid_vec(&(&z * &beta));

            let mut grad = z.transpose() * (&probs - y);
            let weights = probs.map(|q| q * (1.0 - q));
            let weighted = DMatrix::from_fn(z.nrows(), p + 1, |i, j| z[(i, j)] * weights[i]);
            let mut hessian = z.transpose() * weighted;
            for j in 0..=p {
                if j > 0 {
                    grad[j] += inv_c * beta[j];
                    hessian[(j, j)] += inv_c;
                }
                hessian[(j, j)] += HESSIAN_JITTER;
            }

            let direction = match hessian.clone().cholesky() {
                Some(chol) => chol.solve(&grad),
                None => hessian.lu().solve(&grad).ok_or_else(|| {
                    RiskError::DegenerateTraining("Newton system is singular".to_string())
                })?,
            };

            // Step halving until the objective stops increasing
            let mut step = 1.0;
            let mut candidate = &beta - &direction * step;
            let mut candidate_loss = objective(&z, y, &candidate, inv_c);
            while candidate_loss > loss && step > MIN_STEP {
                step *= 0.5;
                candidate = &beta - &direction * step;
                candidate_loss = objective(&z, y, &candidate, inv_c);
            }

            let moved = (&direction * step).amax();
            let improvement = loss - candidate_loss;
            beta = candidate;
            loss = candidate_loss;
            debug!(iteration = iterations, loss, step, moved, "newton step");

            if moved < config.tolerance || improvement.abs() < config.tolerance * (1.0 + loss.abs()) {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "Logistic fit stopped after {} iterations without meeting tolerance {}",
                iterations, config.tolerance
            );
        }

        Ok(Self {
            mean,
            scale,
            beta,
            iterations,
            converged,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.beta[0]
    }

    /// Weights on the raw (unstandardized) feature scale.
    pub fn coefficients(&self) -> DVector<f64> {
        let p = self.mean.len();
        DVector::from_fn(p, |j, _| self.beta[j + 1] / self.scale[j])
    }
}

impl RiskModel for LogisticModel {
    fn predict_proba(&self, x: &DMatrix<f64>) -> DVector<f64> {
        let z = augmented(x, &self.mean, &self.scale);
        sigmoid_vec(&(z * &self.beta))
    }
}

/// Column means and (population) standard deviations; constant columns get 1.
fn standardization(x: &DMatrix<f64>) -> (DVector<f64>, DVector<f64>) {
    let (n, p) = x.shape();
    let mut mean = DVector::zeros(p);
    let mut scale = DVector::from_element(p, 1.0);
    for j in 0..p {
        let column = x.column(j);
        let m = column.sum() / n as f64;
        let var = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64;
        mean[j] = m;
        if var > 0.0 {
            scale[j] = var.sqrt();
        }
    }
    (mean, scale)
}

/// `[1 | (x - mean) / scale]`
fn augmented(x: &DMatrix<f64>, mean: &DVector<f64>, scale: &DVector<f64>) -> DMatrix<f64> {
    let (n, p) = x.shape();
    DMatrix::from_fn(n, p + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            (x[(i, j - 1)] - mean[j - 1]) / scale[j - 1]
        }
    })
}

fn objective(z: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>, inv_c: f64) -> f64 {
    let eta = z * beta;
    let data: f64 = eta
        .iter()
        .zip(y.iter())
        .map(|(e, t)| softplus(*e) - t * e)
        .sum();
    let penalty: f64 = beta.iter().skip(1).map(|w| w * w).sum();
    data + 0.5 * inv_c * penalty
}

fn softplus(v: f64) -> f64 {
    if v > 0.0 {
        v + (-v).exp().ln_1p()
    } else {
        v.exp().ln_1p()
    }
}

fn sigmoid(v: f64) -> f64 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

fn sigmoid_vec(eta: &DVector<f64>) -> DVector<f64> {
    eta.map(sigmoid)
}
