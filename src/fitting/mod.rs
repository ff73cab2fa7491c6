// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fitting a single Gaussian line profile to a spectrum.
//!
//! The fit is a Levenberg-Marquardt minimisation of the sum of squared
//! residuals, with an analytic Jacobian. There are only three parameters, so
//! the normal equations are a 3x3 system and are solved directly.


use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};
use ndarray::prelude::*;
use thiserror::Error;

/// Give up after this many accepted or rejected iterations.
const MAX_ITERATIONS: usize = 200;

/// Stop when the relative decrease in the sum of squared residuals is smaller
/// than this.
const SSR_TOLERANCE: f64 = 1e-10;

/// Stop when the relative size of a parameter step is smaller than this.
const STEP_TOLERANCE: f64 = 1e-10;

const INITIAL_DAMPING: f64 = 1e-3;
const MAX_DAMPING: f64 = 1e16;
const MIN_DAMPING: f64 = 1e-15;

/// `a * exp(-(x - x0)^2 / (2 sigma^2))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    pub amplitude: f64,
    pub centre: f64,
    pub sigma: f64,
}

impl Gaussian {
    pub fn evaluate(&self, x: f64) -> f64 {
        let dx = x - self.centre;
        self.amplitude * (-dx * dx / (2.0 * self.sigma * self.sigma)).exp()
    }

    /// The partial derivatives of [`Gaussian::evaluate`] with respect to
    /// (amplitude, centre, sigma).
    fn gradient(&self, x: f64) -> Vector3<f64> {
        let dx = x - self.centre;
        let s2 = self.sigma * self.sigma;
        let e = (-dx * dx / (2.0 * s2)).exp();
        Vector3::new(
            e,
            self.amplitude * e * dx / s2,
            self.amplitude * e * dx * dx / (s2 * self.sigma),
        )
    }

    fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.centre.is_finite() && self.sigma.is_finite()
    }

    fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.amplitude, self.centre, self.sigma)
    }

    fn from_vector(v: &Vector3<f64>) -> Gaussian {
        Gaussian {
            amplitude: v[0],
            centre: v[1],
            sigma: v[2],
        }
    }
}

/// The intensity-weighted mean and standard deviation of `x`, i.e. the first
/// moment and the square root of the second central moment of `y`. A spectrum
/// with no total intensity doesn't have these, and neither does one whose
/// "variance" is negative.
pub fn moments(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Result<(f64, f64), FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let total = y.sum();
    if total == 0.0 || !total.is_finite() {
        return Err(FitError::DegenerateSpectrum { total });
    }
    let mean = x.iter().zip(y.iter()).map(|(x, y)| x * y).sum::<f64>() / total;
    let variance = x
        .iter()
        .zip(y.iter())
        .map(|(x, y)| (x - mean).powi(2) * y)
        .sum::<f64>()
        / total;
    let sigma = variance.sqrt();
    if !mean.is_finite() || !sigma.is_finite() {
        return Err(FitError::DegenerateSpectrum { total });
    }
    Ok((mean, sigma))
}

/// The result of [`fit_gaussian`].
#[derive(Debug, Clone)]
pub struct GaussianFit {
    pub params: Gaussian,

    /// The estimated covariance of (amplitude, centre, sigma), scaled by the
    /// reduced chi-squared. `None` if the normal matrix at the solution
    /// couldn't be inverted.
    pub covariance: Option<Matrix3<f64>>,

    /// The sum of squared residuals at the solution.
    pub ssr: f64,

    pub iterations: usize,
}

impl GaussianFit {
    /// One-standard-deviation uncertainties on (amplitude, centre, sigma).
    pub fn uncertainties(&self) -> Option<[f64; 3]> {
        self.covariance
            .map(|c| [c[(0, 0)].sqrt(), c[(1, 1)].sqrt(), c[(2, 2)].sqrt()])
    }
}

fn sum_of_squared_residuals(g: &Gaussian, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&x, &y)| (y - g.evaluate(x)).powi(2))
        .sum()
}

/// `(J^T J, J^T r)`, where `J` is the Jacobian of the model and `r` the
/// residuals `y - model`.
fn normal_equations(
    g: &Gaussian,
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
) -> (Matrix3<f64>, Vector3<f64>) {
    let mut jtj = Matrix3::zeros();
    let mut jtr = Vector3::zeros();
    for (&x, &y) in x.iter().zip(y.iter()) {
        let grad = g.gradient(x);
        let r = y - g.evaluate(x);
        jtj += grad * grad.transpose();
        jtr += grad * r;
    }
    (jtj, jtr)
}

/// Fit a Gaussian to `(x, y)` starting from `initial`.
pub fn fit_gaussian(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    initial: Gaussian,
) -> Result<GaussianFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 3 {
        return Err(FitError::TooFewPoints(x.len()));
    }
    if !initial.is_finite() || initial.sigma == 0.0 {
        return Err(FitError::BadInitialGuess(initial));
    }
    debug!("Fitting a Gaussian to {} points, starting from {initial:?}", x.len());

    let mut params = initial;
    let mut ssr = sum_of_squared_residuals(&params, x, y);
    let mut damping = INITIAL_DAMPING;
    let mut converged = ssr == 0.0;
    let mut iterations = 0;

    while !converged {
        if iterations == MAX_ITERATIONS {
            return Err(FitError::NoConvergence { iterations });
        }
        iterations += 1;

        let (jtj, jtr) = normal_equations(&params, x, y);
        let mut augmented = jtj;
        for i in 0..3 {
            augmented[(i, i)] += damping * jtj[(i, i)].max(f64::MIN_POSITIVE);
        }

        let step = match augmented.lu().solve(&jtr) {
            Some(s) if s.iter().all(|v| v.is_finite()) => s,
            _ => {
                damping *= 10.0;
                if damping > MAX_DAMPING {
                    return Err(FitError::Singular);
                }
                continue;
            }
        };

        let p = params.to_vector();
        let candidate = Gaussian::from_vector(&(p + step));
        let candidate_ssr = sum_of_squared_residuals(&candidate, x, y);
        trace!("iteration {iterations}: damping {damping:e}, ssr {ssr:e} -> {candidate_ssr:e}");

        if candidate_ssr.is_finite() && candidate_ssr <= ssr {
            let decrease = ssr - candidate_ssr;
            converged = candidate_ssr == 0.0
                || decrease <= SSR_TOLERANCE * ssr
                || step.norm() <= STEP_TOLERANCE * (p.norm() + STEP_TOLERANCE);
            params = candidate;
            ssr = candidate_ssr;
            damping = (damping / 10.0).max(MIN_DAMPING);
        } else {
            // No step direction reduces the residuals any further; we're at
            // the minimum to machine precision.
            damping *= 10.0;
            converged = damping > MAX_DAMPING;
        }
    }

    // The sign of sigma isn't constrained by the model.
    params.sigma = params.sigma.abs();

    let (jtj, _) = normal_equations(&params, x, y);
    let dof = x.len() - 3;
    let covariance = jtj.try_inverse().map(|inv| {
        if dof > 0 {
            inv * (ssr / dof as f64)
        } else {
            inv
        }
    });
    debug!("Gaussian fit converged after {iterations} iterations: {params:?}, ssr {ssr:e}");

    Ok(GaussianFit {
        params,
        covariance,
        ssr,
        iterations,
    })
}

#[derive(Error, Debug)]
pub enum FitError {
    #[error("The spectrum is degenerate (total intensity {total}); its moments are undefined, so there's nothing to fit")]
    DegenerateSpectrum { total: f64 },

    #[error("Can't fit a Gaussian from the initial guess {0:?}")]
    BadInitialGuess(Gaussian),

    #[error("Need at least 3 points to fit a Gaussian, but only have {0}")]
    TooFewPoints(usize),

    #[error("The x and y arrays have different lengths ({x} vs. {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("The Gaussian fit's normal equations are singular")]
    Singular,

    #[error("The Gaussian fit didn't converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}
