// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hvc-stability errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::analyse::AnalyseArgsError;
use crate::{io::Hdf5ReadError, params::AnalysisError};

/// The *only* publicly visible error from hvc-stability. Each category gets
/// a hint about where to look, unless it's "generic".
#[derive(Error, Debug)]
pub enum HvcError {
    /// An error with the analysis arguments.
    #[error("{0}\n\nCheck the analysis options with: hvc-stability analyse --help")]
    Analyse(String),

    /// An error reading the HDF5 input.
    #[error("{0}\n\nThe datasets in a file can be listed with: hvc-stability inspect <FILE>")]
    Hdf5(String),

    /// The velocity window or crop didn't select anything usable.
    #[error("{0}\n\nTry widening the velocity window (--velocity-min, --velocity-max) or checking the crop (--crop-rows, --crop-cols).")]
    Selection(String),

    /// The mean spectrum couldn't be fit.
    #[error("{0}\n\nIf the cloud is faint, the clipping threshold (--rms, --clip-sigma) may have removed all of it.")]
    Fit(String),

    /// An error deriving the physical properties of the cloud.
    #[error("{0}\n\nCheck --extent-pixels and --plate-scale.")]
    Physics(String),

    /// An error drawing the figures.
    #[error("{0}\n\nPlots can be skipped with --no-plots.")]
    Plot(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are toml or json, with keys named like the long CLI options (using underscores).")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<AnalyseArgsError> for HvcError {
    fn from(e: AnalyseArgsError) -> Self {
        Self::Analyse(e.to_string())
    }
}

impl From<AnalysisError> for HvcError {
    fn from(e: AnalysisError) -> Self {
        let s = e.to_string();
        match e {
            #[cfg(not(feature = "plotting"))]
            AnalysisError::NoPlottingFeature => Self::Plot(s),
            AnalysisError::Hdf5Read(e) => Self::from(e),
            AnalysisError::Selection(_) => Self::Selection(s),
            AnalysisError::Fit(_) => Self::Fit(s),
            AnalysisError::Physics(_) => Self::Physics(s),
            #[cfg(feature = "plotting")]
            AnalysisError::Draw(_) => Self::Plot(s),
        }
    }
}

impl From<Hdf5ReadError> for HvcError {
    fn from(e: Hdf5ReadError) -> Self {
        Self::Hdf5(e.to_string())
    }
}

impl From<std::io::Error> for HvcError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<toml::ser::Error> for HvcError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Generic(format!("Couldn't serialise the arguments to toml: {e}"))
    }
}
