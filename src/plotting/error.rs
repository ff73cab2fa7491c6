// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("While plotting the integrated map: {0}")]
    Map(String),

    #[error("While plotting the spectrum: {0}")]
    Spectrum(String),

    #[error("While plotting the pressure profile: {0}")]
    Pressure(String),

    #[error("Error from the plotters library: {0}")]
    Plotters(Box<dyn std::error::Error>),
}
