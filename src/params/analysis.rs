// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The cloud analysis, from the cube on disk to the pressure profile.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use log::{debug, info};
use ndarray::prelude::*;
use thiserror::Error;

use crate::{
    cli::{display_warnings, InfoPrinter, Warn},
    cube::{CropWindow, SelectionError, SpectralCube, SubCube, VelocityWindow},
    fitting::{fit_gaussian, moments, FitError, Gaussian, GaussianFit},
    io::{read_cube, Hdf5ReadError},
    physics::{angular_size, distance_grid, CloudProperties, PhysicsError, PressureProfile},
};

pub(crate) struct AnalysisParams {
    pub(crate) data_file: PathBuf,
    pub(crate) temperature_dataset: String,
    pub(crate) velocity_dataset: String,

    /// In the units of the velocity dataset \[m/s\].
    pub(crate) velocity_window: VelocityWindow,
    pub(crate) crop: CropWindow,

    /// \[K\]
    pub(crate) rms: f64,
    /// Voxels below `clip_sigma * rms` are zeroed.
    pub(crate) clip_sigma: f64,

    /// \[km/s\]
    pub(crate) channel_width: f64,
    /// Galactic latitude of the cloud \[degrees\].
    pub(crate) latitude: f64,
    pub(crate) extent_pixels: [f64; 2],
    pub(crate) plate_scale_deg: f64,
    pub(crate) plate_scale_pixels: f64,
    pub(crate) max_distance_kpc: usize,
    pub(crate) initial_amplitude: f64,

    /// Where to write plots. If this is `None`, no plots are made.
    pub(crate) plot_dir: Option<PathBuf>,
}

/// Everything the analysis produces.
pub(crate) struct AnalysisResults {
    /// The cropped, clipped part of the cube containing the cloud.
    pub(crate) sub_cube: SubCube,
    pub(crate) integrated_map: Array2<f64>,
    pub(crate) spectrum: Array1<f64>,
    pub(crate) velocity_km_s: Array1<f64>,
    pub(crate) fit: GaussianFit,
    pub(crate) cloud: CloudProperties,
    /// \[radians\]
    pub(crate) angular_size: f64,
    pub(crate) profile: PressureProfile,
    pub(crate) plots: Vec<PathBuf>,
}

impl AnalysisParams {
    pub(crate) fn run(&self) -> Result<AnalysisResults, AnalysisError> {
        let cube = read_cube(
            &self.data_file,
            &self.temperature_dataset,
            &self.velocity_dataset,
        )?;
        let results = self.analyse(&cube)?;
        self.report(&results);
        Ok(results)
    }

    /// Do the analysis on a cube that has already been read.
    pub(crate) fn analyse(&self, cube: &SpectralCube) -> Result<AnalysisResults, AnalysisError> {
        let (num_chans, num_rows, num_cols) = cube.dim();
        debug!("Cube has {num_chans} channels of {num_rows}x{num_cols} pixels");

        let mut sub_cube = cube.select(&self.velocity_window, &self.crop)?;
        let threshold = self.clip_sigma * self.rms;
        let num_clipped = sub_cube.clip(threshold);
        debug!(
            "Zeroed {num_clipped} of {} voxels below {threshold} K",
            sub_cube.data.len()
        );

        let integrated_map = sub_cube.integrated_map();
        let spectrum = sub_cube.mean_spectrum();
        let velocity_km_s = sub_cube.velocity.mapv(|v| v * 1e-3);

        let (mean, sigma) = moments(velocity_km_s.view(), spectrum.view())?;
        debug!("Spectrum moments: mean {mean} km/s, sigma {sigma} km/s");
        let fit = fit_gaussian(
            velocity_km_s.view(),
            spectrum.view(),
            Gaussian {
                amplitude: self.initial_amplitude,
                centre: mean,
                sigma,
            },
        )?;
        if fit.covariance.is_none() {
            "The covariance of the Gaussian fit couldn't be estimated".warn();
        }

        let cloud = CloudProperties::derive(spectrum.view(), fit.params.sigma, self.channel_width);
        if cloud.column_density <= 0.0 {
            format!(
                "The column density ({:e} cm^-2) isn't positive; derived quantities are meaningless",
                cloud.column_density
            )
            .warn();
        }
        let angular_size = angular_size(
            self.extent_pixels,
            self.plate_scale_deg,
            self.plate_scale_pixels,
        );
        let profile = PressureProfile::compute(
            &cloud,
            angular_size,
            self.latitude,
            distance_grid(self.max_distance_kpc),
        )?;

        let plots = match self.plot_dir.as_deref() {
            #[cfg(feature = "plotting")]
            Some(dir) => crate::plotting::plot_all(
                dir,
                integrated_map.view(),
                velocity_km_s.view(),
                spectrum.view(),
                &fit.params,
                &profile,
            )?,
            #[cfg(not(feature = "plotting"))]
            Some(_) => return Err(AnalysisError::NoPlottingFeature),
            None => vec![],
        };

        Ok(AnalysisResults {
            sub_cube,
            integrated_map,
            spectrum,
            velocity_km_s,
            fit,
            cloud,
            angular_size,
            profile,
            plots,
        })
    }

    fn report(&self, results: &AnalysisResults) {
        let AnalysisResults {
            sub_cube,
            fit,
            cloud,
            angular_size,
            profile,
            plots,
            ..
        } = results;

        let mut printer = InfoPrinter::new("Selection".into());
        let first = sub_cube.channel_indices.first().copied().unwrap_or_default();
        let last = sub_cube.channel_indices.last().copied().unwrap_or_default();
        printer.push_line(
            format!(
                "{} channels ({first}..={last}) between {} and {} km/s",
                sub_cube.channel_indices.len(),
                self.velocity_window.min * 1e-3,
                self.velocity_window.max * 1e-3
            )
            .into(),
        );
        printer.push_line(
            format!(
                "rows {:?}, cols {:?}; clipped below {} K",
                self.crop.rows,
                self.crop.cols,
                self.clip_sigma * self.rms
            )
            .into(),
        );
        printer.display();

        let mut printer = InfoPrinter::new("Gaussian fit".into());
        let uncertainties = fit.uncertainties();
        let with_err = |value: f64, i: usize| match uncertainties {
            Some(u) => format!("{value:.4} ± {:.4}", u[i]),
            None => format!("{value:.4}"),
        };
        printer.push_block(vec![
            format!("amplitude: {} K", with_err(fit.params.amplitude, 0)).into(),
            format!("centre:    {} km/s", with_err(fit.params.centre, 1)).into(),
            format!("sigma:     {} km/s", with_err(fit.params.sigma, 2)).into(),
        ]);
        printer.push_line(format!("converged after {} iterations", fit.iterations).into());
        printer.display();

        let mut printer = InfoPrinter::new("Cloud properties".into());
        printer.push_block(vec![
            format!("N_HI:            {:.4e} cm^-2", cloud.column_density).into(),
            format!("Surface density: {:.4} M_sun pc^-2", cloud.surface_density).into(),
            format!("Dispersion:      {:.1} m/s", cloud.dispersion).into(),
            format!("T_k:             {:.1} K", cloud.kinetic_temperature).into(),
            format!("Angular size:    {:.4}°", angular_size.to_degrees()).into(),
        ]);
        match profile.equilibrium_point() {
            Some(eq) => printer.push_line(
                format!(
                    "Cloud and halo pressures cross at d = {:.1} kpc (z = {:.2} kpc, P/k = {:.1} K cm^-3)",
                    eq.distance, eq.height, eq.pressure
                )
                .into(),
            ),
            None => printer.push_line(
                format!(
                    "Cloud and halo pressures don't cross within {} kpc",
                    self.max_distance_kpc
                )
                .into(),
            ),
        }
        printer.display();

        display_warnings();

        for plot in plots {
            info!("Wrote {}", plot.display());
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum AnalysisError {
    #[cfg(not(feature = "plotting"))]
    #[error("hvc-stability was not compiled with the \"plotting\" feature.\nEither compile with this feature or use --no-plots.")]
    NoPlottingFeature,

    #[error(transparent)]
    Hdf5Read(#[from] Hdf5ReadError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Draw(#[from] crate::plotting::DrawError),
}
