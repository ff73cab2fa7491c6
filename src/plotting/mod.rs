// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to plot the results of a cloud analysis.
//!
//! Three figures are written as PNG files: the integrated intensity map, the
//! mean spectrum with its Gaussian fit, and the cloud and halo pressures
//! against height on log-log axes.

mod error;

pub use error::DrawError;

use std::path::{Path, PathBuf};

use log::{debug, warn};
use ndarray::prelude::*;
use plotters::prelude::*;

use crate::{fitting::Gaussian, physics::PressureProfile};

pub(crate) const MAP_FILENAME: &str = "hvc_integrated_map.png";
pub(crate) const SPECTRUM_FILENAME: &str = "hvc_spectrum.png";
pub(crate) const PRESSURE_FILENAME: &str = "hvc_pressure.png";

/// The number of pixels on each side of the map plot.
const MAP_PIXELS: u32 = 1000;
/// The number of X pixels on the line plots.
const X_PIXELS: u32 = 1600;
/// The number of Y pixels on the line plots.
const Y_PIXELS: u32 = 900;

/// Number of samples used to draw the fitted Gaussian.
const NUM_FIT_SAMPLES: usize = 500;

/// Write all three figures into `output_dir`, returning the paths written.
pub(crate) fn plot_all(
    output_dir: &Path,
    map: ArrayView2<f64>,
    velocity_km_s: ArrayView1<f64>,
    spectrum: ArrayView1<f64>,
    fit: &Gaussian,
    profile: &PressureProfile,
) -> Result<Vec<PathBuf>, DrawError> {
    let map_file = output_dir.join(MAP_FILENAME);
    debug!("Plotting the integrated map to {}", map_file.display());
    plot_integrated_map(&map_file, map)?;

    let spectrum_file = output_dir.join(SPECTRUM_FILENAME);
    debug!("Plotting the spectrum to {}", spectrum_file.display());
    plot_spectrum(&spectrum_file, velocity_km_s, spectrum, fit)?;

    let pressure_file = output_dir.join(PRESSURE_FILENAME);
    debug!("Plotting the pressure profile to {}", pressure_file.display());
    plot_pressure(&pressure_file, profile)?;

    Ok(vec![map_file, spectrum_file, pressure_file])
}

/// The smallest and largest finite values. If there are none, (0, 1). If
/// they're the same, the range is widened so that it isn't empty.
fn finite_range<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(acc_min, acc_max), &v| {
            (acc_min.min(v), acc_max.max(v))
        });
    if min > max {
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

/// Map a value in [0, 1] onto a blue (low) to red (high) colour ramp. Values
/// that aren't finite are grey.
fn intensity_colour(normalised: f64) -> HSLColor {
    if !normalised.is_finite() {
        return HSLColor(0.0, 0.0, 0.85);
    }
    let v = normalised.clamp(0.0, 1.0);
    HSLColor(0.7 * (1.0 - v), 0.85, 0.2 + 0.35 * v)
}

/// The map is drawn like an image: row 0 at the top.
fn plot_integrated_map(file: &Path, map: ArrayView2<f64>) -> Result<(), DrawError> {
    let (num_rows, num_cols) = map.dim();
    let (min, max) = finite_range(map.iter());

    let root = BitMapBackend::new(file, (MAP_PIXELS, MAP_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;

    let mut cc = ChartBuilder::on(&root)
        .caption("Integrated intensity [K]", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..num_cols as f64, 0.0..num_rows as f64)
        .map_err(|e| DrawError::Map(e.to_string()))?;

    cc.configure_mesh()
        .disable_mesh()
        .x_desc("x [pixel]")
        .y_desc("y [pixel]")
        .y_label_formatter(&|y| format!("{}", (num_rows as f64 - y).round()))
        .draw()
        .map_err(|e| DrawError::Map(e.to_string()))?;

    cc.draw_series(map.indexed_iter().map(|((row, col), &v)| {
        let top = (num_rows - row) as f64;
        let colour = intensity_colour((v - min) / (max - min));
        Rectangle::new(
            [(col as f64, top), (col as f64 + 1.0, top - 1.0)],
            colour.filled(),
        )
    }))
    .map_err(|e| DrawError::Map(e.to_string()))?;

    root.present()
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    Ok(())
}

fn plot_spectrum(
    file: &Path,
    velocity_km_s: ArrayView1<f64>,
    spectrum: ArrayView1<f64>,
    fit: &Gaussian,
) -> Result<(), DrawError> {
    let (x_min, x_max) = finite_range(velocity_km_s.iter());
    let (y_min, y_max) = finite_range(spectrum.iter());
    let y_min = y_min.min(0.0);
    let y_max = y_max.max(fit.amplitude) * 1.1;

    let root = BitMapBackend::new(file, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;

    let mut cc = ChartBuilder::on(&root)
        .caption("Mean spectrum", ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| DrawError::Spectrum(e.to_string()))?;

    cc.configure_mesh()
        .x_desc("v [km/s]")
        .y_desc("T [K]")
        .draw()
        .map_err(|e| DrawError::Spectrum(e.to_string()))?;

    cc.draw_series(
        velocity_km_s
            .iter()
            .zip(spectrum.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| Circle::new((x, y), 4, BLUE.filled())),
    )
    .map_err(|e| DrawError::Spectrum(e.to_string()))?;

    let step = (x_max - x_min) / (NUM_FIT_SAMPLES - 1) as f64;
    cc.draw_series(LineSeries::new(
        (0..NUM_FIT_SAMPLES).map(|i| {
            let x = x_min + step * i as f64;
            (x, fit.evaluate(x))
        }),
        RED.stroke_width(2),
    ))
    .map_err(|e| DrawError::Spectrum(e.to_string()))?;

    root.present()
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    Ok(())
}

fn plot_pressure(file: &Path, profile: &PressureProfile) -> Result<(), DrawError> {
    // Only positive values can go on log axes.
    let model: Vec<(f64, f64)> = positive_points(profile.height.view(), profile.pressure.view());
    let halo: Vec<(f64, f64)> =
        positive_points(profile.height.view(), profile.halo_pressure.view());
    if model.len() < profile.len() {
        warn!(
            "{} of {} cloud pressures aren't positive and won't be plotted",
            profile.len() - model.len(),
            profile.len()
        );
    }
    if model.is_empty() && halo.is_empty() {
        return Err(DrawError::Pressure(
            "There are no positive pressures to plot".to_string(),
        ));
    }

    let (x_min, x_max) = finite_range(model.iter().chain(halo.iter()).map(|(x, _)| x));
    let (y_min, y_max) = finite_range(model.iter().chain(halo.iter()).map(|(_, y)| y));
    // Pad by a fraction of a decade either side.
    let (x_min, x_max) = (x_min / 1.2, x_max * 1.2);
    let (y_min, y_max) = (y_min / 1.5, y_max * 1.5);

    let root = BitMapBackend::new(file, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;

    let mut cc = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d((x_min..x_max).log_scale(), (y_min..y_max).log_scale())
        .map_err(|e| DrawError::Pressure(e.to_string()))?;

    cc.configure_mesh()
        .x_desc("z [kpc]")
        .y_desc("P/k [K cm^-3]")
        .axis_desc_style(("sans-serif", 28))
        .draw()
        .map_err(|e| DrawError::Pressure(e.to_string()))?;

    cc.draw_series(LineSeries::new(model, RED.stroke_width(2)))
        .map_err(|e| DrawError::Pressure(e.to_string()))?
        .label("HVC stability")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], RED.stroke_width(2)));

    cc.draw_series(LineSeries::new(halo, BLUE.stroke_width(2)))
        .map_err(|e| DrawError::Pressure(e.to_string()))?
        .label("HIM (Wolfire et al. 1995)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], BLUE.stroke_width(2)));

    cc.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(RGBColor(230, 230, 230))
        .border_style(BLACK)
        .label_font(("sans-serif", 24))
        .draw()
        .map_err(|e| DrawError::Pressure(e.to_string()))?;

    root.present()
        .map_err(|e| DrawError::Plotters(Box::new(e)))?;
    Ok(())
}

fn positive_points(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y.iter())
        .filter(|&(&x, &y)| x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0)
        .map(|(&x, &y)| (x, y))
        .collect()
}
