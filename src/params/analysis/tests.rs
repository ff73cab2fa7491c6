// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::prelude::*;

use super::*;
use crate::constants::*;

/// Parameters like the defaults, but for a small cube.
fn get_params() -> AnalysisParams {
    AnalysisParams {
        data_file: PathBuf::from(DEFAULT_DATA_FILE),
        temperature_dataset: DEFAULT_TEMPERATURE_DATASET.to_string(),
        velocity_dataset: DEFAULT_VELOCITY_DATASET.to_string(),
        velocity_window: VelocityWindow {
            min: DEFAULT_VELOCITY_MIN,
            max: DEFAULT_VELOCITY_MAX,
        },
        crop: CropWindow {
            rows: 4..12,
            cols: 2..18,
        },
        rms: DEFAULT_RMS,
        clip_sigma: DEFAULT_CLIP_SIGMA,
        channel_width: DEFAULT_CHANNEL_WIDTH,
        latitude: DEFAULT_LATITUDE_DEG,
        extent_pixels: DEFAULT_EXTENT_PIXELS,
        plate_scale_deg: DEFAULT_PLATE_SCALE_DEG,
        plate_scale_pixels: DEFAULT_PLATE_SCALE_PIXELS,
        max_distance_kpc: DEFAULT_MAX_DISTANCE_KPC,
        initial_amplitude: DEFAULT_INITIAL_AMPLITUDE,
        plot_dir: None,
    }
}

/// HI4PI-like channels from -260 km/s to -150 km/s [m/s].
fn get_velocities() -> Array1<f64> {
    Array1::from_iter((0..).map(|i| -260e3 + 1.29e3 * i as f64).take_while(|&v| v < -150e3))
}

/// A cube where every pixel of the crop has the same Gaussian line, and
/// everything outside the crop is empty.
fn get_gaussian_cube(line: Gaussian) -> SpectralCube {
    let velocity = get_velocities();
    let temperature = Array3::from_shape_fn((velocity.len(), 16, 20), |(c, y, x)| {
        if (4..12).contains(&y) && (2..18).contains(&x) {
            line.evaluate(velocity[c] * 1e-3)
        } else {
            0.0
        }
    });
    SpectralCube::new(temperature, velocity)
}

#[test]
fn test_analyse_a_gaussian_cloud() {
    let line = Gaussian {
        amplitude: 5.0,
        centre: -205.0,
        sigma: 4.0,
    };
    let cube = get_gaussian_cube(line);
    let params = get_params();
    let results = params.analyse(&cube).unwrap();

    // All channels in the window are kept.
    let expected_chans: Vec<usize> = cube
        .velocity()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > -225e3 && v < -185e3)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(results.sub_cube.channel_indices, expected_chans);
    assert_eq!(results.spectrum.len(), expected_chans.len());
    assert_eq!(results.integrated_map.dim(), (8, 16));

    // Every pixel has the same line, so the spectrum is that line, clipped.
    let threshold = DEFAULT_CLIP_SIGMA * DEFAULT_RMS;
    for (&v, &s) in results.velocity_km_s.iter().zip(results.spectrum.iter()) {
        let t = line.evaluate(v);
        let expected = if t < threshold { 0.0 } else { t };
        assert_abs_diff_eq!(s, expected, epsilon = 1e-12);
    }
    let map_value = results.spectrum.sum();
    for &m in results.integrated_map.iter() {
        assert_abs_diff_eq!(m, map_value, epsilon = 1e-10);
    }

    // Clipping only removes the far wings, so the fit is close to the truth.
    assert_relative_eq!(results.fit.params.amplitude, 5.0, max_relative = 0.03);
    assert_abs_diff_eq!(results.fit.params.centre, -205.0, epsilon = 0.1);
    assert_relative_eq!(results.fit.params.sigma, 4.0, max_relative = 0.05);

    assert_relative_eq!(
        results.cloud.column_density,
        HI_COLUMN_DENSITY_COEFF * results.spectrum.sum() * DEFAULT_CHANNEL_WIDTH
    );
    assert_relative_eq!(results.cloud.dispersion, results.fit.params.sigma * 1e3);
    assert_relative_eq!(
        results.angular_size,
        (15.0_f64 * 22.0 / 266.0).to_radians(),
        max_relative = 1e-14
    );
    assert_eq!(results.profile.len(), DEFAULT_MAX_DISTANCE_KPC);
    assert_abs_diff_eq!(results.profile.distance[0], 1.0);
    assert!(results.plots.is_empty());
}

#[test]
fn test_faint_cloud_is_degenerate() {
    // Everything is below 3 sigma, so everything is clipped.
    let line = Gaussian {
        amplitude: 0.1,
        centre: -205.0,
        sigma: 4.0,
    };
    let cube = get_gaussian_cube(line);
    let result = get_params().analyse(&cube);
    assert!(matches!(
        result,
        Err(AnalysisError::Fit(FitError::DegenerateSpectrum { .. }))
    ));
}

#[test]
fn test_empty_velocity_window_is_an_error() {
    let cube = get_gaussian_cube(Gaussian {
        amplitude: 5.0,
        centre: -205.0,
        sigma: 4.0,
    });
    let mut params = get_params();
    params.velocity_window = VelocityWindow {
        min: 100e3,
        max: 200e3,
    };
    let result = params.analyse(&cube);
    assert!(matches!(
        result,
        Err(AnalysisError::Selection(SelectionError::NoChannels { .. }))
    ));
}

#[test]
fn test_zero_angular_size_is_an_error() {
    let cube = get_gaussian_cube(Gaussian {
        amplitude: 5.0,
        centre: -205.0,
        sigma: 4.0,
    });
    let mut params = get_params();
    params.extent_pixels = [30.0, 30.0];
    let result = params.analyse(&cube);
    assert!(matches!(
        result,
        Err(AnalysisError::Physics(PhysicsError::NonPositiveAngularSize(_)))
    ));
}

#[test]
fn test_missing_file_is_an_error() {
    let mut params = get_params();
    params.data_file = PathBuf::from("/does/not/exist.h5");
    let result = params.run();
    assert!(matches!(
        result,
        Err(AnalysisError::Hdf5Read(Hdf5ReadError::Open { .. }))
    ));
}
