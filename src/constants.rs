// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Physical constants are in SI units
unless the name says otherwise.
 */

pub use std::f64::consts::PI;

/// Mass of a hydrogen atom \[kg\].
pub const HYDROGEN_MASS: f64 = 1.6737236e-27;

/// Mean particle mass of the neutral gas, accounting for helium \[kg\].
pub const MEAN_PARTICLE_MASS: f64 = 1.25 * HYDROGEN_MASS;

/// Boltzmann constant \[J K^-1\].
pub const BOLTZMANN: f64 = 1.38064852e-23;

/// Newtonian gravitational constant \[m^3 kg^-1 s^-2\] (CODATA 2018).
pub const GRAVITATIONAL_CONSTANT: f64 = 6.6743e-11;

/// Nominal solar mass \[kg\] (IAU 2015).
pub const SOLAR_MASS: f64 = 1.988409870698051e30;

/// One parsec \[m\].
pub const PARSEC_M: f64 = 3.0856775814913673e16;

/// One kiloparsec \[m\].
pub const KPC_TO_M: f64 = 1e3 * PARSEC_M;

/// One parsec \[cm\].
pub const PC_TO_CM: f64 = 1e2 * PARSEC_M;

/// Optically-thin HI column density per unit brightness temperature and
/// velocity \[cm^-2 (K km s^-1)^-1\].
pub const HI_COLUMN_DENSITY_COEFF: f64 = 1.82243e18;

/// The normalisation of the Wolfire et al. (1995) halo pressure law
/// \[K cm^-3\].
pub const WOLFIRE_P0: f64 = 2250.0;

/// The squared scale height in the Wolfire et al. (1995) law \[kpc^2\].
pub const WOLFIRE_Z2: f64 = 19.6;

/// The power-law index of the Wolfire et al. (1995) law.
pub const WOLFIRE_INDEX: f64 = -1.35;

// Defaults for the analysis. These match the HI4PI cube of the cloud the
// analysis was written for.

/// The default input file.
pub const DEFAULT_DATA_FILE: &str = "data.h5";

/// The default name of the brightness-temperature cube dataset.
pub const DEFAULT_TEMPERATURE_DATASET: &str = "temperature";

/// The default name of the velocity-axis dataset.
pub const DEFAULT_VELOCITY_DATASET: &str = "velocity";

/// Lower (exclusive) velocity bound of the cloud \[m/s\].
pub const DEFAULT_VELOCITY_MIN: f64 = -225000.0;

/// Upper (exclusive) velocity bound of the cloud \[m/s\].
pub const DEFAULT_VELOCITY_MAX: f64 = -185000.0;

/// The noise rms of the cube \[K\].
pub const DEFAULT_RMS: f64 = 43e-3;

/// Voxels below this many multiples of the rms are zeroed.
pub const DEFAULT_CLIP_SIGMA: f64 = 3.0;

/// Default spatial crop, rows (y). Half open.
pub const DEFAULT_CROP_ROWS: [usize; 2] = [144, 158];

/// Default spatial crop, columns (x). Half open.
pub const DEFAULT_CROP_COLS: [usize; 2] = [172, 202];

/// HI4PI channel separation \[km/s\].
pub const DEFAULT_CHANNEL_WIDTH: f64 = 1.29;

/// Galactic latitude of the cloud \[degrees\].
pub const DEFAULT_LATITUDE_DEG: f64 = 41.0;

/// Two pixel coordinates spanning the cloud on the sky.
pub const DEFAULT_EXTENT_PIXELS: [f64; 2] = [51.0, 29.0];

/// Plate scale: this many degrees ...
pub const DEFAULT_PLATE_SCALE_DEG: f64 = 15.0;

/// ... per this many pixels.
pub const DEFAULT_PLATE_SCALE_PIXELS: f64 = 266.0;

/// The distance grid runs from 1 kpc to this many kpc in 1 kpc steps.
pub const DEFAULT_MAX_DISTANCE_KPC: usize = 1000;

/// The largest distance grid that will be computed \[kpc\]. Each distance
/// carries five `f64`s, so this is ~40 MB.
pub const MAX_DISTANCE_LIMIT_KPC: usize = 1_000_000;

/// The Gaussian fit starts from this amplitude \[K\].
pub const DEFAULT_INITIAL_AMPLITUDE: f64 = 1.0;
