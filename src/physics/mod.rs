// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Physical properties of a cloud derived from its HI line profile, and the
//! pressure it needs to be confined as a function of its (unknown) distance.
//!
//! The distance to the cloud isn't known, so quantities that depend on it are
//! computed over a grid of distances. The cloud's height above the disk follows
//! from its galactic latitude; the pressure of the hot halo at that height is
//! given by the Wolfire et al. (1995) law.


use log::trace;
use ndarray::prelude::*;
use thiserror::Error;

use crate::constants::*;

/// Convert kiloparsecs to metres.
#[inline]
pub fn kpc_to_m(kpc: f64) -> f64 {
    kpc * KPC_TO_M
}

/// Convert metres to kiloparsecs.
#[inline]
pub fn m_to_kpc(m: f64) -> f64 {
    m / KPC_TO_M
}

/// The angle subtended by the cloud \[radians\], from two pixel coordinates on
/// either side of it and the plate scale (`plate_scale_deg` degrees per
/// `plate_scale_pixels` pixels).
pub fn angular_size(extent_pixels: [f64; 2], plate_scale_deg: f64, plate_scale_pixels: f64) -> f64 {
    let pixels = (extent_pixels[0] - extent_pixels[1]).abs();
    (plate_scale_deg * pixels / plate_scale_pixels).to_radians()
}

/// The thermal pressure of the hot halo at height `z_kpc` \[K cm^-3\]
/// (Wolfire et al. 1995).
pub fn wolfire_pressure(z_kpc: f64) -> f64 {
    WOLFIRE_P0 * (1.0 + z_kpc * z_kpc / WOLFIRE_Z2).powf(WOLFIRE_INDEX)
}

/// The pressure a spherical cloud of column density `nhi_cm2` \[cm^-2\]
/// exerts on itself through gravity \[K cm^-3\].
pub fn self_gravity_pressure(nhi_cm2: f64) -> f64 {
    let nhi_m2 = nhi_cm2 * 1e4;
    MEAN_PARTICLE_MASS * MEAN_PARTICLE_MASS * GRAVITATIONAL_CONSTANT * nhi_m2 * nhi_m2 * PI
        / 15.0
        / BOLTZMANN
        * 1e-6
}

/// 1, 2, ..., `max_kpc` kiloparsecs.
pub fn distance_grid(max_kpc: usize) -> Array1<f64> {
    Array1::from_iter((1..=max_kpc).map(|d| d as f64))
}

/// Distance-independent properties of a cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudProperties {
    /// HI column density \[cm^-2\].
    pub column_density: f64,

    /// Surface mass density \[M_sun pc^-2\].
    pub surface_density: f64,

    /// Line-of-sight velocity dispersion \[m/s\].
    pub dispersion: f64,

    /// Kinetic temperature, assuming the line is thermally broadened \[K\].
    pub kinetic_temperature: f64,
}

impl CloudProperties {
    /// Derive the properties from the cloud's mean spectrum \[K\], the fitted
    /// line width `sigma_km_s` and the width of a channel.
    pub fn derive(
        spectrum: ArrayView1<f64>,
        sigma_km_s: f64,
        channel_width_km_s: f64,
    ) -> CloudProperties {
        let column_density = HI_COLUMN_DENSITY_COEFF * spectrum.sum() * channel_width_km_s;
        let surface_density = column_density * HYDROGEN_MASS * PC_TO_CM * PC_TO_CM / SOLAR_MASS;
        let dispersion = sigma_km_s * 1e3;
        let kinetic_temperature = HYDROGEN_MASS * dispersion * dispersion / BOLTZMANN;

        CloudProperties {
            column_density,
            surface_density,
            dispersion,
            kinetic_temperature,
        }
    }
}

/// Quantities as a function of the distance to the cloud. All arrays have the
/// same length.
#[derive(Debug, Clone)]
pub struct PressureProfile {
    /// \[kpc\]
    pub distance: Array1<f64>,

    /// Height above the galactic plane \[kpc\].
    pub height: Array1<f64>,

    /// HI volume density \[cm^-3\].
    pub volume_density: Array1<f64>,

    /// The thermal pressure of the cloud, less its self gravity \[K cm^-3\].
    pub pressure: Array1<f64>,

    /// The halo pressure at each height \[K cm^-3\].
    pub halo_pressure: Array1<f64>,
}

/// Where the cloud's pressure first crosses the halo's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumPoint {
    /// \[kpc\]
    pub distance: f64,
    /// \[kpc\]
    pub height: f64,
    /// \[K cm^-3\]
    pub pressure: f64,
}

impl PressureProfile {
    /// Compute the profile for a cloud subtending `angular_size` radians at
    /// galactic latitude `latitude_deg`, for each distance \[kpc\].
    pub fn compute(
        cloud: &CloudProperties,
        angular_size: f64,
        latitude_deg: f64,
        distance: Array1<f64>,
    ) -> Result<PressureProfile, PhysicsError> {
        if !(angular_size > 0.0 && angular_size.is_finite()) {
            return Err(PhysicsError::NonPositiveAngularSize(angular_size));
        }

        let sin_b = latitude_deg.to_radians().sin();
        let nhi_m2 = cloud.column_density * 1e4;
        let self_gravity = self_gravity_pressure(cloud.column_density);
        trace!("Self-gravity pressure term: {self_gravity:e} K cm^-3");

        let height = distance.mapv(|d| d * sin_b);
        // The cloud is as deep as it is wide.
        let volume_density = distance.mapv(|d| nhi_m2 / angular_size / kpc_to_m(d) * 1e-6);
        let pressure = volume_density.mapv(|n| n * cloud.kinetic_temperature - self_gravity);
        let halo_pressure = height.mapv(wolfire_pressure);

        Ok(PressureProfile {
            distance,
            height,
            volume_density,
            pressure,
            halo_pressure,
        })
    }

    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    /// Where the cloud's pressure first crosses the halo's, if it does within
    /// the grid. Between grid points, the crossing is linearly interpolated.
    /// Non-finite points are skipped.
    pub fn equilibrium_point(&self) -> Option<EquilibriumPoint> {
        let excess = &self.pressure - &self.halo_pressure;
        let point = |i: usize, t: f64| {
            let lerp = |a: &Array1<f64>| match a.get(i + 1) {
                Some(next) if t > 0.0 => a[i] + t * (next - a[i]),
                _ => a[i],
            };
            EquilibriumPoint {
                distance: lerp(&self.distance),
                height: lerp(&self.height),
                pressure: lerp(&self.pressure),
            }
        };

        for (i, &e0) in excess.iter().enumerate() {
            if !e0.is_finite() {
                continue;
            }
            if e0 == 0.0 {
                return Some(point(i, 0.0));
            }
            match excess.get(i + 1) {
                Some(&e1) if e1.is_finite() && e1 != 0.0 && (e0 < 0.0) != (e1 < 0.0) => {
                    return Some(point(i, e0 / (e0 - e1)));
                }
                _ => (),
            }
        }
        None
    }
}

#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("The angular size of the cloud must be positive, but it is {0} radians")]
    NonPositiveAngularSize(f64),
}
