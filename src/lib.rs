// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Pressure stability of a high-velocity HI cloud.

A brightness-temperature cube is read from HDF5, the cloud is cut out in
velocity and on the sky, and its mean spectrum is fit with a Gaussian. The
fitted line width and the column density give the cloud's self-gravitating
pressure at each trial distance, which is compared against the pressure of the
Galactic halo to find where the cloud could be in equilibrium.
 */

pub mod constants;
pub mod cube;
pub mod fitting;
pub mod physics;

mod cli;
mod io;
mod params;
#[cfg(feature = "plotting")]
mod plotting;

// Re-exports.
pub use cli::{Hvc, HvcError};
