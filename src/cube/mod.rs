// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Position-position-velocity cubes, and the code to cut a cloud out of one.
//!
//! Cubes are ordered (channel, y, x). A cloud is isolated by keeping the
//! channels whose velocity falls inside a [`VelocityWindow`] and cropping the
//! spatial axes to a [`CropWindow`]; the result is a [`SubCube`], which owns
//! its own copy of the data.


use std::ops::Range;

use log::{debug, trace};
use ndarray::prelude::*;
use thiserror::Error;

/// A brightness-temperature cube and its velocity axis. The velocity axis has
/// exactly as many elements as the cube has channels.
#[derive(Debug, Clone)]
pub struct SpectralCube {
    temperature: Array3<f64>,
    velocity: Array1<f64>,
}

impl SpectralCube {
    /// Create a new cube. The caller guarantees that `velocity` has one value
    /// per channel of `temperature`.
    pub(crate) fn new(temperature: Array3<f64>, velocity: Array1<f64>) -> SpectralCube {
        debug_assert_eq!(temperature.len_of(Axis(0)), velocity.len());
        SpectralCube {
            temperature,
            velocity,
        }
    }

    pub fn temperature(&self) -> ArrayView3<f64> {
        self.temperature.view()
    }

    pub fn velocity(&self) -> ArrayView1<f64> {
        self.velocity.view()
    }

    /// (channels, y, x)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.temperature.dim()
    }

    /// Get the indices of the channels whose velocities are within the window,
    /// in the order they appear in the cube.
    pub fn channels_in(&self, window: &VelocityWindow) -> Vec<usize> {
        self.velocity
            .iter()
            .enumerate()
            .filter(|&(_, &v)| window.contains(v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Copy out the part of the cube inside the velocity and crop windows.
    pub fn select(
        &self,
        velocity_window: &VelocityWindow,
        crop: &CropWindow,
    ) -> Result<SubCube, SelectionError> {
        let (num_chans, num_rows, num_cols) = self.dim();
        if crop.rows.is_empty() || crop.cols.is_empty() {
            return Err(SelectionError::EmptyCrop {
                rows: crop.rows.clone(),
                cols: crop.cols.clone(),
            });
        }
        if crop.rows.end > num_rows || crop.cols.end > num_cols {
            return Err(SelectionError::CropOutOfBounds {
                rows: crop.rows.clone(),
                cols: crop.cols.clone(),
                num_rows,
                num_cols,
            });
        }

        let channel_indices = self.channels_in(velocity_window);
        if channel_indices.is_empty() {
            return Err(SelectionError::NoChannels {
                min: velocity_window.min,
                max: velocity_window.max,
                num_chans,
            });
        }
        debug!(
            "Selected {} of {num_chans} channels ({}..={})",
            channel_indices.len(),
            channel_indices[0],
            channel_indices[channel_indices.len() - 1]
        );
        trace!("Selected channel indices: {channel_indices:?}");

        let data = self
            .temperature
            .slice(s![.., crop.rows.clone(), crop.cols.clone()])
            .select(Axis(0), &channel_indices);
        let velocity = self.velocity.select(Axis(0), &channel_indices);

        Ok(SubCube {
            data,
            velocity,
            channel_indices,
        })
    }
}

/// Velocity bounds in the units of the cube's velocity axis. Both bounds are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityWindow {
    pub min: f64,
    pub max: f64,
}

impl VelocityWindow {
    pub fn contains(&self, v: f64) -> bool {
        v > self.min && v < self.max
    }
}

/// Half-open pixel ranges on the spatial axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropWindow {
    /// y
    pub rows: Range<usize>,
    /// x
    pub cols: Range<usize>,
}

/// A copy of part of a [`SpectralCube`].
#[derive(Debug, Clone)]
pub struct SubCube {
    /// (channel, y, x)
    pub data: Array3<f64>,

    /// The velocity of each retained channel.
    pub velocity: Array1<f64>,

    /// The indices of the retained channels in the parent cube.
    pub channel_indices: Vec<usize>,
}

impl SubCube {
    /// Zero every voxel below `threshold`. Returns the number of voxels that
    /// were changed.
    pub fn clip(&mut self, threshold: f64) -> usize {
        clip_below(self.data.view_mut(), threshold)
    }

    /// The sum over the channel axis; one value per pixel.
    pub fn integrated_map(&self) -> Array2<f64> {
        self.data.sum_axis(Axis(0))
    }

    /// The mean over both spatial axes; one value per channel.
    pub fn mean_spectrum(&self) -> Array1<f64> {
        let (_, num_rows, num_cols) = self.data.dim();
        let num_pixels = (num_rows * num_cols) as f64;
        self.data.sum_axis(Axis(2)).sum_axis(Axis(1)) / num_pixels
    }
}

/// Set every value less than `threshold` to zero. This is a hard zero, not a
/// mask; clipped voxels still count in sums and means. NaNs are left alone.
/// Returns the number of values that were changed.
pub fn clip_below<D: Dimension>(mut data: ArrayViewMut<f64, D>, threshold: f64) -> usize {
    let mut num_clipped = 0;
    data.iter_mut().filter(|v| **v < threshold).for_each(|v| {
        if *v != 0.0 {
            num_clipped += 1;
        }
        *v = 0.0;
    });
    num_clipped
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("No channels have velocities strictly between {min} and {max} (the cube has {num_chans} channels)")]
    NoChannels { min: f64, max: f64, num_chans: usize },

    #[error("The crop window (rows {rows:?}, cols {cols:?}) is empty")]
    EmptyCrop {
        rows: Range<usize>,
        cols: Range<usize>,
    },

    #[error("The crop window (rows {rows:?}, cols {cols:?}) doesn't fit in the cube's {num_rows}x{num_cols} pixels")]
    CropOutOfBounds {
        rows: Range<usize>,
        cols: Range<usize>,
        num_rows: usize,
        num_cols: usize,
    },
}
