// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading in HDF5 files.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Hdf5ReadError {
    /// Error when opening a HDF5 file.
    #[error("{source_file}:{source_line}:{source_column}: Couldn't open {filename}: {hdf5_error}")]
    Open {
        hdf5_error: Box<hdf5::Error>,
        filename: Box<Path>,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },

    /// A dataset that should be present isn't.
    #[error("{filename}: Couldn't find a dataset named '{dataset}'. Available: {available}")]
    MissingDataset {
        dataset: Box<str>,
        available: Box<str>,
        filename: Box<Path>,
    },

    /// A generic error associated with the hdf5 crate while reading a dataset.
    #[error("{source_file}:{source_line}:{source_column}: {filename} dataset '{dataset}': {hdf5_error}")]
    Read {
        hdf5_error: Box<hdf5::Error>,
        dataset: Box<str>,
        filename: Box<Path>,
        source_file: &'static str,
        source_line: u32,
        source_column: u32,
    },

    #[error("{filename} dataset '{dataset}' has {got} dimensions, but {expected} were expected")]
    BadRank {
        dataset: Box<str>,
        expected: usize,
        got: usize,
        filename: Box<Path>,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error("{filename}: the velocity axis has {velocity_len} values, but the cube has {cube_channels} channels")]
    ChannelMismatch {
        velocity_len: usize,
        cube_channels: usize,
        filename: Box<Path>,
    },
}
