// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading HDF5 files.
//!
//! Spectral-line cubes are expected to have a 3D brightness-temperature
//! dataset (channel, y, x) and a 1D velocity dataset with one value per
//! channel. Datasets are always read as `f64`; HDF5 does the conversion from
//! whatever floating-point type is stored.

mod error;

pub use error::Hdf5ReadError;

use std::path::Path;

use itertools::Itertools;
use log::{debug, info, trace};
use ndarray::prelude::*;

use crate::cube::SpectralCube;

/// Open a HDF5 file.
#[track_caller]
fn h5_open<P: AsRef<Path>>(file: P) -> Result<hdf5::File, Hdf5ReadError> {
    hdf5::File::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        Hdf5ReadError::Open {
            hdf5_error: Box::new(e),
            filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

#[track_caller]
fn h5_read_error(e: hdf5::Error, dataset: &str, file: &Path) -> Hdf5ReadError {
    let caller = std::panic::Location::caller();
    Hdf5ReadError::Read {
        hdf5_error: Box::new(e),
        dataset: dataset.into(),
        filename: file.to_path_buf().into_boxed_path(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    }
}

/// Get a dataset out of the root group, complaining with the names of the
/// available members if it isn't there.
fn h5_dataset(
    h5: &hdf5::File,
    name: &str,
    file: &Path,
) -> Result<hdf5::Dataset, Hdf5ReadError> {
    let members = h5
        .member_names()
        .map_err(|e| h5_read_error(e, name, file))?;
    if !members.iter().any(|m| m == name) {
        return Err(Hdf5ReadError::MissingDataset {
            dataset: name.into(),
            available: members.iter().join(", ").into_boxed_str(),
            filename: file.to_path_buf().into_boxed_path(),
        });
    }
    h5.dataset(name).map_err(|e| h5_read_error(e, name, file))
}

/// Get the names and shapes of all of the datasets in the root group of a HDF5
/// file. Members that aren't datasets (e.g. groups) are skipped.
pub(crate) fn list_datasets<P: AsRef<Path>>(
    file: P,
) -> Result<Vec<(String, Vec<usize>)>, Hdf5ReadError> {
    let file = file.as_ref();
    let h5 = h5_open(file)?;
    let members = h5
        .member_names()
        .map_err(|e| h5_read_error(e, "/", file))?;

    let mut datasets = Vec::with_capacity(members.len());
    for name in members {
        match h5.dataset(&name) {
            Ok(ds) => datasets.push((name, ds.shape())),
            Err(_) => trace!("'{name}' in {} isn't a dataset; skipping", file.display()),
        }
    }
    Ok(datasets)
}

/// Read a spectral-line cube and its velocity axis out of a HDF5 file. The file
/// is closed before this function returns.
pub(crate) fn read_cube<P: AsRef<Path>>(
    file: P,
    temperature_dataset: &str,
    velocity_dataset: &str,
) -> Result<SpectralCube, Hdf5ReadError> {
    let file = file.as_ref();
    debug!("Reading spectral cube from {}", file.display());
    let h5 = h5_open(file)?;
    let members = h5
        .member_names()
        .map_err(|e| h5_read_error(e, "/", file))?;
    info!("List of arrays in {}: [{}]", file.display(), members.iter().join(", "));

    let temperature = {
        let ds = h5_dataset(&h5, temperature_dataset, file)?;
        let shape = ds.shape();
        info!("Shape of '{temperature_dataset}': {shape:?}");
        if shape.len() != 3 {
            return Err(Hdf5ReadError::BadRank {
                dataset: temperature_dataset.into(),
                expected: 3,
                got: shape.len(),
                filename: file.to_path_buf().into_boxed_path(),
            });
        }
        let data: Vec<f64> = ds
            .read_raw()
            .map_err(|e| h5_read_error(e, temperature_dataset, file))?;
        Array3::from_shape_vec((shape[0], shape[1], shape[2]), data)?
    };

    let velocity = {
        let ds = h5_dataset(&h5, velocity_dataset, file)?;
        let shape = ds.shape();
        info!("Shape of '{velocity_dataset}': {shape:?}");
        if shape.len() != 1 {
            return Err(Hdf5ReadError::BadRank {
                dataset: velocity_dataset.into(),
                expected: 1,
                got: shape.len(),
                filename: file.to_path_buf().into_boxed_path(),
            });
        }
        let data: Vec<f64> = ds
            .read_raw()
            .map_err(|e| h5_read_error(e, velocity_dataset, file))?;
        Array1::from(data)
    };

    if velocity.len() != temperature.len_of(Axis(0)) {
        return Err(Hdf5ReadError::ChannelMismatch {
            velocity_len: velocity.len(),
            cube_channels: temperature.len_of(Axis(0)),
            filename: file.to_path_buf().into_boxed_path(),
        });
    }

    Ok(SpectralCube::new(temperature, velocity))
}
