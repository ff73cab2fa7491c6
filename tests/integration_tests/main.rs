// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod analyse;
mod inspect;
mod no_stderr;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use ndarray::prelude::*;

fn hvc_stability() -> Command {
    Command::cargo_bin("hvc-stability").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Channels from -260 km/s to -150 km/s in HI4PI steps [m/s].
fn get_velocities() -> Array1<f64> {
    Array1::from_iter((0..).map(|i| -260e3 + 1.29e3 * i as f64).take_while(|&v| v < -150e3))
}

/// Write a 16x20 pixel cube to `dir`. Pixels in rows 4..12 and columns 2..18
/// have a Gaussian line with the given amplitude [K], centred on -205 km/s
/// with a 4 km/s dispersion; all others are empty.
fn write_cloud(dir: &Path, amplitude: f64) -> PathBuf {
    let path = dir.join("cloud.h5");
    let velocity = get_velocities();
    let cube = Array3::from_shape_fn((velocity.len(), 16, 20), |(c, y, x)| {
        if (4..12).contains(&y) && (2..18).contains(&x) {
            let v = velocity[c] * 1e-3;
            (amplitude * (-(v + 205.0).powi(2) / (2.0 * 4.0 * 4.0)).exp()) as f32
        } else {
            0.0
        }
    });

    let file = hdf5::File::create(&path).unwrap();
    let ds = file
        .new_dataset::<f32>()
        .shape(cube.dim())
        .create("temperature")
        .unwrap();
    ds.write_raw(cube.as_slice().unwrap()).unwrap();
    let ds = file
        .new_dataset::<f64>()
        .shape(velocity.len())
        .create("velocity")
        .unwrap();
    ds.write_raw(velocity.as_slice().unwrap()).unwrap();

    path
}
