// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (input/output, reading/writing).

pub(crate) mod h5;

pub(crate) use h5::{list_datasets, read_cube, Hdf5ReadError};
