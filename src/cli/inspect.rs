// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;

use super::common::InfoPrinter;
use crate::{io::list_datasets, HvcError};

/// List the datasets of an HDF5 file and their shapes.
#[derive(Parser, Debug)]
pub(super) struct InspectArgs {
    /// The HDF5 file to inspect.
    #[clap(name = "HDF5_FILE", parse(from_os_str))]
    file: PathBuf,
}

impl InspectArgs {
    pub(super) fn run(self) -> Result<(), HvcError> {
        let datasets = list_datasets(&self.file)?;

        let mut printer = InfoPrinter::new(format!("Datasets in {}", self.file.display()).into());
        if datasets.is_empty() {
            printer.push_line("<none>".into());
        }
        for (name, shape) in datasets {
            printer.push_line(format!("{name}: ({})", shape.iter().join(", ")).into());
        }
        printer.display();

        Ok(())
    }
}
