// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, hvc_stability, write_cloud};

#[test]
fn test_analyse_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);

    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyse",
            "--data", &data.display().to_string(),
            "--crop-rows", "4", "12",
            "--crop-cols", "2", "18",
            "--no-plots",
        ])
        .ok();
    assert!(cmd.is_ok(), "analyse failed on a simple cloud: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_inspect_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 1.0);

    let cmd = hvc_stability()
        .args(["inspect", &data.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
