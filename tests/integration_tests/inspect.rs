// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, get_velocities, hvc_stability, write_cloud};

#[test]
fn test_inspect_lists_datasets() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 1.0);
    let num_chans = get_velocities().len();

    let cmd = hvc_stability()
        .args(["inspect", &data.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(
        stdout.contains(&format!("temperature: ({num_chans}, 16, 20)")),
        "{stdout}"
    );
    assert!(stdout.contains(&format!("velocity: ({num_chans})")), "{stdout}");
}

#[test]
fn test_inspect_missing_file_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let cmd = hvc_stability()
        .args(["inspect", &tmp_dir.path().join("nope.h5").display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"), "{stderr}");
}
