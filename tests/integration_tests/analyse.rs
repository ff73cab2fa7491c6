// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write};

use tempfile::TempDir;

use crate::{get_cmd_output, hvc_stability, write_cloud};

#[test]
fn test_analyse_cloud() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);

    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyse",
            "--data", &data.display().to_string(),
            "--crop-rows", "4", "12",
            "--crop-cols", "2", "18",
            "--max-distance", "100",
            "--no-plots",
        ])
        .ok();
    assert!(cmd.is_ok(), "analyse failed on a simple cloud: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("List of arrays in"), "{stdout}");
    assert!(stdout.contains("Gaussian fit"), "{stdout}");
    assert!(stdout.contains("Cloud properties"), "{stdout}");
    assert!(stdout.contains("hvc-stability analyse complete."), "{stdout}");
}

#[test]
#[cfg(feature = "plotting")]
fn test_analyse_cloud_with_plots() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);
    // Doesn't exist yet; analyse makes it.
    let output_dir = tmp_dir.path().join("plots");

    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyse",
            "--data", &data.display().to_string(),
            "--crop-rows", "4", "12",
            "--crop-cols", "2", "18",
            "--max-distance", "100",
            "--output-dir", &output_dir.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "analyse failed to plot a simple cloud: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);

    for plot in ["hvc_integrated_map.png", "hvc_spectrum.png", "hvc_pressure.png"] {
        let file = output_dir.join(plot);
        let metadata = std::fs::metadata(&file)
            .unwrap_or_else(|e| panic!("{} wasn't written: {e}", file.display()));
        assert!(metadata.len() > 0, "{} is empty", file.display());
        assert!(stdout.contains(plot), "{stdout}");
    }
}

#[test]
fn test_analyze_alias() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);

    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyze",
            "--data", &data.display().to_string(),
            "--crop-rows", "4", "12",
            "--crop-cols", "2", "18",
            "--no-plots",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
}

#[test]
fn test_faint_cloud_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    // Below the default 3 sigma threshold everywhere.
    let data = write_cloud(tmp_dir.path(), 0.1);

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
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("degenerate"), "{stderr}");
}

#[test]
fn test_crop_outside_the_cube_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);

    // The default crop is far outside a 16x20 cube.
    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyse",
            "--data", &data.display().to_string(),
            "--no-plots",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("--crop-rows"), "{stderr}");
}

#[test]
fn test_missing_data_file_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = tmp_dir.path().join("nope.h5");

    let cmd = hvc_stability()
        .args(["analyse", "--data", &data.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("doesn't exist"), "{stderr}");
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);
    let output_dir = tmp_dir.path().join("figures");

    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyse",
            "--data", &data.display().to_string(),
            "--output-dir", &output_dir.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(!output_dir.exists());
}

#[test]
fn test_saved_toml_reproduces_the_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_cloud(tmp_dir.path(), 5.0);
    let toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = hvc_stability()
        .args([
            "analyse",
            "--data", &data.display().to_string(),
            "--crop-rows", "4", "12",
            "--crop-cols", "2", "18",
            "--velocity-min", "-230000",
            "--no-plots",
            "--dry-run",
            "--save-toml", &toml.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let contents = std::fs::read_to_string(&toml).unwrap();
    assert!(contents.contains("velocity_min = -230000"), "{contents}");
    assert!(contents.contains("no_plots = true"), "{contents}");

    // Now run from the file alone.
    let cmd = hvc_stability()
        .args(["analyse", &toml.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Gaussian fit"), "{stdout}");
}

#[test]
fn test_unknown_arg_file_type_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("args.ini");
    let mut f = File::create(&arg_file).unwrap();
    writeln!(f, "rms = 0.1").unwrap();

    let cmd = hvc_stability()
        .args(["analyse", &arg_file.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("toml, json"), "{stderr}");
}
