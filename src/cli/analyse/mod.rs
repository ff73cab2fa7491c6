// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arguments for the `analyse` subcommand.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    constants::*,
    cube::{CropWindow, VelocityWindow},
    params::AnalysisParams,
    HvcError,
};

lazy_static::lazy_static! {
    static ref DATA_HELP: String =
        format!("Path to the HDF5 file containing the cube. Default: {DEFAULT_DATA_FILE}");

    static ref TEMPERATURE_DATASET_HELP: String =
        format!("The name of the 3D brightness-temperature dataset (channel, row, column) [K]. Default: {DEFAULT_TEMPERATURE_DATASET}");

    static ref VELOCITY_DATASET_HELP: String =
        format!("The name of the 1D velocity dataset, one value per channel [m/s]. Default: {DEFAULT_VELOCITY_DATASET}");

    static ref VELOCITY_MIN_HELP: String =
        format!("Only channels with velocities strictly greater than this are used [m/s]. Default: {DEFAULT_VELOCITY_MIN}");

    static ref VELOCITY_MAX_HELP: String =
        format!("Only channels with velocities strictly less than this are used [m/s]. Default: {DEFAULT_VELOCITY_MAX}");

    static ref RMS_HELP: String =
        format!("The noise rms of the cube [K]. Default: {DEFAULT_RMS}");

    static ref CLIP_SIGMA_HELP: String =
        format!("Voxels fainter than this many multiples of the rms are set to zero. Default: {DEFAULT_CLIP_SIGMA}");

    static ref CROP_ROWS_HELP: String =
        format!("The first and one-past-the-last row (y) of the cloud. Default: {} {}", DEFAULT_CROP_ROWS[0], DEFAULT_CROP_ROWS[1]);

    static ref CROP_COLS_HELP: String =
        format!("The first and one-past-the-last column (x) of the cloud. Default: {} {}", DEFAULT_CROP_COLS[0], DEFAULT_CROP_COLS[1]);

    static ref CHANNEL_WIDTH_HELP: String =
        format!("The channel separation of the cube [km/s]. Default: {DEFAULT_CHANNEL_WIDTH}");

    static ref LATITUDE_HELP: String =
        format!("The galactic latitude of the cloud [degrees]. Default: {DEFAULT_LATITUDE_DEG}");

    static ref EXTENT_PIXELS_HELP: String =
        format!("Two pixel coordinates spanning the cloud on the sky. Default: {} {}", DEFAULT_EXTENT_PIXELS[0], DEFAULT_EXTENT_PIXELS[1]);

    static ref PLATE_SCALE_HELP: String =
        format!("The plate scale of the cube, as this many degrees per this many pixels. Default: {DEFAULT_PLATE_SCALE_DEG} {DEFAULT_PLATE_SCALE_PIXELS}");

    static ref MAX_DISTANCE_HELP: String =
        format!("Cloud distances from 1 kpc to this many kpc are tried, in 1 kpc steps. At most {MAX_DISTANCE_LIMIT_KPC}. Default: {DEFAULT_MAX_DISTANCE_KPC}");

    static ref INITIAL_AMPLITUDE_HELP: String =
        format!("The amplitude the Gaussian fit starts from [K]. Default: {DEFAULT_INITIAL_AMPLITUDE}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct AnalyseArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(short, long, help = DATA_HELP.as_str(), help_heading = "INPUT DATA")]
    pub(super) data: Option<PathBuf>,

    #[clap(long, help = TEMPERATURE_DATASET_HELP.as_str(), help_heading = "INPUT DATA")]
    pub(super) temperature_dataset: Option<String>,

    #[clap(long, help = VELOCITY_DATASET_HELP.as_str(), help_heading = "INPUT DATA")]
    pub(super) velocity_dataset: Option<String>,

    #[clap(long, allow_hyphen_values = true, help = VELOCITY_MIN_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) velocity_min: Option<f64>,

    #[clap(long, allow_hyphen_values = true, help = VELOCITY_MAX_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) velocity_max: Option<f64>,

    #[clap(long, number_of_values = 2, help = CROP_ROWS_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) crop_rows: Option<Vec<usize>>,

    #[clap(long, number_of_values = 2, help = CROP_COLS_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) crop_cols: Option<Vec<usize>>,

    #[clap(long, allow_hyphen_values = true, help = RMS_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) rms: Option<f64>,

    #[clap(long, allow_hyphen_values = true, help = CLIP_SIGMA_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) clip_sigma: Option<f64>,

    #[clap(long, allow_hyphen_values = true, help = INITIAL_AMPLITUDE_HELP.as_str(), help_heading = "FITTING")]
    pub(super) initial_amplitude: Option<f64>,

    #[clap(long, allow_hyphen_values = true, help = CHANNEL_WIDTH_HELP.as_str(), help_heading = "CLOUD")]
    pub(super) channel_width: Option<f64>,

    #[clap(long, allow_hyphen_values = true, help = LATITUDE_HELP.as_str(), help_heading = "CLOUD")]
    pub(super) latitude: Option<f64>,

    #[clap(long, number_of_values = 2, allow_hyphen_values = true, help = EXTENT_PIXELS_HELP.as_str(), help_heading = "CLOUD")]
    pub(super) extent_pixels: Option<Vec<f64>>,

    #[clap(long, number_of_values = 2, allow_hyphen_values = true, help = PLATE_SCALE_HELP.as_str(), help_heading = "CLOUD")]
    pub(super) plate_scale: Option<Vec<f64>>,

    #[clap(long, help = MAX_DISTANCE_HELP.as_str(), help_heading = "CLOUD")]
    pub(super) max_distance: Option<usize>,

    /// The directory to write figures to. It is created if it doesn't exist.
    /// Default: the current directory.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output_dir: Option<PathBuf>,

    /// Don't draw any figures.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) no_plots: bool,
}

impl AnalyseArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<AnalyseArgs, HvcError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let AnalyseArgs {
                args_file: _,
                data,
                temperature_dataset,
                velocity_dataset,
                velocity_min,
                velocity_max,
                crop_rows,
                crop_cols,
                rms,
                clip_sigma,
                initial_amplitude,
                channel_width,
                latitude,
                extent_pixels,
                plate_scale,
                max_distance,
                output_dir,
                no_plots,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(AnalyseArgs {
                args_file: None,
                data: cli_args.data.or(data),
                temperature_dataset: cli_args.temperature_dataset.or(temperature_dataset),
                velocity_dataset: cli_args.velocity_dataset.or(velocity_dataset),
                velocity_min: cli_args.velocity_min.or(velocity_min),
                velocity_max: cli_args.velocity_max.or(velocity_max),
                crop_rows: cli_args.crop_rows.or(crop_rows),
                crop_cols: cli_args.crop_cols.or(crop_cols),
                rms: cli_args.rms.or(rms),
                clip_sigma: cli_args.clip_sigma.or(clip_sigma),
                initial_amplitude: cli_args.initial_amplitude.or(initial_amplitude),
                channel_width: cli_args.channel_width.or(channel_width),
                latitude: cli_args.latitude.or(latitude),
                extent_pixels: cli_args.extent_pixels.or(extent_pixels),
                plate_scale: cli_args.plate_scale.or(plate_scale),
                max_distance: cli_args.max_distance.or(max_distance),
                output_dir: cli_args.output_dir.or(output_dir),
                no_plots: cli_args.no_plots || no_plots,
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<AnalysisParams, AnalyseArgsError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data,
            temperature_dataset,
            velocity_dataset,
            velocity_min,
            velocity_max,
            crop_rows,
            crop_cols,
            rms,
            clip_sigma,
            initial_amplitude,
            channel_width,
            latitude,
            extent_pixels,
            plate_scale,
            max_distance,
            output_dir,
            no_plots,
        } = self;

        let data_file = data.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
        if !data_file.exists() {
            return Err(AnalyseArgsError::DataFileDoesntExist(data_file));
        }
        let temperature_dataset =
            temperature_dataset.unwrap_or_else(|| DEFAULT_TEMPERATURE_DATASET.to_string());
        let velocity_dataset =
            velocity_dataset.unwrap_or_else(|| DEFAULT_VELOCITY_DATASET.to_string());

        let min = velocity_min.unwrap_or(DEFAULT_VELOCITY_MIN);
        let max = velocity_max.unwrap_or(DEFAULT_VELOCITY_MAX);
        // NaNs fail this comparison too.
        if !(min < max) {
            return Err(AnalyseArgsError::BadVelocityWindow { min, max });
        }
        let velocity_window = VelocityWindow { min, max };

        let [row_start, row_end] = pair("crop_rows", crop_rows, DEFAULT_CROP_ROWS)?;
        if row_start >= row_end {
            return Err(AnalyseArgsError::EmptyCrop {
                axis: "rows",
                start: row_start,
                end: row_end,
            });
        }
        let [col_start, col_end] = pair("crop_cols", crop_cols, DEFAULT_CROP_COLS)?;
        if col_start >= col_end {
            return Err(AnalyseArgsError::EmptyCrop {
                axis: "cols",
                start: col_start,
                end: col_end,
            });
        }
        let crop = CropWindow {
            rows: row_start..row_end,
            cols: col_start..col_end,
        };

        let rms = positive("rms", rms.unwrap_or(DEFAULT_RMS))?;
        let clip_sigma = clip_sigma.unwrap_or(DEFAULT_CLIP_SIGMA);
        if !clip_sigma.is_finite() || clip_sigma < 0.0 {
            return Err(AnalyseArgsError::BadClipSigma(clip_sigma));
        }
        let initial_amplitude = initial_amplitude.unwrap_or(DEFAULT_INITIAL_AMPLITUDE);
        if !initial_amplitude.is_finite() {
            return Err(AnalyseArgsError::NotFinite {
                arg: "initial_amplitude",
                value: initial_amplitude,
            });
        }

        let channel_width = positive("channel_width", channel_width.unwrap_or(DEFAULT_CHANNEL_WIDTH))?;
        let latitude = latitude.unwrap_or(DEFAULT_LATITUDE_DEG);
        if !latitude.is_finite() {
            return Err(AnalyseArgsError::NotFinite {
                arg: "latitude",
                value: latitude,
            });
        }
        let extent_pixels = pair("extent_pixels", extent_pixels, DEFAULT_EXTENT_PIXELS)?;
        let [plate_scale_deg, plate_scale_pixels] = pair(
            "plate_scale",
            plate_scale,
            [DEFAULT_PLATE_SCALE_DEG, DEFAULT_PLATE_SCALE_PIXELS],
        )?;
        if plate_scale_pixels == 0.0 || !plate_scale_pixels.is_finite() {
            return Err(AnalyseArgsError::BadPlateScale(plate_scale_pixels));
        }
        let max_distance_kpc = max_distance.unwrap_or(DEFAULT_MAX_DISTANCE_KPC);
        if max_distance_kpc == 0 {
            return Err(AnalyseArgsError::NoDistances);
        }
        if max_distance_kpc > MAX_DISTANCE_LIMIT_KPC {
            return Err(AnalyseArgsError::TooManyDistances {
                max: max_distance_kpc,
                limit: MAX_DISTANCE_LIMIT_KPC,
            });
        }

        let plot_dir = if no_plots {
            if output_dir.is_some() {
                "An output directory was given, but --no-plots means nothing will be written to it"
                    .warn();
            }
            None
        } else {
            let dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
            if dir.exists() && !dir.is_dir() {
                return Err(AnalyseArgsError::OutputDirNotADir(dir));
            }
            Some(dir)
        };

        let mut printer = InfoPrinter::new("Input data".into());
        printer.push_line(format!("File: {}", data_file.display()).into());
        printer.push_line(
            format!("Datasets: {temperature_dataset} (cube), {velocity_dataset} (velocity)")
                .into(),
        );
        printer.display();

        let mut printer = InfoPrinter::new("Analysis parameters".into());
        printer.push_block(vec![
            format!("Velocity window: ({min}, {max}) m/s").into(),
            format!("Crop: rows {:?}, cols {:?}", crop.rows, crop.cols).into(),
            format!("Clipping below {clip_sigma} × {rms} K").into(),
        ]);
        printer.push_block(vec![
            format!("Channel width: {channel_width} km/s").into(),
            format!("Latitude: {latitude}°").into(),
            format!(
                "Extent: pixels {} to {}, at {plate_scale_deg}° per {plate_scale_pixels} pixels",
                extent_pixels[0], extent_pixels[1]
            )
            .into(),
            format!("Distances: 1 to {max_distance_kpc} kpc").into(),
        ]);
        match plot_dir.as_ref() {
            Some(dir) => printer.push_line(format!("Writing figures to {}", dir.display()).into()),
            None => printer.push_line("Not drawing figures".into()),
        }
        printer.display();

        display_warnings();

        Ok(AnalysisParams {
            data_file,
            temperature_dataset,
            velocity_dataset,
            velocity_window,
            crop,
            rms,
            clip_sigma,
            channel_width,
            latitude,
            extent_pixels,
            plate_scale_deg,
            plate_scale_pixels,
            max_distance_kpc,
            initial_amplitude,
            plot_dir,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HvcError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        if let Some(dir) = params.plot_dir.as_ref() {
            std::fs::create_dir_all(dir)?;
        }
        params.run()?;
        Ok(())
    }
}

/// Unpack a two-value argument, falling back to `default` if it wasn't given.
/// Only argument files can supply the wrong number of values; clap catches
/// this on the command line.
fn pair<T: Copy>(
    arg: &'static str,
    values: Option<Vec<T>>,
    default: [T; 2],
) -> Result<[T; 2], AnalyseArgsError> {
    match values.as_deref() {
        None => Ok(default),
        Some(&[a, b]) => Ok([a, b]),
        Some(v) => Err(AnalyseArgsError::NotAPair { arg, got: v.len() }),
    }
}

fn positive(arg: &'static str, value: f64) -> Result<f64, AnalyseArgsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AnalyseArgsError::NotPositive { arg, value })
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum AnalyseArgsError {
    #[error("The data file '{}' doesn't exist", .0.display())]
    DataFileDoesntExist(PathBuf),

    #[error("The velocity window is empty; the minimum ({min}) must be less than the maximum ({max})")]
    BadVelocityWindow { min: f64, max: f64 },

    #[error("The {axis} crop is empty; the start ({start}) must be less than the end ({end})")]
    EmptyCrop {
        axis: &'static str,
        start: usize,
        end: usize,
    },

    #[error("'{arg}' needs exactly 2 values, but {got} were given")]
    NotAPair { arg: &'static str, got: usize },

    #[error("'{arg}' must be finite and positive, but it was {value}")]
    NotPositive { arg: &'static str, value: f64 },

    #[error("'{arg}' must be finite, but it was {value}")]
    NotFinite { arg: &'static str, value: f64 },

    #[error("The clipping multiplier must be finite and non-negative, but it was {0}")]
    BadClipSigma(f64),

    #[error("The plate scale's pixel count must be finite and non-zero, but it was {0}")]
    BadPlateScale(f64),

    #[error("The maximum distance must be at least 1 kpc")]
    NoDistances,

    #[error("The maximum distance ({max} kpc) is more than the limit of {limit} kpc")]
    TooManyDistances { max: usize, limit: usize },

    #[error("The output directory '{}' exists but isn't a directory", .0.display())]
    OutputDirNotADir(PathBuf),
}
