// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use atlas_camera::{
    camera::CameraConfig,
    image::{FourCC, JPEG, NV12, RGB3},
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for delivered frames.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Raw NV12 frames exactly as the sensor delivers them
    Nv12,
    /// JPEG stream encoded at fixed quality 100
    Jpeg,
    /// Packed 24-bit RGB decoded from the JPEG stream
    Rgb,
}

impl From<OutputFormat> for FourCC {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Nv12 => NV12,
            OutputFormat::Jpeg => JPEG,
            OutputFormat::Rgb => RGB3,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Camera device id
    #[arg(short, long, env = "CAMERA", default_value = "0")]
    pub camera: u32,

    /// Camera resolution
    #[arg(
        long,
        env = "CAMERA_SIZE",
        value_delimiter = ' ',
        num_args = 2,
        default_value = "1280 720"
    )]
    pub camera_size: Vec<u32>,

    /// Camera frames per second
    #[arg(long, env = "CAMERA_FPS", default_value = "5")]
    pub camera_fps: u32,

    /// Output format for delivered frames
    #[arg(short, long, env = "FORMAT", value_enum, default_value = "jpeg")]
    pub format: OutputFormat,

    /// Number of frames to grab before exiting
    #[arg(short = 'n', long, env = "FRAMES", default_value = "30")]
    pub frames: u32,

    /// Directory to write numbered frame dumps into
    #[arg(long, env = "DUMP")]
    pub dump: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<&Args> for CameraConfig {
    fn from(args: &Args) -> Self {
        CameraConfig {
            id: args.camera,
            width: args.camera_size[0],
            height: args.camera_size[1],
            fps: args.camera_fps,
            format: args.format.into(),
        }
    }
}
