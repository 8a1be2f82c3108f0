// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Error types for the capture and conversion pipeline.
//!
//! Each external boundary reports its own fault type: [`DriverFault`] for the
//! camera driver, [`EngineFault`] for the JPEG engine, and [`DecodeFault`] for
//! the software decoder. [`CameraError`] is the single error surfaced by the
//! public API and carries enough context to tell which boundary failed and
//! with what status.

use crate::image::FourCC;
use thiserror::Error;

/// Status code returned by a failed camera driver call.
///
/// The driver control surface reports plain integer statuses; zero is success
/// and anything else is carried through unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("driver status {0}")]
pub struct DriverFault(pub i32);

/// Fault raised by a JPEG engine handle for a single encode request.
#[derive(Error, Debug)]
pub enum EngineFault {
    /// The engine answered the control call with a nonzero status.
    #[error("engine control status {0}")]
    Status(i32),

    /// The software codec rejected the request.
    #[error(transparent)]
    Codec(#[from] turbojpeg::Error),
}

/// Fault raised by the JPEG decoder for a stream it cannot decode.
#[derive(Error, Debug)]
pub enum DecodeFault {
    /// The stream is truncated or not a JPEG at all.
    #[error("truncated or malformed stream")]
    Malformed,

    /// The software codec rejected the stream.
    #[error(transparent)]
    Codec(#[from] turbojpeg::Error),
}

/// Errors surfaced by the capture and conversion pipeline.
///
/// Operations fail fast: the first boundary fault maps to exactly one variant
/// and nothing retries internally. Conversion errors leave the destination
/// buffer unwritten.
#[derive(Error, Debug)]
pub enum CameraError {
    /// The device did not report a closed status when opening.
    #[error("camera {id} is busy")]
    DeviceBusy { id: u32 },

    /// The driver refused to open the device.
    #[error("open camera {id} failed: {fault}")]
    DeviceOpenFailed { id: u32, fault: DriverFault },

    /// The driver refused to close the device.
    #[error("close camera {id} failed: {fault}")]
    DeviceCloseFailed { id: u32, fault: DriverFault },

    /// A property could not be applied; the device has been released.
    #[error("configure camera {id} failed on {property}: {fault}")]
    ConfigurationFailed {
        id: u32,
        property: &'static str,
        fault: DriverFault,
    },

    /// The driver failed to deliver a frame.
    #[error("read frame from camera {id} failed: {fault}")]
    FrameReadFailed { id: u32, fault: DriverFault },

    /// No connection to the JPEG engine could be established.
    #[error("jpeg engine unavailable")]
    EngineUnavailable,

    /// The engine faulted while processing an encode request.
    #[error("jpeg encode failed: {0}")]
    CodecError(#[from] EngineFault),

    /// The software decoder rejected the stream.
    #[error("jpeg decode failed: {0}")]
    DecodeError(#[from] DecodeFault),

    /// The destination cannot hold the converted image.
    #[error("need {needed} bytes but only {capacity} are available")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// The session is not configured for a format this pipeline can produce.
    #[error("unsupported image format {format}")]
    InvalidFormat { format: FourCC },

    /// The frame buffer reservation was refused by the allocator.
    #[error("failed to allocate {size} byte frame buffer")]
    AllocationFailed { size: usize },
}
