// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # Atlas Camera Library
//!
//! This library provides frame acquisition and format conversion for
//! embedded accelerator boards. It manages the encoder-aligned capture
//! buffer, drives the camera through a narrow driver boundary, and converts
//! frames between the sensor's native NV12 and the delivery formats.
//!
//! ## Features
//!
//! - **Aligned Frame Buffers**: NV12 buffers with 16 byte row stride, page
//!   multiple capacity, and a 128 byte base address as the JPEG engine
//!   requires, reused across frames.
//! - **JPEG Encoding**: The engine is modelled as a connect-per-request
//!   boundary; a software implementation backed by turbojpeg with SIMD runs
//!   the same pipeline on machines without the accelerator.
//! - **RGB Delivery**: JPEG streams decode into a separate caller buffer,
//!   never aliasing the raw capture.
//! - **Capture Sessions**: [`camera::CameraSession`] owns the open,
//!   configure, read, close lifecycle with fail-fast device release.
//! - **Simulation**: [`sim::SimCamera`] is a deterministic software sensor
//!   for development and testing without hardware.
//!
//! ## Example
//!
//! ```no_run
//! use atlas_camera::{
//!     camera::{CameraConfig, CameraSession},
//!     image::JPEG,
//!     sim::SimCamera,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Capture sessions work the same over real hardware or the simulator
//! let mut session = CameraSession::new(SimCamera::new());
//! session.open(CameraConfig {
//!     format: JPEG,
//!     ..CameraConfig::default()
//! })?;
//!
//! let mut buf = vec![0u8; 1280 * 720 * 3];
//! let frame = session.read(&mut buf)?;
//! println!("encoded {} bytes", frame.len);
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Requirements
//!
//! - **Linux**: any platform with libjpeg-turbo for the software codec path
//! - **Hardware Acceleration**: boards with a JPEG codec engine plug in
//!   through the [`codec::JpegEngine`] boundary

pub mod camera;
pub mod codec;
pub mod error;
pub mod image;
pub mod sim;
