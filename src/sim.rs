// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Simulated camera driver producing a deterministic test pattern.

use crate::{
    camera::{CameraDriver, CameraProperty, CameraStatus},
    error::DriverFault,
    image::{align_up, NV12, ROW_ALIGN},
};
use tracing::debug;

/// Software camera delivering a moving NV12 gradient.
///
/// Stands in for the sensor wherever real hardware is absent: tests, benches,
/// and the demo grabber. Frames are stride padded exactly like the vendor
/// driver delivers them, and a frame counter shifts the pattern so
/// consecutive reads differ.
pub struct SimCamera {
    width: u32,
    height: u32,
    fps: u32,
    status: CameraStatus,
    frames: u64,
}

impl SimCamera {
    /// Creates a closed simulated device with 720p geometry.
    pub fn new() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 5,
            status: CameraStatus::Closed,
            frames: 0,
        }
    }

    /// Frames delivered since the device was created.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Configured frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDriver for SimCamera {
    fn query_status(&mut self, _id: u32) -> CameraStatus {
        self.status
    }

    fn open(&mut self, id: u32) -> Result<(), DriverFault> {
        if self.status != CameraStatus::Closed {
            return Err(DriverFault(-1));
        }
        debug!(id, "sim device opened");
        self.status = CameraStatus::Opened;
        Ok(())
    }

    fn close(&mut self, id: u32) -> Result<(), DriverFault> {
        if self.status != CameraStatus::Opened {
            return Err(DriverFault(-1));
        }
        debug!(id, "sim device closed");
        self.status = CameraStatus::Closed;
        Ok(())
    }

    fn set_property(&mut self, _id: u32, prop: CameraProperty) -> Result<(), DriverFault> {
        if self.status != CameraStatus::Opened {
            return Err(DriverFault(-1));
        }
        match prop {
            CameraProperty::Fps(fps) => self.fps = fps,
            // The sensor only produces NV12.
            CameraProperty::ImageFormat(format) if format != NV12 => {
                return Err(DriverFault(-3));
            }
            CameraProperty::ImageFormat(_) => {}
            CameraProperty::Resolution { width, height } => {
                self.width = width;
                self.height = height;
            }
            CameraProperty::CapMode(_) => {}
        }
        Ok(())
    }

    fn read_frame(&mut self, _id: u32, dst: &mut [u8]) -> Result<usize, DriverFault> {
        if self.status != CameraStatus::Opened {
            return Err(DriverFault(-1));
        }
        let w = self.width as usize;
        let h = self.height as usize;
        let stride = align_up(w, ROW_ALIGN);
        let total = stride * h * 3 / 2;
        if dst.len() < total {
            return Err(DriverFault(-2));
        }

        // Diagonal luma gradient shifted by the frame counter, slowly varying
        // chroma planes.
        let phase = (self.frames % 256) as usize;
        for row in 0..h {
            for (col, px) in dst[row * stride..row * stride + w].iter_mut().enumerate() {
                *px = ((row + col + phase) & 0xFF) as u8;
            }
        }
        let uv_base = stride * h;
        for row in 0..h / 2 {
            let line = &mut dst[uv_base + row * stride..uv_base + row * stride + w];
            for (col, px) in line.iter_mut().enumerate() {
                *px = if col % 2 == 0 {
                    ((128 + row + phase) & 0xFF) as u8
                } else {
                    ((64 + col / 2 + phase) & 0xFF) as u8
                };
            }
        }

        self.frames += 1;
        Ok(total)
    }
}
