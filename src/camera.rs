// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Camera session over an injected driver and codec stack.
//!
//! [`CameraSession`] owns the device lifecycle: open verifies the device is
//! closed, applies the capture properties in a fixed order, and releases the
//! device again if any property fails. Reads dispatch on the configured
//! output format, reusing one encoder-aligned NV12 buffer across frames.
//! The driver, JPEG engine, and decoder are all trait objects handed in at
//! construction, so the session runs unchanged against real hardware, the
//! simulator, or test fakes.

use crate::{
    codec::{jpeg_to_rgb, yuv_to_jpeg, JpegDecoder, JpegEngine, TurboJpegDecoder, TurboJpegEngine},
    error::{CameraError, DriverFault},
    image::{FourCC, FrameBuffer, JPEG, NV12, RGB3},
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use unix_ts::Timestamp;

/// Device status reported by [`CameraDriver::query_status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraStatus {
    /// The device is free and can be opened.
    Closed,
    /// The device is held by a session.
    Opened,
    /// The device is in a fault state and needs a reset.
    Error,
}

/// Capture scheduling mode applied while configuring the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapMode {
    /// The sensor delivers frames continuously.
    Active,
    /// Frames are produced only on demand.
    Passive,
}

/// One property application in the configuration sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraProperty {
    /// Capture frame rate.
    Fps(u32),
    /// Sensor output pixel format.
    ImageFormat(FourCC),
    /// Capture resolution in pixels.
    Resolution { width: u32, height: u32 },
    /// Capture scheduling mode.
    CapMode(CapMode),
}

impl CameraProperty {
    /// Short name used in logs and configuration errors.
    pub fn name(&self) -> &'static str {
        match self {
            CameraProperty::Fps(_) => "fps",
            CameraProperty::ImageFormat(_) => "image format",
            CameraProperty::Resolution { .. } => "resolution",
            CameraProperty::CapMode(_) => "capture mode",
        }
    }
}

/// Camera driver control surface.
///
/// Calls mirror the vendor device interface one to one and block until the
/// driver answers. Nonzero driver statuses arrive as [`DriverFault`].
pub trait CameraDriver {
    /// Reports the current device state.
    fn query_status(&mut self, id: u32) -> CameraStatus;

    /// Takes ownership of the device.
    fn open(&mut self, id: u32) -> Result<(), DriverFault>;

    /// Releases the device.
    fn close(&mut self, id: u32) -> Result<(), DriverFault>;

    /// Applies one capture property.
    fn set_property(&mut self, id: u32, prop: CameraProperty) -> Result<(), DriverFault>;

    /// Reads one frame into `dst`, returning the byte count delivered.
    fn read_frame(&mut self, id: u32, dst: &mut [u8]) -> Result<usize, DriverFault>;
}

/// Capture configuration applied when opening a session.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Device id.
    pub id: u32,
    /// Capture width in pixels.
    pub width: u32,
    /// Capture height in pixels.
    pub height: u32,
    /// Capture frame rate.
    pub fps: u32,
    /// Output format delivered by [`CameraSession::read`].
    pub format: FourCC,
}

impl Default for CameraConfig {
    /// 720p NV12 at 5 fps on camera 0, the sensor bring-up configuration.
    fn default() -> Self {
        Self {
            id: 0,
            width: 1280,
            height: 720,
            fps: 5,
            format: NV12,
        }
    }
}

/// Metadata for one delivered frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Bytes written into the caller's buffer.
    pub len: usize,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Format of the delivered bytes.
    pub format: FourCC,
    /// Capture completion time.
    pub timestamp: Timestamp,
}

struct ActiveState {
    config: CameraConfig,
    yuv: FrameBuffer,
}

/// Synchronous capture session.
///
/// One thread owns the session; every call blocks until the underlying
/// boundary answers. Dropping an open session releases the device.
///
/// # Example
///
/// ```no_run
/// use atlas_camera::{camera::{CameraConfig, CameraSession}, sim::SimCamera};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = CameraSession::new(SimCamera::new());
/// session.open(CameraConfig::default())?;
///
/// let mut buf = vec![0u8; 1_382_400];
/// let frame = session.read(&mut buf)?;
/// println!("got {} bytes of {}", frame.len, frame.format);
///
/// session.close()?;
/// # Ok(())
/// # }
/// ```
pub struct CameraSession<D: CameraDriver> {
    driver: D,
    engine: Box<dyn JpegEngine>,
    decoder: Box<dyn JpegDecoder>,
    state: Option<ActiveState>,
    scratch: Vec<u8>,
    opened: bool,
}

impl<D: CameraDriver> CameraSession<D> {
    /// Creates a session over `driver` with the software codec stack.
    pub fn new(driver: D) -> Self {
        Self::with_codec(driver, Box::new(TurboJpegEngine), Box::new(TurboJpegDecoder))
    }

    /// Creates a session with caller-supplied engine and decoder boundaries.
    ///
    /// Construction performs no device or engine calls.
    pub fn with_codec(
        driver: D,
        engine: Box<dyn JpegEngine>,
        decoder: Box<dyn JpegDecoder>,
    ) -> Self {
        Self {
            driver,
            engine,
            decoder,
            state: None,
            scratch: Vec::new(),
            opened: false,
        }
    }

    /// Whether the device is currently open.
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// The configuration from the most recent open.
    pub fn config(&self) -> Option<&CameraConfig> {
        self.state.as_ref().map(|s| &s.config)
    }

    /// Opens and configures the device.
    ///
    /// The session buffer is reconciled with the requested dimensions first,
    /// so reopening at a new resolution reallocates instead of keeping the
    /// previous geometry. Properties are applied in a fixed order; the first
    /// failure releases the device so nothing stays half configured.
    ///
    /// # Errors
    ///
    /// [`CameraError::DeviceBusy`] when the device is not closed,
    /// [`CameraError::DeviceOpenFailed`] when the driver refuses it, and
    /// [`CameraError::ConfigurationFailed`] when a property cannot be
    /// applied.
    pub fn open(&mut self, config: CameraConfig) -> Result<(), CameraError> {
        self.reconcile(&config)?;
        let id = config.id;

        let status = self.driver.query_status(id);
        if status != CameraStatus::Closed {
            warn!(id, ?status, "device is not closed");
            return Err(CameraError::DeviceBusy { id });
        }

        self.driver.open(id).map_err(|fault| {
            warn!(id, %fault, "device open refused");
            CameraError::DeviceOpenFailed { id, fault }
        })?;

        if let Err(err) = self.configure() {
            if let Err(fault) = self.driver.close(id) {
                warn!(id, %fault, "device release after failed configure failed");
            }
            return Err(err);
        }

        info!(
            id,
            width = config.width,
            height = config.height,
            fps = config.fps,
            format = %config.format,
            "camera opened"
        );
        self.opened = true;
        Ok(())
    }

    /// Points the session at `config`, reallocating the frame buffer only
    /// when the requested geometry differs from the current one.
    fn reconcile(&mut self, config: &CameraConfig) -> Result<(), CameraError> {
        let reuse = self
            .state
            .as_ref()
            .is_some_and(|s| s.yuv.width() == config.width && s.yuv.height() == config.height);
        if reuse {
            if let Some(state) = self.state.as_mut() {
                state.config = config.clone();
            }
        } else {
            let yuv = FrameBuffer::new(config.width, config.height)?;
            self.state = Some(ActiveState {
                config: config.clone(),
                yuv,
            });
        }
        Ok(())
    }

    /// Applies the capture properties in the order the device requires.
    fn configure(&mut self) -> Result<(), CameraError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let id = state.config.id;
        let props = [
            CameraProperty::Fps(state.config.fps),
            CameraProperty::ImageFormat(NV12),
            CameraProperty::Resolution {
                width: state.config.width,
                height: state.config.height,
            },
            CameraProperty::CapMode(CapMode::Active),
        ];
        for prop in props {
            self.driver.set_property(id, prop).map_err(|fault| {
                warn!(id, property = prop.name(), %fault, "set property failed");
                CameraError::ConfigurationFailed {
                    id,
                    property: prop.name(),
                    fault,
                }
            })?;
            debug!(id, property = prop.name(), "property applied");
        }
        Ok(())
    }

    /// Reads one frame into `dst` in the configured output format.
    ///
    /// NV12 frames go straight from the driver into `dst`. JPEG frames are
    /// captured into the session buffer and encoded through the engine. RGB
    /// frames additionally decode the JPEG stream into `dst`, so the raw
    /// capture and the decoded image never alias the same memory.
    ///
    /// # Errors
    ///
    /// [`CameraError::InvalidFormat`] for formats the pipeline cannot
    /// produce (the driver is not touched),
    /// [`CameraError::FrameReadFailed`] when the driver fails the capture,
    /// and the conversion errors from [`yuv_to_jpeg`] and [`jpeg_to_rgb`].
    pub fn read(&mut self, dst: &mut [u8]) -> Result<Frame, CameraError> {
        let Some(state) = self.state.as_mut() else {
            return Err(CameraError::InvalidFormat {
                format: FourCC([0; 4]),
            });
        };
        let id = state.config.id;
        let format = state.config.format;

        let len = match format {
            NV12 => Self::capture(&mut self.driver, id, dst)?,
            JPEG => Self::capture_jpeg(
                &mut self.driver,
                self.engine.as_ref(),
                id,
                &mut state.yuv,
                dst,
            )?,
            RGB3 => {
                // Worst case for the encoded stream within one frame budget.
                let cap = state.config.width as usize * state.config.height as usize * 3;
                self.scratch.resize(cap, 0);
                let jpeg_len = Self::capture_jpeg(
                    &mut self.driver,
                    self.engine.as_ref(),
                    id,
                    &mut state.yuv,
                    &mut self.scratch,
                )?;
                jpeg_to_rgb(dst, &self.scratch[..jpeg_len], self.decoder.as_ref())?
            }
            format => {
                warn!(%format, "unsupported output format");
                return Err(CameraError::InvalidFormat { format });
            }
        };

        let frame = Frame {
            len,
            width: state.config.width,
            height: state.config.height,
            format,
            timestamp: timestamp_now(),
        };
        debug!(len = frame.len, format = %frame.format, "frame delivered");
        Ok(frame)
    }

    /// Captures one raw NV12 frame directly into `dst`.
    fn capture(driver: &mut D, id: u32, dst: &mut [u8]) -> Result<usize, CameraError> {
        driver.read_frame(id, dst).map_err(|fault| {
            warn!(id, %fault, "frame read failed");
            CameraError::FrameReadFailed { id, fault }
        })
    }

    /// Captures into the session buffer and encodes the frame into `dst`.
    fn capture_jpeg(
        driver: &mut D,
        engine: &dyn JpegEngine,
        id: u32,
        yuv: &mut FrameBuffer,
        dst: &mut [u8],
    ) -> Result<usize, CameraError> {
        // The driver may fill the whole window; the actual frame length is
        // whatever it reports back.
        let capacity = yuv.buf_size();
        yuv.set_image_size(capacity);
        let read = Self::capture(driver, id, yuv.data_mut())?;
        yuv.set_image_size(read.min(capacity));
        debug!(read, "raw frame captured");

        yuv_to_jpeg(dst, yuv, engine)
    }

    /// Releases the device. The session buffer is kept so reopening at the
    /// same geometry does not reallocate.
    pub fn close(&mut self) -> Result<(), CameraError> {
        if !self.opened {
            return Ok(());
        }
        let id = self.state.as_ref().map(|s| s.config.id).unwrap_or_default();
        self.driver.close(id).map_err(|fault| {
            warn!(id, %fault, "device close failed");
            CameraError::DeviceCloseFailed { id, fault }
        })?;
        self.opened = false;
        info!(id, "camera closed");
        Ok(())
    }
}

impl<D: CameraDriver> Drop for CameraSession<D> {
    fn drop(&mut self) {
        if self.opened {
            if let Err(err) = self.close() {
                warn!(%err, "closing camera on drop failed");
            }
        }
    }
}

fn timestamp_now() -> Timestamp {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Timestamp::new(now.as_secs() as i64, now.subsec_nanos())
}
