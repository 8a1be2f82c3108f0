// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! JPEG engine and decoder boundaries with software implementations.
//!
//! The encoder is modelled after a hardware codec engine: a connection is
//! acquired per request through [`JpegEngine::connect`], the request carries
//! the full plane geometry the engine needs to walk the buffer, and the
//! handle is released when it drops. [`TurboJpegEngine`] and
//! [`TurboJpegDecoder`] stand in for the hardware using libjpeg-turbo, so the
//! same conversion paths run on machines without the accelerator.

use crate::{
    error::{CameraError, DecodeFault, EngineFault},
    image::{align_up, FourCC, FrameBuffer, NV12, PAGE_SIZE, ROW_ALIGN},
};
use tracing::{debug, warn};

/// Encode quality applied to every request.
pub const ENCODE_QUALITY: i32 = 100;

/// One synchronous encode request handed to the engine.
///
/// Geometry is the engine's view of the source buffer, not the caller's: odd
/// dimensions are clamped down to even values (the encoder rejects odd
/// geometry, so a one pixel edge is dropped rather than failing the frame),
/// the stride is the 16-aligned clamped width, and `buf_size` is the
/// page-aligned capacity the engine expects for that stride.
pub struct EncodeRequest<'a> {
    /// Image width in pixels, clamped to even.
    pub width: u32,
    /// Image height in pixels, clamped to even.
    pub height: u32,
    /// Allocated rows per plane; the chroma plane begins at
    /// `stride * plane_height`.
    pub plane_height: u32,
    /// Row stride in bytes derived from the clamped width.
    pub stride: usize,
    /// Page-aligned buffer capacity for this geometry.
    pub buf_size: usize,
    /// Encode quality level.
    pub level: i32,
    /// Pixel format of `data`.
    pub format: FourCC,
    /// The full aligned data window of the source buffer.
    pub data: &'a [u8],
}

impl<'a> EncodeRequest<'a> {
    /// Derives the engine's view of `src`.
    pub fn from_buffer(src: &'a FrameBuffer) -> Self {
        let width = src.width() & !1;
        let height = src.height() & !1;
        let stride = align_up(width as usize, ROW_ALIGN);
        let buf_size = align_up(stride * src.height() as usize * 3 / 2, PAGE_SIZE);
        Self {
            width,
            height,
            plane_height: src.height(),
            stride,
            buf_size,
            level: ENCODE_QUALITY,
            format: src.format(),
            data: src.data(),
        }
    }
}

/// Connection factory for the JPEG engine.
///
/// A handle is acquired per conversion call and dropped when the call
/// finishes, so no connection outlives a single request.
pub trait JpegEngine {
    /// Connects to the engine, or `None` when it cannot be reached.
    fn connect(&self) -> Option<Box<dyn EncoderHandle>>;
}

/// One live engine connection.
pub trait EncoderHandle {
    /// Submits an encode request, blocking until the engine produces the
    /// stream or reports a fault.
    fn encode(&mut self, req: &EncodeRequest) -> Result<Vec<u8>, EngineFault>;
}

/// Packed-pixel image produced by a [`JpegDecoder`].
pub struct DecodedImage {
    /// Tightly packed pixel rows.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel.
    pub channels: usize,
}

/// Software JPEG decode boundary.
pub trait JpegDecoder {
    /// Decodes `jpeg` into packed 24-bit RGB.
    fn decode(&self, jpeg: &[u8]) -> Result<DecodedImage, DecodeFault>;
}

/// Software JPEG engine backed by libjpeg-turbo.
///
/// Connecting never fails here; the fallible connect path exists for engines
/// that talk to a real device.
pub struct TurboJpegEngine;

struct TurboJpegHandle;

impl JpegEngine for TurboJpegEngine {
    fn connect(&self) -> Option<Box<dyn EncoderHandle>> {
        Some(Box::new(TurboJpegHandle))
    }
}

impl EncoderHandle for TurboJpegHandle {
    fn encode(&mut self, req: &EncodeRequest) -> Result<Vec<u8>, EngineFault> {
        debug_assert_eq!(req.format, NV12);

        // The descriptor must cover both planes before they are walked.
        let chroma = req.stride * (req.height as usize / 2);
        let last = req.stride * req.plane_height as usize + chroma;
        if req.stride < req.width as usize
            || req.plane_height < req.height
            || req.data.len() < last
        {
            return Err(EngineFault::Status(-1));
        }

        let pixels = nv12_to_i420(req);
        let yuv = turbojpeg::YuvImage {
            pixels: pixels.as_slice(),
            width: req.width as usize,
            align: 1,
            height: req.height as usize,
            subsamp: turbojpeg::Subsamp::Sub2x2,
        };
        let jpeg = turbojpeg::compress_yuv(yuv, req.level)?;
        Ok(jpeg.to_vec())
    }
}

/// Deinterleaves the strided NV12 planes into tight I420 for libjpeg-turbo.
fn nv12_to_i420(req: &EncodeRequest) -> Vec<u8> {
    let w = req.width as usize;
    let h = req.height as usize;
    let stride = req.stride;
    let y_plane = stride * req.plane_height as usize;

    let mut out = vec![0u8; w * h + (w / 2) * (h / 2) * 2];
    let (y_out, uv_out) = out.split_at_mut(w * h);
    for row in 0..h {
        y_out[row * w..(row + 1) * w].copy_from_slice(&req.data[row * stride..row * stride + w]);
    }
    let (u_out, v_out) = uv_out.split_at_mut((w / 2) * (h / 2));
    for row in 0..h / 2 {
        let src = &req.data[y_plane + row * stride..y_plane + row * stride + w];
        for col in 0..w / 2 {
            u_out[row * (w / 2) + col] = src[2 * col];
            v_out[row * (w / 2) + col] = src[2 * col + 1];
        }
    }
    out
}

/// Software JPEG decoder backed by libjpeg-turbo.
pub struct TurboJpegDecoder;

impl JpegDecoder for TurboJpegDecoder {
    fn decode(&self, jpeg: &[u8]) -> Result<DecodedImage, DecodeFault> {
        let img = turbojpeg::decompress(jpeg, turbojpeg::PixelFormat::RGB)?;
        Ok(DecodedImage {
            data: img.pixels,
            width: img.width as u32,
            height: img.height as u32,
            channels: 3,
        })
    }
}

/// Encodes the NV12 frame in `src` into `dst` through the engine.
///
/// The engine connection is scoped to this call and dropped on every path
/// out. Returns the encoded byte count; a stream that does not fit fails
/// with [`CameraError::BufferTooSmall`] and leaves `dst` unwritten.
pub fn yuv_to_jpeg(
    dst: &mut [u8],
    src: &FrameBuffer,
    engine: &dyn JpegEngine,
) -> Result<usize, CameraError> {
    let req = EncodeRequest::from_buffer(src);
    debug!(
        width = req.width,
        height = req.height,
        stride = req.stride,
        buf_size = req.buf_size,
        "encode request"
    );

    let mut handle = engine.connect().ok_or(CameraError::EngineUnavailable)?;
    let encoded = handle.encode(&req)?;
    if encoded.len() > dst.len() {
        warn!(
            needed = encoded.len(),
            capacity = dst.len(),
            "encoded stream exceeds destination"
        );
        return Err(CameraError::BufferTooSmall {
            needed: encoded.len(),
            capacity: dst.len(),
        });
    }
    dst[..encoded.len()].copy_from_slice(&encoded);
    Ok(encoded.len())
}

/// Decodes the JPEG stream in `src` into packed RGB in `dst`.
///
/// Returns the decoded byte count. `dst` is written only when the whole
/// image fits; a short destination fails with
/// [`CameraError::BufferTooSmall`] and leaves it untouched.
pub fn jpeg_to_rgb(
    dst: &mut [u8],
    src: &[u8],
    decoder: &dyn JpegDecoder,
) -> Result<usize, CameraError> {
    let decoded = decoder.decode(src)?;
    let needed = decoded.data.len();
    if needed > dst.len() {
        warn!(
            needed,
            capacity = dst.len(),
            "decoded image exceeds destination"
        );
        return Err(CameraError::BufferTooSmall {
            needed,
            capacity: dst.len(),
        });
    }
    dst[..needed].copy_from_slice(&decoded.data);
    debug!(
        bytes = needed,
        width = decoded.width,
        height = decoded.height,
        "jpeg decoded"
    );
    Ok(needed)
}

/// One-shot NV12 to JPEG converter for callers without a capture session.
///
/// Owns an encoder-aligned staging buffer for fixed dimensions. Each call
/// restrides the caller's tightly packed frame into the staging layout before
/// the engine sees it, so arbitrary source slices work regardless of their
/// alignment.
pub struct JpegConverter {
    staging: FrameBuffer,
    engine: Box<dyn JpegEngine>,
}

impl JpegConverter {
    /// Creates a converter for `width` x `height` frames on the software
    /// engine.
    pub fn new(width: u32, height: u32) -> Result<Self, CameraError> {
        Self::with_engine(width, height, Box::new(TurboJpegEngine))
    }

    /// Creates a converter driving a caller-supplied engine.
    pub fn with_engine(
        width: u32,
        height: u32,
        engine: Box<dyn JpegEngine>,
    ) -> Result<Self, CameraError> {
        let staging = FrameBuffer::new(width, height)?;
        Ok(Self { staging, engine })
    }

    pub fn width(&self) -> u32 {
        self.staging.width()
    }

    pub fn height(&self) -> u32 {
        self.staging.height()
    }

    /// Encodes one tightly packed NV12 frame into `dst`, returning the
    /// encoded byte count.
    ///
    /// `yuv` must hold at least `width * height * 3 / 2` bytes; a shorter
    /// slice fails with [`CameraError::BufferTooSmall`].
    pub fn to_jpeg(&mut self, dst: &mut [u8], yuv: &[u8]) -> Result<usize, CameraError> {
        let w = self.staging.width() as usize;
        let h = self.staging.height() as usize;
        let tight = w * h * 3 / 2;
        if yuv.len() < tight {
            return Err(CameraError::BufferTooSmall {
                needed: tight,
                capacity: yuv.len(),
            });
        }

        let stride = self.staging.stride();
        let data = self.staging.data_mut();
        for row in 0..h {
            data[row * stride..row * stride + w].copy_from_slice(&yuv[row * w..(row + 1) * w]);
        }
        let y_plane = stride * h;
        let y_tight = w * h;
        for row in 0..h / 2 {
            data[y_plane + row * stride..y_plane + row * stride + w]
                .copy_from_slice(&yuv[y_tight + row * w..y_tight + (row + 1) * w]);
        }
        self.staging.set_image_size(tight);

        yuv_to_jpeg(dst, &self.staging, self.engine.as_ref())
    }
}
