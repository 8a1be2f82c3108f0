// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Image formats and the encoder-aligned frame buffer.
//!
//! The sensor delivers semi-planar NV12 with rows padded to a 16 byte stride.
//! The JPEG engine additionally requires the plane base address on a 128 byte
//! boundary and the capacity rounded up to whole pages, so [`FrameBuffer`]
//! owns a raw allocation with enough headroom to satisfy both and exposes the
//! aligned window as its data slice.

use crate::error::CameraError;
use core::fmt;
use std::{io, path::Path};
use tracing::debug;

/// RGB 24-bit pixel format (8 bits per channel, no alpha)
pub const RGB3: FourCC = FourCC(*b"RGB3");

/// YUYV 4:2:2 YUV packed format (common camera output format)
pub const YUYV: FourCC = FourCC(*b"YUYV");

/// NV12 4:2:0 YUV semi-planar format (sensor native output, encoder input)
pub const NV12: FourCC = FourCC(*b"NV12");

/// JPEG compressed stream (encoder output)
pub const JPEG: FourCC = FourCC(*b"JPEG");

/// Row stride alignment for encoder input planes.
pub const ROW_ALIGN: usize = 16;

/// Frame buffer capacity is rounded up to whole pages for DMA transfers.
pub const PAGE_SIZE: usize = 4096;

/// The JPEG engine requires its input base address on this boundary.
pub const ENCODER_ADDR_ALIGN: usize = 128;

/// Four character code identifying a pixel or stream format.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '.' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// Round `val` up to the next multiple of `align`, a power of two.
pub const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Bytes needed to shift `ptr` forward onto an `align` boundary.
fn align_offset(ptr: *const u8, align: usize) -> usize {
    let addr = ptr as usize;
    align_up(addr, align) - addr
}

/// Bytes in an NV12 image with the given row stride.
const fn nv12_size(stride: usize, height: usize) -> usize {
    stride * height * 3 / 2
}

/// Reusable NV12 frame buffer laid out for the JPEG engine.
///
/// Capacity is derived from the 16-aligned row stride and rounded up to whole
/// pages; the data window starts on a 128 byte boundary inside a slightly
/// larger raw allocation. `image_size` tracks how many bytes of the window
/// hold a valid frame and never exceeds the capacity.
///
/// # Example
///
/// ```
/// use atlas_camera::image::{FrameBuffer, ENCODER_ADDR_ALIGN, PAGE_SIZE};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let buf = FrameBuffer::new(1280, 720)?;
/// assert_eq!(buf.stride(), 1280);
/// assert_eq!(buf.buf_size() % PAGE_SIZE, 0);
/// assert_eq!(buf.data().as_ptr() as usize % ENCODER_ADDR_ALIGN, 0);
/// # Ok(())
/// # }
/// ```
pub struct FrameBuffer {
    raw: Vec<u8>,
    offset: usize,
    width: u32,
    height: u32,
    stride: usize,
    buf_size: usize,
    image_size: usize,
    format: FourCC,
}

impl FrameBuffer {
    /// Allocates a zero-filled buffer for `width` x `height` NV12 frames.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::AllocationFailed`] when the reservation is
    /// refused by the allocator.
    pub fn new(width: u32, height: u32) -> Result<Self, CameraError> {
        let stride = align_up(width as usize, ROW_ALIGN);
        let buf_size = align_up(nv12_size(stride, height as usize), PAGE_SIZE);
        let total = buf_size + ENCODER_ADDR_ALIGN;

        let mut raw = Vec::new();
        raw.try_reserve_exact(total)
            .map_err(|_| CameraError::AllocationFailed { size: total })?;
        raw.resize(total, 0);
        let offset = align_offset(raw.as_ptr(), ENCODER_ADDR_ALIGN);

        debug!(width, height, stride, buf_size, "frame buffer allocated");
        Ok(Self {
            raw,
            offset,
            width,
            height,
            stride,
            buf_size,
            image_size: 0,
            format: NV12,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> FourCC {
        self.format
    }

    /// Row stride in bytes of the luma and chroma planes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Page-aligned capacity of the data window in bytes.
    pub fn buf_size(&self) -> usize {
        self.buf_size
    }

    /// Bytes of the data window holding a valid frame.
    pub fn image_size(&self) -> usize {
        self.image_size
    }

    /// Records how many bytes of the window hold a valid frame, clamped to
    /// the capacity.
    pub fn set_image_size(&mut self, size: usize) {
        self.image_size = size.min(self.buf_size);
    }

    /// The aligned data window.
    pub fn data(&self) -> &[u8] {
        &self.raw[self.offset..self.offset + self.buf_size]
    }

    /// The aligned data window, writable.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.raw[self.offset..self.offset + self.buf_size]
    }

    /// The valid frame prefix of the data window.
    pub fn valid(&self) -> &[u8] {
        &self.data()[..self.image_size]
    }
}

impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {} {}/{} bytes",
            self.width, self.height, self.format, self.image_size, self.buf_size
        )
    }
}

/// Writes a binary dump of `data` to `path`, replacing any existing file.
pub fn write_raw<P: AsRef<Path>>(path: P, data: &[u8]) -> io::Result<()> {
    std::fs::write(&path, data)?;
    debug!(path = %path.as_ref().display(), bytes = data.len(), "wrote raw dump");
    Ok(())
}
