// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use atlas_camera::{
    codec::{jpeg_to_rgb, yuv_to_jpeg, JpegConverter, TurboJpegDecoder, TurboJpegEngine},
    error::CameraError,
    image::FrameBuffer,
};
use std::error::Error;

/// Fills the buffer with a smooth NV12 gradient and marks it valid.
fn fill_gradient(buf: &mut FrameBuffer) {
    let stride = buf.stride();
    let (w, h) = (buf.width() as usize, buf.height() as usize);
    let data = buf.data_mut();
    for row in 0..h {
        for col in 0..w {
            data[row * stride + col] = ((row + col) & 0xFF) as u8;
        }
    }
    let uv = stride * h;
    for row in 0..h / 2 {
        for col in 0..w {
            data[uv + row * stride + col] = if col % 2 == 0 { 128 } else { 96 };
        }
    }
    buf.set_image_size(stride * h * 3 / 2);
}

#[test]
fn encode_produces_jpeg_stream() -> Result<(), Box<dyn Error>> {
    let mut src = FrameBuffer::new(640, 480)?;
    fill_gradient(&mut src);
    println!("{}", src);

    let mut dst = vec![0xEEu8; 640 * 480 * 3];
    let len = yuv_to_jpeg(&mut dst, &src, &TurboJpegEngine)?;

    assert!(len > 0);
    assert!(len < dst.len());
    assert_eq!(&dst[..2], &[0xFF, 0xD8]);
    assert_eq!(&dst[len - 2..len], &[0xFF, 0xD9]);
    // Bytes past the encoded stream stay untouched.
    assert!(dst[len..].iter().all(|&b| b == 0xEE));
    Ok(())
}

#[test]
fn round_trip_recovers_dimensions() -> Result<(), Box<dyn Error>> {
    let mut src = FrameBuffer::new(640, 480)?;
    fill_gradient(&mut src);

    let mut jpeg = vec![0u8; 640 * 480 * 3];
    let jpeg_len = yuv_to_jpeg(&mut jpeg, &src, &TurboJpegEngine)?;

    let mut rgb = vec![0u8; 640 * 480 * 3];
    let rgb_len = jpeg_to_rgb(&mut rgb, &jpeg[..jpeg_len], &TurboJpegDecoder)?;
    assert_eq!(rgb_len, 640 * 480 * 3);
    Ok(())
}

#[test]
fn odd_dimensions_encode_as_even() -> Result<(), Box<dyn Error>> {
    let mut src = FrameBuffer::new(641, 481)?;
    fill_gradient(&mut src);

    let mut jpeg = vec![0u8; 641 * 481 * 3];
    let jpeg_len = yuv_to_jpeg(&mut jpeg, &src, &TurboJpegEngine)?;

    // The one pixel edge is dropped, so the decoded image is 640x480.
    let mut rgb = vec![0u8; 641 * 481 * 3];
    let rgb_len = jpeg_to_rgb(&mut rgb, &jpeg[..jpeg_len], &TurboJpegDecoder)?;
    assert_eq!(rgb_len, 640 * 480 * 3);
    Ok(())
}

#[test]
fn encode_rejects_short_destination() -> Result<(), Box<dyn Error>> {
    let mut src = FrameBuffer::new(640, 480)?;
    fill_gradient(&mut src);

    let mut dst = vec![0xEEu8; 128];
    let err = yuv_to_jpeg(&mut dst, &src, &TurboJpegEngine).unwrap_err();
    match err {
        CameraError::BufferTooSmall { needed, capacity } => {
            assert!(needed > 128);
            assert_eq!(capacity, 128);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(dst.iter().all(|&b| b == 0xEE));
    Ok(())
}

#[test]
fn decode_rejects_garbage() {
    let mut dst = vec![0u8; 1024];
    let err = jpeg_to_rgb(&mut dst, &[0u8; 32], &TurboJpegDecoder).unwrap_err();
    assert!(matches!(err, CameraError::DecodeError(_)));
}

#[test]
fn converter_round_trip() -> Result<(), Box<dyn Error>> {
    let (w, h) = (320u32, 240u32);
    let mut conv = JpegConverter::new(w, h)?;
    assert_eq!(conv.width(), w);
    assert_eq!(conv.height(), h);

    // Tightly packed NV12 source, no stride padding.
    let tight = (w * h * 3 / 2) as usize;
    let yuv: Vec<u8> = (0..tight).map(|i| (i & 0xFF) as u8).collect();

    let mut jpeg = vec![0u8; (w * h * 3) as usize];
    let jpeg_len = conv.to_jpeg(&mut jpeg, &yuv)?;
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let mut rgb = vec![0u8; (w * h * 3) as usize];
    let rgb_len = jpeg_to_rgb(&mut rgb, &jpeg[..jpeg_len], &TurboJpegDecoder)?;
    assert_eq!(rgb_len, (w * h * 3) as usize);
    Ok(())
}
