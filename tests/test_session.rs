// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use atlas_camera::{
    camera::{CameraConfig, CameraSession},
    codec::{jpeg_to_rgb, TurboJpegDecoder},
    error::CameraError,
    image::{FourCC, JPEG, NV12, RGB3, YUYV},
    sim::SimCamera,
};
use std::error::Error;

fn config(width: u32, height: u32, format: FourCC) -> CameraConfig {
    CameraConfig {
        id: 0,
        width,
        height,
        fps: 30,
        format,
    }
}

#[test]
fn nv12_session_delivers_padded_frames() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(320, 240, NV12))?;
    assert!(session.is_open());

    let mut a = vec![0u8; 320 * 240 * 3 / 2];
    let mut b = vec![0u8; 320 * 240 * 3 / 2];
    let frame = session.read(&mut a)?;
    assert_eq!(frame.len, a.len());
    assert_eq!(frame.width, 320);
    assert_eq!(frame.height, 240);
    assert_eq!(frame.format, NV12);
    assert!(frame.timestamp.seconds() > 0);

    // The simulator advances its pattern between frames.
    session.read(&mut b)?;
    assert_ne!(a, b);

    session.close()?;
    assert!(!session.is_open());
    Ok(())
}

#[test]
fn jpeg_session_delivers_decodable_stream() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(640, 480, JPEG))?;

    let mut dst = vec![0u8; 640 * 480 * 3];
    let frame = session.read(&mut dst)?;
    assert_eq!(frame.format, JPEG);
    assert!(frame.len > 0);
    assert_eq!(&dst[..2], &[0xFF, 0xD8]);

    let mut rgb = vec![0u8; 640 * 480 * 3];
    let rgb_len = jpeg_to_rgb(&mut rgb, &dst[..frame.len], &TurboJpegDecoder)?;
    assert_eq!(rgb_len, 640 * 480 * 3);
    Ok(())
}

#[test]
fn rgb_session_fills_exact_image() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(320, 240, RGB3))?;

    let mut dst = vec![0u8; 320 * 240 * 3];
    let frame = session.read(&mut dst)?;
    assert_eq!(frame.len, 320 * 240 * 3);
    assert_eq!(frame.format, RGB3);
    Ok(())
}

#[test]
fn reopen_changes_resolution() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(320, 240, NV12))?;

    let mut small = vec![0u8; 320 * 240 * 3 / 2];
    session.read(&mut small)?;
    session.close()?;

    session.open(config(640, 480, NV12))?;
    let mut big = vec![0u8; 640 * 480 * 3 / 2];
    let frame = session.read(&mut big)?;
    assert_eq!(frame.width, 640);
    assert_eq!(frame.height, 480);
    assert_eq!(frame.len, big.len());
    Ok(())
}

#[test]
fn open_twice_reports_busy() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(320, 240, NV12))?;

    let err = session.open(config(320, 240, NV12)).unwrap_err();
    assert!(matches!(err, CameraError::DeviceBusy { id: 0 }));
    // The first open still holds the device.
    assert!(session.is_open());
    Ok(())
}

#[test]
fn unsupported_output_format_fails_read() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(320, 240, YUYV))?;

    let mut dst = vec![0u8; 320 * 240 * 2];
    let err = session.read(&mut dst).unwrap_err();
    assert!(matches!(err, CameraError::InvalidFormat { format: YUYV }));
    Ok(())
}

#[test]
fn short_nv12_destination_fails_capture() -> Result<(), Box<dyn Error>> {
    let mut session = CameraSession::new(SimCamera::new());
    session.open(config(320, 240, NV12))?;

    let mut dst = vec![0u8; 64];
    let err = session.read(&mut dst).unwrap_err();
    assert!(matches!(err, CameraError::FrameReadFailed { .. }));
    Ok(())
}
