use atlas_camera::{
    camera::{CameraConfig, CameraSession},
    image::{self, align_up, write_raw, ROW_ALIGN},
    sim::SimCamera,
};
use args::{Args, OutputFormat};
use clap::Parser;
use std::{error::Error, time::Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod args;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let config = CameraConfig::from(&args);
    info!(
        camera = config.id,
        width = config.width,
        height = config.height,
        fps = config.fps,
        format = %config.format,
        "starting frame grabber"
    );

    if let Some(dir) = &args.dump {
        std::fs::create_dir_all(dir)?;
    }

    let mut session = CameraSession::new(SimCamera::new());
    session.open(config.clone())?;

    let mut frame_buf = vec![0u8; frame_capacity(&config)];
    let started = Instant::now();

    for n in 0..args.frames {
        let t0 = Instant::now();
        let frame = session.read(&mut frame_buf)?;
        debug!(
            frame = n,
            len = frame.len,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            timestamp = %format!(
                "{}.{:09}",
                frame.timestamp.seconds(),
                frame.timestamp.subsec(9)
            ),
            "frame"
        );

        if let Some(dir) = &args.dump {
            let path = dir.join(format!("frame-{:04}.{}", n, extension(args.format)));
            write_raw(&path, &frame_buf[..frame.len])?;
        }
    }

    let elapsed = started.elapsed();
    info!(
        frames = args.frames,
        elapsed_ms = elapsed.as_millis() as u64,
        fps = %format!("{:.1}", args.frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON)),
        "capture finished"
    );

    session.close()?;
    Ok(())
}

/// Destination capacity for one frame in the configured output format.
fn frame_capacity(config: &CameraConfig) -> usize {
    let w = config.width as usize;
    let h = config.height as usize;
    if config.format == image::NV12 {
        align_up(w, ROW_ALIGN) * h * 3 / 2
    } else {
        w * h * 3
    }
}

fn extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Nv12 => "yuv",
        OutputFormat::Jpeg => "jpg",
        OutputFormat::Rgb => "rgb",
    }
}
