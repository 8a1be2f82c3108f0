use atlas_camera::{
    codec::{jpeg_to_rgb, yuv_to_jpeg, TurboJpegDecoder, TurboJpegEngine},
    image::FrameBuffer,
};
use criterion::{criterion_group, criterion_main, Criterion};

fn fill_pattern(buf: &mut FrameBuffer) {
    for (i, px) in buf.data_mut().iter_mut().enumerate() {
        *px = (i & 0xFF) as u8;
    }
    let size = buf.stride() * buf.height() as usize * 3 / 2;
    buf.set_image_size(size);
}

pub fn benchmark_decode(c: &mut Criterion) {
    let engine = TurboJpegEngine;
    let decoder = TurboJpegDecoder;

    let mut group = c.benchmark_group("jpeg_to_rgb");
    for dim in [
        (320, 240),
        (640, 480),
        (960, 540),
        (1280, 720),
        (1920, 1080),
        (3840, 2160),
    ]
    .iter()
    {
        let mut src = FrameBuffer::new(dim.0, dim.1).unwrap();
        fill_pattern(&mut src);
        let mut jpeg = vec![0u8; dim.0 as usize * dim.1 as usize * 3];
        let len = yuv_to_jpeg(&mut jpeg, &src, &engine).unwrap();
        jpeg.truncate(len);

        let mut rgb = vec![0u8; dim.0 as usize * dim.1 as usize * 3];
        group.bench_with_input(format!("{}x{}", dim.0, dim.1), &jpeg, |b, jpeg| {
            b.iter(|| jpeg_to_rgb(&mut rgb, jpeg, &decoder).unwrap())
        });
    }
}

criterion_group!(benches, benchmark_decode);
criterion_main!(benches);
