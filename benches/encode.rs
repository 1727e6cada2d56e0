#[macro_use]
extern crate bencher;

extern crate blockcodec;
use blockcodec::prelude::*;

use bencher::Bencher;


fn waves(size: Vec2<usize>, offset: usize) -> RgbaImage {
    RgbaImage::from_fn(size, |Vec2(x, y)| {
        let phase = (x as f32 - offset as f32) * 0.2;
        let wave = |shift: f32| (128.0 + 80.0 * (phase + shift).sin() * (y as f32 * 0.05).cos()) as u8;
        Rgba::opaque(wave(0.0), wave(1.0), wave(2.0))
    })
}

/// Transform a 640x480 still frame on all cores
fn encode_key_frame_parallel(bench: &mut Bencher) {
    let image = waves(Vec2(640, 480), 0);

    bench.iter(||{
        let bytes = encode_key_frame(&image, &CodecOptions::default()).unwrap();
        bencher::black_box(bytes);
    })
}

/// Transform a 640x480 still frame on a single core
fn encode_key_frame_sequential(bench: &mut Bencher) {
    let image = waves(Vec2(640, 480), 0);

    bench.iter(||{
        let bytes = encode_key_frame(&image, &CodecOptions::sequential()).unwrap();
        bencher::black_box(bytes);
    })
}

/// Motion search and residual transform of a 320x240 frame
fn encode_predicted_frame_parallel(bench: &mut Bencher) {
    let options = CodecOptions::default();
    let key = encode_key_frame(&waves(Vec2(320, 240), 0), &options).unwrap();
    let reference = decode_key_frame(&key, &options).unwrap();
    let image = waves(Vec2(320, 240), 3);

    bench.iter(||{
        let bytes = encode_predicted_frame(&image, &reference, &options).unwrap();
        bencher::black_box(bytes);
    })
}

/// Encode a chain of eight 160x120 frames
fn encode_chain_sequential(bench: &mut Bencher) {
    let images: Vec<RgbaImage> = (0 .. 8).map(|index| waves(Vec2(160, 120), index * 2)).collect();

    bench.iter(||{
        let mut encoder = ChainEncoder::new(CodecOptions::sequential());
        for image in &images { encoder.push(image).unwrap(); }

        let bytes = encoder.finish().to_bytes().unwrap();
        bencher::black_box(bytes);
    })
}

benchmark_group!(encode,
    encode_key_frame_parallel,
    encode_key_frame_sequential,
    encode_predicted_frame_parallel,
    encode_chain_sequential
);

benchmark_main!(encode);
