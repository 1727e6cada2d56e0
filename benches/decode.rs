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

fn chain_bytes(size: Vec2<usize>, count: usize) -> Vec<u8> {
    let mut encoder = ChainEncoder::new(CodecOptions::default());
    for index in 0 .. count { encoder.push(&waves(size, index * 2)).unwrap(); }
    encoder.finish().to_bytes().unwrap()
}

/// Decode a 640x480 still frame to rgba pixels on all cores
fn decode_key_frame_to_rgba_parallel(bench: &mut Bencher) {
    let bytes = encode_key_frame(&waves(Vec2(640, 480), 0), &CodecOptions::default()).unwrap();

    bench.iter(||{
        let image = decode_key_frame(&bytes, &CodecOptions::default()).unwrap().to_rgba();
        bencher::black_box(image);
    })
}

/// Decode a 640x480 still frame to planes on a single core
fn decode_key_frame_sequential(bench: &mut Bencher) {
    let bytes = encode_key_frame(&waves(Vec2(640, 480), 0), &CodecOptions::default()).unwrap();

    bench.iter(||{
        let frame = decode_key_frame(&bytes, &CodecOptions::sequential()).unwrap();
        bencher::black_box(frame);
    })
}

/// Parse and decode a chain of eight 320x240 frames
fn decode_chain_parallel(bench: &mut Bencher) {
    let bytes = chain_bytes(Vec2(320, 240), 8);

    bench.iter(||{
        let frames = FrameChain::from_bytes(&bytes).unwrap()
            .decode_all(CodecOptions::default()).unwrap();

        bencher::black_box(frames);
    })
}

/// Only parse and decompress a chain, without reconstructing pixels
fn parse_chain(bench: &mut Bencher) {
    let bytes = chain_bytes(Vec2(320, 240), 8);

    bench.iter(||{
        let chain = FrameChain::from_bytes(&bytes).unwrap();
        bencher::black_box(chain);
    })
}

benchmark_group!(decode,
    decode_key_frame_to_rgba_parallel,
    decode_key_frame_sequential,
    decode_chain_parallel,
    parse_chain
);

benchmark_main!(decode);
