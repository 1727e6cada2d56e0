extern crate image as png;

extern crate blockcodec;

/// Encodes a sequence of png files into a single frame chain,
/// then decodes the chain again and saves the last frame as a png.
///
/// Usage: `cargo run --example encode_png_sequence -- frame0.png frame1.png ...`.
/// Without arguments, a generated sequence is encoded instead.
fn main() {
    use blockcodec::prelude::*;

    let paths: Vec<String> = std::env::args().skip(1).collect();

    let frames: Vec<RgbaImage> = if paths.is_empty() {
        println!("no png files specified, generating a sequence of moving waves");
        (0 .. 12).map(|index| generated_frame(index * 2)).collect()
    }
    else {
        paths.iter().map(|path| {
            let png_image = png::open(path).expect("could not read png file").to_rgba8();
            let (width, height) = png_image.dimensions();
            RgbaImage::from_rgba_bytes(Vec2(width as usize, height as usize), png_image.as_raw())
                .expect("png buffer does not match its dimensions")
        }).collect()
    };

    let options = CodecOptions::default();
    let mut encoder = ChainEncoder::new(options);

    for frame in &frames {
        encoder.push(frame).expect("all frames must have the same size");
    }

    let chain = encoder.finish();
    let bytes = chain.to_bytes().unwrap();
    std::fs::write("sequence.chain", &bytes).unwrap();

    let raw_byte_count: usize = frames.iter().map(|frame| frame.pixels().len() * 4).sum();
    println!(
        "created sequence.chain with {} frames of {}x{} pixels, {} bytes instead of {} bytes",
        chain.len(), chain.size().width(), chain.size().height(), bytes.len(), raw_byte_count
    );

    // read the file again, as a player would
    let chain = FrameChain::from_bytes(&std::fs::read("sequence.chain").unwrap()).unwrap();
    let decoded = chain.decode_all(options).unwrap();

    let last = decoded.last().expect("the chain contains no frames").to_rgba();
    let png_buffer = png::RgbaImage::from_raw(
        last.size().width() as u32, last.size().height() as u32, last.to_rgba_bytes()
    ).unwrap();

    png_buffer.save("last_frame.png").unwrap();
    println!("created image last_frame.png");
}

fn generated_frame(offset: usize) -> blockcodec::prelude::RgbaImage {
    use blockcodec::prelude::*;

    RgbaImage::from_fn(Vec2(256, 144), |Vec2(x, y)| {
        let phase = (x as f32 - offset as f32) * 0.1;
        let wave = |shift: f32| (128.0 + 100.0 * (phase + shift).sin() * (y as f32 * 0.04).cos()) as u8;
        Rgba::opaque(wave(0.0), wave(2.0), wave(4.0))
    })
}
