
//! Conversion between RGBA pixels and the luma/chroma color space.
//! Uses the BT.601 coefficients with full range samples, as JPEG does.

use crate::error::{Error, Result};
use crate::math::Vec2;


/// A single pixel with red, green, blue and alpha samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba {

    /// Red sample.
    pub r: u8,

    /// Green sample.
    pub g: u8,

    /// Blue sample.
    pub b: u8,

    /// Alpha sample. Not stored by the codec.
    pub a: u8,
}

/// A single pixel in luma and blue/red difference samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct YCbCr {

    /// Luma sample.
    pub y: u8,

    /// Blue-difference chroma sample, centered at 128.
    pub cb: u8,

    /// Red-difference chroma sample, centered at 128.
    pub cr: u8,
}

impl Rgba {

    /// Create an opaque pixel.
    #[inline]
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: u8::MAX }
    }
}


/// The rounding constants of the color transform.
/// Only the forward bias influences the stream,
/// the inverse bias only changes the pixels returned by the decoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorConversion {

    /// Added to each luma and chroma value before truncating it to a byte.
    /// The default of `0.5` rounds to the nearest integer.
    pub forward_bias: f32,

    /// Added to each red, green and blue value before truncating it to a byte.
    /// The default of `0.0` truncates.
    pub inverse_bias: f32,
}

impl Default for ColorConversion {
    fn default() -> Self {
        ColorConversion { forward_bias: 0.5, inverse_bias: 0.0 }
    }
}

impl ColorConversion {

    /// Convert one pixel to luma and chroma. The alpha sample is ignored.
    #[inline]
    pub fn rgba_to_ycbcr(self, pixel: Rgba) -> YCbCr {
        let (r, g, b) = (pixel.r as f32, pixel.g as f32, pixel.b as f32);

        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
        let cr = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;

        YCbCr {
            y: clamp_to_byte(y + self.forward_bias),
            cb: clamp_to_byte(cb + self.forward_bias),
            cr: clamp_to_byte(cr + self.forward_bias),
        }
    }

    /// Convert luma and chroma back to an opaque pixel.
    #[inline]
    pub fn ycbcr_to_rgba(self, pixel: YCbCr) -> Rgba {
        let y = pixel.y as f32;
        let cb = pixel.cb as f32 - 128.0;
        let cr = pixel.cr as f32 - 128.0;

        let r = y + 1.402 * cr;
        let g = y - 0.344136 * cb - 0.714136 * cr;
        let b = y + 1.772 * cb;

        Rgba::opaque(
            clamp_to_byte(r + self.inverse_bias),
            clamp_to_byte(g + self.inverse_bias),
            clamp_to_byte(b + self.inverse_bias),
        )
    }
}

/// Clamp to the byte range, then truncate the fraction.
#[inline]
pub(crate) fn clamp_to_byte(value: f32) -> u8 {
    value.clamp(u8::MIN as f32, u8::MAX as f32) as u8
}


/// A grid of RGBA pixels, stored row by row.
/// This is what the codec receives from and returns to its callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    size: Vec2<usize>,
    pixels: Vec<Rgba>,
}

impl RgbaImage {

    /// Create an image from pixels in row-major order.
    /// Returns an error if the pixel count does not match the size.
    pub fn new(size: impl Into<Vec2<usize>>, pixels: Vec<Rgba>) -> Result<Self> {
        let size = size.into();

        if pixels.len() != size.area() {
            return Err(Error::invalid("pixel count does not match image size"));
        }

        Ok(RgbaImage { size, pixels })
    }

    /// Create an image by computing each pixel from its position.
    pub fn from_fn(size: impl Into<Vec2<usize>>, mut pixel: impl FnMut(Vec2<usize>) -> Rgba) -> Self {
        let size = size.into();

        let pixels = (0 .. size.height())
            .flat_map(|y| (0 .. size.width()).map(move |x| Vec2(x, y)))
            .map(|position| pixel(position))
            .collect();

        RgbaImage { size, pixels }
    }

    /// Create an image from interleaved `[r, g, b, a, r, g, b, a, ...]` bytes.
    pub fn from_rgba_bytes(size: impl Into<Vec2<usize>>, bytes: &[u8]) -> Result<Self> {
        let size = size.into();

        if bytes.len() != size.area() * 4 {
            return Err(Error::invalid("byte count does not match image size"));
        }

        let pixels = bytes.chunks_exact(4)
            .map(|pixel| Rgba { r: pixel[0], g: pixel[1], b: pixel[2], a: pixel[3] })
            .collect();

        Ok(RgbaImage { size, pixels })
    }

    /// Interleaved `[r, g, b, a, r, g, b, a, ...]` bytes, row by row.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter()
            .flat_map(|pixel| [pixel.r, pixel.g, pixel.b, pixel.a])
            .collect()
    }

    /// Width and height of the image.
    #[inline]
    pub fn size(&self) -> Vec2<usize> { self.size }

    /// All pixels, row by row.
    #[inline]
    pub fn pixels(&self) -> &[Rgba] { &self.pixels }

    /// The pixel at the specified position.
    /// Panics for positions outside of the image.
    #[inline]
    pub fn pixel(&self, position: Vec2<usize>) -> Rgba {
        assert!(position.x() < self.size.width() && position.y() < self.size.height(), "pixel position out of bounds");
        self.pixels[position.y() * self.size.width() + position.x()]
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn primaries_use_bt601_coefficients(){
        let conversion = ColorConversion::default();

        assert_eq!(conversion.rgba_to_ycbcr(Rgba::opaque(0, 0, 0)), YCbCr { y: 0, cb: 128, cr: 128 });
        assert_eq!(conversion.rgba_to_ycbcr(Rgba::opaque(255, 255, 255)), YCbCr { y: 255, cb: 128, cr: 128 });

        // 0.299 * 255 + 0.5 = 76.745
        // 128 - 0.168736 * 255 + 0.5 = 85.47
        // 128 + 0.5 * 255 + 0.5 = 256 which is clamped
        assert_eq!(conversion.rgba_to_ycbcr(Rgba::opaque(255, 0, 0)), YCbCr { y: 76, cb: 85, cr: 255 });
    }

    #[test]
    fn alpha_is_ignored(){
        let conversion = ColorConversion::default();
        let transparent = Rgba { r: 10, g: 200, b: 30, a: 0 };
        assert_eq!(conversion.rgba_to_ycbcr(transparent), conversion.rgba_to_ycbcr(Rgba::opaque(10, 200, 30)));
    }

    #[test]
    fn gray_round_trip_is_exact(){
        let conversion = ColorConversion::default();

        for value in 0 ..= 255 {
            let gray = Rgba::opaque(value, value, value);
            assert_eq!(conversion.ycbcr_to_rgba(conversion.rgba_to_ycbcr(gray)), gray);
        }
    }

    #[test]
    fn color_round_trip_is_close(){
        let conversion = ColorConversion::default();

        for r in (0 ..= 255).step_by(15) {
            for g in (0 ..= 255).step_by(15) {
                for b in (0 ..= 255).step_by(15) {
                    let color = Rgba::opaque(r, g, b);
                    let restored = conversion.ycbcr_to_rgba(conversion.rgba_to_ycbcr(color));

                    for (original, restored) in [(color.r, restored.r), (color.g, restored.g), (color.b, restored.b)] {
                        assert!((original as i32 - restored as i32).abs() <= 3, "{:?} became {:?}", color, restored);
                    }
                }
            }
        }
    }

    #[test]
    fn image_from_bytes(){
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let image = RgbaImage::from_rgba_bytes((2, 1), &bytes).unwrap();
        assert_eq!(image.pixel(Vec2(1, 0)), Rgba { r: 5, g: 6, b: 7, a: 8 });
        assert_eq!(image.to_rgba_bytes(), bytes);

        assert!(RgbaImage::from_rgba_bytes((2, 2), &bytes).is_err());
        assert!(RgbaImage::new((3, 3), vec![Rgba::default(); 8]).is_err());
    }
}
