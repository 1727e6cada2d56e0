
//! Sizes, positions, and integer division with explicit rounding.

/// A position or a size in two dimensions.
/// Sizes are width and height, positions are x and y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2<T> (pub T, pub T);

impl<T> Vec2<T> {

    /// Apply a function to both components.
    pub fn map<B>(self, map: impl Fn(T) -> B) -> Vec2<B> {
        Vec2(map(self.0), map(self.1))
    }

    /// `width * height`, for vectors that describe a size.
    pub fn area(self) -> T where T: std::ops::Mul<T, Output = T> {
        self.0 * self.1
    }

    /// The horizontal size.
    #[inline]
    pub fn width(self) -> T { self.0 }

    /// The vertical size.
    #[inline]
    pub fn height(self) -> T { self.1 }

    /// The horizontal position.
    #[inline]
    pub fn x(self) -> T { self.0 }

    /// The vertical position.
    #[inline]
    pub fn y(self) -> T { self.1 }
}

impl<T> From<(T, T)> for Vec2<T> {
    fn from((x, y): (T, T)) -> Self { Vec2(x, y) }
}


/// Round up or down in specific calculations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RoundingMode {

    /// Round down.
    Down,

    /// Round up.
    Up,
}

impl RoundingMode {

    /// Divide two non-negative numbers, rounding the quotient in this direction.
    pub(crate) fn divide(self, dividend: usize, divisor: usize) -> usize {
        match self {
            RoundingMode::Up => dividend.div_ceil(divisor),
            RoundingMode::Down => dividend / divisor,
        }
    }

    /// Divide both components of a size.
    pub(crate) fn divide_size(self, size: Vec2<usize>, divisor: usize) -> Vec2<usize> {
        size.map(|component| self.divide(component, divisor))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rounding_division(){
        assert_eq!(RoundingMode::Up.divide(0, 8), 0);
        assert_eq!(RoundingMode::Up.divide(1, 8), 1);
        assert_eq!(RoundingMode::Up.divide(8, 8), 1);
        assert_eq!(RoundingMode::Up.divide(9, 8), 2);
        assert_eq!(RoundingMode::Up.divide(usize::MAX, 8), usize::MAX / 8 + 1);

        assert_eq!(RoundingMode::Down.divide(9, 2), 4);
        assert_eq!(RoundingMode::Down.divide_size(Vec2(13, 1), 2), Vec2(6, 0));
    }
}
