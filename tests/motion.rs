
extern crate blockcodec;
use blockcodec::prelude::*;
use blockcodec::frame::motion::{estimate, compensate};


/// A pattern without repetitions inside the search radius.
fn texture(size: Vec2<usize>) -> Plane {
    Plane::from_fn(size, |Vec2(x, y)| ((x * 7 + y * 13 + x * y * 3 + (x * x) % 11) % 251) as u8)
}

/// The content of the plane at `(x, y)` appears at `(x + dx, y + dy)`.
fn moved(plane: &Plane, dx: isize, dy: isize) -> Plane {
    let size = plane.size();

    Plane::from_fn(size, |Vec2(x, y)| {
        let source_x = (x as isize - dx).clamp(0, size.width() as isize - 1) as usize;
        let source_y = (y as isize - dy).clamp(0, size.height() as isize - 1) as usize;
        plane.get(Vec2(source_x, source_y))
    })
}

#[test]
fn recovers_shift_in_every_direction(){
    let reference = texture(Vec2(96, 80));

    for (dx, dy) in [(3, 2), (-4, 1), (0, -5), (-7, -7), (6, 0)] {
        let current = moved(&reference, dx, dy);
        let field = estimate(&current, &reference, Channel::Luma, 8, true);
        let count = field.count();

        // macroblocks at the border see content that entered the frame
        for my in 1 .. count.height() - 1 {
            for mx in 1 .. count.width() - 1 {
                assert_eq!(
                    field.get(Vec2(mx, my)), MotionVector::new(-dx as i8, -dy as i8),
                    "macroblock {}, {} for shift {}, {}", mx, my, dx, dy
                );
            }
        }

        let predicted = compensate(&reference, &field, 8).unwrap();
        assert!(predicted.mean_squared_error(&current).unwrap() < current.mean_squared_error(&reference).unwrap());
    }
}

#[test]
fn vectors_stay_inside_radius(){
    let reference = texture(Vec2(64, 64));
    let current = moved(&reference, 6, -6);

    for radius in [1_u8, 3, 8] {
        let field = estimate(&current, &reference, Channel::Luma, radius, false);

        for vector in field.vectors() {
            assert!(vector.dx >= -(radius as i8) && vector.dx < radius as i8);
            assert!(vector.dy >= -(radius as i8) && vector.dy < radius as i8);
        }

        assert!(compensate(&reference, &field, radius).is_ok());
    }
}

#[test]
fn chroma_uses_smaller_macroblocks(){
    let reference = texture(Vec2(32, 24));
    let moved_left_half = moved(&reference, 2, 0);

    // only the left half of the plane moves
    let current = Plane::from_fn(reference.size(), |position| {
        if position.x() < 16 { moved_left_half.get(position) } else { reference.get(position) }
    });

    let field = estimate(&current, &reference, Channel::RedChroma, 4, false);
    assert_eq!(field.macroblock_size(), 8);
    assert_eq!(field.count(), Vec2(4, 3));

    for my in 0 .. 3 {
        assert_eq!(field.get(Vec2(1, my)), MotionVector::new(-2, 0));
        assert_eq!(field.get(Vec2(2, my)), MotionVector::ZERO);
        assert_eq!(field.get(Vec2(3, my)), MotionVector::ZERO);
    }

    let predicted = compensate(&reference, &field, 4).unwrap();
    for y in 0 .. 24 {
        for x in 8 .. 32 {
            assert_eq!(predicted.get(Vec2(x, y)), current.get(Vec2(x, y)));
        }
    }
}
