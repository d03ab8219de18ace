use tracing::{debug, trace};

use super::geometry::{Affine, Placement, Size};
use crate::color::Color;
use crate::raster::{ImageCompositor, RasterImage, filled};

/// Draws `sticker` at `placement` into a transparent canvas the size of
/// `input`, then blends that canvas over `input`.
///
/// Falls back to a copy of `input` when the placement is empty or either
/// compositing primitive fails.
pub(crate) fn composite<C: ImageCompositor + ?Sized>(
    compositor: &C,
    input: &RasterImage,
    sticker: &RasterImage,
    placement: &Placement,
    transform: &Affine,
) -> RasterImage {
    if placement.size.is_empty() {
        trace!("composite: empty placement {:?}", placement.size);
        return input.clone();
    }
    let (width, height) = input.dimensions();
    let mut canvas = filled(width, height, Color::TRANSPARENT_WHITE);
    let sticker_size = Size::from_pixels(sticker.width(), sticker.height());
    let ctm = placement.transform(transform, sticker_size);
    if !compositor.draw_transformed(&mut canvas, sticker, &ctm) {
        debug!("composite: sticker draw unavailable");
        return input.clone();
    }
    match compositor.source_over(&canvas, input) {
        Some(output) => output,
        None => {
            debug!("composite: source-over unavailable");
            input.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::geometry::Point;
    use crate::raster::SkiaCompositor;

    struct NoDraw;

    impl ImageCompositor for NoDraw {
        fn draw_transformed(&self, _: &mut RasterImage, _: &RasterImage, _: &Affine) -> bool {
            false
        }

        fn source_over(&self, _: &RasterImage, _: &RasterImage) -> Option<RasterImage> {
            panic!("source_over must not run after a failed draw");
        }
    }

    fn placement(width: f32, height: f32) -> Placement {
        Placement {
            center: Point::new(10.0, 10.0),
            size: Size::new(width, height),
        }
    }

    #[test]
    fn sticker_is_centered_on_placement() {
        let input = filled(20, 20, Color::BLACK);
        let sticker = filled(2, 2, Color::WHITE);
        let output = composite(
            &SkiaCompositor,
            &input,
            &sticker,
            &placement(4.0, 4.0),
            &Affine::IDENTITY,
        );
        assert_eq!(output.dimensions(), (20, 20));
        assert_eq!(output.get_pixel(9, 9).0, [255, 255, 255, 255]);
        assert_eq!(output.get_pixel(8, 8).0, [255, 255, 255, 255]);
        assert_eq!(output.get_pixel(11, 11).0, [255, 255, 255, 255]);
        assert_eq!(output.get_pixel(7, 10).0, [0, 0, 0, 255]);
        assert_eq!(output.get_pixel(12, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn empty_placement_is_exact_passthrough() {
        let input = filled(5, 5, Color::rgba(1, 2, 3, 4));
        let sticker = filled(2, 2, Color::WHITE);
        let output = composite(
            &NoDraw,
            &input,
            &sticker,
            &placement(0.0, 0.0),
            &Affine::IDENTITY,
        );
        assert_eq!(output, input);
    }

    #[test]
    fn failed_draw_returns_input() {
        let input = filled(5, 5, Color::BLACK);
        let sticker = filled(2, 2, Color::WHITE);
        let output = composite(
            &NoDraw,
            &input,
            &sticker,
            &placement(2.0, 2.0),
            &Affine::IDENTITY,
        );
        assert_eq!(output, input);
    }
}
