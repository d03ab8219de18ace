use image::Rgba;
use text_overlay_rust::{
    Affine, Color, Point, RasterImage, Rect, SkiaCompositor, Size, TextOverlayFilter,
    TextRenderer, TextRequest,
};

/// Glyphs are solid blocks 0.6em wide and 1em tall.
struct BoxRenderer;

impl TextRenderer for BoxRenderer {
    fn measure(&self, request: &TextRequest<'_>) -> Size {
        let glyphs = request.text.chars().count() as f32;
        Size::new(
            (glyphs * request.font_size * 0.6).ceil(),
            request.font_size.ceil(),
        )
    }

    fn rasterize(&self, _request: &TextRequest<'_>, color: Color, canvas: &mut RasterImage) -> bool {
        for pixel in canvas.pixels_mut() {
            *pixel = color.to_rgba();
        }
        true
    }
}

fn gray(width: u32, height: u32) -> RasterImage {
    RasterImage::from_pixel(width, height, Rgba([90, 90, 90, 255]))
}

fn is_yellow(image: &RasterImage, x: u32, y: u32) -> bool {
    let [r, g, b, _] = image.get_pixel(x, y).0;
    r > 200 && g > 200 && b < 40
}

fn filter(image: RasterImage, crop_rect: Rect) -> TextOverlayFilter {
    TextOverlayFilter {
        text: "Hi".to_string(),
        font_name: "box".to_string(),
        initial_font_size: 0.1,
        color: Color::rgb(255, 255, 0),
        crop_rect,
        center: Point::new(0.5, 0.5),
        scale: 0.2,
        transform: Affine::IDENTITY,
        ..TextOverlayFilter::new(image)
    }
}

#[test]
fn uncropped_landscape_scenario() {
    let filter = filter(gray(1000, 500), Rect::UNIT);
    let sticker = filter.sticker(&BoxRenderer);
    assert_eq!(sticker.dimensions(), (60, 50));

    let placement = filter
        .placement(Size::from_pixels(sticker.width(), sticker.height()))
        .unwrap();
    insta::assert_debug_snapshot!(placement.center, @r"
    Point {
        x: 500.0,
        y: 250.0,
    }
    ");
    assert_eq!(placement.size.width, 100.0);
    assert!((placement.size.height - 250.0 / 3.0).abs() < 1e-3);

    let output = filter.output_image(&BoxRenderer, &SkiaCompositor).unwrap();
    assert_eq!(output.dimensions(), (1000, 500));
    assert!(is_yellow(&output, 500, 250));
    assert!(is_yellow(&output, 460, 220));
    assert!(!is_yellow(&output, 440, 250));
    assert_eq!(output.get_pixel(10, 10).0, [90, 90, 90, 255]);
}

#[test]
fn cropped_scenario_lands_inside_crop() {
    let filter = filter(gray(500, 500), Rect::new(0.25, 0.0, 0.5, 1.0));
    assert_eq!(filter.original_size(), Some(Size::new(1000.0, 500.0)));

    let placement = filter.placement(Size::new(60.0, 50.0)).unwrap();
    insta::assert_debug_snapshot!(placement.center, @r"
    Point {
        x: 250.0,
        y: 250.0,
    }
    ");

    let output = filter.output_image(&BoxRenderer, &SkiaCompositor).unwrap();
    assert_eq!(output.dimensions(), (500, 500));
    assert!(is_yellow(&output, 250, 250));
    assert!(!is_yellow(&output, 190, 250));
}

#[test]
fn uncropped_center_is_exact_scaling() {
    for (width, height) in [(640, 480), (480, 640), (333, 777)] {
        let mut filter = filter(gray(width, height), Rect::UNIT);
        filter.center = Point::new(0.3, 0.7);
        assert_eq!(
            filter.original_size(),
            Some(Size::from_pixels(width, height))
        );
        let placement = filter.placement(Size::new(10.0, 5.0)).unwrap();
        assert_eq!(placement.center.x, 0.3 * width as f32);
        assert_eq!(placement.center.y, 0.7 * height as f32);
    }
}

#[test]
fn aspect_ratio_is_locked_for_both_orientations() {
    let sticker = Size::new(60.0, 50.0);
    for image in [gray(800, 300), gray(300, 800)] {
        for scale in [0.1, 0.45, 1.7] {
            let mut filter = filter(image.clone(), Rect::UNIT);
            filter.scale = scale;
            let size = filter.placement(sticker).unwrap().size;
            let ratio = size.width / size.height;
            assert!((ratio - 60.0 / 50.0).abs() < 1e-4, "ratio {ratio}");
        }
    }
}

#[test]
fn degraded_paths_never_panic() {
    let mut absent = filter(gray(10, 10), Rect::UNIT);
    absent.input_image = None;
    assert!(absent.output_image(&BoxRenderer, &SkiaCompositor).is_none());

    let mut empty = filter(gray(10, 10), Rect::UNIT);
    empty.text.clear();
    assert_eq!(
        empty.output_image(&BoxRenderer, &SkiaCompositor),
        Some(gray(10, 10))
    );

    let zero = TextOverlayFilter {
        scale: 0.0,
        ..filter(gray(10, 10), Rect::UNIT)
    };
    assert_eq!(
        zero.output_image(&BoxRenderer, &SkiaCompositor),
        Some(gray(10, 10))
    );
}
