use image::{Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FilterQuality, Pixmap, PixmapPaint, PremultipliedColorU8, Transform,
};
use tracing::debug;

use crate::color::Color;
use crate::filter::geometry::Affine;

/// Straight-alpha RGBA8 raster shared by every stage of the filter.
pub type RasterImage = RgbaImage;

/// Allocates a raster filled with `color`.
pub fn filled(width: u32, height: u32, color: Color) -> RasterImage {
    RgbaImage::from_pixel(width, height, color.to_rgba())
}

/// Draw-with-transform and source-over blending between rasters.
pub trait ImageCompositor {
    /// Source-over draws `image` into `canvas` through `transform`.
    /// Returns `false` when nothing could be drawn.
    fn draw_transformed(
        &self,
        canvas: &mut RasterImage,
        image: &RasterImage,
        transform: &Affine,
    ) -> bool;

    /// Blends `source` over `background`; both must share dimensions.
    fn source_over(&self, source: &RasterImage, background: &RasterImage) -> Option<RasterImage>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkiaCompositor;

impl ImageCompositor for SkiaCompositor {
    fn draw_transformed(
        &self,
        canvas: &mut RasterImage,
        image: &RasterImage,
        transform: &Affine,
    ) -> bool {
        if !transform.is_finite() {
            debug!("compositor: skipping non-finite transform {:?}", transform);
            return false;
        }
        let Some(source) = image_to_pixmap(image) else {
            return false;
        };
        let Some(mut target) = image_to_pixmap(canvas) else {
            return false;
        };
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        target.draw_pixmap(0, 0, source.as_ref(), &paint, to_skia(transform), None);
        pixmap_into_image(&target, canvas);
        true
    }

    fn source_over(&self, source: &RasterImage, background: &RasterImage) -> Option<RasterImage> {
        if source.dimensions() != background.dimensions() {
            debug!(
                "compositor: size mismatch {:?} over {:?}",
                source.dimensions(),
                background.dimensions()
            );
            return None;
        }
        let mut output = background.clone();
        for (dst, src) in output.pixels_mut().zip(source.pixels()) {
            *dst = blend_over(*src, *dst);
        }
        Some(output)
    }
}

/// Straight-alpha source-over for a single pixel. A fully transparent source
/// leaves the destination bit-identical.
pub(crate) fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let [sr, sg, sb, sa] = src.0;
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let [dr, dg, db, da] = dst.0;
    let src_alpha = sa as f32 / 255.0;
    let dst_alpha = da as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    let channel = |s: u8, d: u8| {
        let value = (s as f32 * src_alpha + d as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(sr, dr),
        channel(sg, dg),
        channel(sb, db),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

pub(crate) fn to_skia(transform: &Affine) -> Transform {
    Transform::from_row(
        transform.a,
        transform.b,
        transform.c,
        transform.d,
        transform.tx,
        transform.ty,
    )
}

/// Copies a straight-alpha raster into a premultiplied pixmap.
pub(crate) fn image_to_pixmap(image: &RasterImage) -> Option<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Writes a premultiplied pixmap back into a same-sized raster. Pixels that
/// stay fully transparent keep the raster's existing RGB.
pub(crate) fn pixmap_into_image(pixmap: &Pixmap, image: &mut RasterImage) {
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        if src.alpha() == 0 {
            dst.0[3] = 0;
            continue;
        }
        *dst = demultiply(*src);
    }
}

fn demultiply(color: PremultipliedColorU8) -> Rgba<u8> {
    let color = color.demultiply();
    Rgba([color.red(), color.green(), color.blue(), color.alpha()])
}
