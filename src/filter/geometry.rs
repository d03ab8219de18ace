use anyhow::{Result, anyhow};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// True when either side is zero, negative, or NaN.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Height over width; zero for a zero-width size.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0.0 {
            return 0.0;
        }
        self.height / self.width
    }
}

/// Rectangle in normalized or pixel units depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const UNIT: Rect = Rect {
        origin: Point::ZERO,
        size: Size {
            width: 1.0,
            height: 1.0,
        },
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// A crop rect is usable only when both sides are finite and positive.
    pub fn is_valid_crop(&self) -> bool {
        self.origin.x.is_finite()
            && self.origin.y.is_finite()
            && self.size.width.is_finite()
            && self.size.height.is_finite()
            && !self.size.is_empty()
    }
}

/// Parses `N` comma-separated floats, e.g. `"0.5, 0.5"`.
fn parse_floats<const N: usize>(value: &str) -> Result<[f32; N]> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("invalid number in '{}': {}", value, err))?;
    parts
        .try_into()
        .map_err(|_| anyhow!("expected {} comma-separated numbers, got '{}'", N, value))
}

impl FromStr for Point {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let [x, y] = parse_floats::<2>(value)?;
        Ok(Point::new(x, y))
    }
}

impl FromStr for Rect {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let [x, y, width, height] = parse_floats::<4>(value)?;
        Ok(Rect::new(x, y, width, height))
    }
}

/// 2D affine transform: `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
///
/// The `pre_*` methods follow graphics-context semantics: the argument is
/// applied to incoming coordinates before `self`, so a chain written in
/// drawing order reads outermost first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn rotate(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Returns `self ∘ other`: `other` maps the point first.
    pub fn pre_concat(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn pre_translate(&self, tx: f32, ty: f32) -> Affine {
        self.pre_concat(&Affine::translate(tx, ty))
    }

    pub fn pre_scale(&self, sx: f32, sy: f32) -> Affine {
        self.pre_concat(&Affine::scale(sx, sy))
    }

    pub fn map_point(&self, point: Point) -> Point {
        Point {
            x: self.a * point.x + self.c * point.y + self.tx,
            y: self.b * point.x + self.d * point.y + self.ty,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
            .iter()
            .all(|value| value.is_finite())
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Absolute sticker placement in the input image's pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub center: Point,
    pub size: Size,
}

impl Placement {
    /// Canvas transform for drawing a `sticker_size` raster at this placement.
    ///
    /// Translate to the placement origin, apply the user transform, pull back
    /// by half the placement size, then scale the raster to the placement size.
    pub fn transform(&self, user: &Affine, sticker_size: Size) -> Affine {
        let sx = if sticker_size.width > 0.0 {
            self.size.width / sticker_size.width
        } else {
            0.0
        };
        let sy = if sticker_size.height > 0.0 {
            self.size.height / sticker_size.height
        } else {
            0.0
        };
        Affine::translate(self.center.x, self.center.y)
            .pre_concat(user)
            .pre_translate(self.size.width * -0.5, self.size.height * -0.5)
            .pre_scale(sx, sy)
    }
}

/// Reconstructs the uncropped image size, each side rounded to whole pixels.
pub fn original_size(image_size: Size, crop_rect: &Rect) -> Size {
    Size {
        width: (image_size.width / crop_rect.size.width).round(),
        height: (image_size.height / crop_rect.size.height).round(),
    }
}

/// Maps a normalized center on the original image into cropped pixel space.
pub fn absolute_center(original: Size, crop_rect: &Rect, center: Point) -> Point {
    Point {
        x: center.x * original.width - crop_rect.origin.x * original.width,
        y: center.y * original.height - crop_rect.origin.y * original.height,
    }
}

/// Sticker size anchored on the shorter side of the original image.
pub fn absolute_sticker_size(original: Size, scale: f32, sticker_size: Size) -> Size {
    let ratio = sticker_size.aspect_ratio();
    let anchor = if original.width > original.height {
        original.height
    } else {
        original.width
    };
    Size {
        width: scale * anchor,
        height: scale * ratio * anchor,
    }
}

pub fn resolve_placement(
    image_size: Size,
    crop_rect: &Rect,
    center: Point,
    scale: f32,
    sticker_size: Size,
) -> Placement {
    let original = original_size(image_size, crop_rect);
    Placement {
        center: absolute_center(original, crop_rect, center),
        size: absolute_sticker_size(original, scale, sticker_size),
    }
}
