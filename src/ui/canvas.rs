//! Drawing surface abstraction
//!
//! An immediate-mode canvas with a save/restore transform stack, in the shape
//! of the canvases watch faces are usually drawn on. [`GraphicsCanvas`]
//! implements it on top of any embedded-graphics draw target.
//!
//! [`GraphicsCanvas`]: super::graphics::GraphicsCanvas

use super::{color::Argb, geometry::Point2};

/// Saved transforms a canvas must support
pub const MAX_SAVE_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shadow {
    pub radius: f32,
    pub color: Argb,
}

/// How one visual element is drawn.
///
/// Created once per element and mutated in place on mode or config changes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaintStyle {
    pub color: Argb,
    pub stroke_width: f32,
    pub anti_alias: bool,
    pub shadow: Option<Shadow>,
    /// Text height in pixels, only used for text
    pub text_size: f32,
}

impl PaintStyle {
    /// Anti-aliased stroke without shadow
    pub const fn stroke(color: Argb, stroke_width: f32) -> Self {
        Self {
            color,
            stroke_width,
            anti_alias: true,
            shadow: None,
            text_size: 0.0,
        }
    }

    /// Solid fill
    pub const fn fill(color: Argb) -> Self {
        Self {
            color,
            stroke_width: 0.0,
            anti_alias: false,
            shadow: None,
            text_size: 0.0,
        }
    }

    pub const fn with_shadow(mut self, radius: f32, color: Argb) -> Self {
        self.shadow = Some(Shadow { radius, color });
        self
    }

    pub const fn with_text_size(mut self, text_size: f32) -> Self {
        self.text_size = text_size;
        self
    }

    /// Change the shadow colour, keeping its radius
    pub fn set_shadow_color(&mut self, color: Argb) {
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.color = color;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanvasError<E> {
    /// The underlying draw target failed
    Draw(E),
    /// More than [`MAX_SAVE_DEPTH`] nested saves
    TransformStackFull,
}

/// Immediate-mode 2D surface.
///
/// Rotations apply to everything drawn after them until the matching
/// `restore`. Callers must balance `save` and `restore`.
pub trait Canvas {
    type Error;

    /// Push the current transform
    fn save(&mut self) -> Result<(), Self::Error>;

    /// Pop the last saved transform. Restoring an empty stack resets to identity.
    fn restore(&mut self);

    /// Rotate clockwise about `pivot`
    fn rotate(&mut self, degrees: f32, pivot: Point2);

    /// Move the origin by `(dx, dy)`
    fn translate(&mut self, dx: f32, dy: f32);

    /// Fill the whole surface
    fn fill(&mut self, color: Argb) -> Result<(), Self::Error>;

    fn line(&mut self, from: Point2, to: Point2, paint: &PaintStyle) -> Result<(), Self::Error>;

    /// Rectangle with its top-left corner at `origin`. A zero stroke width fills it.
    fn rect(&mut self, origin: Point2, width: f32, height: f32, paint: &PaintStyle) -> Result<(), Self::Error>;

    /// Stroke a circle outline
    fn circle(&mut self, center: Point2, radius: f32, paint: &PaintStyle) -> Result<(), Self::Error>;

    /// Blit a bitmap with its top-left corner at `origin`
    fn bitmap<B: Bitmap + ?Sized>(&mut self, bitmap: &B, origin: Point2) -> Result<(), Self::Error>;

    /// Draw text horizontally centred on `anchor`, `anchor.y` being the baseline
    fn text(&mut self, text: &str, anchor: Point2, paint: &PaintStyle) -> Result<(), Self::Error>;
}

/// Read-only pixel source, for example a background image in flash
pub trait Bitmap {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Pixel at `(x, y)`; callers stay within bounds
    fn pixel(&self, x: u32, y: u32) -> Argb;
}

impl<B: Bitmap + ?Sized> Bitmap for &B {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixel(&self, x: u32, y: u32) -> Argb {
        (**self).pixel(x, y)
    }
}

/// Bitmap backed by a row-major pixel slice
#[derive(Debug, Clone, Copy)]
pub struct SliceBitmap<'a> {
    width: u32,
    pixels: &'a [Argb],
}

impl<'a> SliceBitmap<'a> {
    /// Returns `None` when `pixels` is not a whole number of rows.
    pub fn new(width: u32, pixels: &'a [Argb]) -> Option<Self> {
        if width == 0 || pixels.len() % width as usize != 0 {
            return None;
        }
        Some(Self { width, pixels })
    }
}

impl Bitmap for SliceBitmap<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        (self.pixels.len() / self.width as usize) as u32
    }

    fn pixel(&self, x: u32, y: u32) -> Argb {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Nearest-neighbour view of a bitmap scaled so its width matches the surface
#[derive(Debug, Clone, Copy)]
pub struct ScaledBitmap<B> {
    inner: B,
    scale: f32,
}

impl<B: Bitmap> ScaledBitmap<B> {
    pub fn to_width(inner: B, width: u32) -> Self {
        let scale = match inner.width() {
            0 => 1.0,
            w => width as f32 / w as f32,
        };
        Self { inner, scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl<B: Bitmap> Bitmap for ScaledBitmap<B> {
    fn width(&self) -> u32 {
        (self.inner.width() as f32 * self.scale) as u32
    }

    fn height(&self) -> u32 {
        (self.inner.height() as f32 * self.scale) as u32
    }

    fn pixel(&self, x: u32, y: u32) -> Argb {
        let sx = ((x as f32 / self.scale) as u32).min(self.inner.width().saturating_sub(1));
        let sy = ((y as f32 / self.scale) as u32).min(self.inner.height().saturating_sub(1));
        self.inner.pixel(sx, sy)
    }
}

/// Greyscale view of a bitmap
#[derive(Debug, Clone, Copy)]
pub struct Desaturated<B>(pub B);

impl<B: Bitmap> Bitmap for Desaturated<B> {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }

    fn pixel(&self, x: u32, y: u32) -> Argb {
        self.0.pixel(x, y).desaturate()
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! Canvas that records draw calls in surface coordinates

    use super::*;
    use crate::ui::geometry::Transform;
    use std::{string::String, vec::Vec};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Op {
        Fill(Argb),
        Line {
            from: Point2,
            to: Point2,
            paint: PaintStyle,
        },
        Rect {
            origin: Point2,
            width: f32,
            height: f32,
            paint: PaintStyle,
        },
        Circle {
            center: Point2,
            radius: f32,
            paint: PaintStyle,
        },
        Bitmap {
            origin: Point2,
            first_pixel: Argb,
        },
        Text {
            text: String,
            anchor: Point2,
            paint: PaintStyle,
        },
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingCanvas {
        pub(crate) ops: Vec<Op>,
        pub(crate) transform: Transform,
        pub(crate) stack: Vec<Transform>,
        pub(crate) max_depth: usize,
    }

    impl RecordingCanvas {
        pub(crate) fn lines(&self) -> impl Iterator<Item = (Point2, Point2, &PaintStyle)> {
            self.ops.iter().filter_map(|op| match op {
                Op::Line { from, to, paint } => Some((*from, *to, paint)),
                _ => None,
            })
        }
    }

    impl Canvas for RecordingCanvas {
        type Error = CanvasError<()>;

        fn save(&mut self) -> Result<(), Self::Error> {
            if self.stack.len() == MAX_SAVE_DEPTH {
                return Err(CanvasError::TransformStackFull);
            }
            self.stack.push(self.transform);
            self.max_depth = self.max_depth.max(self.stack.len());
            Ok(())
        }

        fn restore(&mut self) {
            self.transform = self.stack.pop().unwrap_or_default();
        }

        fn rotate(&mut self, degrees: f32, pivot: Point2) {
            self.transform = self.transform.then(&Transform::rotation(degrees, pivot));
        }

        fn translate(&mut self, dx: f32, dy: f32) {
            self.transform = self.transform.then(&Transform::translation(dx, dy));
        }

        fn fill(&mut self, color: Argb) -> Result<(), Self::Error> {
            self.ops.push(Op::Fill(color));
            Ok(())
        }

        fn line(&mut self, from: Point2, to: Point2, paint: &PaintStyle) -> Result<(), Self::Error> {
            self.ops.push(Op::Line {
                from: self.transform.apply(from),
                to: self.transform.apply(to),
                paint: *paint,
            });
            Ok(())
        }

        fn rect(&mut self, origin: Point2, width: f32, height: f32, paint: &PaintStyle) -> Result<(), Self::Error> {
            self.ops.push(Op::Rect {
                origin: self.transform.apply(origin),
                width,
                height,
                paint: *paint,
            });
            Ok(())
        }

        fn circle(&mut self, center: Point2, radius: f32, paint: &PaintStyle) -> Result<(), Self::Error> {
            self.ops.push(Op::Circle {
                center: self.transform.apply(center),
                radius,
                paint: *paint,
            });
            Ok(())
        }

        fn bitmap<B: Bitmap + ?Sized>(&mut self, bitmap: &B, origin: Point2) -> Result<(), Self::Error> {
            self.ops.push(Op::Bitmap {
                origin,
                first_pixel: bitmap.pixel(0, 0),
            });
            Ok(())
        }

        fn text(&mut self, text: &str, anchor: Point2, paint: &PaintStyle) -> Result<(), Self::Error> {
            self.ops.push(Op::Text {
                text: text.into(),
                anchor: self.transform.apply(anchor),
                paint: *paint,
            });
            Ok(())
        }
    }
}
