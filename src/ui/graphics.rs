//! Canvas on top of an embedded-graphics draw target
//!
//! Works with any display driver (e.g. `mipidsi` on the ST7789) or an
//! in-memory frame buffer. Rotations are applied to coordinates before
//! rasterising. Anti-aliasing is not available on these targets and the flag
//! is ignored; shadows are drawn as a wider stroke beneath the line.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10, FONT_7X13},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Triangle},
    text::{Alignment, Text},
};
use heapless::Vec;

use super::{
    canvas::{Bitmap, Canvas, CanvasError, PaintStyle, MAX_SAVE_DEPTH},
    color::Argb,
    geometry::{Point2, Transform},
};

pub struct GraphicsCanvas<'d, D> {
    target: &'d mut D,
    transform: Transform,
    stack: Vec<Transform, MAX_SAVE_DEPTH>,
}

impl<'d, D> GraphicsCanvas<'d, D>
where
    D: DrawTarget,
    D::Color: From<Rgb888>,
{
    pub fn new(target: &'d mut D) -> Self {
        Self {
            target,
            transform: Transform::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// Number of transforms currently saved
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn color(color: Argb) -> D::Color {
        Rgb888::from(color).into()
    }

    fn stroke_width(&self, width: f32) -> u32 {
        libm::roundf(width * self.transform.scale()).max(0.0) as u32
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Argb, width: u32) -> Result<(), CanvasError<D::Error>> {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(Self::color(color), width))
            .draw(&mut *self.target)
            .map_err(CanvasError::Draw)
    }
}

fn font_for(text_size: f32) -> &'static MonoFont<'static> {
    if text_size <= 10.0 {
        &FONT_6X10
    } else if text_size < 20.0 {
        &FONT_7X13
    } else {
        &FONT_10X20
    }
}

impl<'d, D> Canvas for GraphicsCanvas<'d, D>
where
    D: DrawTarget,
    D::Color: From<Rgb888>,
{
    type Error = CanvasError<D::Error>;

    fn save(&mut self) -> Result<(), Self::Error> {
        self.stack
            .push(self.transform)
            .map_err(|_| CanvasError::TransformStackFull)
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
        self.target.clear(Self::color(color)).map_err(CanvasError::Draw)
    }

    fn line(&mut self, from: Point2, to: Point2, paint: &PaintStyle) -> Result<(), Self::Error> {
        let from = self.transform.apply(from).round();
        let to = self.transform.apply(to).round();
        let width = self.stroke_width(paint.stroke_width);

        if let Some(shadow) = paint.shadow {
            let shadow_width = self.stroke_width(paint.stroke_width + shadow.radius / 2.0);
            self.draw_line(from, to, shadow.color, shadow_width)?;
        }
        self.draw_line(from, to, paint.color, width)
    }

    fn rect(&mut self, origin: Point2, width: f32, height: f32, paint: &PaintStyle) -> Result<(), Self::Error> {
        let corners = [
            origin,
            Point2::new(origin.x + width, origin.y),
            Point2::new(origin.x + width, origin.y + height),
            Point2::new(origin.x, origin.y + height),
        ]
        .map(|corner| self.transform.apply(corner).round());

        if paint.stroke_width > 0.0 {
            let stroke = self.stroke_width(paint.stroke_width);
            for i in 0..corners.len() {
                self.draw_line(corners[i], corners[(i + 1) % corners.len()], paint.color, stroke)?;
            }
            return Ok(());
        }

        // Two triangles, so rotated rectangles fill too
        let style = PrimitiveStyle::with_fill(Self::color(paint.color));
        Triangle::new(corners[0], corners[1], corners[2])
            .into_styled(style)
            .draw(&mut *self.target)
            .map_err(CanvasError::Draw)?;
        Triangle::new(corners[0], corners[2], corners[3])
            .into_styled(style)
            .draw(&mut *self.target)
            .map_err(CanvasError::Draw)
    }

    fn circle(&mut self, center: Point2, radius: f32, paint: &PaintStyle) -> Result<(), Self::Error> {
        let center = self.transform.apply(center).round();
        let diameter = libm::roundf(2.0 * radius * self.transform.scale()).max(0.0) as u32;
        let width = self.stroke_width(paint.stroke_width);

        Circle::with_center(center, diameter)
            .into_styled(PrimitiveStyle::with_stroke(Self::color(paint.color), width))
            .draw(&mut *self.target)
            .map_err(CanvasError::Draw)
    }

    fn bitmap<B: Bitmap + ?Sized>(&mut self, bitmap: &B, origin: Point2) -> Result<(), Self::Error> {
        let origin = self.transform.apply(origin).round();
        let (width, height) = (bitmap.width(), bitmap.height());

        let pixels = (0..height).flat_map(|y| {
            (0..width).map(move |x| {
                Pixel(
                    origin + Point::new(x as i32, y as i32),
                    Self::color(bitmap.pixel(x, y)),
                )
            })
        });
        self.target.draw_iter(pixels).map_err(CanvasError::Draw)
    }

    fn text(&mut self, text: &str, anchor: Point2, paint: &PaintStyle) -> Result<(), Self::Error> {
        let anchor = self.transform.apply(anchor).round();
        let style = MonoTextStyle::new(font_for(paint.text_size), Self::color(paint.color));

        Text::with_alignment(text, anchor, style, Alignment::Center)
            .draw(&mut *self.target)
            .map(|_| ())
            .map_err(CanvasError::Draw)
    }
}
