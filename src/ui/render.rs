//! Frame compositing
//!
//! Background, tick marks, snowflake, hands and the centre label, in that
//! order. Every rotation pushed on the canvas is popped again before the
//! next element, so frames never accumulate drift.

use super::{
    canvas::{Bitmap, Canvas, Desaturated, ScaledBitmap},
    color::Argb,
    geometry::{polar, Point2},
    mode::BackgroundKind,
    paints::PaintSet,
    snowflake::{Pattern, SnowflakeLayout},
};
use crate::system::{config::FaceConfig, time::ClockTime};

/// Surface geometry, recomputed when the surface size changes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceLayout {
    pub width: u32,
    pub height: u32,
    pub center: Point2,
    pub hour_hand_radius: f32,
    pub minute_hand_length: f32,
    pub second_hand_length: f32,
    pub center_gap_radius: f32,
    pub tick_length: f32,
    pub snowflake: SnowflakeLayout,
}

impl FaceLayout {
    /// Lengths scale with the horizontal centre so chinned round screens
    /// stay centred on the full surface.
    pub fn new(width: u32, height: u32, config: &FaceConfig) -> Self {
        let center = Point2::new(width as f32 / 2.0, height as f32 / 2.0);
        let hour_hand_radius = center.x * config.hour_hand_ratio;

        Self {
            width,
            height,
            center,
            hour_hand_radius,
            minute_hand_length: center.x * config.minute_hand_ratio,
            second_hand_length: center.x * config.second_hand_ratio,
            center_gap_radius: config.center_gap_radius,
            tick_length: config.tick_length,
            snowflake: SnowflakeLayout::new(center, config.center_gap_radius, hour_hand_radius),
        }
    }
}

/// Everything needed to draw one frame
pub struct Frame<'a, B: ?Sized> {
    pub time: ClockTime,
    pub layout: &'a FaceLayout,
    pub paints: &'a PaintSet,
    pub config: &'a FaceConfig,
    pub background: BackgroundKind,
    pub bitmap: Option<&'a B>,
    pub show_seconds: bool,
}

pub fn render_frame<C, B>(canvas: &mut C, frame: &Frame<'_, B>) -> Result<(), C::Error>
where
    C: Canvas,
    B: Bitmap + ?Sized,
{
    draw_background(canvas, frame)?;
    draw_ticks(canvas, frame)?;
    draw_snowflake(canvas, frame)?;
    draw_hands(canvas, frame)?;
    draw_label(canvas, frame)
}

fn draw_background<C, B>(canvas: &mut C, frame: &Frame<'_, B>) -> Result<(), C::Error>
where
    C: Canvas,
    B: Bitmap + ?Sized,
{
    let origin = Point2::new(0.0, 0.0);
    match (frame.background, frame.bitmap) {
        (BackgroundKind::SolidBlack, _) => canvas.fill(Argb::BLACK),
        (BackgroundKind::Bitmap, Some(bitmap)) => {
            canvas.bitmap(&ScaledBitmap::to_width(bitmap, frame.layout.width), origin)
        }
        (BackgroundKind::GrayBitmap, Some(bitmap)) => canvas.bitmap(
            &Desaturated(ScaledBitmap::to_width(bitmap, frame.layout.width)),
            origin,
        ),
        // A bitmap background without a bitmap falls back to the colour
        _ => canvas.rect(
            origin,
            frame.layout.width as f32,
            frame.layout.height as f32,
            &frame.paints.background,
        ),
    }
}

fn draw_ticks<C, B>(canvas: &mut C, frame: &Frame<'_, B>) -> Result<(), C::Error>
where
    C: Canvas,
    B: Bitmap + ?Sized,
{
    let center = frame.layout.center;
    let outer = center.x;
    let inner = outer - frame.layout.tick_length;

    for tick in 0..12 {
        let degrees = tick as f32 * 30.0;
        canvas.line(
            polar(center, inner, degrees),
            polar(center, outer, degrees),
            &frame.paints.snowflake,
        )?;
    }
    Ok(())
}

fn draw_snowflake<C, B>(canvas: &mut C, frame: &Frame<'_, B>) -> Result<(), C::Error>
where
    C: Canvas,
    B: Bitmap + ?Sized,
{
    let tick = frame.time.tick_count(frame.config.seconds_per_tick);
    let pattern = Pattern::at(tick, &frame.layout.snowflake, &frame.config.snowflake_thresholds);
    let center = frame.layout.center;

    canvas.save()?;
    // Align with the hour hand
    canvas.rotate(frame.time.hour_rotation(), center);
    let drawn = pattern
        .segments(center)
        .try_for_each(|segment| canvas.line(segment.from, segment.to, &frame.paints.snowflake));
    canvas.restore();
    drawn
}

fn draw_hands<C, B>(canvas: &mut C, frame: &Frame<'_, B>) -> Result<(), C::Error>
where
    C: Canvas,
    B: Bitmap + ?Sized,
{
    let layout = frame.layout;
    let paints = frame.paints;
    let center = layout.center;
    let start = Point2::new(center.x, center.y - layout.center_gap_radius);
    let tip = |length: f32| Point2::new(center.x, center.y - length);

    let hours = frame.time.hour_rotation();
    let minutes = frame.time.minute_rotation();
    let seconds = frame.time.second_rotation();

    canvas.save()?;
    let drawn = (|| {
        canvas.rotate(hours, center);
        canvas.line(start, tip(layout.hour_hand_radius), &paints.hour_hand)?;

        canvas.rotate(minutes - hours, center);
        canvas.line(start, tip(layout.minute_hand_length), &paints.minute_hand)?;

        if frame.show_seconds {
            canvas.rotate(seconds - minutes, center);
            canvas.line(start, tip(layout.second_hand_length), &paints.second_hand)?;
        }

        canvas.circle(center, layout.center_gap_radius, &paints.minute_hand)
    })();
    canvas.restore();
    drawn
}

fn draw_label<C, B>(canvas: &mut C, frame: &Frame<'_, B>) -> Result<(), C::Error>
where
    C: Canvas,
    B: Bitmap + ?Sized,
{
    let mut buf = [0u8; 8];
    let Ok(text) = format_no_std::show(
        &mut buf,
        format_args!("{}:{:02}", frame.time.display_hour(), frame.time.minute),
    ) else {
        warn!("time label does not fit");
        return Ok(());
    };

    let label = &frame.paints.label;
    let center = frame.layout.center;
    canvas.save()?;
    canvas.translate(center.x, center.y);
    let drawn = canvas.text(text, Point2::new(0.0, label.text_size / 3.0), label);
    canvas.restore();
    drawn
}
