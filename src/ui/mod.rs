//! UI definitions module

use chrono::NaiveDateTime;

use canvas::{Bitmap, Canvas};

pub mod canvas;
pub mod color;
pub mod geometry;
pub mod graphics;
pub mod mode;
pub mod paints;
pub mod render;
pub mod snow_watchface;
pub mod snowflake;

pub trait WatchFace {
    /// Draw one frame for the given wall-clock time onto `canvas`
    fn draw<C, B>(&self, canvas: &mut C, now: &NaiveDateTime, background: Option<&B>) -> Result<(), C::Error>
    where
        C: Canvas,
        B: Bitmap + ?Sized;
}
