//! Snowflake watch face
//!
//! An analog watch face whose centre grows a procedural snowflake over the
//! course of the day. The host (display driver, wall clock, companion
//! channel) is abstracted behind small traits so the face can be driven from
//! firmware tasks or exercised on a host.
//!
//! - [`ui`]: geometry, colours, the canvas abstraction, the snowflake
//!   generator and the frame renderer
//! - [`system`]: wall-clock snapshots, redraw timer cadence, constants and
//!   the companion colour-config channel

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod system;
pub mod ui;

pub use system::{
    config::FaceConfig,
    sync::{ColorConfig, ConfigChannel, ConfigMap},
    time::ClockTime,
    timer::Scheduler,
};
pub use ui::{
    canvas::{Bitmap, Canvas, PaintStyle},
    snow_watchface::{Event, EventQueue, SnowflakeFace},
    WatchFace,
};
