//! Watch face configuration
//!
//! Every visual and timing constant lives here and is built once at start-up.

use embassy_time::Duration;

/// Tick-count thresholds splitting the day into snowflake animation bands.
pub const SNOWFLAKE_THRESHOLDS: [f32; 7] = [-500.0, 1000.0, 2000.0, 3000.0, 5000.0, 8000.0, 10000.0];

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceConfig {
    /// Redraw interval while interactive and not muted
    pub normal_update_rate: Duration,
    /// Redraw interval while muted
    pub mute_update_rate: Duration,

    /// Label alpha in mute mode
    pub mute_alpha: u8,
    /// Label alpha otherwise
    pub normal_alpha: u8,

    /// Minute and second hand stroke width
    pub hand_stroke_width: f32,
    /// Snowflake and tick stroke width
    pub rest_stroke_width: f32,
    /// Hour hand stroke and shadow multiplier
    pub hour_scale_factor: f32,
    pub shadow_radius: f32,

    /// Radius left empty around the centre, also the centre circle radius
    pub center_gap_radius: f32,
    pub tick_length: f32,

    /// Hand lengths as a fraction of the horizontal centre
    pub hour_hand_ratio: f32,
    pub minute_hand_ratio: f32,
    pub second_hand_ratio: f32,

    pub label_text_size: f32,

    pub snowflake_thresholds: [f32; 7],
    /// Seconds of the day per snowflake tick
    pub seconds_per_tick: i32,
}

impl FaceConfig {
    /// Create the default face configuration
    pub const fn new() -> Self {
        Self {
            normal_update_rate: Duration::from_millis(1_000),
            mute_update_rate: Duration::from_millis(60_000),

            mute_alpha: 100,
            normal_alpha: 255,

            hand_stroke_width: 6.0,
            rest_stroke_width: 4.0,
            hour_scale_factor: 1.1,
            shadow_radius: 6.0,

            center_gap_radius: 30.0,
            tick_length: 10.0,

            hour_hand_ratio: 0.5,
            minute_hand_ratio: 0.7,
            second_hand_ratio: 0.9,

            label_text_size: 20.0,

            snowflake_thresholds: SNOWFLAKE_THRESHOLDS,
            seconds_per_tick: 14,
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self::new()
    }
}
