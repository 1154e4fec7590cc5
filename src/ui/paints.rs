//! Paint state of the face
//!
//! One [`PaintStyle`] per visual element, created once and recomputed in
//! place whenever the mode, the configured colours or the background palette
//! change.

use super::{
    canvas::PaintStyle,
    color::Argb,
    mode::ModeSignals,
};
use crate::system::{config::FaceConfig, sync::ColorConfig};

/// Colours extracted from the background bitmap by the host.
///
/// Hands keep the configured colours; the palette only tints the snowflake
/// and the hand shadows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandPalette {
    pub light_vibrant: Option<Argb>,
    pub dark_muted: Option<Argb>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaintSet {
    pub background: PaintStyle,
    pub hour_hand: PaintStyle,
    pub minute_hand: PaintStyle,
    pub second_hand: PaintStyle,
    /// Snowflake and tick marks
    pub snowflake: PaintStyle,
    /// Centre time label
    pub label: PaintStyle,

    /// Interactive snowflake colour
    rest_color: Argb,
    /// Interactive hand shadow colour
    shadow_color: Argb,
}

impl PaintSet {
    pub fn new(config: &FaceConfig, colors: &ColorConfig) -> Self {
        let hand = PaintStyle::stroke(Argb::WHITE, config.hand_stroke_width)
            .with_shadow(config.shadow_radius, Argb::GRAY);
        let hour_hand = PaintStyle::stroke(Argb::WHITE, config.hour_scale_factor * config.hand_stroke_width)
            .with_shadow(config.hour_scale_factor * config.shadow_radius, Argb::GRAY);
        let label = PaintStyle::stroke(Argb::WHITE, config.hand_stroke_width / 4.0)
            .with_text_size(config.label_text_size);

        let mut paints = Self {
            background: PaintStyle::fill(colors.background),
            hour_hand,
            minute_hand: hand,
            second_hand: hand,
            snowflake: PaintStyle::stroke(Argb::WHITE, config.rest_stroke_width),
            label,
            rest_color: Argb::WHITE,
            shadow_color: Argb::BLACK,
        };
        paints.derive_from_background(colors.background);
        paints
    }

    /// Snowflake tint and shadow when there is no background bitmap
    pub fn derive_from_background(&mut self, background: Argb) {
        self.rest_color = background.rest_tint();
        self.shadow_color = Argb::BLACK;
    }

    /// Snowflake and shadow colours from a bitmap palette
    pub fn apply_palette(&mut self, palette: &HandPalette) {
        self.rest_color = palette.light_vibrant.unwrap_or(Argb::WHITE);
        self.shadow_color = palette.dark_muted.unwrap_or(Argb::BLACK);
    }

    pub fn rest_color(&self) -> Argb {
        self.rest_color
    }

    pub fn shadow_color(&self) -> Argb {
        self.shadow_color
    }

    /// Recompute every paint for the current mode.
    ///
    /// Ambient forces a fixed monochrome palette; leaving it brings back the
    /// configured colours.
    pub fn refresh(&mut self, signals: &ModeSignals, colors: &ColorConfig, config: &FaceConfig) {
        if signals.ambient {
            self.background.color = Argb::BLACK;
            self.hour_hand.color = Argb::WHITE;
            self.minute_hand.color = Argb::WHITE;
            self.second_hand.color = Argb::WHITE;
            self.snowflake.color = Argb::GRAY;
            self.set_shadow_color(Argb::BLACK);
        } else {
            self.background.color = colors.background;
            self.hour_hand.color = colors.hours;
            self.minute_hand.color = colors.minutes;
            self.second_hand.color = colors.seconds;
            self.snowflake.color = self.rest_color;
            self.set_shadow_color(self.shadow_color);
        }

        let hand_anti_alias = signals.hand_anti_alias();
        self.hour_hand.anti_alias = hand_anti_alias;
        self.minute_hand.anti_alias = hand_anti_alias;
        self.second_hand.anti_alias = hand_anti_alias;
        self.snowflake.anti_alias = signals.anti_alias();

        self.label.color = self.minute_hand.color.with_alpha(signals.label_alpha(config));
        self.label.anti_alias = signals.anti_alias();
    }

    fn set_shadow_color(&mut self, color: Argb) {
        self.hour_hand.set_shadow_color(color);
        self.minute_hand.set_shadow_color(color);
        self.second_hand.set_shadow_color(color);
    }
}
