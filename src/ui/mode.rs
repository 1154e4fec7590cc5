//! Display modes
//!
//! Five independent host signals decide how the face is drawn and how often.
//! They are collected in [`ModeSignals`] and every decision is derived from it
//! in one place.

use embassy_time::Duration;

use crate::system::config::FaceConfig;

/// Mode used for colour and alpha decisions in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMode {
    Interactive,
    Ambient,
    Mute,
}

/// Background drawn in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackgroundKind {
    /// Configured background colour
    SolidColor,
    /// Background bitmap in colour
    Bitmap,
    /// Desaturated background bitmap
    GrayBitmap,
    /// Plain black, protecting ambient displays from burn-in and banding
    SolidBlack,
}

/// Host "do not disturb" filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptionFilter {
    All,
    Priority,
    /// Nothing interrupts: the face goes mute
    None,
    Alarms,
}

impl InterruptionFilter {
    pub fn is_mute(&self) -> bool {
        matches!(self, InterruptionFilter::None)
    }
}

/// Static display capabilities, reported once by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayProperties {
    /// Fewer colour bits in ambient mode
    pub low_bit_ambient: bool,
    /// Static bright pixels must be avoided in ambient mode
    pub burn_in_protection: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeSignals {
    pub visible: bool,
    pub ambient: bool,
    pub mute: bool,
    pub properties: DisplayProperties,
}

impl ModeSignals {
    /// Ambient wins over mute
    pub fn render_mode(&self) -> RenderMode {
        if self.ambient {
            RenderMode::Ambient
        } else if self.mute {
            RenderMode::Mute
        } else {
            RenderMode::Interactive
        }
    }

    /// The periodic redraw runs only while visible and not ambient
    pub fn timer_should_run(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Interval of the periodic redraw while it runs
    pub fn update_interval(&self, config: &FaceConfig) -> Duration {
        if self.mute {
            config.mute_update_rate
        } else {
            config.normal_update_rate
        }
    }

    /// Redraw cadence in the current state; `None` when redraws are driven
    /// by the host's minute tick or the face is hidden.
    pub fn cadence(&self, config: &FaceConfig) -> Option<Duration> {
        self.timer_should_run().then(|| self.update_interval(config))
    }

    /// Ambient on a display that needs protecting
    fn degraded_ambient(&self) -> bool {
        self.ambient && (self.properties.low_bit_ambient || self.properties.burn_in_protection)
    }

    pub fn background(&self, has_bitmap: bool) -> BackgroundKind {
        if self.degraded_ambient() {
            BackgroundKind::SolidBlack
        } else if !has_bitmap {
            BackgroundKind::SolidColor
        } else if self.ambient {
            BackgroundKind::GrayBitmap
        } else {
            BackgroundKind::Bitmap
        }
    }

    /// Hands lose anti-aliasing in ambient on low-bit or burn-in displays
    pub fn hand_anti_alias(&self) -> bool {
        !self.degraded_ambient()
    }

    /// Everything else loses anti-aliasing in ambient on low-bit displays
    pub fn anti_alias(&self) -> bool {
        !(self.ambient && self.properties.low_bit_ambient)
    }

    /// Whether the second hand is drawn
    pub fn show_seconds(&self) -> bool {
        !self.ambient
    }

    pub fn label_alpha(&self, config: &FaceConfig) -> u8 {
        if self.mute {
            config.mute_alpha
        } else {
            config.normal_alpha
        }
    }
}
