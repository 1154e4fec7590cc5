//! ARGB colours
//!
//! Colours travel over the companion channel as packed `0xAARRGGBB` integers,
//! so that is the face's native colour type. Conversion to display colours
//! goes through `Rgb888`.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// Packed `0xAARRGGBB` colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Argb(u32);

impl Argb {
    pub const BLACK: Argb = Argb(0xFF00_0000);
    pub const WHITE: Argb = Argb(0xFFFF_FFFF);
    pub const GRAY: Argb = Argb(0xFF88_8888);
    pub const TRANSPARENT: Argb = Argb(0);

    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn into_u32(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Same colour with a different alpha
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | (alpha as u32) << 24)
    }

    /// Grey of equal luminance, matching a zero-saturation colour matrix
    pub fn desaturate(self) -> Self {
        let luma = 0.213 * self.red() as f32 + 0.715 * self.green() as f32 + 0.072 * self.blue() as f32;
        let l = clamp_channel(luma);
        Self::from_argb(self.alpha(), l, l, l)
    }

    /// Hue (0–360), saturation and value (0–1)
    pub fn to_hsv(self) -> [f32; 3] {
        let r = self.red() as f32 / 255.0;
        let g = self.green() as f32 / 255.0;
        let b = self.blue() as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * libm::fmodf((g - b) / delta, 6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let hue = if hue < 0.0 { hue + 360.0 } else { hue };
        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        [hue, saturation, max]
    }

    /// Opaque colour from hue (degrees), saturation and value
    pub fn from_hsv(hsv: [f32; 3]) -> Self {
        let [hue, saturation, value] = hsv;
        let hue = libm::fmodf(hue, 360.0);
        let hue = if hue < 0.0 { hue + 360.0 } else { hue };
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);

        let c = value * saturation;
        let x = c * (1.0 - libm::fabsf(libm::fmodf(hue / 60.0, 2.0) - 1.0));
        let m = value - c;

        let (r, g, b) = match (hue / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::from_argb(
            0xFF,
            clamp_channel((r + m) * 255.0),
            clamp_channel((g + m) * 255.0),
            clamp_channel((b + m) * 255.0),
        )
    }

    /// Light tint of this colour's hue used for the snowflake and ticks.
    ///
    /// Value is raised to full on purpose so the tint stays visible on dark
    /// backgrounds; greys give white.
    pub fn rest_tint(self) -> Self {
        let [hue, saturation, _] = self.to_hsv();
        // Greys have no hue to tint with
        let saturation = if saturation == 0.0 { 0.0 } else { 0.2 };
        Self::from_hsv([hue, saturation, 1.0])
    }
}

fn clamp_channel(value: f32) -> u8 {
    libm::roundf(value).clamp(0.0, 255.0) as u8
}

impl From<Argb> for Rgb888 {
    /// Alpha is applied against black, displays have no blending.
    fn from(color: Argb) -> Self {
        let alpha = color.alpha() as u32;
        let scale = |channel: u8| ((channel as u32 * alpha + 127) / 255) as u8;
        Rgb888::new(scale(color.red()), scale(color.green()), scale(color.blue()))
    }
}

impl From<Rgb888> for Argb {
    fn from(color: Rgb888) -> Self {
        Argb::from_argb(0xFF, color.r(), color.g(), color.b())
    }
}
