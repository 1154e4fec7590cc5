//! Companion colour-config synchronisation
//!
//! The phone companion stores the face colours as a small key/value map. The
//! face reads it on connection, fills in missing keys, writes it back, and
//! applies every change notification it receives afterwards.

use heapless::{String, Vec};

use crate::ui::color::Argb;

pub const KEY_BACKGROUND_COLOR: &str = "background_color";
pub const KEY_HOURS_COLOR: &str = "hours_color";
pub const KEY_MINUTES_COLOR: &str = "minutes_color";
pub const KEY_SECONDS_COLOR: &str = "seconds_color";

/// Longest key accepted from the channel
pub const MAX_KEY_LEN: usize = 32;
/// Maximum number of entries in a config map
pub const MAX_ENTRIES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Key longer than [`MAX_KEY_LEN`]
    KeyTooLong,
    /// Map already holds [`MAX_ENTRIES`] entries
    MapFull,
}

/// Key/value snapshot as carried over the companion channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMap {
    entries: Vec<(String<MAX_KEY_LEN>, u32), MAX_ENTRIES>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, value)| *value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: &str, value: u32) -> Result<(), ConfigError> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            entry.1 = value;
            return Ok(());
        }

        let key = String::try_from(key).map_err(|_| ConfigError::KeyTooLong)?;
        self.entries
            .push((key, value))
            .map_err(|_| ConfigError::MapFull)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four colours a user can configure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorKey {
    Background,
    Hours,
    Minutes,
    Seconds,
}

impl ColorKey {
    pub const ALL: [ColorKey; 4] = [
        ColorKey::Background,
        ColorKey::Hours,
        ColorKey::Minutes,
        ColorKey::Seconds,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            KEY_BACKGROUND_COLOR => Some(ColorKey::Background),
            KEY_HOURS_COLOR => Some(ColorKey::Hours),
            KEY_MINUTES_COLOR => Some(ColorKey::Minutes),
            KEY_SECONDS_COLOR => Some(ColorKey::Seconds),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorKey::Background => KEY_BACKGROUND_COLOR,
            ColorKey::Hours => KEY_HOURS_COLOR,
            ColorKey::Minutes => KEY_MINUTES_COLOR,
            ColorKey::Seconds => KEY_SECONDS_COLOR,
        }
    }

    /// Colour used when the companion has never stored this key. Also the
    /// ambient colour of the element.
    pub fn default_color(&self) -> Argb {
        match self {
            ColorKey::Background => Argb::BLACK,
            ColorKey::Hours => Argb::WHITE,
            ColorKey::Minutes => Argb::WHITE,
            ColorKey::Seconds => Argb::GRAY,
        }
    }
}

/// Resolved interactive colours; every key always has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorConfig {
    pub background: Argb,
    pub hours: Argb,
    pub minutes: Argb,
    pub seconds: Argb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: ColorKey::Background.default_color(),
            hours: ColorKey::Hours.default_color(),
            minutes: ColorKey::Minutes.default_color(),
            seconds: ColorKey::Seconds.default_color(),
        }
    }
}

impl ColorConfig {
    pub fn get(&self, key: ColorKey) -> Argb {
        match key {
            ColorKey::Background => self.background,
            ColorKey::Hours => self.hours,
            ColorKey::Minutes => self.minutes,
            ColorKey::Seconds => self.seconds,
        }
    }

    pub fn set(&mut self, key: ColorKey, color: Argb) {
        match key {
            ColorKey::Background => self.background = color,
            ColorKey::Hours => self.hours = color,
            ColorKey::Minutes => self.minutes = color,
            ColorKey::Seconds => self.seconds = color,
        }
    }
}

/// Config to store back after the startup fetch.
///
/// Every colour key comes first, with its fetched value or its default.
/// Other keys follow while they fit and are dropped with a warning otherwise.
pub fn complete_config(config: &ConfigMap) -> Result<ConfigMap, ConfigError> {
    let mut completed = ConfigMap::new();
    for key in ColorKey::ALL {
        let value = config
            .get(key.as_str())
            .unwrap_or_else(|| key.default_color().into_u32());
        completed.insert(key.as_str(), value)?;
    }

    for (key, value) in config.iter().filter(|(key, _)| ColorKey::parse(key).is_none()) {
        if completed.insert(key, value).is_err() {
            warn!("config map full, dropping key {=str}", key);
        }
    }
    Ok(completed)
}

/// Recognised colour updates contained in a map, in map order.
///
/// Unknown keys are logged and skipped.
pub fn color_updates(config: &ConfigMap) -> impl Iterator<Item = (ColorKey, Argb)> + '_ {
    config.iter().filter_map(|(key, value)| match ColorKey::parse(key) {
        Some(color_key) => {
            debug!("config key {=str} -> {=u32:#x}", key, value);
            Some((color_key, Argb::from_u32(value)))
        }
        None => {
            warn!("ignoring unknown config key {=str}", key);
            None
        }
    })
}

/// Companion key/value channel.
///
/// All operations are fire-and-forget; results come back as face events
/// (`ChannelConnected`, `ConfigFetched`, `ConfigChanged`). A failing call
/// leaves the face colours untouched.
pub trait ConfigChannel {
    type Error;

    fn connect(&mut self) -> Result<(), Self::Error>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Request the stored config. The reply arrives as `Event::ConfigFetched`.
    fn request_config(&mut self) -> Result<(), Self::Error>;

    /// Store a complete config
    fn put_config(&mut self, config: &ConfigMap) -> Result<(), Self::Error>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::vec::Vec as StdVec;

    /// In-memory companion channel
    #[derive(Debug, Default)]
    pub(crate) struct MemoryChannel {
        pub(crate) connected: bool,
        pub(crate) offline: bool,
        pub(crate) requests: usize,
        pub(crate) stored: Option<ConfigMap>,
    }

    impl ConfigChannel for MemoryChannel {
        type Error = ();

        fn connect(&mut self) -> Result<(), ()> {
            if self.offline {
                return Err(());
            }
            self.connected = true;
            Ok(())
        }

        fn disconnect(&mut self) {
            self.connected = false;
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn request_config(&mut self) -> Result<(), ()> {
            if !self.connected {
                return Err(());
            }
            self.requests += 1;
            Ok(())
        }

        fn put_config(&mut self, config: &ConfigMap) -> Result<(), ()> {
            if !self.connected {
                return Err(());
            }
            self.stored = Some(config.clone());
            Ok(())
        }
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut map = ConfigMap::new();
        map.insert(KEY_HOURS_COLOR, 1).unwrap();
        map.insert(KEY_HOURS_COLOR, 2).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(KEY_HOURS_COLOR), Some(2));
    }

    #[test]
    fn insert_rejects_long_keys_and_overflow() {
        let mut map = ConfigMap::new();
        assert_eq!(
            map.insert("a_key_that_is_far_too_long_for_the_map", 0),
            Err(ConfigError::KeyTooLong)
        );
        for i in 0..MAX_ENTRIES {
            let key = std::format!("key{i}");
            map.insert(&key, i as u32).unwrap();
        }
        assert_eq!(map.insert("one_more", 0), Err(ConfigError::MapFull));
    }

    #[test]
    fn completed_config_keeps_explicit_values() {
        let mut map = ConfigMap::new();
        map.insert(KEY_HOURS_COLOR, 0xFFFF_0000).unwrap();

        let completed = complete_config(&map).unwrap();
        assert_eq!(completed.len(), 4);
        assert_eq!(completed.get(KEY_HOURS_COLOR), Some(0xFFFF_0000));
        assert_eq!(completed.get(KEY_BACKGROUND_COLOR), Some(0xFF00_0000));
        assert_eq!(completed.get(KEY_MINUTES_COLOR), Some(0xFFFF_FFFF));
        assert_eq!(completed.get(KEY_SECONDS_COLOR), Some(0xFF88_8888));

        // Completing twice changes nothing
        assert_eq!(complete_config(&completed), Ok(completed));
    }

    #[test]
    fn colour_keys_win_over_other_keys() {
        let mut map = ConfigMap::new();
        for key in ["date_color", "face_style", "ticks_color", "font", "locale"] {
            map.insert(key, 1).unwrap();
        }
        map.insert(KEY_HOURS_COLOR, 0xFF00_FF00).unwrap();
        map.insert("units", 2).unwrap();
        map.insert("layout", 3).unwrap();
        assert_eq!(map.len(), MAX_ENTRIES);

        let completed = complete_config(&map).unwrap();
        assert_eq!(completed.len(), MAX_ENTRIES);
        assert_eq!(completed.get(KEY_HOURS_COLOR), Some(0xFF00_FF00));
        for key in ColorKey::ALL {
            assert!(completed.contains_key(key.as_str()));
        }
        // Other keys keep their order until the map is full
        assert_eq!(completed.get("date_color"), Some(1));
        assert_eq!(completed.get("ticks_color"), Some(1));
        assert_eq!(completed.get("font"), Some(1));
        assert_eq!(completed.get("locale"), None);
        assert_eq!(completed.get("layout"), None);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let mut map = ConfigMap::new();
        map.insert("face_style", 3).unwrap();
        map.insert(KEY_SECONDS_COLOR, 0xFF00_FF00).unwrap();

        let updates: StdVec<_> = color_updates(&map).collect();
        assert_eq!(updates, [(ColorKey::Seconds, Argb::from_u32(0xFF00_FF00))]);
    }

    #[test]
    fn key_names_round_trip() {
        for key in ColorKey::ALL {
            assert_eq!(ColorKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ColorKey::parse("date_color"), None);
    }
}
