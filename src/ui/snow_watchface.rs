//! Snowflake watch face
//!
//! All host callbacks arrive as [`Event`]s and are handled one at a time
//! between frames, so no state is ever touched while a frame is drawn.

use chrono::NaiveDateTime;
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};

use super::{
    canvas::{Bitmap, Canvas},
    mode::{DisplayProperties, InterruptionFilter, ModeSignals, RenderMode},
    paints::{HandPalette, PaintSet},
    render::{render_frame, FaceLayout, Frame},
    WatchFace,
};
use crate::system::{
    config::FaceConfig,
    sync::{color_updates, complete_config, ColorConfig, ColorKey, ConfigChannel, ConfigMap},
    time::{epoch_millis, ClockTime},
    timer::{RedrawTimer, Scheduler},
};

/// Host notification
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    /// Reported once after creation
    PropertiesChanged(DisplayProperties),
    InterruptionFilterChanged(InterruptionFilter),
    SurfaceChanged { width: u32, height: u32 },
    /// Once-a-minute tick from the host, the only redraw source in ambient
    TimeTick,
    /// The pending redraw posted through [`Scheduler`] fired
    RedrawTimer,
    TimeZoneChanged,
    /// A background bitmap was installed or removed
    BackgroundBitmapChanged(bool),
    /// Palette extracted from the background bitmap, `None` if extraction failed
    PaletteGenerated(Option<HandPalette>),
    ChannelConnected,
    /// Reply to [`ConfigChannel::request_config`]
    ConfigFetched(ConfigMap),
    /// The companion changed the stored config
    ConfigChanged(ConfigMap),
    Destroy,
}

/// Queue for events posted by other tasks, drained between frames
pub type EventQueue<const N: usize> = Channel<NoopRawMutex, Event, N>;

pub struct SnowflakeFace<S, K> {
    config: FaceConfig,
    signals: ModeSignals,
    /// Interactive colours from the companion
    colors: ColorConfig,
    paints: PaintSet,
    layout: FaceLayout,
    timer: RedrawTimer,
    scheduler: S,
    channel: K,
    has_bitmap: bool,
    invalidated: bool,
}

impl<S, K> SnowflakeFace<S, K>
where
    S: Scheduler,
    K: ConfigChannel,
{
    /// Create a hidden, interactive face with default colours
    pub fn new(config: FaceConfig, scheduler: S, channel: K) -> Self {
        let signals = ModeSignals::default();
        let colors = ColorConfig::default();
        let mut paints = PaintSet::new(&config, &colors);
        paints.refresh(&signals, &colors, &config);

        Self {
            layout: FaceLayout::new(0, 0, &config),
            timer: RedrawTimer::new(signals.update_interval(&config)),
            config,
            signals,
            colors,
            paints,
            scheduler,
            channel,
            has_bitmap: false,
            invalidated: true,
        }
    }

    pub fn signals(&self) -> &ModeSignals {
        &self.signals
    }

    pub fn render_mode(&self) -> RenderMode {
        self.signals.render_mode()
    }

    pub fn paints(&self) -> &PaintSet {
        &self.paints
    }

    pub fn colors(&self) -> &ColorConfig {
        &self.colors
    }

    pub fn layout(&self) -> &FaceLayout {
        &self.layout
    }

    pub fn interval(&self) -> embassy_time::Duration {
        self.timer.interval()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn channel(&self) -> &K {
        &self.channel
    }

    /// Whether a redraw was requested since the last call
    pub fn take_invalidated(&mut self) -> bool {
        core::mem::replace(&mut self.invalidated, false)
    }

    /// Handle every queued event. Returns the number handled.
    pub fn pump<const N: usize>(&mut self, queue: &EventQueue<N>, now: &NaiveDateTime) -> usize {
        let mut handled = 0;
        while let Ok(event) = queue.try_receive() {
            self.handle(event, now);
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, event: Event, now: &NaiveDateTime) {
        match event {
            Event::VisibilityChanged(visible) => {
                debug!("visibility changed: {}", visible);
                self.signals.visible = visible;
                if visible {
                    if self.channel.connect().is_err() {
                        warn!("config channel unavailable");
                    }
                } else if self.channel.is_connected() {
                    self.channel.disconnect();
                }
                self.update_timer(now);
            }
            Event::AmbientModeChanged(ambient) => {
                debug!("ambient mode changed: {}", ambient);
                if self.signals.ambient != ambient {
                    self.signals.ambient = ambient;
                    info!("render mode: {}", self.signals.render_mode());
                }
                self.refresh();
                self.update_timer(now);
            }
            Event::PropertiesChanged(properties) => {
                debug!(
                    "properties changed: low-bit ambient = {}, burn-in protection = {}",
                    properties.low_bit_ambient,
                    properties.burn_in_protection
                );
                self.signals.properties = properties;
                self.refresh();
            }
            Event::InterruptionFilterChanged(filter) => {
                debug!("interruption filter changed: {}", filter);
                let mute = filter.is_mute();
                let interval = if mute {
                    self.config.mute_update_rate
                } else {
                    self.config.normal_update_rate
                };
                if self.timer.set_interval(interval) && self.signals.timer_should_run() {
                    self.update_timer(now);
                }
                if self.signals.mute != mute {
                    self.signals.mute = mute;
                    info!("render mode: {}", self.signals.render_mode());
                    self.refresh();
                }
            }
            Event::SurfaceChanged { width, height } => {
                debug!("surface changed: {}x{}", width, height);
                self.layout = FaceLayout::new(width, height, &self.config);
                self.invalidated = true;
            }
            Event::TimeTick => {
                debug!("time tick: ambient = {}", self.signals.ambient);
                self.invalidated = true;
            }
            Event::RedrawTimer => {
                trace!("updating time");
                self.invalidated = true;
                if self.signals.timer_should_run() {
                    self.timer.rearm(&mut self.scheduler, true, epoch_millis(now));
                }
            }
            Event::TimeZoneChanged => {
                debug!("time zone changed");
                self.invalidated = true;
            }
            Event::BackgroundBitmapChanged(has_bitmap) => {
                debug!("background bitmap changed: {}", has_bitmap);
                self.has_bitmap = has_bitmap;
                if !has_bitmap {
                    self.paints.derive_from_background(self.colors.background);
                }
                self.refresh();
            }
            Event::PaletteGenerated(Some(palette)) => {
                debug!("palette generated: {}", palette);
                if self.has_bitmap {
                    self.paints.apply_palette(&palette);
                    self.refresh();
                }
            }
            Event::PaletteGenerated(None) => {
                debug!("no palette generated, keeping colours");
            }
            Event::ChannelConnected => {
                debug!("config channel connected");
                if self.channel.request_config().is_err() {
                    warn!("config fetch failed");
                }
            }
            Event::ConfigFetched(config) => {
                debug!("config fetched: {} keys", config.len());
                // Store the completed config so the companion sees every key
                match complete_config(&config) {
                    Ok(completed) => {
                        if self.channel.put_config(&completed).is_err() {
                            warn!("config store failed");
                        }
                        self.apply_config(&completed);
                    }
                    Err(_) => {
                        warn!("config could not be completed");
                        self.apply_config(&config);
                    }
                }
            }
            Event::ConfigChanged(config) => {
                debug!("config updated");
                self.apply_config(&config);
            }
            Event::Destroy => {
                debug!("destroy");
                self.timer.cancel(&mut self.scheduler);
                if self.channel.is_connected() {
                    self.channel.disconnect();
                }
            }
        }
    }

    /// Cancel the pending redraw and post a new one if the timer should run
    fn update_timer(&mut self, now: &NaiveDateTime) {
        trace!("update timer");
        let running = self.signals.timer_should_run();
        self.timer.rearm(&mut self.scheduler, running, epoch_millis(now));
        if running {
            self.invalidated = true;
        }
    }

    fn refresh(&mut self) {
        self.paints.refresh(&self.signals, &self.colors, &self.config);
        self.invalidated = true;
    }

    fn apply_config(&mut self, config: &ConfigMap) {
        let mut updated = false;
        for (key, color) in color_updates(config) {
            self.colors.set(key, color);
            if key == ColorKey::Background && !self.has_bitmap {
                self.paints.derive_from_background(color);
            }
            updated = true;
        }
        if updated {
            self.refresh();
        }
    }
}

impl<S, K> WatchFace for SnowflakeFace<S, K>
where
    S: Scheduler,
    K: ConfigChannel,
{
    fn draw<C, B>(&self, canvas: &mut C, now: &NaiveDateTime, background: Option<&B>) -> Result<(), C::Error>
    where
        C: Canvas,
        B: Bitmap + ?Sized,
    {
        let frame = Frame {
            time: ClockTime::from_datetime(now),
            layout: &self.layout,
            paints: &self.paints,
            config: &self.config,
            background: self.signals.background(self.has_bitmap),
            bitmap: background,
            show_seconds: self.signals.show_seconds(),
        };
        render_frame(canvas, &frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        system::{
            sync::{tests::MemoryChannel, KEY_BACKGROUND_COLOR, KEY_HOURS_COLOR, KEY_MINUTES_COLOR, KEY_SECONDS_COLOR},
            timer::tests::QueueScheduler,
        },
        ui::{
            canvas::{recording::RecordingCanvas, SliceBitmap},
            color::Argb,
        },
    };
    use chrono::NaiveDate;
    use embassy_time::Duration;

    type Face = SnowflakeFace<QueueScheduler, MemoryChannel>;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 24)
            .unwrap()
            .and_hms_milli_opt(9, 41, 7, 300)
            .unwrap()
    }

    fn face() -> Face {
        let mut face = SnowflakeFace::new(FaceConfig::new(), QueueScheduler::default(), MemoryChannel::default());
        face.handle(Event::SurfaceChanged { width: 240, height: 240 }, &now());
        face
    }

    fn map(entries: &[(&str, u32)]) -> ConfigMap {
        let mut map = ConfigMap::new();
        for (key, value) in entries {
            map.insert(key, *value).unwrap();
        }
        map
    }

    #[test]
    fn becoming_visible_starts_aligned_timer() {
        let mut face = face();
        assert!(face.scheduler().pending.is_empty());

        face.handle(Event::VisibilityChanged(true), &now());
        assert_eq!(face.scheduler().pending, [Duration::from_millis(700)]);
        assert!(face.channel().connected);
    }

    #[test]
    fn ambient_and_hidden_stop_the_timer() {
        let mut face = face();
        face.handle(Event::VisibilityChanged(true), &now());

        face.handle(Event::AmbientModeChanged(true), &now());
        assert!(face.scheduler().pending.is_empty());
        assert_eq!(face.render_mode(), RenderMode::Ambient);

        face.handle(Event::AmbientModeChanged(false), &now());
        assert_eq!(face.scheduler().pending.len(), 1);

        face.handle(Event::VisibilityChanged(false), &now());
        assert!(face.scheduler().pending.is_empty());
        assert!(!face.channel().connected);
    }

    #[test]
    fn timer_tick_reposts_once() {
        let mut face = face();
        face.handle(Event::VisibilityChanged(true), &now());
        face.take_invalidated();

        face.handle(Event::RedrawTimer, &now());
        face.handle(Event::RedrawTimer, &now());
        assert!(face.take_invalidated());
        assert_eq!(face.scheduler().pending.len(), 1);
    }

    #[test]
    fn mute_slows_the_timer_and_dims_the_label() {
        let mut face = face();
        face.handle(Event::VisibilityChanged(true), &now());

        face.handle(Event::InterruptionFilterChanged(InterruptionFilter::None), &now());
        assert_eq!(face.render_mode(), RenderMode::Mute);
        assert_eq!(face.interval(), Duration::from_millis(60_000));
        // 09:41:07.300 → next whole minute
        assert_eq!(face.scheduler().pending, [Duration::from_millis(52_700)]);
        assert_eq!(face.paints().label.color.alpha(), 100);

        face.handle(Event::InterruptionFilterChanged(InterruptionFilter::All), &now());
        assert_eq!(face.render_mode(), RenderMode::Interactive);
        assert_eq!(face.scheduler().pending, [Duration::from_millis(700)]);
        assert_eq!(face.paints().label.color.alpha(), 255);
    }

    #[test]
    fn low_bit_ambient_round_trip() {
        let mut face = face();
        face.handle(
            Event::PropertiesChanged(DisplayProperties {
                low_bit_ambient: true,
                burn_in_protection: false,
            }),
            &now(),
        );
        face.handle(
            Event::ConfigChanged(map(&[
                (KEY_HOURS_COLOR, 0xFFFF_0000),
                (KEY_MINUTES_COLOR, 0xFF00_FF00),
            ])),
            &now(),
        );
        let interactive = *face.paints();
        assert!(interactive.hour_hand.anti_alias);

        face.handle(Event::AmbientModeChanged(true), &now());
        let ambient = face.paints();
        assert!(!ambient.hour_hand.anti_alias);
        assert!(!ambient.minute_hand.anti_alias);
        assert_eq!(ambient.hour_hand.color, Argb::WHITE);
        assert_eq!(ambient.minute_hand.color, Argb::WHITE);
        assert_eq!(ambient.snowflake.color, Argb::GRAY);
        assert_eq!(ambient.hour_hand.shadow.map(|s| s.color), Some(Argb::BLACK));

        face.handle(Event::AmbientModeChanged(false), &now());
        assert_eq!(*face.paints(), interactive);
        assert_eq!(face.paints().hour_hand.color, Argb::from_u32(0xFFFF_0000));
    }

    #[test]
    fn config_in_ambient_applies_on_exit() {
        let mut face = face();
        face.handle(Event::AmbientModeChanged(true), &now());
        face.handle(Event::ConfigChanged(map(&[(KEY_SECONDS_COLOR, 0xFF00_00FF)])), &now());
        assert_eq!(face.paints().second_hand.color, Argb::WHITE);

        face.handle(Event::AmbientModeChanged(false), &now());
        assert_eq!(face.paints().second_hand.color, Argb::from_u32(0xFF00_00FF));
    }

    #[test]
    fn startup_fetch_fills_and_stores_defaults() {
        let mut face = face();
        face.handle(Event::VisibilityChanged(true), &now());
        face.handle(Event::ChannelConnected, &now());
        assert_eq!(face.channel().requests, 1);

        face.handle(Event::ConfigFetched(map(&[(KEY_HOURS_COLOR, 0xFF0000)])), &now());
        let stored = face.channel().stored.clone().unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored.get(KEY_HOURS_COLOR), Some(0xFF0000));
        assert_eq!(stored.get(KEY_BACKGROUND_COLOR), Some(0xFF00_0000));
        assert_eq!(stored.get(KEY_MINUTES_COLOR), Some(0xFFFF_FFFF));
        assert_eq!(stored.get(KEY_SECONDS_COLOR), Some(0xFF88_8888));
        assert_eq!(face.colors().hours, Argb::from_u32(0xFF0000));
    }

    #[test]
    fn fetch_with_many_other_keys_is_still_stored() {
        let mut face = face();
        face.handle(Event::VisibilityChanged(true), &now());
        face.handle(Event::ChannelConnected, &now());
        face.handle(
            Event::ConfigFetched(map(&[
                ("date_color", 1),
                ("face_style", 2),
                ("ticks_color", 3),
                ("font", 4),
                ("locale", 5),
                (KEY_HOURS_COLOR, 0xFF00_FF00),
            ])),
            &now(),
        );

        let stored = face.channel().stored.clone().unwrap();
        assert_eq!(stored.get(KEY_HOURS_COLOR), Some(0xFF00_FF00));
        assert_eq!(stored.get(KEY_BACKGROUND_COLOR), Some(0xFF00_0000));
        assert_eq!(stored.get(KEY_MINUTES_COLOR), Some(0xFFFF_FFFF));
        assert_eq!(stored.get(KEY_SECONDS_COLOR), Some(0xFF88_8888));
        assert_eq!(face.colors().hours, Argb::from_u32(0xFF00_FF00));
    }

    #[test]
    fn offline_channel_keeps_colors() {
        let channel = MemoryChannel {
            offline: true,
            ..Default::default()
        };
        let mut face = SnowflakeFace::new(FaceConfig::new(), QueueScheduler::default(), channel);
        let before = *face.colors();
        face.handle(Event::VisibilityChanged(true), &now());
        face.handle(Event::ChannelConnected, &now());
        face.handle(Event::ConfigFetched(ConfigMap::new()), &now());

        assert_eq!(face.channel().stored, None);
        assert_eq!(face.channel().requests, 0);
        assert_eq!(*face.colors(), before);
    }

    #[test]
    fn unknown_keys_do_not_invalidate() {
        let mut face = face();
        face.take_invalidated();
        face.handle(Event::ConfigChanged(map(&[("date_color", 7)])), &now());
        assert!(!face.take_invalidated());
    }

    #[test]
    fn time_zone_change_invalidates() {
        let mut face = face();
        face.take_invalidated();
        face.handle(Event::TimeZoneChanged, &now());
        assert!(face.take_invalidated());
    }

    #[test]
    fn background_color_tints_the_snowflake() {
        let mut face = face();
        face.handle(Event::ConfigChanged(map(&[(KEY_BACKGROUND_COLOR, 0xFF00_00FF)])), &now());
        assert_eq!(face.paints().background.color, Argb::from_u32(0xFF00_00FF));
        assert_eq!(face.paints().snowflake.color, Argb::from_argb(0xFF, 204, 204, 255));
    }

    #[test]
    fn palette_only_applies_with_a_bitmap() {
        let mut face = face();
        let palette = HandPalette {
            light_vibrant: Some(Argb::from_u32(0xFFAB_CDEF)),
            ..Default::default()
        };
        face.handle(Event::PaletteGenerated(Some(palette)), &now());
        assert_eq!(face.paints().snowflake.color, Argb::WHITE);

        face.handle(Event::BackgroundBitmapChanged(true), &now());
        face.handle(Event::PaletteGenerated(Some(palette)), &now());
        assert_eq!(face.paints().snowflake.color, Argb::from_u32(0xFFAB_CDEF));

        face.handle(Event::PaletteGenerated(None), &now());
        assert_eq!(face.paints().snowflake.color, Argb::from_u32(0xFFAB_CDEF));
    }

    #[test]
    fn destroy_cancels_everything() {
        let mut face = face();
        face.handle(Event::VisibilityChanged(true), &now());
        face.handle(Event::Destroy, &now());
        assert!(face.scheduler().pending.is_empty());
        assert!(!face.channel().connected);
    }

    #[test]
    fn queued_events_are_drained() {
        let queue: EventQueue<4> = Channel::new();
        queue.try_send(Event::VisibilityChanged(true)).unwrap();
        queue.try_send(Event::AmbientModeChanged(true)).unwrap();

        let mut face = face();
        assert_eq!(face.pump(&queue, &now()), 2);
        assert_eq!(face.render_mode(), RenderMode::Ambient);
        assert!(face.scheduler().pending.is_empty());
        assert_eq!(face.pump(&queue, &now()), 0);
    }

    #[test]
    fn draws_gray_bitmap_in_ambient() {
        let pixels = [Argb::from_u32(0xFFFF_0000); 4];
        let bitmap = SliceBitmap::new(2, &pixels).unwrap();
        let mut face = face();
        face.handle(Event::BackgroundBitmapChanged(true), &now());
        face.handle(Event::AmbientModeChanged(true), &now());

        let mut canvas = RecordingCanvas::default();
        face.draw(&mut canvas, &now(), Some(&bitmap)).unwrap();
        assert!(matches!(
            canvas.ops[0],
            crate::ui::canvas::recording::Op::Bitmap { first_pixel, .. }
                if first_pixel == Argb::from_u32(0xFFFF_0000).desaturate()
        ));
        assert!(canvas.stack.is_empty());
    }
}
