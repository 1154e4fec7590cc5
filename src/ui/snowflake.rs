//! Procedural snowflake
//!
//! The snowflake is a pure function of the tick count (seconds of the day
//! divided by 14). The day is split into bands by fixed thresholds; within a
//! band the radius, stub length and rotation of up to three overlaid stars
//! are interpolated linearly, and every band starts where the previous one
//! ended.
//!
//! Shapes are described in face coordinates with 12 o'clock pointing up.
//! The renderer rotates the whole pattern onto the hour hand.


use super::geometry::{rotate_about, Point2};

/// Layout of the snowflake on the face
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SnowflakeLayout {
    pub center: Point2,
    /// Spokes start here
    pub gap_radius: f32,
    /// Reference radius, the hour hand length
    pub max_radius: f32,
    /// Reference stub length
    pub max_stub: f32,
}

impl SnowflakeLayout {
    pub fn new(center: Point2, gap_radius: f32, hour_hand_radius: f32) -> Self {
        Self {
            center,
            gap_radius,
            max_radius: hour_hand_radius,
            max_stub: hour_hand_radius / 10.0,
        }
    }
}

/// Animation band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// A single star grows out of the centre
    Sprout,
    /// A second, larger star grows on top of the first
    Branch,
    /// The inner star vanishes while the outer one splits in two
    Morph,
    /// Mini snowflakes grow and drift outwards between the arms
    Bloom,
    /// Everything stays in place and flickers with the tick count
    Drift,
}

impl Phase {
    pub const ALL: [Phase; 5] = [Phase::Sprout, Phase::Branch, Phase::Morph, Phase::Bloom, Phase::Drift];

    /// Band containing `tick`. Anything below the first threshold still
    /// sprouts; everything from the fifth threshold on drifts.
    pub fn at(tick: i32, thresholds: &[f32; 7]) -> Phase {
        let tick = tick as f32;
        if tick < thresholds[1] {
            Phase::Sprout
        } else if tick < thresholds[2] {
            Phase::Branch
        } else if tick < thresholds[3] {
            Phase::Morph
        } else if tick < thresholds[4] {
            Phase::Bloom
        } else {
            Phase::Drift
        }
    }

    /// Thresholds bounding this band
    fn bounds(&self, thresholds: &[f32; 7]) -> (f32, f32) {
        match self {
            Phase::Sprout => (thresholds[0], thresholds[1]),
            Phase::Branch => (thresholds[1], thresholds[2]),
            Phase::Morph => (thresholds[2], thresholds[3]),
            Phase::Bloom => (thresholds[3], thresholds[4]),
            Phase::Drift => (thresholds[4], thresholds[6]),
        }
    }

    /// Progress through the band, clamped to `0..=1`
    pub fn progress(&self, tick: i32, thresholds: &[f32; 7]) -> f32 {
        let (start, end) = self.bounds(thresholds);
        if end <= start {
            return 0.0;
        }
        ((tick as f32 - start) / (end - start)).clamp(0.0, 1.0)
    }
}

/// One star of the snowflake
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Spokes from `inner_radius` to `outer_radius`, each with `stubs`
    /// mirrored side ticks getting shorter towards the tip
    Star {
        points: u32,
        inner_radius: f32,
        outer_radius: f32,
        stubs: u32,
        stub_length: f32,
        offset: f32,
    },
    /// Small stars centred on a ring of `radius`, one per point
    Mini {
        points: u32,
        radius: f32,
        stubs: u32,
        stub_length: f32,
        offset: f32,
    },
}

impl Shape {
    fn star(inner_radius: f32, outer_radius: f32, stubs: u32, stub_length: f32, offset: f32) -> Self {
        Shape::Star {
            points: 6,
            inner_radius,
            outer_radius,
            stubs,
            stub_length,
            offset,
        }
    }

    fn mini(radius: f32, stub_length: f32, offset: f32) -> Self {
        Shape::Mini {
            points: 6,
            radius,
            stubs: 8,
            stub_length,
            offset,
        }
    }

    /// Outer extent of the shape
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Star { outer_radius, .. } => outer_radius,
            Shape::Mini { radius, .. } => radius,
        }
    }

    /// Rotation of the first point, in degrees
    pub fn offset(&self) -> f32 {
        match *self {
            Shape::Star { offset, .. } | Shape::Mini { offset, .. } => offset,
        }
    }

    pub fn segment_count(&self) -> usize {
        match *self {
            Shape::Star { points, stubs, .. } => (points * (2 * stubs + 1)) as usize,
            Shape::Mini { points, stubs, .. } => (points * stubs) as usize,
        }
    }

    /// Whether every segment of the shape has zero length
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Shape::Star {
                inner_radius,
                outer_radius,
                stub_length,
                ..
            } => outer_radius <= inner_radius && stub_length <= 0.0,
            Shape::Mini { stub_length, .. } => stub_length <= 0.0,
        }
    }

    /// The `index`-th segment around `center`
    fn segment(&self, index: usize, center: Point2) -> Segment {
        // Spokes are spaced by whole degrees
        let spacing = |points: u32| (360 / points.max(1)) as f32;
        let place = |x: f32, up: f32, degrees: f32| {
            rotate_about(Point2::new(center.x + x, center.y - up), center, degrees)
        };

        match *self {
            Shape::Star {
                points,
                inner_radius,
                outer_radius,
                stubs,
                stub_length,
                offset,
            } => {
                let per_point = (2 * stubs + 1) as usize;
                let rotation = offset + (index / per_point) as f32 * spacing(points);
                let part = (index % per_point) as u32;

                // Spokes never reach back into the centre gap
                let outer_radius = outer_radius.max(inner_radius);
                if part == 2 * stubs {
                    return Segment::new(
                        place(0.0, inner_radius, rotation),
                        place(0.0, outer_radius, rotation),
                    );
                }

                let j = part / 2;
                let side = if part % 2 == 0 { -1.0 } else { 1.0 };
                let spoke = outer_radius - inner_radius;
                let base = inner_radius + spoke / (stubs + 1) as f32 * (j + 1) as f32;
                let reach = stub_length.max(0.0) * (stubs - j) as f32;

                Segment::new(
                    place(0.0, base, rotation),
                    place(side * reach, base + reach, rotation),
                )
            }
            Shape::Mini {
                points,
                radius,
                stubs,
                stub_length,
                offset,
            } => {
                let stubs_per_point = stubs.max(1) as usize;
                let rotation = offset + (index / stubs_per_point) as f32 * spacing(points);
                let turn = (index % stubs_per_point) as f32 * spacing(stubs);
                let (sin, cos) = libm::sincosf(turn.to_radians());
                let length = stub_length.max(0.0);

                Segment::new(
                    place(0.0, radius, rotation),
                    place(length * sin, radius + length * cos, rotation),
                )
            }
        }
    }
}

/// Line segment in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    pub from: Point2,
    pub to: Point2,
}

impl Segment {
    pub fn new(from: Point2, to: Point2) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }

    pub fn is_finite(&self) -> bool {
        self.from.is_finite() && self.to.is_finite()
    }
}

/// Snowflake for one tick count
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    phase: Phase,
    /// Drawn in order, unused slots trailing
    shapes: [Option<Shape>; 3],
}

impl Pattern {
    pub fn at(tick: i32, layout: &SnowflakeLayout, thresholds: &[f32; 7]) -> Self {
        Self::for_phase(Phase::at(tick, thresholds), tick, layout, thresholds)
    }

    /// Evaluate the formulas of `phase` at `tick`, even outside its band
    pub fn for_phase(phase: Phase, tick: i32, layout: &SnowflakeLayout, thresholds: &[f32; 7]) -> Self {
        let f = phase.progress(tick, thresholds);
        let gap = layout.gap_radius;
        let r = layout.max_radius;
        let stub = layout.max_stub;

        let shapes = match phase {
            Phase::Sprout => [Some(Shape::star(gap, f * r, 2, f * stub, 0.0)), None, None],
            Phase::Branch => [
                Some(Shape::star(gap, r, 2, stub, 0.0)),
                Some(Shape::star(gap, f * r * 3.0 / 2.0, 3, f * stub / 2.0, 30.0)),
                None,
            ],
            Phase::Morph => [
                Some(Shape::star(gap, r - f * r, 2, stub - f * stub, 0.0)),
                Some(Shape::star(gap, r * 3.0 / 2.0, 3, stub / 2.0, 30.0 - f * 15.0)),
                Some(Shape::star(
                    gap,
                    r * 3.0 / 2.0 - f * r * 3.0 / 4.0,
                    3,
                    stub / 2.0 - f * stub / 4.0,
                    30.0 + f * 15.0,
                )),
            ],
            Phase::Bloom => [
                Some(Shape::star(gap, r * 3.0 / 2.0, 3 + tick.rem_euclid(3) as u32, stub / 2.0, 15.0)),
                Some(Shape::star(gap, r * 3.0 / 4.0, 3, stub / 4.0, 45.0)),
                Some(Shape::mini(r + f * r / 4.0, f * stub, 45.0)),
            ],
            Phase::Drift => [
                Some(Shape::star(gap, r * 3.0 / 2.0, 3 + tick.rem_euclid(3) as u32, stub / 2.0, 15.0)),
                Some(Shape::star(gap, r * 3.0 / 4.0, 3 - tick.rem_euclid(2) as u32, stub / 4.0, 45.0)),
                Some(Shape::mini(
                    r * 5.0 / 4.0,
                    stub + tick.rem_euclid(8) as f32 * stub / 8.0,
                    45.0,
                )),
            ],
        };

        Self { phase, shapes }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.iter().flatten()
    }

    pub fn segment_count(&self) -> usize {
        self.shapes().map(Shape::segment_count).sum()
    }

    /// Lazily generate every segment around `center`
    pub fn segments(&self, center: Point2) -> Segments<'_> {
        Segments {
            shapes: &self.shapes,
            center,
            shape: 0,
            index: 0,
        }
    }
}

/// Iterator over the segments of a [`Pattern`]
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    shapes: &'a [Option<Shape>],
    center: Point2,
    shape: usize,
    index: usize,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        loop {
            let shape = self.shapes.get(self.shape)?.as_ref()?;
            if self.index < shape.segment_count() {
                let segment = shape.segment(self.index, self.center);
                self.index += 1;
                return Some(segment);
            }
            self.shape += 1;
            self.index = 0;
        }
    }
}
