use std::time::{Duration, Instant};

use crate::geo::GeoPoint;
use crate::route_path::RoutePath;

/// Lifecycle phase of a tracking run, as shown to the user.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Approaching,
    Arrived,
    EnRoute,
}

/// What one tick produced: the point to move the marker to, the phase to
/// display, and whether the one-shot arrival milestone fired on this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickUpdate {
    pub point: GeoPoint,
    pub phase: Phase,
    pub arrived_now: bool,
}

/// One active tracking run: a path plus a monotonically increasing index into
/// it. The session does not own any timer; a single external scheduler calls
/// `tick` and decides the cadence. It also does not render anything, callers
/// get the point/phase and do their own marker updates.
pub struct TrackingSession {
    path: RoutePath,
    index: usize,
    phase: Phase,
    arrival_notified: bool,
    arrived_at: Option<Instant>,
    arrival_hold: Duration,
}

impl TrackingSession {
    pub fn new(path: RoutePath, arrival_hold: Duration) -> Self {
        TrackingSession {
            path,
            index: 0,
            phase: Phase::Approaching,
            arrival_notified: false,
            arrived_at: None,
            arrival_hold,
        }
    }

    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.path.len()
    }

    /// Advances the playback by one step. Returns `None` once the path is
    /// exhausted (terminal, no looping).
    ///
    /// The phase at the midpoint is driven by two competing rules: the index
    /// moving past the midpoint, and the fixed arrival hold. The hold wins:
    /// the display stays `arrived` until `arrival_hold` has elapsed, no matter
    /// how far the index has advanced by then.
    pub fn tick(&mut self, now: Instant) -> Option<TickUpdate> {
        if self.is_finished() {
            return None;
        }
        let point = self.path.points()[self.index];
        let midpoint = self.path.midpoint_index();

        let mut arrived_now = false;
        self.phase = if self.index < midpoint {
            Phase::Approaching
        } else if self.index == midpoint && !self.arrival_notified {
            self.arrival_notified = true;
            self.arrived_at = Some(now);
            arrived_now = true;
            Phase::Arrived
        } else {
            match self.arrived_at {
                Some(at) if now.duration_since(at) < self.arrival_hold => Phase::Arrived,
                _ => Phase::EnRoute,
            }
        };

        self.index += 1;
        Some(TickUpdate {
            point,
            phase: self.phase,
            arrived_now,
        })
    }
}
