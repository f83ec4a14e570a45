use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::map_bridge::MapSink;
use crate::notifications::{BusEvent, NotificationSink};
use crate::route_path::RoutePath;
use crate::tracking_session::TrackingSession;

// Where the simulated bus spawns and ends up when the caller doesn't say:
// ~2km north-east of the user, and a destination on the other side.
const DEFAULT_BUS_START_OFFSET: (f64, f64) = (0.02, 0.015);
const DEFAULT_DESTINATION_OFFSET: (f64, f64) = (0.025, -0.02);

#[derive(Clone, Debug)]
pub struct AnimatorConfig {
    pub steps_per_leg: usize,
    pub tick_interval: Duration,
    pub arrival_hold: Duration,
    pub delay_check_interval: Duration,
    pub delay_probability: f64,
    pub delay_minutes: RangeInclusive<u32>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        AnimatorConfig {
            steps_per_leg: 20,
            tick_interval: Duration::from_millis(200),
            arrival_hold: Duration::from_secs(3),
            delay_check_interval: Duration::from_secs(30),
            delay_probability: 0.2,
            delay_minutes: 5..=15,
        }
    }
}

/// What to track: the bus route label shown in notifications plus the three
/// anchor locations. Start and destination fall back to fixed offsets from
/// the user when the caller doesn't know them.
#[derive(Clone, Debug)]
pub struct TrackedRoute {
    pub route_label: String,
    pub user_location: GeoPoint,
    pub bus_start: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
}

struct ActiveSession {
    id: Uuid,
    playback: JoinHandle<()>,
    delay_monitor: JoinHandle<()>,
}

/// Owns the tracking lifecycle: builds the path, drives the playback loop and
/// the independent delay monitor on tokio timers, and fans updates out to the
/// injected map and notification sinks. At most one session is active at a
/// time; starting a new one tears the previous one down first.
pub struct TransitAnimator {
    config: AnimatorConfig,
    map: Arc<dyn MapSink>,
    notifier: Arc<dyn NotificationSink>,
    active: Option<ActiveSession>,
}

impl TransitAnimator {
    pub fn new(
        config: AnimatorConfig,
        map: Arc<dyn MapSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        TransitAnimator {
            config,
            map,
            notifier,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts tracking `route`. Fails fast on invalid input (non-finite
    /// coordinates, zero steps) without touching the current session; on valid
    /// input any previous session is fully torn down before the new timers are
    /// created, so two playback loops can never drive the marker at once.
    pub fn start(&mut self, route: TrackedRoute) -> Result<()> {
        let user = route.user_location;
        let bus_start = route.bus_start.unwrap_or(GeoPoint::new(
            user.lat + DEFAULT_BUS_START_OFFSET.0,
            user.lng + DEFAULT_BUS_START_OFFSET.1,
        ));
        let destination = route.destination.unwrap_or(GeoPoint::new(
            user.lat + DEFAULT_DESTINATION_OFFSET.0,
            user.lng + DEFAULT_DESTINATION_OFFSET.1,
        ));
        let path = RoutePath::build(bus_start, user, destination, self.config.steps_per_leg)?;

        self.stop();

        let id = Uuid::new_v4();
        info!(
            "starting tracking session {} for {} ({} points)",
            id,
            route.route_label,
            path.len()
        );

        if let Err(e) = self.map.set_route(path.points()) {
            warn!("map sink rejected route polyline: {e}");
        }
        if let Err(e) = self.map.fit_bounds(path.points()) {
            warn!("map sink rejected fit_bounds: {e}");
        }

        let mut session = TrackingSession::new(path, self.config.arrival_hold);
        let map = self.map.clone();
        let notifier = self.notifier.clone();
        let tick_interval = self.config.tick_interval;
        let route_label = route.route_label.clone();
        let playback = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let update = match session.tick(Instant::now()) {
                    Some(update) => update,
                    None => break,
                };
                if let Err(e) = map.set_marker(update.point, update.phase) {
                    warn!("map sink rejected marker update: {e}");
                }
                if update.arrived_now {
                    let event = BusEvent::Arrived {
                        route: route_label.clone(),
                    };
                    if let Err(e) = notifier.notify(&event) {
                        warn!("notification sink failed for arrival: {e}");
                    }
                }
            }
            info!("tracking session {id} reached the end of its path");
        });

        let notifier = self.notifier.clone();
        let check_interval = self.config.delay_check_interval;
        let probability = self.config.delay_probability;
        let minutes_range = self.config.delay_minutes.clone();
        let route_label = route.route_label;
        let delay_monitor = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(check_interval);
            // the first interval tick completes immediately; skip it so the
            // first roll happens a full period in
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let minutes = {
                    let mut rng = rand::rng();
                    if rng.random_bool(probability) {
                        Some(rng.random_range(minutes_range.clone()))
                    } else {
                        None
                    }
                };
                if let Some(minutes) = minutes {
                    let event = BusEvent::Delayed {
                        route: route_label.clone(),
                        minutes,
                    };
                    if let Err(e) = notifier.notify(&event) {
                        warn!("notification sink failed for delay: {e}");
                    }
                }
            }
        });

        self.active = Some(ActiveSession {
            id,
            playback,
            delay_monitor,
        });
        Ok(())
    }

    /// Cancels all timers of the active session. No position update or phase
    /// transition happens after this returns, including the pending arrival
    /// hold. No-op when nothing is running.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.playback.abort();
            active.delay_monitor.abort();
            if let Err(e) = self.map.clear() {
                warn!("map sink rejected clear: {e}");
            }
            info!("tracking session {} stopped", active.id);
        }
    }
}

impl Drop for TransitAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
