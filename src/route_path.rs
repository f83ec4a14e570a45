use std::f64::consts::PI;

use anyhow::Result;

use crate::geo::GeoPoint;

// Amplitude of the fake road-following curve, in degrees (~100m).
const CURVE_AMPLITUDE_DEG: f64 = 0.001;

/// Interpolates `steps + 1` points between `start` and `end` (both inclusive),
/// with a sinusoidal offset so the leg doesn't render as a perfectly straight
/// line. Deterministic: offset is zero at both endpoints since
/// `sin(0) == sin(4*PI) == 0`.
///
/// `steps == 0` returns just `[start]`.
pub fn generate_leg(start: GeoPoint, end: GeoPoint, steps: usize) -> Vec<GeoPoint> {
    if steps == 0 {
        return vec![start];
    }
    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let ratio = i as f64 / steps as f64;
        let lat = start.lat + (end.lat - start.lat) * ratio;
        let lng = start.lng + (end.lng - start.lng) * ratio;
        let offset = CURVE_AMPLITUDE_DEG * (ratio * PI * 4.0).sin();
        points.push(GeoPoint::new(lat + offset, lng + offset * 0.5));
    }
    points
}

/// The full path of one tracking run: an approach leg (bus start -> user)
/// followed by a journey leg (user -> destination). Immutable once built;
/// restarting a session builds a fresh one.
#[derive(Debug, PartialEq)]
pub struct RoutePath {
    points: Vec<GeoPoint>,
}

impl RoutePath {
    pub fn build(
        bus_start: GeoPoint,
        user_location: GeoPoint,
        destination: GeoPoint,
        steps_per_leg: usize,
    ) -> Result<RoutePath> {
        ensure!(steps_per_leg > 0, "steps_per_leg must be > 0");
        bus_start.validate()?;
        user_location.validate()?;
        destination.validate()?;

        // The shared midpoint is intentionally NOT de-duplicated: it appears as
        // the last point of the approach leg and the first point of the journey
        // leg, which makes `midpoint_index` unambiguous.
        let mut points = generate_leg(bus_start, user_location, steps_per_leg);
        points.extend(generate_leg(user_location, destination, steps_per_leg));
        Ok(RoutePath { points })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first point of the journey leg, i.e. where the bus reaches
    /// the user. Used as the "arrived" milestone trigger.
    pub fn midpoint_index(&self) -> usize {
        self.points.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use crate::geo::GeoPoint;
    use crate::route_path::{generate_leg, RoutePath};

    #[test]
    fn zero_steps() {
        let a = GeoPoint::new(1.0, 2.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert_eq!(generate_leg(a, b, 0), vec![a]);
    }

    #[test]
    fn build_rejects_bad_input() {
        let a = GeoPoint::new(1.0, 2.0);
        assert!(RoutePath::build(a, a, a, 0).is_err());
        assert!(RoutePath::build(GeoPoint::new(f64::NAN, 2.0), a, a, 20).is_err());
    }
}
