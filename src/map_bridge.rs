use anyhow::Result;

use crate::geo::GeoPoint;
use crate::tracking_session::Phase;

/// Capability interface over whatever map widget the frontend runs. The
/// animator only talks to this trait, it does not care how (or whether) the
/// map library got loaded. All methods are best-effort: a map that is not
/// ready yet may return an error and the caller keeps going.
pub trait MapSink: Send + Sync {
    /// Draws the full tracking path as a polyline. Called once per session.
    fn set_route(&self, points: &[GeoPoint]) -> Result<()>;

    /// Moves the tracked-bus marker. Called on every tick.
    fn set_marker(&self, point: GeoPoint, phase: Phase) -> Result<()>;

    /// Adjusts the viewport to contain all given points.
    fn fit_bounds(&self, points: &[GeoPoint]) -> Result<()>;

    /// Removes the tracking marker and polyline. Called on session teardown.
    fn clear(&self) -> Result<()>;
}

/// Headless sink for tests and server-side use.
pub struct NoopMapSink;

impl MapSink for NoopMapSink {
    fn set_route(&self, _points: &[GeoPoint]) -> Result<()> {
        Ok(())
    }

    fn set_marker(&self, _point: GeoPoint, _phase: Phase) -> Result<()> {
        Ok(())
    }

    fn fit_bounds(&self, _points: &[GeoPoint]) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }
}
