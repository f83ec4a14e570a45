use std::sync::Mutex;

use anyhow::Result;
use bustrack_core::geo::GeoPoint;
use bustrack_core::map_bridge::MapSink;
use bustrack_core::notifications::{BusEvent, NotificationSink};
use bustrack_core::tracking_session::Phase;

/// Map sink that remembers everything it was told.
#[derive(Default)]
pub struct RecordingMapSink {
    pub routes: Mutex<Vec<Vec<GeoPoint>>>,
    pub markers: Mutex<Vec<(GeoPoint, Phase)>>,
    pub clears: Mutex<u32>,
}

impl MapSink for RecordingMapSink {
    fn set_route(&self, points: &[GeoPoint]) -> Result<()> {
        self.routes.lock().unwrap().push(points.to_vec());
        Ok(())
    }

    fn set_marker(&self, point: GeoPoint, phase: Phase) -> Result<()> {
        self.markers.lock().unwrap().push((point, phase));
        Ok(())
    }

    fn fit_bounds(&self, _points: &[GeoPoint]) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.clears.lock().unwrap() += 1;
        Ok(())
    }
}

/// Map sink standing in for a map that never finished loading.
pub struct BrokenMapSink;

impl MapSink for BrokenMapSink {
    fn set_route(&self, _points: &[GeoPoint]) -> Result<()> {
        Err(anyhow::anyhow!("map not ready"))
    }

    fn set_marker(&self, _point: GeoPoint, _phase: Phase) -> Result<()> {
        Err(anyhow::anyhow!("map not ready"))
    }

    fn fit_bounds(&self, _points: &[GeoPoint]) -> Result<()> {
        Err(anyhow::anyhow!("map not ready"))
    }

    fn clear(&self) -> Result<()> {
        Err(anyhow::anyhow!("map not ready"))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<BusEvent>>,
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, event: &BusEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct BrokenNotifier;

impl NotificationSink for BrokenNotifier {
    fn notify(&self, _event: &BusEvent) -> Result<()> {
        Err(anyhow::anyhow!("push provider unreachable"))
    }
}
