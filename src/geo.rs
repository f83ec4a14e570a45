use anyhow::Result;

/// A plain lat/lng pair. Value type, no identity beyond its coordinates.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.lat.is_finite() && self.lng.is_finite(),
            "non-finite coordinates: ({}, {})",
            self.lat,
            self.lng
        );
        ensure!(
            (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng),
            "coordinates out of range: ({}, {})",
            self.lat,
            self.lng
        );
        Ok(())
    }
}

// The dashboard only deals with a few km around the user, so a flat-earth
// approximation is good enough. 1 degree ~= 111km.
const KM_PER_DEGREE: f64 = 111.0;

pub fn rough_distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = a.lat - b.lat;
    let d_lng = a.lng - b.lng;
    (d_lat * d_lat + d_lng * d_lng).sqrt() * KM_PER_DEGREE
}

/// (south-west corner, north-east corner) of a point set. `None` when empty.
pub fn bounding_box(points: &[GeoPoint]) -> Option<(GeoPoint, GeoPoint)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.lat = min.lat.min(p.lat);
        min.lng = min.lng.min(p.lng);
        max.lat = max.lat.max(p.lat);
        max.lng = max.lng.max(p.lng);
    }
    Some((min, max))
}
