use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use rand::Rng;
use std::collections::HashMap;

use crate::geo::{rough_distance_km, GeoPoint};

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrafficCondition {
    Light,
    Moderate,
    Heavy,
}

impl TrafficCondition {
    /// Baseline delay in minutes for this condition.
    pub fn base_delay_min(&self) -> u32 {
        match self {
            TrafficCondition::Light => 2,
            TrafficCondition::Moderate => 8,
            TrafficCondition::Heavy => 20,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Pickup,
    Dropoff,
    Waypoint,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct RoutePoint {
    pub location: GeoPoint,
    pub order: u32,
    pub stop_kind: StopKind,
    pub wait_time_min: Option<u32>,
    pub distance_km: Option<f64>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct BusRoute {
    pub route_id: String,
    pub route_name: String,
    pub points: Vec<RoutePoint>,
    pub total_distance_km: f64,
    pub estimated_time_min: u32,
    pub traffic: TrafficCondition,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct UpcomingBus {
    pub route_id: String,
    pub route_name: String,
    pub estimated_arrival: String,
    pub bus_id: String,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct NearbyStop {
    pub stop_id: String,
    pub name: String,
    pub location: GeoPoint,
    pub distance_km: f64,
    pub next_buses: Vec<UpcomingBus>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct BusInfo {
    pub id: String,
    pub route: String,
    pub destination: String,
    pub from: String,
    pub to: String,
    pub arrival_time: String,
    pub speed_kmh: u32,
    pub driver_name: String,
    pub driver_phone: String,
    pub has_women_conductor: bool,
    pub women_seats: u32,
    pub location: GeoPoint,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SeatOccupancy {
    pub bus_id: String,
    pub total_seats: u32,
    pub occupied_seats: u32,
    pub women_seats_occupied: u32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    BusStop,
    Depot,
    PointOfInterest,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct MapLocation {
    pub location: GeoPoint,
    pub address: String,
    pub landmark: String,
    pub kind: LocationKind,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct TrafficReport {
    pub condition: TrafficCondition,
    pub delay_min: u32,
}

// How far a drifting bus moves per step and how far from the center it is
// allowed to wander, both in degrees (~50m and ~5km).
const DRIFT_STEP_DEG: f64 = 0.0005;
const DRIFT_RADIUS_DEG: f64 = 0.045;

fn stop(
    stop_id: &str,
    name: &str,
    lat: f64,
    lng: f64,
    next_buses: Vec<(&str, &str, &str, &str)>,
) -> NearbyStop {
    NearbyStop {
        stop_id: stop_id.to_string(),
        name: name.to_string(),
        location: GeoPoint::new(lat, lng),
        distance_km: 0.0,
        next_buses: next_buses
            .into_iter()
            .map(|(route_id, route_name, estimated_arrival, bus_id)| UpcomingBus {
                route_id: route_id.to_string(),
                route_name: route_name.to_string(),
                estimated_arrival: estimated_arrival.to_string(),
                bus_id: bus_id.to_string(),
            })
            .collect(),
    }
}

#[allow(clippy::too_many_arguments)]
fn bus(
    id: &str,
    route: &str,
    destination: &str,
    arrival_time: &str,
    speed_kmh: u32,
    driver_name: &str,
    driver_phone: &str,
    has_women_conductor: bool,
    women_seats: u32,
    lat: f64,
    lng: f64,
) -> BusInfo {
    BusInfo {
        id: id.to_string(),
        route: route.to_string(),
        destination: destination.to_string(),
        from: "Bangalore Central".to_string(),
        to: destination.to_string(),
        arrival_time: arrival_time.to_string(),
        speed_kmh,
        driver_name: driver_name.to_string(),
        driver_phone: driver_phone.to_string(),
        has_women_conductor,
        women_seats,
        location: GeoPoint::new(lat, lng),
    }
}

lazy_static! {
    static ref SAMPLE_STOPS: Vec<NearbyStop> = vec![
        stop(
            "stop_001",
            "MG Road Bus Stop",
            12.9752,
            77.6095,
            vec![
                ("route_45A", "Route 45A", "5 mins", "bus_001"),
                ("route_12B", "Route 12B", "12 mins", "bus_002"),
            ],
        ),
        stop(
            "stop_002",
            "Electronic City Hub",
            12.8438,
            77.6606,
            vec![("route_23C", "Route 23C", "8 mins", "bus_003")],
        ),
        stop(
            "stop_003",
            "Whitefield Tech Park",
            12.9698,
            77.7500,
            vec![("route_156F", "Route 156F", "15 mins", "bus_006")],
        ),
    ];
    static ref SAMPLE_BUSES: Vec<BusInfo> = vec![
        bus(
            "1", "Route 45A", "Electronic City", "2 min", 45, "Rajesh Kumar",
            "+91 98765 43210", true, 8, 12.9716, 77.5946,
        ),
        bus(
            "2", "Route 12B", "MG Road", "5 min", 32, "Suresh Reddy",
            "+91 98765 43211", false, 6, 12.9752, 77.6095,
        ),
        bus(
            "3", "Route 23C", "Whitefield", "7 min", 38, "Manjunath S",
            "+91 98765 43212", true, 8, 12.9698, 77.7500,
        ),
        bus(
            "4", "Route 67D", "Banashankari", "10 min", 42, "Venkatesh M",
            "+91 98765 43213", false, 6, 12.9255, 77.5468,
        ),
        bus(
            "5", "Route 89E", "Koramangala", "12 min", 35, "Prakash N",
            "+91 98765 43214", true, 8, 12.9352, 77.6245,
        ),
        bus(
            "6", "Route 156F", "Indiranagar", "15 min", 40, "Ravi Kumar",
            "+91 98765 43215", true, 8, 12.9784, 77.6408,
        ),
    ];
    static ref SAMPLE_LOCATIONS: Vec<MapLocation> = vec![
        MapLocation {
            location: GeoPoint::new(12.9752, 77.6095),
            address: "MG Road, Bangalore".to_string(),
            landmark: "Brigade Road Junction".to_string(),
            kind: LocationKind::BusStop,
        },
        MapLocation {
            location: GeoPoint::new(12.8438, 77.6606),
            address: "Electronic City Phase 1".to_string(),
            landmark: "Infosys Main Gate".to_string(),
            kind: LocationKind::BusStop,
        },
        MapLocation {
            location: GeoPoint::new(12.9716, 77.5946),
            address: "Bangalore Central".to_string(),
            landmark: "Railway Station".to_string(),
            kind: LocationKind::Depot,
        },
        MapLocation {
            location: GeoPoint::new(12.9698, 77.7500),
            address: "Whitefield".to_string(),
            landmark: "ITPL Main Gate".to_string(),
            kind: LocationKind::PointOfInterest,
        },
    ];
}

fn sample_routes() -> HashMap<String, BusRoute> {
    let mut routes = HashMap::new();
    routes.insert(
        "route_45A".to_string(),
        BusRoute {
            route_id: "route_45A".to_string(),
            route_name: "Route 45A - Bangalore Central to Electronic City".to_string(),
            points: vec![
                RoutePoint {
                    location: GeoPoint::new(12.9716, 77.5946),
                    order: 1,
                    stop_kind: StopKind::Pickup,
                    wait_time_min: Some(2),
                    distance_km: Some(0.0),
                },
                RoutePoint {
                    location: GeoPoint::new(12.9352, 77.6245),
                    order: 2,
                    stop_kind: StopKind::Waypoint,
                    wait_time_min: Some(1),
                    distance_km: Some(5.2),
                },
                RoutePoint {
                    location: GeoPoint::new(12.8438, 77.6606),
                    order: 3,
                    stop_kind: StopKind::Dropoff,
                    wait_time_min: Some(3),
                    distance_km: Some(12.5),
                },
            ],
            total_distance_km: 17.7,
            estimated_time_min: 45,
            traffic: TrafficCondition::Moderate,
        },
    );
    routes.insert(
        "route_12B".to_string(),
        BusRoute {
            route_id: "route_12B".to_string(),
            route_name: "Route 12B - Koramangala to MG Road".to_string(),
            points: vec![
                RoutePoint {
                    location: GeoPoint::new(12.9352, 77.6245),
                    order: 1,
                    stop_kind: StopKind::Pickup,
                    wait_time_min: Some(1),
                    distance_km: Some(0.0),
                },
                RoutePoint {
                    location: GeoPoint::new(12.9752, 77.6095),
                    order: 2,
                    stop_kind: StopKind::Dropoff,
                    wait_time_min: Some(2),
                    distance_km: Some(4.8),
                },
            ],
            total_distance_km: 4.8,
            estimated_time_min: 25,
            traffic: TrafficCondition::Light,
        },
    );
    routes
}

/// In-memory stand-in for the transit backend. Explicitly constructed and
/// passed to whoever needs it; holds no global state.
pub struct TransitData {
    stops: Vec<NearbyStop>,
    routes: HashMap<String, BusRoute>,
    buses: Vec<BusInfo>,
    occupancy: HashMap<String, SeatOccupancy>,
}

impl TransitData {
    /// The demo dataset: a handful of Bangalore stops, routes and buses.
    pub fn bangalore_sample() -> Self {
        let occupancy = [("1", 40, 10, 2), ("2", 45, 35, 5), ("3", 42, 18, 3)]
            .into_iter()
            .map(|(bus_id, total, occupied, women)| {
                (
                    bus_id.to_string(),
                    SeatOccupancy {
                        bus_id: bus_id.to_string(),
                        total_seats: total,
                        occupied_seats: occupied,
                        women_seats_occupied: women,
                        last_updated: Utc::now(),
                    },
                )
            })
            .collect();
        TransitData {
            stops: SAMPLE_STOPS.clone(),
            routes: sample_routes(),
            buses: SAMPLE_BUSES.clone(),
            occupancy,
        }
    }

    /// Stops within `radius_km` of `center`, nearest first, with distances
    /// recomputed from the caller's position.
    pub fn nearby_stops(&self, center: GeoPoint, radius_km: f64) -> Vec<NearbyStop> {
        self.stops
            .iter()
            .map(|s| {
                let mut s = s.clone();
                s.distance_km = rough_distance_km(&s.location, &center);
                s
            })
            .filter(|s| s.distance_km <= radius_km)
            .sorted_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
            .collect()
    }

    pub fn nearby_buses(&self, center: GeoPoint, radius_km: f64) -> Vec<BusInfo> {
        self.buses
            .iter()
            .filter(|b| rough_distance_km(&b.location, &center) <= radius_km)
            .sorted_by(|a, b| {
                rough_distance_km(&a.location, &center)
                    .total_cmp(&rough_distance_km(&b.location, &center))
            })
            .cloned()
            .collect()
    }

    pub fn route_details(&self, route_id: &str) -> Result<&BusRoute> {
        self.routes
            .get(route_id)
            .ok_or_else(|| anyhow!("route not found: {route_id}"))
    }

    pub fn seat_occupancy(&self, bus_id: &str) -> Option<&SeatOccupancy> {
        self.occupancy.get(bus_id)
    }

    pub fn search_locations(&self, query: &str, kind: Option<LocationKind>) -> Vec<MapLocation> {
        let query = query.to_lowercase();
        SAMPLE_LOCATIONS
            .iter()
            .filter(|l| {
                l.address.to_lowercase().contains(&query)
                    || l.landmark.to_lowercase().contains(&query)
            })
            .filter(|l| kind.map_or(true, |k| l.kind == k))
            .cloned()
            .collect()
    }

    /// A synthetic two-point route between arbitrary locations. Traffic is
    /// derived from distance (>10km heavy, >5km moderate) unless the caller
    /// asked to avoid it.
    pub fn optimized_route(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        avoid_traffic: bool,
    ) -> Result<BusRoute> {
        from.validate()?;
        to.validate()?;
        let distance_km = rough_distance_km(&from, &to);
        let traffic = if avoid_traffic {
            TrafficCondition::Light
        } else if distance_km > 10.0 {
            TrafficCondition::Heavy
        } else if distance_km > 5.0 {
            TrafficCondition::Moderate
        } else {
            TrafficCondition::Light
        };
        Ok(BusRoute {
            route_id: format!("optimized_{}", Utc::now().timestamp_millis()),
            route_name: "Optimized Route".to_string(),
            points: vec![
                RoutePoint {
                    location: from,
                    order: 1,
                    stop_kind: StopKind::Pickup,
                    wait_time_min: Some(2),
                    distance_km: Some(0.0),
                },
                RoutePoint {
                    location: to,
                    order: 2,
                    stop_kind: StopKind::Dropoff,
                    wait_time_min: Some(1),
                    distance_km: Some(distance_km),
                },
            ],
            total_distance_km: distance_km,
            estimated_time_min: (distance_km * 2.5).ceil() as u32,
            traffic,
        })
    }

    /// Rolls current traffic conditions: a random condition plus up to ten
    /// extra minutes on top of its baseline delay.
    pub fn traffic_conditions(&self, rng: &mut impl Rng) -> TrafficReport {
        let condition = match rng.random_range(0..3) {
            0 => TrafficCondition::Light,
            1 => TrafficCondition::Moderate,
            _ => TrafficCondition::Heavy,
        };
        TrafficReport {
            condition,
            delay_min: condition.base_delay_min() + rng.random_range(0..10),
        }
    }

    /// Idle animation for the nearby-bus markers: each bus takes a small step
    /// in a random direction, but never wanders more than ~5km from `center`.
    pub fn drift_buses(&mut self, center: GeoPoint, rng: &mut impl Rng) {
        for bus in &mut self.buses {
            let direction = rng.random_range(0.0..std::f64::consts::TAU);
            let next = GeoPoint::new(
                bus.location.lat + direction.cos() * DRIFT_STEP_DEG,
                bus.location.lng + direction.sin() * DRIFT_STEP_DEG,
            );
            let d_lat = next.lat - center.lat;
            let d_lng = next.lng - center.lng;
            if (d_lat * d_lat + d_lng * d_lng).sqrt() < DRIFT_RADIUS_DEG {
                bus.location = next;
            }
        }
    }
}
