mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use bustrack_core::animator::{AnimatorConfig, TrackedRoute, TransitAnimator};
use bustrack_core::geo::GeoPoint;
use bustrack_core::notifications::BusEvent;
use bustrack_core::tracking_session::Phase;
use test_utils::{BrokenMapSink, BrokenNotifier, RecordingMapSink, RecordingNotifier};

// Scaled way down from the 200ms/3s/30s reference values so tests run fast.
fn fast_config() -> AnimatorConfig {
    AnimatorConfig {
        steps_per_leg: 3,
        tick_interval: Duration::from_millis(5),
        arrival_hold: Duration::ZERO,
        // effectively disabled unless a test wants it
        delay_check_interval: Duration::from_secs(3600),
        delay_probability: 0.2,
        delay_minutes: 5..=15,
    }
}

fn sample_route(route_label: &str, user_lat: f64) -> TrackedRoute {
    TrackedRoute {
        route_label: route_label.to_string(),
        user_location: GeoPoint::new(user_lat, 77.5946),
        bus_start: None,
        destination: None,
    }
}

#[tokio::test]
async fn full_run_delivers_all_updates() {
    let map = Arc::new(RecordingMapSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut animator = TransitAnimator::new(fast_config(), map.clone(), notifier.clone());

    animator.start(sample_route("Route 45A", 12.9716)).unwrap();
    assert!(animator.is_active());
    tokio::time::sleep(Duration::from_millis(300)).await;

    // steps_per_leg = 3 makes an 8 point path, one marker update per point.
    let markers = map.markers.lock().unwrap().clone();
    assert_eq!(markers.len(), 8);
    assert_eq!(markers[0].1, Phase::Approaching);
    assert_eq!(markers[4].1, Phase::Arrived);
    assert_eq!(markers[7].1, Phase::EnRoute);

    // The polyline was pushed once, at session start.
    assert_eq!(map.routes.lock().unwrap().len(), 1);

    // Exactly one arrival event.
    let events = notifier.events.lock().unwrap();
    let arrivals: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, BusEvent::Arrived { .. }))
        .collect();
    assert_eq!(arrivals.len(), 1);
    assert_eq!(arrivals[0].route(), "Route 45A");
}

#[tokio::test]
async fn stop_cancels_all_timers() {
    let map = Arc::new(RecordingMapSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut config = fast_config();
    config.steps_per_leg = 50;
    config.tick_interval = Duration::from_millis(10);
    let mut animator = TransitAnimator::new(config, map.clone(), notifier.clone());

    animator.start(sample_route("Route 12B", 12.9716)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    animator.stop();
    assert!(!animator.is_active());

    let count_after_stop = map.markers.lock().unwrap().len();
    assert!(count_after_stop > 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(map.markers.lock().unwrap().len(), count_after_stop);
    assert_eq!(*map.clears.lock().unwrap(), 1);

    // Stopping again is a no-op.
    animator.stop();
    assert_eq!(*map.clears.lock().unwrap(), 1);
}

#[tokio::test]
async fn restart_tears_down_previous_session() {
    let map = Arc::new(RecordingMapSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut config = fast_config();
    config.steps_per_leg = 50;
    config.tick_interval = Duration::from_millis(10);
    let mut animator = TransitAnimator::new(config, map.clone(), notifier.clone());

    // First session far in the north, second one near the equator: every
    // marker update reveals which loop produced it.
    animator.start(sample_route("Route 45A", 50.0)).unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    animator.start(sample_route("Route 23C", 10.0)).unwrap();
    let markers_at_restart = map.markers.lock().unwrap().len();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let markers = map.markers.lock().unwrap();
    assert!(markers.len() > markers_at_restart);
    for (point, _) in markers[markers_at_restart..].iter() {
        assert!(
            point.lat < 40.0,
            "first session kept driving the marker after restart: {point:?}"
        );
    }
}

#[tokio::test]
async fn invalid_input_is_rejected_up_front() {
    let map = Arc::new(RecordingMapSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut animator = TransitAnimator::new(fast_config(), map.clone(), notifier);

    assert!(animator
        .start(sample_route("Route 45A", f64::NAN))
        .is_err());
    assert!(!animator.is_active());
    assert!(map.routes.lock().unwrap().is_empty());

    let mut config = fast_config();
    config.steps_per_leg = 0;
    let mut animator =
        TransitAnimator::new(config, map.clone(), Arc::new(RecordingNotifier::default()));
    assert!(animator.start(sample_route("Route 45A", 12.9716)).is_err());
}

#[tokio::test]
async fn broken_map_does_not_interrupt_playback() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut animator =
        TransitAnimator::new(fast_config(), Arc::new(BrokenMapSink), notifier.clone());

    animator.start(sample_route("Route 67D", 12.9716)).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // The playback still reached the midpoint and reported the arrival.
    let events = notifier.events.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, BusEvent::Arrived { .. })));
}

#[tokio::test]
async fn broken_notifier_does_not_interrupt_playback() {
    let map = Arc::new(RecordingMapSink::default());
    let mut animator =
        TransitAnimator::new(fast_config(), map.clone(), Arc::new(BrokenNotifier));

    animator.start(sample_route("Route 89E", 12.9716)).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(map.markers.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn delay_monitor_emits_delayed_events() {
    let map = Arc::new(RecordingMapSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut config = fast_config();
    config.steps_per_leg = 100;
    config.delay_check_interval = Duration::from_millis(10);
    config.delay_probability = 1.0;
    config.delay_minutes = 7..=7;
    let mut animator = TransitAnimator::new(config, map, notifier.clone());

    animator.start(sample_route("Route 156F", 12.9716)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    animator.stop();

    let events = notifier.events.lock().unwrap();
    let delays: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, BusEvent::Delayed { .. }))
        .collect();
    assert!(!delays.is_empty());
    for event in delays {
        assert_eq!(
            event,
            &BusEvent::Delayed {
                route: "Route 156F".to_string(),
                minutes: 7
            }
        );
    }
}
