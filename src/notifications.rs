use anyhow::Result;
use chrono::Utc;
use serde_json::json;

/// Milestone events surfaced to the user while tracking a bus. `Delayed` comes
/// from an independent periodic source and is uncorrelated with the playback
/// position.
#[derive(Clone, Debug, PartialEq)]
pub enum BusEvent {
    Approaching {
        route: String,
        eta_text: String,
    },
    Arrived {
        route: String,
    },
    Delayed {
        route: String,
        minutes: u32,
    },
    Departed {
        route: String,
        destination: String,
    },
}

impl BusEvent {
    pub fn route(&self) -> &str {
        match self {
            BusEvent::Approaching { route, .. }
            | BusEvent::Arrived { route }
            | BusEvent::Delayed { route, .. }
            | BusEvent::Departed { route, .. } => route,
        }
    }

    pub fn title(&self) -> String {
        match self {
            BusEvent::Approaching { route, .. } => format!("Bus {route} Approaching"),
            BusEvent::Arrived { route } => format!("Bus {route} Arrived"),
            BusEvent::Delayed { route, .. } => format!("Bus {route} Delayed"),
            BusEvent::Departed { route, .. } => format!("Bus {route} Departed"),
        }
    }

    pub fn message(&self) -> String {
        match self {
            BusEvent::Approaching { eta_text, .. } => format!(
                "Your bus is approaching your location. Estimated arrival: {eta_text}"
            ),
            BusEvent::Arrived { .. } => {
                "Your bus has arrived at your location! Please board now.".to_string()
            }
            BusEvent::Delayed { route, minutes } => format!(
                "Your bus {route} is running {minutes} minutes late due to traffic conditions."
            ),
            BusEvent::Departed { destination, .. } => {
                format!("Your bus has departed and is en route to {destination}.")
            }
        }
    }

    pub fn category(&self) -> &'static str {
        "bus_tracking"
    }

    fn status(&self) -> &'static str {
        match self {
            BusEvent::Approaching { .. } => "approaching",
            BusEvent::Arrived { .. } => "arrived",
            BusEvent::Delayed { .. } => "delayed",
            BusEvent::Departed { .. } => "departed",
        }
    }

    /// Structured payload attached to every outgoing notification.
    pub fn custom_attributes(&self) -> serde_json::Value {
        json!({
            "app": "bus-tracker",
            "timestamp": Utc::now().to_rfc3339(),
            "bus_route": self.route(),
            "bus_status": self.status(),
        })
    }
}

/// Whatever actually delivers the event to the user: push provider, toast,
/// browser notification. Failures here must never interrupt the playback loop;
/// the animator logs them and keeps ticking.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &BusEvent) -> Result<()>;
}

/// Default sink: reports through the log facade. Useful headless and as the
/// fallback when no push provider is wired up.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, event: &BusEvent) -> Result<()> {
        info!(
            "[{}] {}: {}",
            event.category(),
            event.title(),
            event.message()
        );
        Ok(())
    }
}
