use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skywatch_core::NetworkError;

/// Alert severity tag carried by the seismic feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Red,
    Orange,
    Yellow,
    Green,
    #[default]
    None,
}

impl AlertSeverity {
    /// Parse the feed's optional alert tag.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::to_ascii_lowercase).as_deref() {
            Some("red") => Self::Red,
            Some("orange") => Self::Orange,
            Some("yellow") => Self::Yellow,
            Some("green") => Self::Green,
            _ => Self::None,
        }
    }

    /// Marker color on the globe view.
    pub fn display_color(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green | Self::None => "blue",
        }
    }

    /// Sidebar label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::None => "No Alert",
        }
    }
}

/// Whether the feed flagged the event as tsunami-generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Earthquake,
    Tsunami,
}

/// One recent seismic event from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    pub id: String,
    pub place: String,
    pub magnitude: Option<f64>,
    pub time: DateTime<Utc>,
    pub kind: EventKind,
    pub depth_km: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub alert: AlertSeverity,
    pub url: Option<String>,
}

/// Seismic feed errors.
#[derive(Debug, thiserror::Error)]
pub enum QuakeError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_tag_parsing() {
        assert_eq!(AlertSeverity::from_tag(Some("red")), AlertSeverity::Red);
        assert_eq!(AlertSeverity::from_tag(Some("ORANGE")), AlertSeverity::Orange);
        assert_eq!(AlertSeverity::from_tag(Some("unknown")), AlertSeverity::None);
        assert_eq!(AlertSeverity::from_tag(None), AlertSeverity::None);
    }

    #[test]
    fn test_display_colors() {
        assert_eq!(AlertSeverity::Red.display_color(), "red");
        assert_eq!(AlertSeverity::Yellow.display_color(), "yellow");
        // Anything below yellow renders as the neutral marker color
        assert_eq!(AlertSeverity::Green.display_color(), "blue");
        assert_eq!(AlertSeverity::None.display_color(), "blue");
    }

    #[test]
    fn test_no_alert_label() {
        assert_eq!(AlertSeverity::None.label(), "No Alert");
        assert_eq!(AlertSeverity::Red.label(), "red");
    }
}
