use serde::{Deserialize, Serialize};

/// Horizontal distance (in pixels) past which a drag counts as an indent or
/// outdent gesture.
pub const DEFAULT_THRESHOLD: f64 = 50.0;

/// Discrete horizontal intent of a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Outdent
    Left,
    #[default]
    Default,
    /// Indent
    Right,
}

impl Zone {
    /// Classify a horizontal displacement with the default threshold.
    pub fn classify(delta_x: f64) -> Zone {
        Zone::classify_with(delta_x, DEFAULT_THRESHOLD)
    }

    /// Classify with a custom threshold. Both bounds are inclusive, so the
    /// dead zone is the open interval `(-threshold, threshold)`.
    pub fn classify_with(delta_x: f64, threshold: f64) -> Zone {
        if delta_x <= -threshold {
            Zone::Left
        } else if delta_x >= threshold {
            Zone::Right
        } else {
            Zone::Default
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Left => write!(f, "left"),
            Zone::Default => write!(f, "default"),
            Zone::Right => write!(f, "right"),
        }
    }
}
