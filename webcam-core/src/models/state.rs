use super::error::WebcamError;

/// Acquisition state of a widget instance.
///
/// State transitions:
/// ```text
/// idle → requesting → active
///            ↓  ↘
///          idle   failed
/// ```
/// `requesting → idle` happens when device enumeration fails. Teardown
/// returns any state to idle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AcquisitionState {
    #[default]
    Idle,
    Requesting,
    Active,
    Failed(WebcamError),
}

impl AcquisitionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self, Self::Requesting)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether a live stream is bound (the widget's `hasUserMedia`).
    pub fn has_user_media(&self) -> bool {
        self.is_active()
    }

    pub fn error(&self) -> Option<&WebcamError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}
