use crate::models::error::WebcamError;
use crate::models::state::AcquisitionState;

/// Event delegate for widget notifications.
///
/// Methods may be called from whichever thread the host resolves
/// acquisition on. No widget lock is held during the call.
pub trait WebcamDelegate: Send + Sync {
    /// Completion callback: fired once per acquisition attempt, with the
    /// error on failure.
    fn on_user_media(&self, error: Option<&WebcamError>);

    /// Called when the acquisition state changes.
    fn on_state_changed(&self, _state: &AcquisitionState) {}
}

impl<F> WebcamDelegate for F
where
    F: Fn(Option<&WebcamError>) + Send + Sync,
{
    fn on_user_media(&self, error: Option<&WebcamError>) {
        self(error)
    }
}
