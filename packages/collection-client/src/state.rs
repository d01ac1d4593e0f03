//! Per-flow request state

/// Ephemeral UI state for one flow instance.
///
/// `loading` is true only while that flow's call is in flight; every
/// operation calls [`RequestState::begin`] first and [`RequestState::finish`]
/// on all exit paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
    pub result_id: Option<String>,
}

impl RequestState {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.success = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn succeed(&mut self, result_id: impl Into<String>) {
        self.success = true;
        self.result_id = Some(result_id.into());
    }

    pub fn finish(&mut self) {
        self.loading = false;
    }
}
