use serde::Serialize;

/// Lifecycle of the form.
///
/// `Idle → Loading → {Success, Failed} → Idle`, where the last step is an
/// explicit dismiss or the next submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum FormStatus {
    Idle,
    Loading,
    Success,
    Failed(String),
}

impl FormStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FormStatus::Loading)
    }

    /// Whether a request has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self, FormStatus::Success | FormStatus::Failed(_))
    }

    /// User-facing error text, if the last request failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            FormStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl Default for FormStatus {
    fn default() -> Self {
        FormStatus::Idle
    }
}

/// Result of a submit that got as far as the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The route was published; `points` is its coordinate count.
    Published { points: usize },
    /// A newer submit started before this one finished; its result was
    /// dropped.
    Superseded,
}
