use std::fmt;

/// The lifecycle of a method page.
///
/// ```text
/// Idle -> ConfigLoading -> Ready -> Submitting -> RenderingSuccess -> Ready
///                                             \-> RenderingError   -> Ready
/// ```
///
/// `Ready` is re-entered after either rendering outcome. Submitting from
/// `Idle` is allowed: the credential is resolved on demand before the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Idle,
    ConfigLoading,
    Ready,
    Submitting,
    RenderingSuccess,
    RenderingError,
}

impl PageState {
    /// Returns `true` if moving from `self` to `next` is a valid transition.
    #[must_use]
    pub fn can_enter(self, next: Self) -> bool {
        use PageState::{ConfigLoading, Idle, Ready, RenderingError, RenderingSuccess, Submitting};

        matches!(
            (self, next),
            (Idle, ConfigLoading | Submitting)
                | (ConfigLoading, Ready)
                | (Ready, Submitting)
                | (Submitting, RenderingSuccess | RenderingError)
                | (RenderingSuccess | RenderingError, Ready)
        )
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::ConfigLoading => "loading config",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::RenderingSuccess => "rendering result",
            Self::RenderingError => "rendering error",
        })
    }
}
