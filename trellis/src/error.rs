//! Error types for overlay lifecycles and animations.

/// Failure reported by the animation collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnimationError {
    /// The controller could not build an animation for the given root.
    #[error("Failed to create animation: {reason}")]
    Create { reason: String },

    /// The animation failed while playing.
    #[error("Animation failed while playing: {reason}")]
    Play { reason: String },

    /// The animation was destroyed before it finished.
    #[error("Animation was cancelled")]
    Cancelled,
}

impl AnimationError {
    /// Creates a new creation error.
    pub fn create(reason: impl Into<String>) -> Self {
        Self::Create {
            reason: reason.into(),
        }
    }

    /// Creates a new playback error.
    pub fn play(reason: impl Into<String>) -> Self {
        Self::Play {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by overlay operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OverlayError {
    /// No attached overlay matches the lookup.
    #[error("Overlay does not exist (tag: {tag}, id: {})", .id.as_deref().unwrap_or("<top>"))]
    NotFound { tag: String, id: Option<String> },

    /// The enter or leave animation failed.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

impl OverlayError {
    /// Creates a new not-found error.
    pub fn not_found(tag: impl Into<String>, id: Option<&str>) -> Self {
        Self::NotFound {
            tag: tag.into(),
            id: id.map(str::to_string),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
