use thiserror::Error;

/// Reasons a play request could not be carried out.
///
/// These never reach callers of the manager's play operations; they are
/// logged and the request is dropped.
#[derive(Debug, Error)]
pub enum SoundError {
    /// The resolver could not locate the named asset.
    #[error("unable to find sound resource: {resource}")]
    ResourceNotFound { resource: String },

    /// The backend could not build or start a player for the resource.
    #[error("unable to play {resource}: {source:#}")]
    PlaybackConstructionFailed {
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SoundError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }

    pub fn construction(resource: impl Into<String>, source: anyhow::Error) -> Self {
        Self::PlaybackConstructionFailed {
            resource: resource.into(),
            source,
        }
    }

    /// The resource identifier the failed request named.
    pub fn resource(&self) -> &str {
        match self {
            Self::ResourceNotFound { resource } => resource,
            Self::PlaybackConstructionFailed { resource, .. } => resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_not_found_message() {
        let err = SoundError::not_found("theme.mp3");
        assert_eq!(err.to_string(), "unable to find sound resource: theme.mp3");
        assert_eq!(err.resource(), "theme.mp3");
    }

    #[test]
    fn test_construction_keeps_cause() {
        let err = SoundError::construction("/sfx/broken.wav", anyhow!("unsupported codec"));
        assert!(err.to_string().contains("/sfx/broken.wav"));
        assert!(err.to_string().contains("unsupported codec"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
