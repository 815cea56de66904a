use thiserror::Error;

/// Text handed to `onError` for every asset failure. The cause is logged.
pub const LOAD_FAILED_MESSAGE: &str = "Audio failed to load";

/// Outcome of a failed existence probe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("asset responded with HTTP {0}")]
    Status(u16),

    #[error("probe timed out")]
    Timeout,

    #[error("probe transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Transport(e.to_string())
        }
    }
}

/// Failures reported by a media handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("playback not allowed: {0}")]
    NotAllowed(String),
}

/// Every way a cue can end up not playing the recorded asset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    #[error("no audio asset offered")]
    NoAssetOffered,

    #[error("existence probe failed: {0}")]
    ProbeFailure(#[from] ProbeError),

    #[error("media error: {0}")]
    MediaDecode(MediaError),

    #[error("no metadata after {0} ms")]
    MetadataTimeout(u64),

    #[error("playback could not start: {0}")]
    PlaybackStart(MediaError),

    #[error("no audio asset and no fallback text")]
    NoFallbackAvailable,
}

impl CueError {
    /// Asset-specific failures surface through `onError`; the expected
    /// "nothing offered" case and log-only failures do not.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            CueError::ProbeFailure(_) | CueError::MediaDecode(_) | CueError::MetadataTimeout(_)
        )
    }

    pub fn forces_fallback(&self) -> bool {
        !matches!(self, CueError::PlaybackStart(_) | CueError::NoFallbackAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_asset_failures_are_reported() {
        assert!(CueError::ProbeFailure(ProbeError::Status(404)).is_reported());
        assert!(CueError::MediaDecode(MediaError::Decode("bad frame".into())).is_reported());
        assert!(CueError::MetadataTimeout(10_000).is_reported());
        assert!(!CueError::NoAssetOffered.is_reported());
        assert!(!CueError::PlaybackStart(MediaError::NotAllowed("autoplay".into())).is_reported());
        assert!(!CueError::NoFallbackAvailable.is_reported());
    }

    #[test]
    fn playback_start_failure_keeps_decision() {
        assert!(!CueError::PlaybackStart(MediaError::NotAllowed("autoplay".into())).forces_fallback());
        assert!(CueError::NoAssetOffered.forces_fallback());
        assert!(CueError::ProbeFailure(ProbeError::Timeout).forces_fallback());
    }

    #[test]
    fn probe_status_is_in_message() {
        let err = CueError::from(ProbeError::Status(404));
        assert_eq!(err.to_string(), "existence probe failed: asset responded with HTTP 404");
    }
}
