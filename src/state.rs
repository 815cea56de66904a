use std::time::Duration;
use serde::{Serialize, Deserialize};

/// Which playback backend is authoritative for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Real,
    Fallback,
}

impl Default for Decision {
    fn default() -> Self {
        Self::Pending
    }
}

/// Accent hint handed to the synthesized-speech fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Accent {
    Us,
    Gb,
    Au,
    Ca,
    In,
    Ie,
    Nz,
    Za,
}

impl Default for Accent {
    fn default() -> Self {
        Self::Us
    }
}

impl Accent {
    /// BCP 47 tag a speech voice can be selected by.
    pub fn language_tag(&self) -> &'static str {
        match self {
            Accent::Us => "en-US",
            Accent::Gb => "en-GB",
            Accent::Au => "en-AU",
            Accent::Ca => "en-CA",
            Accent::In => "en-IN",
            Accent::Ie => "en-IE",
            Accent::Nz => "en-NZ",
            Accent::Za => "en-ZA",
        }
    }
}

/// What the cue presents to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueStatus {
    /// Waiting for the load path or the existence probe to decide.
    Resolving,
    /// Recorded audio is loaded and paused.
    Ready,
    /// Recorded audio is playing.
    Playing,
    /// Synthesized speech owns playback.
    Speaking,
    /// Nothing can be played; shown as an inert indicator.
    Unavailable,
}

/// Caller input for one cue.
#[derive(Clone, PartialEq)]
pub struct CueSource {
    pub asset_ref: Option<String>,
    pub fallback_text: Option<String>,
    pub accent: Accent,
    pub auto_play: bool,
    pub show_controls: bool,
}

impl Default for CueSource {
    fn default() -> Self {
        Self {
            asset_ref: None,
            fallback_text: None,
            accent: Accent::default(),
            auto_play: false,
            show_controls: true,
        }
    }
}

impl CueSource {
    pub fn asset(asset_ref: impl Into<String>) -> Self {
        Self {
            asset_ref: Some(asset_ref.into()),
            ..Self::default()
        }
    }

    pub fn with_fallback_text(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self
    }

    pub fn with_accent(mut self, accent: Accent) -> Self {
        self.accent = accent;
        self
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_controls(mut self, show_controls: bool) -> Self {
        self.show_controls = show_controls;
        self
    }

    /// The locator to try, or `None` when no real asset is offered.
    /// Blank strings count as absent.
    pub fn asset_ref(&self) -> Option<&str> {
        self.asset_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn fallback_text(&self) -> Option<&str> {
        self.fallback_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

// The transcript must never end up in logs.
impl std::fmt::Debug for CueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueSource")
            .field("asset_ref", &self.asset_ref)
            .field("has_fallback_text", &self.fallback_text().is_some())
            .field("accent", &self.accent)
            .field("auto_play", &self.auto_play)
            .field("show_controls", &self.show_controls)
            .finish()
    }
}

/// Point-in-time view of the cue for rendering controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueSnapshot {
    pub status: CueStatus,
    pub decision: Decision,
    pub playing: bool,
    pub muted: bool,
    pub loading: bool,
    pub position_fraction: f64,
    pub duration_seconds: f64,
    pub show_controls: bool,
}

/// Notifications published to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CueEvent {
    DecisionChanged { decision: Decision },
    Status { status: CueStatus },
    Progress { position_fraction: f64 },
    Ended,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Progress sampling cadence while recorded audio plays.
    pub sample_interval_ms: u64,
    /// How long the load path may wait for metadata before giving up.
    pub metadata_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub user_agent: String,
    pub start_muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            metadata_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
            user_agent: format!("ListeningCue/{}", env!("CARGO_PKG_VERSION")),
            start_muted: false,
        }
    }
}

impl Settings {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_asset_ref_counts_as_absent() {
        let source = CueSource::asset("   ");
        assert_eq!(source.asset_ref(), None);

        let source = CueSource::asset(" https://x/a.mp3 ");
        assert_eq!(source.asset_ref(), Some("https://x/a.mp3"));
    }

    #[test]
    fn debug_output_hides_fallback_text() {
        let source = CueSource::default().with_fallback_text("the secret answer");
        let printed = format!("{:?}", source);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("has_fallback_text: true"));
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"probe_timeout_ms": 750}"#).unwrap();
        assert_eq!(settings.probe_timeout_ms, 750);
        assert_eq!(settings.sample_interval_ms, 100);
        assert_eq!(settings.metadata_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(CueEvent::Error { message: "Audio failed to load".into() }).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Audio failed to load");

        let json = serde_json::to_value(Accent::Gb).unwrap();
        assert_eq!(json, "GB");
    }
}
