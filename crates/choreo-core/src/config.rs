use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoreoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub autoplay: AutoplayConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub visibility: VisibilityConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Easing curve used by `scroll_to` animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingType {
    /// Jump at the end
    None,
    Linear,
    /// 1 - (1-t)³
    Cubic,
    /// 1 - (1-t)⁵
    Quintic,
    /// 1 - 2^(-10t)
    EaseOut,
    /// min(1, 1.001 - 2^(-10t)), the page scroller's curve
    #[default]
    EaseOutExpo,
}

/// Reduced-motion preference: forced on, forced off, or follow the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducedMotion {
    On,
    Off,
    #[default]
    Auto,
}

impl ReducedMotion {
    /// Resolve against what the host reports for "auto"
    pub fn resolve(self, host_prefers_reduced: bool) -> bool {
        match self {
            ReducedMotion::On => true,
            ReducedMotion::Off => false,
            ReducedMotion::Auto => host_prefers_reduced,
        }
    }
}

impl FromStr for ReducedMotion {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "reduce" => Ok(ReducedMotion::On),
            "off" | "false" | "no-preference" => Ok(ReducedMotion::Off),
            "auto" => Ok(ReducedMotion::Auto),
            other => Err(crate::Error::invalid_option(
                "reduced_motion",
                format!("expected on, off or auto, got {other:?}"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Interpolate wheel input instead of applying it directly
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Fraction of the remaining distance covered per frame (0, 1]
    #[serde(default = "default_lerp")]
    pub lerp: f64,
    /// Default duration of programmatic scroll_to animations
    #[serde(default = "default_scroll_to_duration")]
    pub scroll_to_duration_ms: u64,
    /// Default easing of programmatic scroll_to animations
    #[serde(default)]
    pub easing: EasingType,
    /// Multiplier applied to raw wheel deltas
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            lerp: default_lerp(),
            scroll_to_duration_ms: default_scroll_to_duration(),
            easing: EasingType::default(),
            wheel_multiplier: default_wheel_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Intersection ratio that counts as "entered" (0, 1]
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// CSS-like root margin, e.g. "0px 0px -20% 0px"
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    /// Viewport offset an anchored element is re-centred to
    #[serde(default)]
    pub anchor_offset: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin: default_root_margin(),
            anchor_offset: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoplayConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Units moved per frame while running
    #[serde(default = "default_autoplay_speed")]
    pub speed: f64,
    /// Quiet period after the last interaction before motion resumes
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,
    /// Units moved per frame while the pointer rests in an edge zone
    #[serde(default = "default_edge_speed")]
    pub edge_speed: f64,
    /// Height fraction of the top/bottom edge zones
    #[serde(default = "default_edge_zone")]
    pub edge_zone: f64,
    #[serde(default)]
    pub reduced_motion: ReducedMotion,
    /// Hold the page scroll lock while running
    #[serde(default)]
    pub lock_page_scroll: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            speed: default_autoplay_speed(),
            idle_timeout_ms: default_idle_timeout(),
            edge_speed: default_edge_speed(),
            edge_zone: default_edge_zone(),
            reduced_motion: ReducedMotion::default(),
            lock_page_scroll: false,
        }
    }
}

/// How a non-terminal reveal phase leaves the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseExitKind {
    #[default]
    FadeOut,
    HideCursor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Lines revealed one after another
    #[serde(default = "default_loader_lines")]
    pub lines: Vec<String>,
    /// Reveal span of each line; the last value repeats for extra lines
    #[serde(default = "default_phase_durations")]
    pub phase_durations_ms: Vec<u64>,
    #[serde(default = "default_inter_phase_pause")]
    pub inter_phase_pause_ms: u64,
    #[serde(default)]
    pub phase_exit: PhaseExitKind,
    #[serde(default = "default_fade_out")]
    pub fade_out_ms: u64,
    /// Horizontal advance of the cursor per revealed unit
    #[serde(default = "default_unit_width")]
    pub unit_width: u32,
    #[serde(default = "default_blink_period")]
    pub blink_period_ms: u64,
    /// Nudge and widen the cursor once the last line is out
    #[serde(default = "default_true")]
    pub settle_cursor: bool,
    /// Disable page scrolling while the timeline plays
    #[serde(default = "default_true")]
    pub lock_page_scroll: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            lines: default_loader_lines(),
            phase_durations_ms: default_phase_durations(),
            inter_phase_pause_ms: default_inter_phase_pause(),
            phase_exit: PhaseExitKind::default(),
            fade_out_ms: default_fade_out(),
            unit_width: default_unit_width(),
            blink_period_ms: default_blink_period(),
            settle_cursor: default_true(),
            lock_page_scroll: default_true(),
        }
    }
}

impl RevealConfig {
    /// Reveal span for the phase at `index`
    pub fn phase_duration_ms(&self, index: usize) -> u64 {
        self.phase_durations_ms
            .get(index)
            .or_else(|| self.phase_durations_ms.last())
            .copied()
            .unwrap_or(1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityPolicyKind {
    Threshold,
    #[default]
    Distance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default)]
    pub policy: VisibilityPolicyKind,
    /// Share of a unit's own height that must be on screen (threshold policy)
    #[serde(default = "default_visible_fraction")]
    pub visible_fraction: f64,
    /// Opacity of units under the threshold
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f64,
    /// Opacity floor of the distance policy
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f64,
    /// Opacity lost between the centre and the edge (distance policy)
    #[serde(default = "default_falloff")]
    pub falloff: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            policy: VisibilityPolicyKind::default(),
            visible_fraction: default_visible_fraction(),
            dim_opacity: default_dim_opacity(),
            min_opacity: default_min_opacity(),
            falloff: default_falloff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Frames per second while anything animates
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Poll interval while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("choreo")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_lerp() -> f64 {
    0.1
}

fn default_scroll_to_duration() -> u64 {
    1200
}

fn default_wheel_multiplier() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    0.3
}

fn default_root_margin() -> String {
    "0px 0px -20% 0px".to_string()
}

fn default_autoplay_speed() -> f64 {
    0.5
}

fn default_idle_timeout() -> u64 {
    3000
}

fn default_edge_speed() -> f64 {
    2.0
}

fn default_edge_zone() -> f64 {
    0.2
}

fn default_loader_lines() -> Vec<String> {
    vec![
        "THEY BUILT A POWERFUL SYSTEM".to_string(),
        "JUST NOT ONE FOR PEOPLE LIKE US".to_string(),
    ]
}

fn default_phase_durations() -> Vec<u64> {
    vec![4000, 5800]
}

fn default_inter_phase_pause() -> u64 {
    200
}

fn default_fade_out() -> u64 {
    200
}

fn default_unit_width() -> u32 {
    1 // one terminal cell per glyph
}

fn default_blink_period() -> u64 {
    1000
}

fn default_visible_fraction() -> f64 {
    0.1
}

fn default_dim_opacity() -> f64 {
    0.3
}

fn default_min_opacity() -> f64 {
    0.2
}

fn default_falloff() -> f64 {
    0.8
}

fn default_fps() -> u32 {
    60
}

fn default_tick_rate() -> u64 {
    100
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl ChoreoConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaults if it does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/choreo/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("choreo")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("choreo.log")
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        use crate::Error;

        if !(self.scroll.lerp > 0.0 && self.scroll.lerp <= 1.0) {
            return Err(Error::invalid_option("scroll.lerp", "must be in (0, 1]"));
        }
        if !(self.trigger.threshold > 0.0 && self.trigger.threshold <= 1.0) {
            return Err(Error::invalid_option("trigger.threshold", "must be in (0, 1]"));
        }
        crate::geometry::RootMargin::parse(&self.trigger.root_margin)?;
        if self.autoplay.speed < 0.0 || self.autoplay.edge_speed < 0.0 {
            return Err(Error::invalid_option("autoplay.speed", "must not be negative"));
        }
        if !(0.0..=0.5).contains(&self.autoplay.edge_zone) {
            return Err(Error::invalid_option("autoplay.edge_zone", "must be in [0, 0.5]"));
        }
        if self.reveal.lines.is_empty() {
            return Err(Error::invalid_option("reveal.lines", "needs at least one line"));
        }
        if self.ui.fps == 0 {
            return Err(Error::invalid_option("ui.fps", "must be positive"));
        }
        Ok(())
    }
}
