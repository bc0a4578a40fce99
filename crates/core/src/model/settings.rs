use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::catalog::TopicLevel;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── THEME ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the host's preferred color scheme.
    Auto,
}

impl Theme {
    /// Resolves `Auto` against the host preference; explicit themes pass through.
    #[must_use]
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if system_prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            explicit => explicit,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            other => Err(SettingsError::UnknownTheme(other.to_string())),
        }
    }
}

//
// ─── DIFFICULTY FILTER ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    All,
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Whether a topic at `level` is shown under this filter.
    #[must_use]
    pub fn admits(self, level: TopicLevel) -> bool {
        match self {
            Difficulty::All => true,
            Difficulty::Beginner => level == TopicLevel::Beginner,
            Difficulty::Intermediate => level == TopicLevel::Intermediate,
            Difficulty::Advanced => level == TopicLevel::Advanced,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::All => "all",
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(SettingsError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Process-wide learner preferences.
///
/// Always present: `Settings::default()` is what a fresh installation sees.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    theme: Theme,
    difficulty: Difficulty,
    show_hints: bool,
    auto_save: bool,
    sound_enabled: bool,
}

/// Partial settings change; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub difficulty: Option<Difficulty>,
    pub show_hints: Option<bool>,
    pub auto_save: Option<bool>,
    pub sound_enabled: Option<bool>,
}

impl SettingsUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    #[must_use]
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn show_hints(mut self, show_hints: bool) -> Self {
        self.show_hints = Some(show_hints);
        self
    }

    #[must_use]
    pub fn auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = Some(auto_save);
        self
    }

    #[must_use]
    pub fn sound_enabled(mut self, sound_enabled: bool) -> Self {
        self.sound_enabled = Some(sound_enabled);
        self
    }
}

impl Settings {
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn new(
        theme: Theme,
        difficulty: Difficulty,
        show_hints: bool,
        auto_save: bool,
        sound_enabled: bool,
    ) -> Self {
        Self {
            theme,
            difficulty,
            show_hints,
            auto_save,
            sound_enabled,
        }
    }

    /// Returns a copy with every field present in `update` overwritten.
    #[must_use]
    pub fn merged(&self, update: &SettingsUpdate) -> Self {
        Self {
            theme: update.theme.unwrap_or(self.theme),
            difficulty: update.difficulty.unwrap_or(self.difficulty),
            show_hints: update.show_hints.unwrap_or(self.show_hints),
            auto_save: update.auto_save.unwrap_or(self.auto_save),
            sound_enabled: update.sound_enabled.unwrap_or(self.sound_enabled),
        }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn show_hints(&self) -> bool {
        self.show_hints
    }

    /// Whether progress changes are written to durable storage as they happen.
    #[must_use]
    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            difficulty: Difficulty::All,
            show_hints: true,
            auto_save: true,
            sound_enabled: false,
        }
    }
}
