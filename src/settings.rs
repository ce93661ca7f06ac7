//! Player settings and preferences
//!
//! Persisted separately from the leaderboard through the storage collaborator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, load_json, save_json};

/// Colour scheme for the UI and background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Nebula,
    Cosmic,
    Galactic,
}

/// Colours a theme applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Panel glow and box shadow
    pub ui_glow: &'static str,
    pub text_shadow: &'static str,
    pub button: &'static str,
    /// Background/particle colours (0xRRGGBB)
    pub gradient: [u32; 3],
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Nebula, Theme::Cosmic, Theme::Galactic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Nebula => "nebula",
            Theme::Cosmic => "cosmic",
            Theme::Galactic => "galactic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nebula" => Some(Theme::Nebula),
            "cosmic" => Some(Theme::Cosmic),
            "galactic" => Some(Theme::Galactic),
            _ => None,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Nebula => Palette {
                ui_glow: "#800080",
                text_shadow: "#ff00ff",
                button: "#800080",
                gradient: [0x800080, 0xff00ff, 0xc0c0ff],
            },
            Theme::Cosmic => Palette {
                ui_glow: "#0000ff",
                text_shadow: "#00ffff",
                button: "#0000ff",
                gradient: [0x0000ff, 0x00ffff, 0x8080ff],
            },
            Theme::Galactic => Palette {
                ui_glow: "#008000",
                text_shadow: "#00ff00",
                button: "#008000",
                gradient: [0x008000, 0x00ff00, 0x80ff80],
            },
        }
    }

    /// Uniformly random theme (initial pick on first launch)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,

    // === Audio ===
    pub music_enabled: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    /// Tutorial overlay has been dismissed once
    pub tutorial_shown: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            music_enabled: true,
            music_volume: 0.5,
            tutorial_shown: false,
        }
    }
}

impl Settings {
    pub(crate) const STORAGE_KEY: &'static str = "shape_burst_settings";

    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
    }

    /// Whether the tutorial should be shown now
    pub fn needs_tutorial(&self) -> bool {
        !self.tutorial_shown
    }

    pub fn mark_tutorial_shown(&mut self) {
        self.tutorial_shown = true;
    }

    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Self = load_json(storage, Self::STORAGE_KEY);
        settings.set_music_volume(settings.music_volume);
        settings
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
