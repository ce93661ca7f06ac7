//! Background music playlist
//!
//! `Playlist` is the platform-independent model (current track, play state,
//! volume). On the web `MusicPlayer` mirrors it onto an `<audio>` element.

use rand::Rng;

/// A streamable track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    /// Selector key ("track1".."track5")
    pub key: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    /// Cover art thumbnail
    pub art: &'static str,
}

pub const TRACKS: [Track; 5] = [
    Track {
        key: "track1",
        name: "Ambient Space",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3",
        art: "https://via.placeholder.com/50/FF6F61",
    },
    Track {
        key: "track2",
        name: "Cosmic Drift",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3",
        art: "https://via.placeholder.com/50/6B7280",
    },
    Track {
        key: "track3",
        name: "Nebula Waves",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-3.mp3",
        art: "https://via.placeholder.com/50/88D498",
    },
    Track {
        key: "track4",
        name: "Star Pulse",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-4.mp3",
        art: "https://via.placeholder.com/50/FFD700",
    },
    Track {
        key: "track5",
        name: "Galactic Echo",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-5.mp3",
        art: "https://via.placeholder.com/50/FF00FF",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    index: usize,
    playing: bool,
    volume: f32,
    enabled: bool,
}

impl Playlist {
    /// Start at `index` (wrapped), paused
    pub fn new(index: usize) -> Self {
        Self {
            index: index % TRACKS.len(),
            playing: false,
            volume: 0.5,
            enabled: true,
        }
    }

    /// Start on a random track
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random_range(0..TRACKS.len()))
    }

    pub fn current(&self) -> &'static Track {
        &TRACKS[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance to the next track, wrapping around. Play state is kept.
    pub fn next(&mut self) -> &'static Track {
        self.index = (self.index + 1) % TRACKS.len();
        self.current()
    }

    /// Jump to a track by selector key. Unknown keys are ignored.
    pub fn select(&mut self, key: &str) -> Option<&'static Track> {
        let index = TRACKS.iter().position(|t| t.key == key)?;
        self.index = index;
        Some(self.current())
    }

    /// Flip play/pause; returns whether music is now playing
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing && self.enabled;
        self.playing
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling music also stops playback
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.playing = false;
        }
    }

    /// Current track finished
    pub fn on_track_ended(&mut self) -> &'static Track {
        self.next()
    }
}

/// `<audio>` element driven by a `Playlist`
#[cfg(target_arch = "wasm32")]
pub struct MusicPlayer {
    element: web_sys::HtmlAudioElement,
    pub playlist: Playlist,
}

#[cfg(target_arch = "wasm32")]
impl MusicPlayer {
    pub fn new(playlist: Playlist) -> Option<Self> {
        let element = web_sys::HtmlAudioElement::new().ok()?;
        element.set_loop(false);
        let player = Self { element, playlist };
        player.load_current();
        Some(player)
    }

    pub fn element(&self) -> &web_sys::HtmlAudioElement {
        &self.element
    }

    fn load_current(&self) {
        self.element.set_src(self.playlist.current().url);
        self.element.set_volume(self.playlist.volume() as f64);
    }

    fn sync_play_state(&self) {
        if self.playlist.is_playing() {
            if let Err(e) = self.element.play() {
                log::warn!("Music playback failed: {:?}", e);
            }
        } else if let Err(e) = self.element.pause() {
            log::warn!("Music pause failed: {:?}", e);
        }
    }

    pub fn toggle_play(&mut self) -> bool {
        let playing = self.playlist.toggle_play();
        self.sync_play_state();
        playing
    }

    pub fn next(&mut self) {
        self.playlist.next();
        self.load_current();
        self.sync_play_state();
    }

    pub fn select(&mut self, key: &str) {
        if self.playlist.select(key).is_some() {
            self.load_current();
            self.sync_play_state();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.playlist.set_volume(volume);
        self.element.set_volume(self.playlist.volume() as f64);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.playlist.set_enabled(enabled);
        self.sync_play_state();
    }
}
