//! Keyboard chord parsing and matching.
//!
//! Chords are written as `+`-separated parts such as `"Ctrl+Shift+B"`. The
//! primary modifier is platform dependent: `Ctrl` and `Cmd` are aliases of
//! each other when parsing, and a live key event is checked against `meta`
//! on Apple platforms and `ctrl` everywhere else.

use regex::Regex;
use std::sync::OnceLock;

/// Host platform family, which decides the physical primary modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Apple,
    Other,
}

impl Platform {
    /// Platform of the compile target
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Apple
        } else {
            Platform::Other
        }
    }
}

/// A key press with its modifier state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// Parsed form of a chord string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chord {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    /// Upper-cased key token; a chord without one never matches
    pub key: Option<String>,
}

impl Chord {
    /// Parse a chord string, `None` for blank input
    pub fn parse(shortcut: &str) -> Option<Self> {
        if shortcut.trim().is_empty() {
            return None;
        }

        let mut chord = Chord::default();
        for part in shortcut.split('+').map(|p| p.trim().to_lowercase()) {
            match part.as_str() {
                "" => {}
                "ctrl" | "control" | "cmd" | "meta" | "command" => {
                    chord.ctrl = true;
                    chord.meta = true;
                }
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                key => chord.key = Some(key.to_uppercase()),
            }
        }
        Some(chord)
    }

    /// Whether the chord asks for the primary modifier
    pub fn wants_primary(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        let Some(key) = &self.key else {
            return false;
        };

        let has_primary = match platform {
            Platform::Apple => event.meta,
            Platform::Other => event.ctrl,
        };

        event.key.to_uppercase() == *key
            && has_primary == self.wants_primary()
            && event.shift == self.shift
            && event.alt == self.alt
    }
}

/// Whether `event` triggers the chord written as `shortcut`
pub fn matches_shortcut(event: &KeyEvent, shortcut: &str, platform: Platform) -> bool {
    Chord::parse(shortcut).is_some_and(|chord| chord.matches(event, platform))
}

/// Display form of a chord: Apple platforms show `Ctrl`/`Control` as `Cmd`
pub fn format_shortcut(shortcut: &str, platform: Platform) -> String {
    static CONTROL: OnceLock<Regex> = OnceLock::new();

    match platform {
        Platform::Apple => {
            let control =
                CONTROL.get_or_init(|| Regex::new(r"(?i)control|ctrl").expect("Invalid regex"));
            control.replace_all(shortcut, "Cmd").into_owned()
        }
        Platform::Other => shortcut.to_string(),
    }
}

/// Canonical comparison form: lower-case, no whitespace, `meta`/`control` names
pub fn normalize_shortcut(shortcut: &str) -> String {
    shortcut
        .to_lowercase()
        .split_whitespace()
        .collect::<String>()
        .replace("cmd", "meta")
        .replace("ctrl", "control")
}

/// A suggested chord with its Apple spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutPreset {
    pub label: &'static str,
    pub value: &'static str,
    pub apple_value: &'static str,
}

impl ShortcutPreset {
    pub fn value_for(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::Apple => self.apple_value,
            Platform::Other => self.value,
        }
    }
}

macro_rules! preset {
    ($key:literal) => {
        ShortcutPreset {
            label: concat!("Block ", $key),
            value: concat!("Ctrl+Shift+", $key),
            apple_value: concat!("Cmd+Shift+", $key),
        }
    };
}

pub const SHORTCUT_PRESETS: [ShortcutPreset; 15] = [
    preset!("1"),
    preset!("2"),
    preset!("3"),
    preset!("4"),
    preset!("5"),
    preset!("6"),
    preset!("7"),
    preset!("8"),
    preset!("9"),
    preset!("A"),
    preset!("B"),
    preset!("C"),
    preset!("D"),
    preset!("E"),
    preset!("F"),
];
