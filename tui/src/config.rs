use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use moodtrack_core::calendar::WeekStart;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Keymap {
    pub quit: String,
    pub help: String,
    pub next_focus: String,
    pub prev_focus: String,
    pub prev_month: String,
    pub next_month: String,
    pub goto_today: String,
    pub delete_entry: String,
    pub save_entry: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CalendarConfig {
    pub week_start: WeekStart,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub keymap: Keymap,
    pub calendar: CalendarConfig,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            next_focus: "tab".to_string(),
            prev_focus: "backtab".to_string(),
            prev_month: "pageup".to_string(),
            next_month: "pagedown".to_string(),
            goto_today: "t".to_string(),
            delete_entry: "d".to_string(),
            save_entry: "ctrl-s".to_string(),
        }
    }
}

impl Keymap {
    fn bindings(&self) -> [(&'static str, &str); 9] {
        [
            ("quit", &self.quit),
            ("help", &self.help),
            ("next_focus", &self.next_focus),
            ("prev_focus", &self.prev_focus),
            ("prev_month", &self.prev_month),
            ("next_month", &self.next_month),
            ("goto_today", &self.goto_today),
            ("delete_entry", &self.delete_entry),
            ("save_entry", &self.save_entry),
        ]
    }

    /// Check that every binding parses
    pub fn validate(&self) -> Result<()> {
        for (name, binding) in self.bindings() {
            if KeyBinding::parse(binding).is_none() {
                bail!("keymap.{} has an unrecognized key `{}`", name, binding);
            }
        }
        Ok(())
    }
}

/// A key code plus the modifiers that must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Parse strings such as `q`, `?`, `ctrl-s`, `alt-enter`, `pageup`
    pub fn parse(binding: &str) -> Option<Self> {
        let binding = binding.trim();
        if binding.is_empty() {
            return None;
        }

        let mut modifiers = KeyModifiers::NONE;
        let mut rest = binding;
        loop {
            let lower = rest.to_ascii_lowercase();
            if lower.starts_with("ctrl-") && rest.len() > 5 {
                modifiers |= KeyModifiers::CONTROL;
                rest = &rest[5..];
            } else if lower.starts_with("alt-") && rest.len() > 4 {
                modifiers |= KeyModifiers::ALT;
                rest = &rest[4..];
            } else if lower.starts_with("shift-") && rest.len() > 6 {
                modifiers |= KeyModifiers::SHIFT;
                rest = &rest[6..];
            } else {
                break;
            }
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "enter" => KeyCode::Enter,
            "esc" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };

        Some(Self { code, modifiers })
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        // Terminals disagree on whether shifted characters carry SHIFT
        let ignore_shift = matches!(self.code, KeyCode::Char(_) | KeyCode::BackTab);
        let strip = |m: KeyModifiers| {
            if ignore_shift {
                m.difference(KeyModifiers::SHIFT)
            } else {
                m
            }
        };

        let code_matches = match (self.code, key.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) if !self.modifiers.is_empty() => {
                a.eq_ignore_ascii_case(&b)
            }
            (a, b) => a == b,
        };

        code_matches && strip(self.modifiers) == strip(key.modifiers)
    }
}

/// True if `key` triggers the binding string `binding`
pub fn key_matches(binding: &str, key: &KeyEvent) -> bool {
    KeyBinding::parse(binding).map_or(false, |b| b.matches(key))
}

/// Load `path`, writing the default config there first if it is missing
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        if let Err(e) = fs::write(path, toml) {
            log::warn!(
                "event=config_write_failed module=config path={} error={}",
                path.display(),
                e
            );
        }
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config.keymap.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_bindings() {
        assert_eq!(
            KeyBinding::parse("ctrl-s"),
            Some(KeyBinding { code: KeyCode::Char('s'), modifiers: KeyModifiers::CONTROL })
        );
        assert_eq!(KeyBinding::parse("pageup").unwrap().code, KeyCode::PageUp);
        assert_eq!(KeyBinding::parse("?").unwrap().code, KeyCode::Char('?'));
        assert_eq!(KeyBinding::parse("space").unwrap().code, KeyCode::Char(' '));
        assert!(KeyBinding::parse("").is_none());
        assert!(KeyBinding::parse("nonsense").is_none());
    }

    #[test]
    fn test_matches() {
        assert!(key_matches("ctrl-s", &key(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(!key_matches("ctrl-s", &key(KeyCode::Char('s'), KeyModifiers::NONE)));
        assert!(key_matches("?", &key(KeyCode::Char('?'), KeyModifiers::SHIFT)));
        assert!(key_matches("backtab", &key(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert!(key_matches("q", &key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!key_matches("q", &key(KeyCode::Char('q'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().keymap.validate().unwrap();
    }

    #[test]
    fn test_load_writes_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.calendar.week_start, WeekStart::Sunday);

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.keymap.save_entry, "ctrl-s");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[calendar]\nweek_start = \"monday\"\n\n[keymap]\nquit = \"x\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.calendar.week_start, WeekStart::Monday);
        assert_eq!(config.keymap.quit, "x");
        assert_eq!(config.keymap.help, "?");
    }

    #[test]
    fn test_bad_binding_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[keymap]\nquit = \"hyper-q\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
