//! Media key injection.

use std::fmt;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

/// The system keys gestures can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    NextTrack,
    PlayPause,
    VolumeUp,
    VolumeDown,
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaKey::NextTrack => "nexttrack",
            MediaKey::PlayPause => "playpause",
            MediaKey::VolumeUp => "volumeup",
            MediaKey::VolumeDown => "volumedown",
        })
    }
}

/// Something that can press media keys.
pub trait MediaKeys {
    fn press(&mut self, key: MediaKey) -> anyhow::Result<()>;
}

/// Simulates key presses through the OS input system.
pub struct EnigoKeys {
    enigo: Enigo,
}

impl EnigoKeys {
    pub fn new() -> anyhow::Result<Self> {
        let enigo = Enigo::new(&Settings::default())?;
        Ok(Self { enigo })
    }
}

impl MediaKeys for EnigoKeys {
    fn press(&mut self, key: MediaKey) -> anyhow::Result<()> {
        let key = match key {
            MediaKey::NextTrack => Key::MediaNextTrack,
            MediaKey::PlayPause => Key::MediaPlayPause,
            MediaKey::VolumeUp => Key::VolumeUp,
            MediaKey::VolumeDown => Key::VolumeDown,
        };
        self.enigo.key(key, Direction::Click)?;
        Ok(())
    }
}

/// Logs key presses instead of performing them.
#[derive(Debug, Default)]
pub struct LogKeys;

impl MediaKeys for LogKeys {
    fn press(&mut self, key: MediaKey) -> anyhow::Result<()> {
        log::info!("dry run: pressing {key}");
        Ok(())
    }
}

/// Selects the [`MediaKeys`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBackend {
    /// Real key presses through [`EnigoKeys`].
    Enigo,
    /// Dry run through [`LogKeys`].
    Log,
}

impl KeyBackend {
    /// Creates the key presser.
    ///
    /// If the input system is unavailable (eg. there is no display server), key presses are
    /// logged instead.
    pub fn create(self) -> Box<dyn MediaKeys> {
        match self {
            KeyBackend::Enigo => match EnigoKeys::new() {
                Ok(keys) => Box::new(keys),
                Err(e) => {
                    log::warn!("cannot simulate key presses ({e:#}), logging them instead");
                    Box::new(LogKeys)
                }
            },
            KeyBackend::Log => Box::new(LogKeys),
        }
    }
}

/// Presses `key`, logging any failure.
///
/// Returns whether the key press went through.
pub fn press_media_key(keys: &mut dyn MediaKeys, key: MediaKey) -> bool {
    match keys.press(key) {
        Ok(()) => {
            log::debug!("pressed {key}");
            true
        }
        Err(e) => {
            log::error!("failed to press {key}: {e:#}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    struct Broken;

    impl MediaKeys for Broken {
        fn press(&mut self, key: MediaKey) -> anyhow::Result<()> {
            bail!("no input device for {key}")
        }
    }

    #[test]
    fn failures_are_reported_as_false() {
        assert!(!press_media_key(&mut Broken, MediaKey::VolumeUp));
        assert!(press_media_key(&mut LogKeys, MediaKey::VolumeUp));
    }

    #[test]
    fn key_names() {
        assert_eq!(MediaKey::NextTrack.to_string(), "nexttrack");
        assert_eq!(MediaKey::VolumeDown.to_string(), "volumedown");
    }
}
