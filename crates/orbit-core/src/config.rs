//! User preferences consumed by the face
//!
//! Preferences are owned by the settings screens. The face only ever sees an
//! immutable [`ConfigSnapshot`], taken through a [`ConfigSource`] at
//! construction and on every visibility transition.

extern crate alloc;

use alloc::vec::Vec;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::styling::colors::{HEX_BLACK, HEX_WHITE};

/// Full set of face preferences, captured at one instant.
///
/// Colors are packed `0xRRGGBB`. Fields missing from a serialized snapshot take
/// their [`Default`] values.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub background_color: u32,
    pub satellite_color: u32,
    pub text_color: u32,
    pub use_24_hour_clock: bool,
    pub draw_hour_outline: bool,
    pub draw_minute_outline: bool,
    pub draw_second_outline: bool,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            background_color: HEX_BLACK,
            satellite_color: HEX_WHITE,
            text_color: HEX_WHITE,
            use_24_hour_clock: false,
            draw_hour_outline: true,
            draw_minute_outline: false,
            draw_second_outline: false,
        }
    }
}

/// Read capability for preferences.
///
/// Reads are infallible: a source that cannot produce a value returns the
/// defaults instead.
pub trait ConfigSource {
    fn read(&mut self) -> ConfigSnapshot;
}

/// A fixed snapshot is its own source.
impl ConfigSource for ConfigSnapshot {
    fn read(&mut self) -> ConfigSnapshot {
        *self
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to encode preferences: {0}")]
    Encode(postcard::Error),
}

/// Preference blob shared with the settings screens, encoded with postcard.
#[derive(Debug, Default, Clone)]
pub struct StoredConfig {
    blob: Vec<u8>,
}

impl StoredConfig {
    /// Create an empty store. Reading it yields the defaults.
    pub fn new() -> Self {
        Self { blob: Vec::new() }
    }

    /// Wrap an existing blob, e.g. one loaded from flash.
    pub fn from_bytes(blob: Vec<u8>) -> Self {
        Self { blob }
    }

    /// Replace the stored preferences.
    pub fn write(&mut self, snapshot: &ConfigSnapshot) -> Result<(), ConfigError> {
        self.blob = postcard::to_allocvec(snapshot).map_err(ConfigError::Encode)?;
        debug!("Stored {} bytes of preferences", self.blob.len());
        Ok(())
    }

    /// Raw encoded preferences.
    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }
}

impl ConfigSource for StoredConfig {
    fn read(&mut self) -> ConfigSnapshot {
        if self.blob.is_empty() {
            debug!("No stored preferences, using defaults");
            return ConfigSnapshot::default();
        }
        match postcard::from_bytes::<ConfigSnapshot>(&self.blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Stored preferences unreadable ({:?}), using defaults", e);
                ConfigSnapshot::default()
            }
        }
    }
}
