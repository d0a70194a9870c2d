//! Curated rooms: named groups of paths with designated entry points.
//!
//! The manifest lives in `.quarry/rooms.toml`. Decoding goes through a
//! [`ManifestDecoder`] handed to the search engine at construction, so the
//! engine never reaches for a global decoder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{IoResultExt, QuarryError, Result};
use crate::utils::paths::{normalize_relative, parent_dir};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomManifest {
    /// Room for results no curated room claims
    #[serde(default)]
    pub default_room: Option<String>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub entry_points: Vec<String>,
}

/// Turns raw manifest text into a [`RoomManifest`]
pub trait ManifestDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> Result<RoomManifest>;
}

/// Decodes the TOML manifest format
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlManifestDecoder;

impl ManifestDecoder for TomlManifestDecoder {
    fn decode(&self, raw: &str) -> Result<RoomManifest> {
        toml::from_str(raw).map_err(|e| QuarryError::Manifest(e.to_string()))
    }
}

impl RoomManifest {
    /// Read and validate the manifest at `path`; a missing file means no rooms
    pub fn load(path: &Path, decoder: &dyn ManifestDecoder) -> Result<Self> {
        if !path.exists() {
            debug!("No rooms manifest at {}", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).at(path)?;
        let manifest = decoder.decode(&raw)?.normalized()?;
        debug!(
            "Loaded {} rooms from {}",
            manifest.rooms.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Slash-normalize entry points and reject unnamed or duplicate rooms
    pub fn normalized(mut self) -> Result<Self> {
        let mut seen = HashSet::new();
        for room in &mut self.rooms {
            if room.name.trim().is_empty() {
                return Err(QuarryError::Manifest("room with empty name".to_string()));
            }
            if !seen.insert(room.name.clone()) {
                return Err(QuarryError::Manifest(format!(
                    "room '{}' declared twice",
                    room.name
                )));
            }
            room.entry_points = room
                .entry_points
                .iter()
                .map(|p| normalize_relative(p))
                .filter(|p| !p.is_empty())
                .collect();
        }
        Ok(self)
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    /// Every name a result can be grouped under (declared rooms, then the default)
    pub fn room_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rooms.iter().map(|r| r.name.as_str()).collect();
        if let Some(default) = self.default_room.as_deref() {
            if !names.contains(&default) {
                names.push(default);
            }
        }
        names
    }

    pub fn has_room(&self, name: &str) -> bool {
        self.room_names().contains(&name)
    }

    /// The first room declaring `path` as an entry point
    pub fn entry_room(&self, path: &str) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|room| room.entry_points.iter().any(|ep| ep == path))
    }

    pub fn is_entry_point(&self, path: &str) -> bool {
        self.entry_room(path).is_some()
    }

    /// Room for a result path
    ///
    /// Its entry-point room if it is one; else the room whose entry-point
    /// directory is the longest prefix of the path's directory (first declared
    /// wins ties); else the default room; else `None`. Entry points at the
    /// workspace root never claim by prefix.
    pub fn assign(&self, path: &str) -> Option<&str> {
        if let Some(room) = self.entry_room(path) {
            return Some(room.name.as_str());
        }

        let directory = parent_dir(path);
        let mut best: Option<(&str, usize)> = None;
        for room in &self.rooms {
            for entry_point in &room.entry_points {
                let entry_dir = parent_dir(entry_point);
                if entry_dir.is_empty() || !dir_contains(entry_dir, directory) {
                    continue;
                }
                if best.is_none_or(|(_, len)| entry_dir.len() > len) {
                    best = Some((room.name.as_str(), entry_dir.len()));
                }
            }
        }

        best.map(|(name, _)| name)
            .or(self.default_room.as_deref())
    }

    pub fn summary(&self, name: &str) -> Option<&str> {
        self.room(name)
            .map(|room| room.summary.as_str())
            .filter(|summary| !summary.is_empty())
    }
}

/// `ancestor` equals `directory` or is one of its parent directories
fn dir_contains(ancestor: &str, directory: &str) -> bool {
    directory == ancestor
        || directory
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}
