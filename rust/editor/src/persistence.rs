// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Saved projects: a key-value store of project documents, plus file
//! export and import.
//!
//! A project document is `{ name, date, rooms }` where `date` is the save
//! time in milliseconds since the Unix epoch and `rooms` holds one
//! [`RoomRecord`] per room.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use roomplan_geometry::RoomRecord;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scene::SceneManager;

/// A saved project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    /// Save time, epoch milliseconds.
    pub date: i64,
    pub rooms: Vec<RoomRecord>,
}

impl ProjectFile {
    /// Snapshots every room of `scene`.
    pub fn from_scene(name: impl Into<String>, scene: &SceneManager, date: i64) -> Self {
        Self {
            name: name.into(),
            date,
            rooms: scene.to_records(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Listing entry for a saved project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub date: i64,
    pub room_count: usize,
}

/// String key-value storage for project documents.
pub trait ProjectStore {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Returns whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// Every stored key, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory store, used by tests and short-lived sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Store keeping one `<key>.json` file per entry in a directory.
///
/// Keys are percent-encoded in file names; only `[A-Za-z0-9._~-]` stays
/// as is.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn decode_key(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|key| key.into_owned())
}

impl ProjectStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_of(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_of(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        match fs::remove_file(self.path_of(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                Some(key) => keys.push(key),
                None => tracing::warn!(path = %path.display(), "skipping file with undecodable name"),
            }
        }
        Ok(keys)
    }
}

/// Named projects on top of a [`ProjectStore`].
#[derive(Debug)]
pub struct ProjectLibrary<S> {
    store: S,
    prefix: String,
}

impl<S: ProjectStore> ProjectLibrary<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Saves the scene under `name` with the current time.
    pub fn save(&mut self, name: &str, scene: &SceneManager) -> Result<ProjectFile> {
        let project = ProjectFile::from_scene(name.trim(), scene, Utc::now().timestamp_millis());
        self.save_project(&project)?;
        Ok(project)
    }

    /// Stores a project document as is.
    pub fn save_project(&mut self, project: &ProjectFile) -> Result<()> {
        let name = project.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName(project.name.clone()));
        }
        let json = project.to_json()?;
        self.store.set(&self.key(name), &json)?;
        tracing::info!(name, rooms = project.rooms.len(), "project saved");
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<ProjectFile> {
        let json = self
            .store
            .get(&self.key(name.trim()))?
            .ok_or_else(|| Error::ProjectNotFound(name.to_owned()))?;
        ProjectFile::from_json(&json)
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        if self.store.remove(&self.key(name.trim()))? {
            tracing::info!(name, "project deleted");
            Ok(())
        } else {
            Err(Error::ProjectNotFound(name.to_owned()))
        }
    }

    /// Saved projects, newest first. Unreadable entries are skipped.
    pub fn list(&self) -> Result<Vec<ProjectSummary>> {
        let mut projects = Vec::new();
        for key in self.store.keys()? {
            if !key.starts_with(&self.prefix) {
                continue;
            }
            let Some(json) = self.store.get(&key)? else {
                continue;
            };
            match ProjectFile::from_json(&json) {
                Ok(project) => projects.push(ProjectSummary {
                    name: project.name,
                    date: project.date,
                    room_count: project.rooms.len(),
                }),
                Err(e) => tracing::warn!(key, error = %e, "skipping unreadable project"),
            }
        }
        projects.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
        Ok(projects)
    }
}

/// File name for an exported project, e.g. `My_Flat_2024-05-01.json`.
pub fn export_file_name(name: &str, date: NaiveDate) -> String {
    let stem = name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}_{}.json", stem, date.format("%Y-%m-%d"))
}

/// Writes the scene as a project document into `dir`. Returns the file path.
pub fn export_to_file(dir: &Path, name: &str, scene: &SceneManager) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidName(name.to_owned()));
    }
    let now = Utc::now();
    let project = ProjectFile::from_scene(name, scene, now.timestamp_millis());
    let path = dir.join(export_file_name(name, now.date_naive()));
    fs::write(&path, project.to_json()?)?;
    tracing::info!(path = %path.display(), rooms = project.rooms.len(), "project exported");
    Ok(path)
}

/// Reads a project document from disk.
pub fn import_from_file(path: &Path) -> Result<ProjectFile> {
    let json = fs::read_to_string(path)?;
    ProjectFile::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::Params;

    fn project(name: &str, date: i64) -> ProjectFile {
        ProjectFile {
            name: name.into(),
            date,
            rooms: Vec::new(),
        }
    }

    #[test]
    fn key_encoding_round_trips() {
        for key in ["roomEditor_plain", "roomEditor_My Flat", "roomEditor_50%/ü"] {
            let encoded = encode_key(key);
            assert!(!encoded.contains(['/', ' ']));
            assert_eq!(decode_key(&encoded).as_deref(), Some(key));
        }
        assert_eq!(encode_key("roomEditor_My Flat"), "roomEditor_My%20Flat");
        // Escapes that are not UTF-8 cannot name a key.
        assert_eq!(decode_key("bad%FF"), None);
    }

    #[test]
    fn export_names_replace_whitespace() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_file_name("My  Flat\tv2", date), "My_Flat_v2_2024-05-01.json");
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut library = ProjectLibrary::new(MemoryStore::new(), "roomEditor_");
        let scene = SceneManager::new(Params::default());
        assert!(matches!(library.save("   ", &scene), Err(Error::InvalidName(_))));
        assert!(library.list().unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first_and_skips_garbage() {
        let mut store = MemoryStore::new();
        store.set("roomEditor_broken", "{ not json").unwrap();
        store.set("otherApp_thing", "{}").unwrap();
        let mut library = ProjectLibrary::new(store, "roomEditor_");
        library.save_project(&project("old", 1_000)).unwrap();
        library.save_project(&project("new", 3_000)).unwrap();
        library.save_project(&project("mid", 2_000)).unwrap();

        let names: Vec<_> = library.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["new", "mid", "old"]);
    }

    #[test]
    fn load_and_delete_missing_projects() {
        let mut library = ProjectLibrary::new(MemoryStore::new(), "roomEditor_");
        library.save_project(&project("flat", 5)).unwrap();
        assert_eq!(library.load("flat").unwrap(), project("flat", 5));
        library.delete("flat").unwrap();
        assert!(matches!(library.load("flat"), Err(Error::ProjectNotFound(_))));
        assert!(matches!(library.delete("flat"), Err(Error::ProjectNotFound(_))));
    }
}
