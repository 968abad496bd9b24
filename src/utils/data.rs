use crate::utils::cheat_sheet::CheatSheetEntry;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A string store addressed by fixed key names
pub trait KeyValueStore {
    /// `None` when nothing has been stored under `key`
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Stores each key as `{dir}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create store directory {:?}", self.dir))?;
        std::fs::write(self.path_for(key), value).context("Failed to write store file")?;
        Ok(())
    }
}

/// In-process store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Save any serializable data to a pretty JSON file
pub fn save_json<T: Serialize + ?Sized>(data: &T, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;
    std::fs::write(path, json).context("Failed to write JSON file")?;
    Ok(())
}

/// One CSV row per team in a cheat sheet entry
#[derive(Debug, Serialize)]
struct CheatSheetRow<'a> {
    sport: &'a str,
    matchup: &'a str,
    start_time: String,
    team: &'a str,
    decimal_odds: f64,
}

/// Save the cheat sheet to CSV
pub fn save_cheat_sheet_to_csv(entries: &[CheatSheetEntry], filename: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    for entry in entries {
        for odds in &entry.odds {
            writer.serialize(CheatSheetRow {
                sport: &entry.sport,
                matchup: &entry.matchup,
                start_time: entry.start_time.to_rfc3339(),
                team: &odds.team,
                decimal_odds: odds.odds,
            })?;
        }
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cheat_sheet::TeamOdds;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("myPicks"), None);
        store.set("myPicks", "[]").unwrap();
        assert_eq!(store.get("myPicks").as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::default();
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v2"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_save_cheat_sheet_to_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cheatsheet.csv");
        let entries = vec![CheatSheetEntry {
            sport: "NHL".to_string(),
            matchup: "Away @ Home".to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap(),
            odds: vec![
                TeamOdds {
                    team: "Away".to_string(),
                    odds: 3.1,
                },
                TeamOdds {
                    team: "Home".to_string(),
                    odds: 1.4,
                },
            ],
        }];

        save_cheat_sheet_to_csv(&entries, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "sport,matchup,start_time,team,decimal_odds");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("NHL,Away @ Home,"));
        assert!(lines[1].ends_with(",Away,3.1"));
    }
}
