//! AnimationStore – owns the animation set and its persistence round-trip.
//!
//! One JSON record per animation in the storage directory, keyed by the
//! record's `name` field. Legacy records (`.anim` extension, and split cell
//! encodings inside any record) are upgraded on load; a bad record is
//! skipped with a warning, never fatal to the whole load.

use log::{debug, info, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::animation::Animation;
use crate::error::{AnimatorError, Result};
use crate::grid::GridWorld;
use crate::record::{AnimationRecord, LEGACY_RECORD_EXT, RECORD_EXT};

// ---------------------------------------------------------------------------
// Load report
// ---------------------------------------------------------------------------

/// Outcome of a [`AnimationStore::load_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Animations now registered in memory.
    pub loaded: usize,
    /// Records skipped (malformed or unresolved grid).
    pub skipped: usize,
    /// Legacy records rewritten in the current format.
    pub upgraded: usize,
    /// Cells dropped from frames during the lossy legacy-cell upgrade.
    pub dropped_cells: usize,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct AnimationStore {
    dir: PathBuf,
    auto_save: bool,
    animations: HashMap<String, Animation>,
}

impl AnimationStore {
    /// Open a store over `dir`, creating the directory if absent.
    pub fn open(dir: impl Into<PathBuf>, auto_save: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            auto_save,
            animations: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.animations.values()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn playing_count(&self) -> usize {
        self.animations.values().filter(|a| a.is_playing()).count()
    }

    // -----------------------------------------------------------------------
    // Create / delete
    // -----------------------------------------------------------------------

    /// Register a new empty animation. Persists immediately when auto-save
    /// is enabled; a failed write leaves no ghost entry behind.
    pub fn create_animation(
        &mut self,
        name: &str,
        grid: &str,
        frame_interval_ms: u64,
    ) -> Result<&mut Animation> {
        match self.animations.entry(name.to_string()) {
            Entry::Occupied(_) => Err(AnimatorError::DuplicateName(name.to_string())),
            Entry::Vacant(entry) => {
                let animation = Animation::new(name, grid, frame_interval_ms);
                if self.auto_save {
                    write_record(&self.dir, &animation.to_record())?;
                }
                Ok(entry.insert(animation))
            }
        }
    }

    /// Remove an animation from memory and durable storage.
    ///
    /// Callers stop playback through the scheduler first; a leftover handle
    /// is still cancelled here so a store used standalone cannot leak a
    /// running timer.
    pub fn delete_animation(&mut self, name: &str) -> Result<()> {
        let Some(mut animation) = self.animations.remove(name) else {
            return Err(AnimatorError::NotFound(name.to_string()));
        };

        if let Some(handle) = animation.end_playback() {
            handle.cancel();
        }

        let record = self.record_path(name);
        if record.exists() {
            fs::remove_file(&record)?;
        }

        // A legacy record for the same name may still be around.
        let legacy = self.legacy_record_path(name);
        if legacy.exists() {
            fs::remove_file(&legacy)?;
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Serialize the full entity, overwriting any prior record for the name.
    pub fn save_animation(&self, name: &str) -> Result<()> {
        let animation = self
            .animations
            .get(name)
            .ok_or_else(|| AnimatorError::NotFound(name.to_string()))?;

        write_record(&self.dir, &animation.to_record())?;
        debug!("Saved animation '{}'", name);
        Ok(())
    }

    /// Persist every animation; failures are logged per record.
    pub fn save_all(&self) {
        for name in self.animations.keys() {
            if let Err(e) = self.save_animation(name) {
                warn!("Failed to save animation '{}': {}", name, e);
            }
        }
    }

    /// Enumerate durable records and register every loadable animation.
    ///
    /// Per-record policy: a record missing required fields or referencing a
    /// grid the world cannot resolve is skipped with a warning. Legacy
    /// containers are rewritten in the current format first; the old file
    /// survives until the rewrite is confirmed on disk.
    pub fn load_all(&mut self, world: &dyn GridWorld) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        self.upgrade_legacy_records(&mut report)?;

        for path in self.record_files(RECORD_EXT)? {
            let record = match read_record(&path) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Animation record {} is malformed: {}", path.display(), e);
                    report.skipped += 1;
                    continue;
                }
            };

            if !world.has_grid(&record.grid) {
                warn!(
                    "Animation '{}' references unresolvable grid '{}', skipping",
                    record.name, record.grid
                );
                report.skipped += 1;
                continue;
            }

            let (animation, dropped) = Animation::from_record(&record);
            if dropped > 0 {
                warn!(
                    "Animation '{}': dropped {} cells with unmappable legacy encodings",
                    record.name, dropped
                );
                report.dropped_cells += dropped;
            }

            debug!("Loaded animation '{}'", animation.name());
            self.animations.insert(record.name, animation);
            report.loaded += 1;
        }

        info!("Loaded {} animations", report.loaded);
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Legacy upgrade
    // -----------------------------------------------------------------------

    /// Rewrite every legacy `.anim` record as a current `.json` record.
    ///
    /// The legacy file is removed only after the new record is written; an
    /// unreadable legacy record, or one whose name already has a current
    /// record, is left in place untouched.
    fn upgrade_legacy_records(&self, report: &mut LoadReport) -> Result<()> {
        let legacy_files = self.record_files(LEGACY_RECORD_EXT)?;
        if legacy_files.is_empty() {
            return Ok(());
        }

        info!(
            "Found {} legacy animation records to upgrade",
            legacy_files.len()
        );

        for path in legacy_files {
            let record = match read_record(&path) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        "Legacy record {} is unreadable, keeping it as-is: {}",
                        path.display(),
                        e
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            let target = self.record_path(&record.name);
            if target.exists() {
                warn!(
                    "Legacy record {} collides with an existing current record, keeping both",
                    path.display()
                );
                continue;
            }

            write_record(&self.dir, &record)?;
            fs::remove_file(&path)?;

            info!("Upgraded legacy animation record '{}'", record.name);
            report.upgraded += 1;
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // File helpers
    // -----------------------------------------------------------------------

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, RECORD_EXT))
    }

    fn legacy_record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, LEGACY_RECORD_EXT))
    }

    fn record_files(&self, ext: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

// ---------------------------------------------------------------------------
// Record I/O
// ---------------------------------------------------------------------------

fn write_record(dir: &Path, record: &AnimationRecord) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(record).map_err(io::Error::from)?;
    fs::write(dir.join(format!("{}.{}", record.name, RECORD_EXT)), bytes)?;
    Ok(())
}

fn read_record(path: &Path) -> Result<AnimationRecord> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| AnimatorError::MalformedRecord {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        reason: e.to_string(),
    })
}
