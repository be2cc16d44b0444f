use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;
use vocaquiz_core::repo::{prepare_edit, prepare_new, CardStore};
use vocaquiz_core::{Card, CardId, CoreError, NewCard, Schedule};

pub mod paths;

const FILE_VERSION: u32 = 1;
const BACKUP_PREFIX: &str = "vocaquiz-";
pub const DEFAULT_MAX_BACKUPS: usize = 10;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cards: Vec<Card>,
}

#[derive(Clone)]
struct State {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cards: Vec<Card>,
}

impl State {
    fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            cards: Vec::new(),
        }
    }

    fn to_image(&self) -> FileImage {
        FileImage {
            version: FILE_VERSION,
            created_at: self.created_at,
            updated_at: self.updated_at,
            cards: self.cards.clone(),
        }
    }

    fn from_image(img: FileImage) -> Self {
        Self {
            created_at: img.created_at,
            updated_at: img.updated_at,
            cards: img.cards,
        }
    }
}

/// Where the state came from when the store was opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Primary,
    Backup(PathBuf),
    Fresh,
}

pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    max_backups: usize,
    origin: Origin,
    state: RwLock<State>,
    save_lock: Mutex<()>,
}

impl JsonStore {
    pub async fn open_in(root: &Path) -> Result<Self, CoreError> {
        let (file, backups) = paths::store_paths(root);
        Self::open_with(file, backups, DEFAULT_MAX_BACKUPS).await
    }

    pub async fn open_with(
        path: PathBuf,
        backups_dir: PathBuf,
        max_backups: usize,
    ) -> Result<Self, CoreError> {
        let max_backups = max_backups.max(1);
        let (p, b) = (path.clone(), backups_dir.clone());
        let (state, origin) =
            task::spawn_blocking(move || load_or_restore(&p, &b, max_backups))
                .await
                .map_err(CoreError::persistence)?
                .map_err(CoreError::persistence)?;
        tracing::info!(
            path = %path.display(),
            cards = state.cards.len(),
            ?origin,
            "card store opened"
        );
        Ok(Self {
            path,
            backups_dir,
            max_backups,
            origin,
            state: RwLock::new(state),
            save_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    async fn save(&self) -> Result<(), CoreError> {
        // Snapshot under the save lock so a later save always carries every earlier change.
        let _guard = self.save_lock.lock().await;
        let snapshot = {
            let mut s = self.state.write();
            s.updated_at = Utc::now();
            s.to_image()
        };
        let path = self.path.clone();
        let backups = self.backups_dir.clone();
        let keep = self.max_backups;

        task::spawn_blocking(move || write_with_backup(&path, &backups, keep, &snapshot))
            .await
            .map_err(CoreError::persistence)?
            .map_err(|e| {
                tracing::warn!(error = %e, "card store write failed");
                CoreError::persistence(e)
            })
    }
}

fn read_image(path: &Path) -> io::Result<FileImage> {
    let buf = fs::read_to_string(path)?;
    let img = serde_json::from_str::<FileImage>(&buf)?;
    if img.version > FILE_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported store version {}", img.version),
        ));
    }
    Ok(img)
}

/// Backup files, newest first. Names embed a sortable timestamp.
fn list_backups(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_backup(p))
        .collect();
    files.sort();
    files.reverse();
    Ok(files)
}

fn is_backup(p: &Path) -> bool {
    p.extension().and_then(|s| s.to_str()) == Some("json")
        && p.file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|n| n.starts_with(BACKUP_PREFIX))
}

fn load_or_restore(path: &Path, backups_dir: &Path, keep: usize) -> io::Result<(State, Origin)> {
    let primary_exists = path.exists();
    if primary_exists {
        match read_image(path) {
            Ok(img) => return Ok((State::from_image(img), Origin::Primary)),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "card store unreadable, trying backups"),
        }
    }

    for backup in list_backups(backups_dir)? {
        match read_image(&backup) {
            Ok(img) => {
                tracing::warn!(backup = %backup.display(), "restoring card store from backup");
                write_atomic(path, &serde_json::to_vec_pretty(&img)?)?;
                return Ok((State::from_image(img), Origin::Backup(backup)));
            }
            Err(e) => tracing::warn!(backup = %backup.display(), error = %e, "skipping unreadable backup"),
        }
    }

    if primary_exists {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is unreadable and no usable backup exists", path.display()),
        ));
    }

    let st = State::new_empty();
    write_with_backup(path, backups_dir, keep, &st.to_image())?;
    Ok((st, Origin::Fresh))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn write_with_backup(
    path: &Path,
    backups_dir: &Path,
    max_backups: usize,
    img: &FileImage,
) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(img)?;
    write_atomic(path, &json)?;

    fs::create_dir_all(backups_dir)?;
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = backups_dir.join(format!("{BACKUP_PREFIX}{ts}.json"));
    write_atomic(&backup_path, &json)?;

    rotate_backups(backups_dir, max_backups)
}

fn rotate_backups(dir: &Path, keep: usize) -> io::Result<()> {
    for stale in list_backups(dir)?.into_iter().skip(keep) {
        let _ = fs::remove_file(stale);
    }
    Ok(())
}

#[async_trait]
impl CardStore for JsonStore {
    async fn load_all(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self.state.read().cards.clone())
    }

    async fn persist(&self, id: CardId, schedule: &Schedule) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            let Some(card) = s.cards.iter_mut().find(|c| c.id == id) else {
                return Err(CoreError::CardNotFound(id));
            };
            card.schedule = schedule.clone();
        }
        self.save().await
    }

    async fn add_card(&self, draft: NewCard) -> Result<Card, CoreError> {
        let card = {
            let mut s = self.state.write();
            let card = prepare_new(&s.cards, draft)?;
            s.cards.push(card.clone());
            card
        };
        self.save().await?;
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Card, CoreError> {
        let s = self.state.read();
        s.cards
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(CoreError::CardNotFound(id))
    }

    async fn update_card(&self, card: &Card) -> Result<Card, CoreError> {
        let updated = {
            let mut s = self.state.write();
            let updated = prepare_edit(&s.cards, card)?;
            if let Some(slot) = s.cards.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated.clone();
            }
            updated
        };
        self.save().await?;
        Ok(updated)
    }

    async fn delete_card(&self, id: CardId) -> Result<(), CoreError> {
        {
            let mut s = self.state.write();
            let before = s.cards.len();
            s.cards.retain(|c| c.id != id);
            if s.cards.len() == before {
                return Err(CoreError::CardNotFound(id));
            }
        }
        self.save().await
    }
}
