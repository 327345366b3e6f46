use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::metadata::{MetadataStore, PhotoRecord};
use super::Error;

/// Source of `uploaded_at` timestamps, in seconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> f64 + Send + Sync>;

pub fn system_clock() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

/// Photo files in one flat directory, joined with their [`MetadataStore`]
/// records.
///
/// Each operation is a single load-mutate-save cycle on the metadata
/// document. Cycles are serialized within this process; nothing coordinates
/// with other processes writing the same document.
pub struct PhotoRepository {
    photo_dir: PathBuf,
    store: MetadataStore,
    clock: Clock,
    lock: Mutex<()>,
}

impl fmt::Debug for PhotoRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoRepository")
            .field("photo_dir", &self.photo_dir)
            .field("store", &self.store)
            .finish()
    }
}

impl PhotoRepository {
    /// Creates the photo directory and an empty metadata document if needed.
    pub fn open(photo_dir: impl Into<PathBuf>, store: MetadataStore) -> Result<Self, Error> {
        let photo_dir = photo_dir.into();
        fs::create_dir_all(&photo_dir)?;
        store.init()?;

        Ok(PhotoRepository {
            photo_dir,
            store,
            clock: Arc::new(system_clock),
            lock: Mutex::new(()),
        })
    }

    pub fn with_clock(mut self, clock: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn photo_dir(&self) -> &Path {
        &self.photo_dir
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// On-disk location for `filename`, or `None` if it would leave the
    /// photo directory.
    pub fn photo_path(&self, filename: &str) -> Option<PathBuf> {
        if is_plain_filename(filename) {
            Some(self.photo_dir.join(filename))
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `bytes` under a freshly generated filename and records it with
    /// zero likes. Returns the generated filename.
    pub fn save_upload(
        &self,
        bytes: &[u8],
        original_name: &str,
        caption: &str,
    ) -> Result<String, Error> {
        let filename = generate_filename(original_name);
        let _guard = self.lock();

        fs::write(self.photo_dir.join(&filename), bytes)?;

        let mut metadata = self.store.load()?;
        metadata.insert(
            filename.clone(),
            PhotoRecord {
                original_name: original_name.to_string(),
                caption: caption.to_string(),
                likes: 0,
                uploaded_at: (self.clock)(),
            },
        );
        self.store.save(&metadata)?;

        info!(%filename, original_name, size = bytes.len(), "saved upload");
        Ok(filename)
    }

    /// Records whose file still exists, newest first. Equal timestamps keep
    /// document order.
    pub fn list_photos(&self) -> Result<Vec<(PathBuf, PhotoRecord)>, Error> {
        let metadata = {
            let _guard = self.lock();
            self.store.load()?
        };

        let mut photos: Vec<_> = metadata
            .into_iter()
            .filter_map(|(filename, record)| {
                let path = self.photo_path(&filename)?;
                if path.is_file() {
                    Some((path, record))
                } else {
                    debug!(%filename, "skipping record without a file");
                    None
                }
            })
            .collect();

        photos.sort_by(|(_, a), (_, b)| b.uploaded_at.total_cmp(&a.uploaded_at));
        Ok(photos)
    }

    pub fn get_photo(&self, filename: &str) -> Result<Option<(PathBuf, PhotoRecord)>, Error> {
        let path = match self.photo_path(filename) {
            Some(path) => path,
            None => return Ok(None),
        };

        let mut metadata = {
            let _guard = self.lock();
            self.store.load()?
        };

        match metadata.shift_remove(filename) {
            Some(record) if path.is_file() => Ok(Some((path, record))),
            _ => Ok(None),
        }
    }

    /// Removes the file and its record. Unknown filenames are a no-op.
    pub fn delete_photo(&self, filename: &str) -> Result<(), Error> {
        let path = match self.photo_path(filename) {
            Some(path) => path,
            None => {
                warn!(filename, "refusing to delete outside the photo directory");
                return Ok(());
            },
        };

        let _guard = self.lock();
        let mut metadata = self.store.load()?;

        match fs::remove_file(&path) {
            Ok(()) => debug!(%filename, "removed photo file"),
            Err(err) if err.kind() == ErrorKind::NotFound => {},
            Err(err) => return Err(err.into()),
        }

        if metadata.shift_remove(filename).is_some() {
            info!(%filename, "deleted photo");
        }
        self.store.save(&metadata)?;

        Ok(())
    }

    /// Adds one like and returns the new count, or 0 for an unknown filename.
    pub fn like_photo(&self, filename: &str) -> Result<u64, Error> {
        if !is_plain_filename(filename) {
            return Ok(0);
        }

        let _guard = self.lock();
        let mut metadata = self.store.load()?;

        let likes = match metadata.get_mut(filename) {
            Some(record) => {
                record.likes = record.likes.saturating_add(1);
                record.likes
            },
            None => return Ok(0),
        };
        self.store.save(&metadata)?;

        debug!(%filename, likes, "liked photo");
        Ok(likes)
    }
}

/// Lowercased extension of `name` without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
}

fn generate_filename(original_name: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    match extension_of(original_name) {
        Some(ext) => format!("{}.{}", token, ext),
        None => token,
    }
}

fn is_plain_filename(filename: &str) -> bool {
    if filename.contains(|c| c == '/' || c == '\\') {
        return false;
    }

    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
