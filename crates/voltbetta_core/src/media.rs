//! Photo file storage and thumbnail cache.
//!
//! # Responsibility
//! - Copy user-picked images into the managed image root.
//! - Produce cached, aspect-preserving thumbnails with the `image` crate.
//!
//! # Invariants
//! - Stored file names are `<YYYYmmdd_HHMMSS>_<original file name>`.
//! - `save_image` never touches the database; callers persist the returned
//!   record.
//! - Deleting a file that is already gone is not an error.

use crate::model::photo::FishPhoto;
use crate::model::RecordId;
use chrono::{DateTime, Utc};
use image::imageops::FilterType;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Longest edge of a generated thumbnail when none is configured.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

const STORED_NAME_FORMAT: &str = "%Y%m%d_%H%M%S";
const THUMBNAIL_PREFIX: &str = "thumb_";

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug)]
pub enum MediaError {
    /// The picked source file does not exist.
    SourceMissing(PathBuf),
    /// The source path has no usable file name component.
    InvalidFileName(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
    Image(image::ImageError),
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing(path) => {
                write!(f, "source image not found: {}", path.display())
            }
            Self::InvalidFileName(path) => {
                write!(f, "source path has no file name: {}", path.display())
            }
            Self::Io { path, source } => write!(f, "image file error at {}: {source}", path.display()),
            Self::Image(err) => write!(f, "image decode/encode failed: {err}"),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Image(err) => Some(err),
            Self::SourceMissing(_) | Self::InvalidFileName(_) => None,
        }
    }
}

impl From<image::ImageError> for MediaError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MediaError + '_ {
    move |source| MediaError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Managed image directory plus its thumbnail cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStore {
    root: PathBuf,
    thumbnail_dir: PathBuf,
    thumbnail_size: u32,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, thumbnail_dir: impl Into<PathBuf>, thumbnail_size: u32) -> Self {
        Self {
            root: root.into(),
            thumbnail_dir: thumbnail_dir.into(),
            thumbnail_size: thumbnail_size.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn thumbnail_dir(&self) -> &Path {
        &self.thumbnail_dir
    }

    /// Copies `source` into the image root and describes the stored copy.
    ///
    /// # Errors
    /// - `SourceMissing` when `source` is not an existing file.
    /// - `Io` when the root cannot be created or the copy fails.
    pub fn save_image(
        &self,
        source: &Path,
        caption: &str,
        category: &str,
        treatment_plan_id: Option<RecordId>,
        now: DateTime<Utc>,
    ) -> MediaResult<FishPhoto> {
        let started_at = Instant::now();
        if !source.is_file() {
            error!("event=image_save module=media status=error reason=source_missing");
            return Err(MediaError::SourceMissing(source.to_path_buf()));
        }
        let original_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| MediaError::InvalidFileName(source.to_path_buf()))?;

        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        let stamp = now.format(STORED_NAME_FORMAT).to_string();
        let (file_name, target) = self.free_target(&stamp, original_name);
        let bytes = fs::copy(source, &target).map_err(io_error(&target))?;

        info!(
            "event=image_save module=media status=ok bytes={} duration_ms={}",
            bytes,
            started_at.elapsed().as_millis()
        );

        let mut photo = FishPhoto::new(caption, self.root.to_string_lossy(), file_name, now);
        photo.category = category.to_string();
        photo.is_treatment_photo = treatment_plan_id.is_some();
        photo.treatment_plan_id = treatment_plan_id;
        Ok(photo)
    }

    /// First unused `<stamp>_<name>` in the root; a clash gets `_1`, `_2`, ...
    /// before the extension.
    fn free_target(&self, stamp: &str, original_name: &str) -> (String, PathBuf) {
        let original = Path::new(original_name);
        let stem = original
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| original_name.to_string());
        let extension = original
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut file_name = format!("{stamp}_{original_name}");
        let mut suffix = 0u32;
        while self.root.join(&file_name).exists() {
            suffix += 1;
            file_name = format!("{stamp}_{stem}_{suffix}{extension}");
        }
        let target = self.root.join(&file_name);
        (file_name, target)
    }

    /// Cache path of the thumbnail for `photo`.
    pub fn thumbnail_path(&self, photo: &FishPhoto) -> PathBuf {
        let stem = Path::new(&photo.file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| photo.file_name.clone());
        self.thumbnail_dir.join(format!("{THUMBNAIL_PREFIX}{stem}.png"))
    }

    /// Returns a cached thumbnail for `photo`, generating it on first use.
    pub fn thumbnail(&self, photo: &FishPhoto) -> MediaResult<PathBuf> {
        let cache_path = self.thumbnail_path(photo);
        if cache_path.is_file() {
            return Ok(cache_path);
        }

        let source = photo.full_path();
        if !source.is_file() {
            return Err(MediaError::SourceMissing(source));
        }

        fs::create_dir_all(&self.thumbnail_dir).map_err(io_error(&self.thumbnail_dir))?;
        let img = image::open(&source)?;
        let (width, height) = fit_within(
            img.width(),
            img.height(),
            self.thumbnail_size,
            self.thumbnail_size,
        );
        img.resize_exact(width, height, FilterType::Triangle)
            .save(&cache_path)?;

        info!(
            "event=thumbnail_generate module=media status=ok width={} height={}",
            width, height
        );
        Ok(cache_path)
    }

    /// Removes the stored file and its cached thumbnail when present.
    pub fn delete_image(&self, photo: &FishPhoto) -> MediaResult<()> {
        for path in [photo.full_path(), self.thumbnail_path(photo)] {
            if path.is_file() {
                fs::remove_file(&path).map_err(io_error(&path))?;
            }
        }
        info!("event=image_delete module=media status=ok");
        Ok(())
    }
}

/// Scales `(width, height)` down to fit `max_width x max_height`, keeping the
/// aspect ratio. Images already inside the box are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let aspect = f64::from(width) / f64::from(height);
    let mut w = f64::from(width);
    let mut h = f64::from(height);

    if w > f64::from(max_width) {
        w = f64::from(max_width);
        h = w / aspect;
    }
    if h > f64::from(max_height) {
        h = f64::from(max_height);
        w = h * aspect;
    }

    (round_dimension(w), round_dimension(h))
}

fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}
