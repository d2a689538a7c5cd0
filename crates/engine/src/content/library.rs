use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to scan asset directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open sprite {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode sprite {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("required sprite group {group:?} is missing")]
    MissingGroup { group: String },
}

/// Decoded RGBA frame, ready for blitting.
#[derive(Debug, Clone)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// All sprites, loaded up front. Groups are directories relative to the
/// asset root with `/` separators, e.g. `tiles/Dirt` or
/// `characters/Player/Idle`; frames are the directory's PNGs in filename
/// order.
#[derive(Debug, Default)]
pub struct SpriteLibrary {
    groups: HashMap<String, Vec<SpriteImage>>,
}

impl SpriteLibrary {
    pub fn load(root: &Path) -> Result<Self, AssetError> {
        let mut library = Self::default();
        library.load_dir(root, String::new())?;
        info!(
            groups = library.groups.len(),
            root = %root.display(),
            "sprites_loaded"
        );
        Ok(library)
    }

    fn load_dir(&mut self, dir: &Path, group: String) -> Result<(), AssetError> {
        let entries = fs::read_dir(dir).map_err(|source| AssetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        // Filename order defines frame order within a group.
        paths.sort();

        for path in paths {
            if path.is_dir() {
                let name = match path.file_name().and_then(|name| name.to_str()) {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                let child_group = if group.is_empty() {
                    name
                } else {
                    format!("{group}/{name}")
                };
                self.load_dir(&path, child_group)?;
            } else if path.extension().is_some_and(|ext| ext == "png") && !group.is_empty() {
                let sprite = decode_png(&path)?;
                self.groups.entry(group.clone()).or_default().push(sprite);
            }
        }
        Ok(())
    }

    pub fn frame(&self, group: &str, index: usize) -> Option<&SpriteImage> {
        let frames = self.groups.get(group)?;
        if frames.is_empty() {
            return None;
        }
        frames.get(index % frames.len())
    }

    pub fn group_len(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, Vec::len)
    }

    pub fn require(&self, groups: &[String]) -> Result<(), AssetError> {
        for group in groups {
            if !self.groups.contains_key(group) {
                return Err(AssetError::MissingGroup {
                    group: group.clone(),
                });
            }
        }
        Ok(())
    }

    /// Frame-count index scenes use for animation setup; cheap to clone into
    /// the shared world.
    pub fn index(&self) -> AssetIndex {
        let mut index = AssetIndex::empty();
        for (group, frames) in &self.groups {
            index.insert(group.clone(), frames.len());
        }
        index
    }
}

fn decode_png(path: &Path) -> Result<SpriteImage, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let image = reader
        .decode()
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    Ok(SpriteImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    frame_counts: HashMap<String, usize>,
}

impl AssetIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: String, frame_count: usize) {
        self.frame_counts.insert(group, frame_count);
    }

    /// Unknown groups report a single frame so animations stay valid while
    /// the renderer draws nothing for them.
    pub fn frame_count(&self, group: &str) -> usize {
        self.frame_counts.get(group).copied().unwrap_or(1).max(1)
    }

    pub fn contains(&self, group: &str) -> bool {
        self.frame_counts.contains_key(group)
    }

    pub fn groups_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut groups: Vec<String> = self
            .frame_counts
            .keys()
            .filter_map(|group| group.strip_prefix(prefix))
            .map(|suffix| suffix.to_string())
            .collect();
        groups.sort();
        groups
    }
}
