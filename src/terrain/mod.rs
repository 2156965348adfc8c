mod label;
mod locator;
mod tile;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

pub use self::label::{Label, LabelKey};
pub use self::locator::{locate, Dataset, TileIdentifier};
pub use self::tile::{RasterTile, Sample, SampleFormat, TileGeometry};

impl Dataset {
    pub fn sample_format(self) -> SampleFormat {
        match self {
            Dataset::Dtm => SampleFormat::I16Be,
            Dataset::Ortho => SampleFormat::U16Be,
        }
    }
}

/// Local directory holding downloaded archive tiles under their archive file names.
#[derive(Clone, Debug)]
pub struct DataFolder {
    root: PathBuf,
}

/// Local paths and archive URLs of one tile product.
#[derive(Clone, Debug, PartialEq)]
pub struct TileFiles {
    pub image: PathBuf,
    pub label: PathBuf,
    pub image_url: String,
    pub label_url: String,
}

impl DataFolder {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        DataFolder {
            root: root.as_ref().to_owned(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_files(&self, id: &TileIdentifier, dataset: Dataset) -> TileFiles {
        let files = TileFiles {
            image: self.root.join(id.image_file_name(dataset)),
            label: self.root.join(id.label_file_name(dataset)),
            image_url: id.image_url(dataset),
            label_url: id.label_url(dataset),
        };
        debug!("Tile {} expected at {:?}", id.name, files.image);
        files
    }
}

impl TileFiles {
    pub fn is_present(&self) -> bool {
        self.image.is_file() && self.label.is_file()
    }

    /// Fails with the archive URL of the first file missing locally.
    pub fn ensure_present(&self) -> Result<()> {
        if !self.label.is_file() {
            return Err(Error::MissingTileData {
                path: self.label.clone(),
                url: self.label_url.clone(),
            });
        }
        if !self.image.is_file() {
            return Err(Error::MissingTileData {
                path: self.image.clone(),
                url: self.image_url.clone(),
            });
        }
        Ok(())
    }
}
