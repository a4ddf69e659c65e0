use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::{CompressionMethod, ZipArchive};

use crate::error::{Error, Result};

/// One entry of an archive as recorded in its central directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub compression: CompressionMethod,
    pub size: u64,
    pub compressed_size: u64,
    pub crc32: u32,
    pub is_dir: bool,
}

impl EntryInfo {
    pub fn is_stored(&self) -> bool {
        self.compression == CompressionMethod::Stored
    }
}

fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(Error::io(path))?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| Error::Corrupted {
        path: path.to_path_buf(),
        source,
    })
}

/// List the entries of the archive at `path` in archive order.
pub fn inspect(path: &Path) -> Result<Vec<EntryInfo>> {
    let mut archive = open(path)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|source| Error::Corrupted {
            path: path.to_path_buf(),
            source,
        })?;
        entries.push(EntryInfo {
            name: entry.name().to_string(),
            compression: entry.compression(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            crc32: entry.crc32(),
            is_dir: entry.is_dir(),
        });
    }
    Ok(entries)
}

/// Decompressed contents of every file entry, keyed by entry name.
pub fn read_entries(path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = open(path)?;
    let mut contents = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| Error::Corrupted {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.is_dir() {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).map_err(Error::io(path))?;
        contents.insert(entry.name().to_string(), bytes);
    }
    Ok(contents)
}
