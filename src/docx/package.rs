//! Zip container codec: read every entry into memory, hand out part bytes,
//! and write the whole archive back with original names and order.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::Error;

#[derive(Clone)]
pub struct PackageEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub is_dir: bool,
}

#[derive(Clone)]
pub struct Package {
    entries: Vec<PackageEntry>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }
        Ok(Package { entries })
    }

    /// Assemble a package from scratch; every entry is deflated.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: Into<String>,
    {
        Package {
            entries: parts
                .into_iter()
                .map(|(name, data)| PackageEntry {
                    name: name.into(),
                    data,
                    compression: CompressionMethod::Deflated,
                    is_dir: false,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    /// Replace the bytes of an existing part, or append a new one.
    pub fn replace(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let compression = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(compression);
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }
        Ok(writer.finish()?.into_inner())
    }
}
