// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

//! The resource tree that native libraries are shipped in.

use std::{
    collections::HashMap,
    env,
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

/// Read access to the files shipped with the application.
///
/// Paths are `/`-separated and relative to the bundle root, e.g.
/// `native/linux/x86_64/libLiteCore.so.0`. A missing entry is reported as
/// [`io::ErrorKind::NotFound`].
pub trait Bundle: Send + Sync {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// A bundle laid out as a directory on disk.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory containing the running executable.
    pub fn beside_executable() -> io::Result<Self> {
        let exe = env::current_exe()?;
        let root = exe
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent"))?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl Bundle for DirBundle {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self.resolve(path))?))
    }
}

/// A bundle compiled into the binary, usually with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedBundle {
    files: HashMap<&'static str, &'static [u8]>,
}

impl EmbeddedBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &'static str, bytes: &'static [u8]) -> Self {
        self.files.insert(path.trim_start_matches('/'), bytes);
        self
    }
}

impl FromIterator<(&'static str, &'static [u8])> for EmbeddedBundle {
    fn from_iter<I: IntoIterator<Item = (&'static str, &'static [u8])>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |bundle, (path, bytes)| bundle.with_file(path, bytes))
    }
}

impl Bundle for EmbeddedBundle {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let bytes = self
            .files
            .get(path.trim_start_matches('/'))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry {path}")))?;
        Ok(Box::new(*bytes))
    }
}
