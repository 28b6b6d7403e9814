// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    Error, Result,
    bundle::{Bundle, DirBundle},
    config::LoaderConfig,
    extract,
    platform::{Platform, ResourceLocation},
};

/// Opens shared libraries. [`SystemLoader`] is the real thing.
pub trait DynamicLoader: Send + Sync {
    /// Handle that keeps the library mapped for as long as it lives.
    type Library: Send + 'static;

    fn open(&self, path: &Path) -> std::result::Result<Self::Library, dlopen2::Error>;
}

/// The operating system's dynamic loader (`dlopen` / `LoadLibraryW`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

impl DynamicLoader for SystemLoader {
    type Library = dlopen2::raw::Library;

    fn open(&self, path: &Path) -> std::result::Result<Self::Library, dlopen2::Error> {
        dlopen2::raw::Library::open(path.as_os_str())
    }
}

/// How a library name maps onto the file handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A configured path, loaded in place.
    Override(PathBuf),
    /// A bundled file copied to `target` first.
    Extract {
        location: ResourceLocation,
        target: PathBuf,
    },
}

struct Loaded<T> {
    path: PathBuf,
    _library: T,
}

/// Loads native libraries at most once each.
///
/// Every load runs under a single lock, so concurrent callers never extract
/// or open the same library twice. Loaded libraries stay mapped until this
/// value is dropped.
pub struct NativeLibraries<L: DynamicLoader = SystemLoader> {
    config: LoaderConfig,
    platform: Platform,
    bundle: Box<dyn Bundle>,
    loader: L,
    loaded: Mutex<HashMap<String, Loaded<L::Library>>>,
}

impl NativeLibraries<SystemLoader> {
    pub fn new(config: LoaderConfig, bundle: impl Bundle + 'static) -> Self {
        Self::with_loader(config, bundle, SystemLoader)
    }

    /// Configuration from the environment and a bundle rooted next to the
    /// running executable.
    pub fn from_env() -> Self {
        let bundle = DirBundle::beside_executable().unwrap_or_else(|e| {
            warn!(error = %e, "cannot locate executable, using the working directory as bundle root");
            DirBundle::new(".")
        });
        Self::new(LoaderConfig::from_env(), bundle)
    }
}

impl<L: DynamicLoader> NativeLibraries<L> {
    pub fn with_loader(config: LoaderConfig, bundle: impl Bundle + 'static, loader: L) -> Self {
        Self {
            config,
            platform: Platform::current(),
            bundle: Box::new(bundle),
            loader,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves bundle paths for `platform` instead of the compile target.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Works out where `library` would be loaded from without touching the
    /// filesystem.
    pub fn resolve(&self, library: &str) -> Result<Resolution> {
        validate_name(library)?;

        if let Some(path) = self.config.configured_path(library) {
            return Ok(Resolution::Override(absolute(&path)?));
        }

        let target = self
            .config
            .temp_dir()
            .join(self.platform.library_file_name(library));
        Ok(Resolution::Extract {
            location: self.platform.resource_location(library),
            target: absolute(&target)?,
        })
    }

    /// Loads `library` unless it is already loaded, returning the path it
    /// was loaded from.
    pub fn try_load(&self, library: &str) -> Result<PathBuf> {
        validate_name(library)?;

        let mut loaded = self.loaded.lock();
        if let Some(entry) = loaded.get(library) {
            return Ok(entry.path.clone());
        }

        let path = match self.resolve(library)? {
            Resolution::Override(path) => {
                debug!(library, path = %path.display(), "using configured library path");
                if !path.exists() {
                    return Err(Error::ResourceNotFound {
                        library: library.to_string(),
                        location: ResourceLocation::System(path),
                    });
                }
                path
            }
            Resolution::Extract { location, target } => {
                debug!(library, platform = %self.platform, %location, "extracting bundled library");
                extract::extract(library, &location, self.bundle.as_ref(), &target)?
            }
        };

        let handle = self
            .loader
            .open(&path)
            .map_err(|source| Error::LoaderRejected {
                path: path.clone(),
                source,
            })?;

        info!(library, path = %path.display(), "loaded native library");
        loaded.insert(
            library.to_string(),
            Loaded {
                path: path.clone(),
                _library: handle,
            },
        );
        Ok(path)
    }

    /// [`try_load`](Self::try_load) with errors logged and reported as
    /// `false`.
    pub fn load(&self, library: &str) -> bool {
        match self.try_load(library) {
            Ok(_) => true,
            Err(e) => {
                error!(library, error = %e, "error loading native library");
                false
            }
        }
    }

    pub fn is_loaded(&self, library: &str) -> bool {
        self.loaded.lock().contains_key(library)
    }

    pub fn loaded_path(&self, library: &str) -> Option<PathBuf> {
        self.loaded.lock().get(library).map(|entry| entry.path.clone())
    }

    /// Names of the loaded libraries, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loaded.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Library names become file names, so they must be non-empty and must not
/// contain path separators or NUL.
fn validate_name(library: &str) -> Result<()> {
    if library.is_empty() || library.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidName);
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::io("resolve", path, e))
}
