// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

use tracing::debug;

pub const DEFAULT_NAMESPACE: &str = "native_loader";

/// Environment variable overriding the extraction directory in
/// [`LoaderConfig::from_env`].
pub const TEMP_DIR_ENV: &str = "NATIVE_LOADER_TEMP_DIR";

/// Settings of a [`NativeLibraries`](crate::NativeLibraries).
///
/// Override paths are keyed by library name. A library without an override
/// is resolved from the bundle.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    namespace: String,
    overrides: HashMap<String, PathBuf>,
    temp_dir: PathBuf,
    read_env: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            overrides: HashMap::new(),
            temp_dir: env::temp_dir(),
            read_env: false,
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus override lookup in the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default().with_env(true);
        if let Some(dir) = env::var_os(TEMP_DIR_ENV) {
            config.temp_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_env(mut self, read_env: bool) -> Self {
        self.read_env = read_env;
        self
    }

    pub fn with_library_path(mut self, library: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(library.into(), path.into());
        self
    }

    /// Keeps every `<namespace>.lib.<name>.path` entry of a properties
    /// source as an override for `<name>`. Other keys are ignored.
    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<PathBuf>,
    {
        let prefix = format!("{}.lib.", self.namespace);
        for (key, value) in properties {
            let library = key
                .as_ref()
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".path"))
                .filter(|library| !library.is_empty());
            if let Some(library) = library {
                self.overrides.insert(library.to_string(), value.into());
            }
        }
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// `"<namespace>.lib.<library>.path"`
    pub fn property_key(&self, library: &str) -> String {
        format!("{}.lib.{library}.path", self.namespace)
    }

    /// The property key in upper snake case, e.g.
    /// `NATIVE_LOADER_LIB_LITECORE_PATH`.
    pub fn env_key(&self, library: &str) -> String {
        self.property_key(library)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Override path for `library`, if one is configured.
    pub fn configured_path(&self, library: &str) -> Option<PathBuf> {
        if let Some(path) = self.overrides.get(library) {
            return Some(path.clone());
        }
        if !self.read_env {
            return None;
        }

        [self.property_key(library), self.env_key(library)]
            .into_iter()
            .find_map(|key| {
                let value = env::var_os(&key).filter(|value| !value.is_empty())?;
                debug!(key = %key, "override path found in environment");
                Some(PathBuf::from(value))
            })
    }
}
