// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

use std::{path::Path, sync::Arc};

use dlopen2::wrapper::{Container, WrapperApi};

use crate::{DynamicLoader, Error, NativeLibraries, Result};

/// A typed symbol table bound to a loaded library.
pub type ApiHandle<T> = Arc<Container<T>>;

/// Opens the library at `path` and resolves every symbol of `T`.
///
/// # Safety
///
/// The signatures declared in `T` must match the symbols exported by the
/// library, and its initializers run in this process.
pub unsafe fn load_api<T: WrapperApi>(path: impl AsRef<Path>) -> Result<ApiHandle<T>> {
    let path = path.as_ref();
    let container = unsafe { Container::load(path.as_os_str()) }.map_err(|source| {
        Error::LoaderRejected {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(Arc::new(container))
}

impl<L: DynamicLoader> NativeLibraries<L> {
    /// Loads `library` through the cache, then binds `T` to it.
    ///
    /// # Safety
    ///
    /// Same contract as [`load_api`].
    pub unsafe fn load_api<T: WrapperApi>(&self, library: &str) -> Result<ApiHandle<T>> {
        let path = self.try_load(library)?;
        unsafe { load_api(path) }
    }
}
