// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::platform::ResourceLocation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The library name is empty or would escape the extraction directory.
    #[error("library name must be non-empty and free of path separators")]
    InvalidName,

    /// Neither an override nor a bundled file exists for the current platform.
    #[error("native library '{library}' not found at {location}")]
    ResourceNotFound {
        library: String,
        location: ResourceLocation,
    },

    /// Extracting the library to its target file failed.
    #[error("failed to {context} '{}': {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The dynamic loader refused the file.
    #[error("dynamic loader rejected '{}': {source}", path.display())]
    LoaderRejected {
        path: PathBuf,
        #[source]
        source: dlopen2::Error,
    },
}

impl Error {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
