// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

//! Locates, extracts and loads platform-specific native libraries shipped
//! with an application.
//!
//! A library is looked up by its logical name (e.g. `"LiteCore"`). Unless a
//! path is configured for it, the file is read from
//! `native/<os>/<arch>/<file name>` in the bundle, copied to the temp
//! directory and opened from there. Each [`NativeLibraries`] loads a given
//! name at most once.
//!
//! ```no_run
//! use native_loader::{DirBundle, LoaderConfig, NativeLibraries};
//!
//! let libs = NativeLibraries::new(LoaderConfig::from_env(), DirBundle::new("/opt/app"));
//! if !libs.load("LiteCore") {
//!     eprintln!("LiteCore is not available on this platform");
//! }
//! ```

use std::sync::LazyLock;

mod api;
mod bundle;
mod config;
mod error;
mod extract;
mod loader;
mod platform;

pub use api::{ApiHandle, load_api};
pub use bundle::{Bundle, DirBundle, EmbeddedBundle};
pub use config::{DEFAULT_NAMESPACE, LoaderConfig, TEMP_DIR_ENV};
pub use error::{Error, Result};
pub use loader::{DynamicLoader, NativeLibraries, Resolution, SystemLoader};
pub use platform::{ARM_LINUX_LIBRARY_DIR, Arch, BUNDLE_ROOT, Os, Platform, ResourceLocation};

static GLOBAL: LazyLock<NativeLibraries> = LazyLock::new(NativeLibraries::from_env);

/// Process-wide loader configured with [`NativeLibraries::from_env`].
pub fn global() -> &'static NativeLibraries {
    &GLOBAL
}

/// Loads `library` with the process-wide loader. Errors are logged.
pub fn load_library(library: &str) -> bool {
    GLOBAL.load(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_loader() {
        assert!(!load_library(""));
        assert!(!global().is_loaded(""));
        assert_eq!(global().platform(), &Platform::current());
    }

    #[test]
    fn test_global_resolves_into_temp_dir() {
        let library = "NativeLoaderGlobalResolve";
        let platform = global().platform();
        let expected_target = std::path::absolute(
            global()
                .config()
                .temp_dir()
                .join(platform.library_file_name(library)),
        )
        .unwrap();

        assert_eq!(
            global().resolve(library).unwrap(),
            Resolution::Extract {
                location: platform.resource_location(library),
                target: expected_target,
            }
        );
        assert!(!global().is_loaded(library));
    }
}
