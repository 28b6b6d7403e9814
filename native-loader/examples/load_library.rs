// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Parser;
use native_loader::{DirBundle, LoaderConfig, NativeLibraries, Platform, Resolution};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Extract and load a bundled native library")]
struct Opts {
    /// Logical library name, e.g. LiteCore.
    library: String,

    /// Root of the bundle holding native/<os>/<arch>/...
    #[arg(long, default_value = ".")]
    bundle: PathBuf,

    /// Load this file instead of the bundled one.
    #[arg(long)]
    path: Option<PathBuf>,

    /// Directory the library is extracted to.
    #[arg(long, env = "NATIVE_LOADER_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Resolve for another OS, e.g. "Mac OS X".
    #[arg(long, requires = "arch")]
    os: Option<String>,

    /// Resolve for another architecture, e.g. "arm".
    #[arg(long, requires = "os")]
    arch: Option<String>,

    /// Print where the library would come from and exit.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();

    let mut config = LoaderConfig::from_env();
    if let Some(temp_dir) = opts.temp_dir {
        config = config.with_temp_dir(temp_dir);
    }
    if let Some(path) = opts.path {
        config = config.with_library_path(&opts.library, path);
    }

    let mut libs = NativeLibraries::new(config, DirBundle::new(&opts.bundle));
    if let (Some(os), Some(arch)) = (opts.os, opts.arch) {
        libs = libs.with_platform(Platform::from_names(&os, &arch));
    }

    if opts.dry_run {
        match libs.resolve(&opts.library) {
            Ok(Resolution::Override(path)) => println!("override: {}", path.display()),
            Ok(Resolution::Extract { location, target }) => {
                println!("{} -> {}", location, target.display())
            }
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    match libs.try_load(&opts.library) {
        Ok(path) => info!(platform = %libs.platform(), "{} loaded from {}", opts.library, path.display()),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
