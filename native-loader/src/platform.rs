// SPDX-FileCopyrightText: 2025 Contributors to the native-loader project.
// SPDX-License-Identifier: Apache-2.0

//! Platform detection and the naming rules that depend on it.
//!
//! Operating system and architecture names are folded into a closed set of
//! variants. Anything unrecognized is kept, normalized, in an `Other` variant
//! so that it still maps onto a directory of the bundle.

use std::{fmt, path::PathBuf};

/// Directory searched instead of the bundle on 32-bit ARM Linux.
pub const ARM_LINUX_LIBRARY_DIR: &str = "/usr/lib/arm-linux-gnueabihf";

/// Root directory of the native libraries inside a bundle.
pub const BUNDLE_ROOT: &str = "native";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    MacOs,
    Windows,
    Other(String),
}

impl Os {
    /// Classifies an OS name such as `"Linux"`, `"Mac OS X"`, `"Windows 10"`
    /// or one of the values of `std::env::consts::OS`.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("linux") {
            Os::Linux
        } else if lower.contains("mac") || lower.contains("darwin") {
            Os::MacOs
        } else if lower.contains("windows") {
            Os::Windows
        } else {
            Os::Other(strip_non_word(name).to_ascii_lowercase())
        }
    }

    /// Name of this OS's directory in the bundle.
    pub fn dir_name(&self) -> &str {
        match self {
            Os::Linux => "linux",
            Os::MacOs => "osx",
            Os::Windows => "windows",
            Os::Other(name) => name,
        }
    }

    /// File name of `library` following this OS's shared library conventions.
    pub fn library_file_name(&self, library: &str) -> String {
        let mapped = match self {
            Os::Windows => format!("{library}.dll"),
            Os::MacOs => format!("lib{library}.dylib"),
            Os::Linux | Os::Other(_) => format!("lib{library}.so"),
        };
        self.normalize_file_name(mapped)
    }

    /// Applies the per-OS extension fixups to an already mapped file name:
    /// `.jnilib` becomes `.dylib` on macOS, and `.so` gains the `.0` version
    /// suffix on Linux.
    pub fn normalize_file_name(&self, mapped: String) -> String {
        match self {
            Os::MacOs => match mapped.strip_suffix(".jnilib") {
                Some(stem) => format!("{stem}.dylib"),
                None => mapped,
            },
            Os::Linux if mapped.ends_with(".so") => format!("{mapped}.0"),
            _ => mapped,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    /// 32-bit ARM, whatever the revision.
    Arm,
    Aarch64,
    Other(String),
}

impl Arch {
    pub fn from_name(name: &str) -> Self {
        let normalized = strip_non_word(&name.replace('-', "_"));
        match normalized.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Arch::X86_64,
            "x86" | "i386" | "i486" | "i586" | "i686" => Arch::X86,
            "aarch64" | "arm64" => Arch::Aarch64,
            arm if arm.starts_with("arm") => Arch::Arm,
            _ => Arch::Other(normalized),
        }
    }

    pub fn dir_name(&self) -> &str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Arm => "arm",
            Arch::Aarch64 => "aarch64",
            Arch::Other(name) => name,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// The platform this crate was compiled for.
    pub fn current() -> Self {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_names(os: &str, arch: &str) -> Self {
        Self {
            os: Os::from_name(os),
            arch: Arch::from_name(arch),
        }
    }

    pub fn library_file_name(&self, library: &str) -> String {
        self.os.library_file_name(library)
    }

    /// Where the file for `library` is read from before extraction.
    pub fn resource_location(&self, library: &str) -> ResourceLocation {
        let file_name = self.library_file_name(library);
        if self.os == Os::Linux && self.arch == Arch::Arm {
            return ResourceLocation::System(PathBuf::from(ARM_LINUX_LIBRARY_DIR).join(file_name));
        }
        ResourceLocation::Bundled(format!(
            "{BUNDLE_ROOT}/{}/{}/{file_name}",
            self.os.dir_name(),
            self.arch.dir_name()
        ))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Source of a native library that has to be extracted before loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    /// A `/`-separated path relative to the bundle root.
    Bundled(String),
    /// An absolute path on the local filesystem.
    System(PathBuf),
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocation::Bundled(path) => write!(f, "bundle:/{path}"),
            ResourceLocation::System(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Drops every character outside `[A-Za-z0-9_]`.
fn strip_non_word(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_aliases() {
        assert_eq!(Os::from_name("Linux"), Os::Linux);
        assert_eq!(Os::from_name("linux"), Os::Linux);
        assert_eq!(Os::from_name("Mac OS X"), Os::MacOs);
        assert_eq!(Os::from_name("macos"), Os::MacOs);
        assert_eq!(Os::from_name("Darwin"), Os::MacOs);
        assert_eq!(Os::from_name("Windows 10"), Os::Windows);
        assert_eq!(Os::from_name("Free BSD"), Os::Other("freebsd".to_string()));
    }

    #[test]
    fn test_arch_normalization() {
        assert_eq!(Arch::from_name("amd64"), Arch::X86_64);
        assert_eq!(Arch::from_name("x86-64"), Arch::X86_64);
        assert_eq!(Arch::from_name("i686"), Arch::X86);
        assert_eq!(Arch::from_name("arm64"), Arch::Aarch64);
        assert_eq!(Arch::from_name("armv7l"), Arch::Arm);
        assert_eq!(Arch::from_name("arm"), Arch::Arm);
        assert_eq!(Arch::from_name("ppc64 le"), Arch::Other("ppc64le".to_string()));
    }

    #[test]
    fn test_linux_file_name_is_versioned() {
        let platform = Platform::from_names("Linux", "amd64");
        assert_eq!(platform.library_file_name("LiteCore"), "libLiteCore.so.0");
    }

    #[test]
    fn test_mac_file_name_never_jnilib() {
        let os = Os::from_name("Mac OS X");
        assert_eq!(os.library_file_name("LiteCore"), "libLiteCore.dylib");
        assert_eq!(
            os.normalize_file_name("libLiteCore.jnilib".to_string()),
            "libLiteCore.dylib"
        );
    }

    #[test]
    fn test_windows_and_other_file_names() {
        assert_eq!(Os::Windows.library_file_name("LiteCore"), "LiteCore.dll");
        assert_eq!(
            Os::from_name("SunOS").library_file_name("LiteCore"),
            "libLiteCore.so"
        );
    }

    #[test]
    fn test_bundled_resource_location() {
        let platform = Platform::from_names("Linux", "x86_64");
        assert_eq!(
            platform.resource_location("LiteCore"),
            ResourceLocation::Bundled("native/linux/x86_64/libLiteCore.so.0".to_string())
        );

        let platform = Platform::from_names("Mac OS X", "aarch64");
        assert_eq!(
            platform.resource_location("LiteCore"),
            ResourceLocation::Bundled("native/osx/aarch64/libLiteCore.dylib".to_string())
        );

        let platform = Platform::from_names("Haiku", "riscv64");
        assert_eq!(
            platform.resource_location("LiteCore"),
            ResourceLocation::Bundled("native/haiku/riscv64/libLiteCore.so".to_string())
        );
    }

    #[test]
    fn test_arm_linux_uses_system_directory() {
        let platform = Platform::from_names("Linux", "arm");
        assert_eq!(
            platform.resource_location("LiteCore"),
            ResourceLocation::System(PathBuf::from(
                "/usr/lib/arm-linux-gnueabihf/libLiteCore.so.0"
            ))
        );
    }

    #[test]
    fn test_arm64_linux_stays_in_bundle() {
        let platform = Platform::from_names("Linux", "arm64");
        assert!(matches!(
            platform.resource_location("LiteCore"),
            ResourceLocation::Bundled(_)
        ));
    }
}
