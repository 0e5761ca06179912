//! Per-platform selection of release artifacts.

pub mod resolver;

pub use resolver::resolve_assets_by_platform;

use serde::Serialize;

use crate::github::ReleaseAsset;

/// Target platform of a downloadable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Macos,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Macos, Platform::Linux];

    /// Key used for this platform in page data and URLs.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Linux => "linux",
        }
    }
}

/// At most one resolved artifact per platform. Derived from a release's
/// asset list; absence means "no download for this platform".
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PlatformAssets {
    pub windows: Option<ReleaseAsset>,
    pub macos: Option<ReleaseAsset>,
    pub linux: Option<ReleaseAsset>,
}

impl PlatformAssets {
    pub fn get(&self, platform: Platform) -> Option<&ReleaseAsset> {
        match platform {
            Platform::Windows => self.windows.as_ref(),
            Platform::Macos => self.macos.as_ref(),
            Platform::Linux => self.linux.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Platform::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

/// Renders a byte count for humans, e.g. `84.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}
