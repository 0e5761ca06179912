use log::warn;

use crate::github::{Release, ReleaseAsset};

use super::PlatformAssets;

/// Fixed artifact names produced by the release CI. Exact matches take
/// priority over the suffix fallbacks below.
pub const WINDOWS_SETUP: &str = "s-ide-windows-setup.exe";
pub const MACOS_INSTALLER: &str = "s-ide-macos-installer.dmg";
pub const LINUX_APPIMAGE: &str = "s-ide-linux.AppImage";
pub const LINUX_DEB: &str = "s-ide-linux.deb";

/// One name-matching rule. Matching is case-sensitive; suffixes are exact.
enum Rule {
    Exact(&'static str),
    Suffix(&'static str),
}

impl Rule {
    fn matches(&self, name: &str) -> bool {
        match self {
            Rule::Exact(expected) => name == *expected,
            Rule::Suffix(suffix) => name.ends_with(suffix),
        }
    }
}

const WINDOWS_RULES: &[Rule] = &[Rule::Exact(WINDOWS_SETUP), Rule::Suffix(".exe")];
const MACOS_RULES: &[Rule] = &[Rule::Exact(MACOS_INSTALLER), Rule::Suffix(".dmg")];
const LINUX_RULES: &[Rule] = &[
    Rule::Exact(LINUX_APPIMAGE),
    Rule::Suffix(".AppImage"),
    Rule::Exact(LINUX_DEB),
    Rule::Suffix(".deb"),
    Rule::Suffix(".rpm"),
];

/// Picks at most one artifact per platform from a release's asset list.
///
/// Rules are tried in priority order; the first rule with a hit wins and the
/// hit is the first asset in list order. A platform without a match stays
/// `None`. A release whose assets match no platform at all gets a warning,
/// since that usually means the artifact naming changed upstream.
pub fn resolve_assets_by_platform(release: &Release) -> PlatformAssets {
    let resolved = PlatformAssets {
        windows: find(&release.assets, WINDOWS_RULES),
        macos: find(&release.assets, MACOS_RULES),
        linux: find(&release.assets, LINUX_RULES),
    };

    if resolved.is_empty() && !release.assets.is_empty() {
        warn!(
            "No platform assets resolved for release {} ({} assets); artifact naming may have changed",
            release.tag_name,
            release.assets.len()
        );
    }

    resolved
}

fn find(assets: &[ReleaseAsset], rules: &[Rule]) -> Option<ReleaseAsset> {
    rules
        .iter()
        .find_map(|rule| assets.iter().find(|asset| rule.matches(&asset.name)))
        .cloned()
}
