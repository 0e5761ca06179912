use serde::{Deserialize, Serialize};

use super::error::FetchError;

/// One downloadable file attached to a release.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

/// One published release of the application, as delivered by the API.
///
/// Field names follow the wire format. `body` is tolerated absent because
/// releases created through the API can omit it; the site treats missing and
/// empty notes the same.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct Release {
    pub tag_name: String,
    pub name: String,
    #[serde(default)]
    pub body: String,
    pub published_at: String,
    pub html_url: String,
    pub prerelease: bool,
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Enforces the constraints serde cannot express: non-empty names and
    /// well-formed download URLs. Deserialization plus this check is the
    /// schema gate for every payload crossing the trust boundary.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.tag_name.is_empty() {
            return Err(FetchError::InvalidFormat(
                "release tag_name is empty".to_string(),
            ));
        }
        for asset in &self.assets {
            asset.validate()?;
        }
        Ok(())
    }
}

impl ReleaseAsset {
    fn validate(&self) -> Result<(), FetchError> {
        if self.name.is_empty() {
            return Err(FetchError::InvalidFormat("asset name is empty".to_string()));
        }
        if let Err(e) = reqwest::Url::parse(&self.browser_download_url) {
            return Err(FetchError::InvalidFormat(format!(
                "asset '{}' has a malformed download URL: {}",
                self.name, e
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RELEASE: &str = r###"{
        "tag_name": "v1.4.0",
        "name": "S-IDE 1.4.0",
        "body": "## What's new\n- things",
        "published_at": "2024-06-01T12:00:00Z",
        "html_url": "https://github.com/S-IDE-studio/S-IDE/releases/tag/v1.4.0",
        "prerelease": false,
        "assets": [
            {
                "name": "s-ide-windows-setup.exe",
                "browser_download_url": "https://github.com/S-IDE-studio/S-IDE/releases/download/v1.4.0/s-ide-windows-setup.exe",
                "size": 88604672
            }
        ]
    }"###;

    #[test]
    fn test_deserialize_full_release() {
        let release: Release = serde_json::from_str(FULL_RELEASE).unwrap();
        assert_eq!(release.tag_name, "v1.4.0");
        assert_eq!(release.name, "S-IDE 1.4.0");
        assert!(!release.prerelease);
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].size, 88604672);
        assert!(release.validate().is_ok());
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let first: Release = serde_json::from_str(FULL_RELEASE).unwrap();
        let second: Release = serde_json::from_str(FULL_RELEASE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_tag_name_fails_deserialization() {
        let payload = r#"{
            "name": "S-IDE 1.4.0",
            "published_at": "2024-06-01T12:00:00Z",
            "html_url": "https://example.com",
            "prerelease": false,
            "assets": []
        }"#;
        let result: Result<Release, _> = serde_json::from_str(payload);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("tag_name"));
    }

    #[test]
    fn test_missing_body_defaults_to_empty() {
        let payload = r#"{
            "tag_name": "v0.1.0",
            "name": "First",
            "published_at": "2024-01-01T00:00:00Z",
            "html_url": "https://example.com",
            "prerelease": true,
            "assets": []
        }"#;
        let release: Release = serde_json::from_str(payload).unwrap();
        assert_eq!(release.body, "");
        assert!(release.prerelease);
    }

    #[test]
    fn test_validate_rejects_empty_tag_name() {
        let release = Release::default();
        let err = release.validate().unwrap_err();
        assert!(matches!(err, FetchError::InvalidFormat(_)));
    }

    #[test]
    fn test_validate_rejects_malformed_download_url() {
        let release = Release {
            tag_name: "v1.0.0".into(),
            assets: vec![ReleaseAsset {
                name: "installer.exe".into(),
                browser_download_url: "not a url".into(),
                size: 1,
            }],
            ..Default::default()
        };
        let err = release.validate().unwrap_err();
        assert!(matches!(err, FetchError::InvalidFormat(_)));
        assert!(err.to_string().contains("installer.exe"));
    }

    #[test]
    fn test_validate_rejects_empty_asset_name() {
        let release = Release {
            tag_name: "v1.0.0".into(),
            assets: vec![ReleaseAsset {
                name: String::new(),
                browser_download_url: "https://example.com/file".into(),
                size: 0,
            }],
            ..Default::default()
        };
        assert!(release.validate().is_err());
    }
}
