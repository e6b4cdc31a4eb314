//! Capture platform metadata.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform a screenshot was captured on.
///
/// Mobile captures carry a `device_name`; desktop/browser captures carry a
/// `browser_name` and a screen resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Platform {
    pub platform_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
}

impl Platform {
    pub fn device(platform_name: &str, device_name: &str) -> Self {
        Platform {
            platform_name: platform_name.to_string(),
            device_name: Some(device_name.to_string()),
            ..Default::default()
        }
        .normalized()
    }

    pub fn browser(platform_name: &str, browser_name: &str, width: u32, height: u32) -> Self {
        Platform {
            platform_name: platform_name.to_string(),
            browser_name: Some(browser_name.to_string()),
            screen_width: Some(width),
            screen_height: Some(height),
            ..Default::default()
        }
        .normalized()
    }

    /// Lowercase and trim every name, joining inner whitespace with `-`; blank
    /// names become unset.
    pub fn normalized(self) -> Self {
        Platform {
            platform_name: normalize(&self.platform_name),
            device_name: self.device_name.as_deref().map(normalize).filter(|s| !s.is_empty()),
            browser_name: self.browser_name.as_deref().map(normalize).filter(|s| !s.is_empty()),
            screen_width: self.screen_width,
            screen_height: self.screen_height,
        }
    }

    /// Names that cannot be joined into an unambiguous fingerprint.
    pub fn validate(&self) -> Result<(), String> {
        let names = std::iter::once(("platform_name", Some(&self.platform_name)))
            .chain([
                ("device_name", self.device_name.as_ref()),
                ("browser_name", self.browser_name.as_ref()),
            ]);
        for (field, value) in names {
            if let Some(value) = value
                && !value.is_empty()
                && !is_token(value)
            {
                return Err(format!(
                    "{} '{}' must be ASCII without '_' or whitespace",
                    field, value
                ));
            }
        }
        Ok(())
    }

    /// Whether every set name is a fingerprint token.
    pub fn has_token_names(&self) -> bool {
        is_token(&self.platform_name)
            && self.device_name.as_deref().is_none_or(is_token)
            && self.browser_name.as_deref().is_none_or(is_token)
    }

    pub fn has_name(&self) -> bool {
        !self.platform_name.trim().is_empty()
    }

    pub fn is_device(&self) -> bool {
        self.device_name.is_some()
    }

    pub fn is_browser(&self) -> bool {
        self.device_name.is_none() && self.browser_name.is_some()
    }
}

fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_graphic() && b != b'_')
}
