//! Platform fingerprints: stable identity keys for same-target captures.

use crate::models::Platform;

/// Fingerprint of a platform at a given screenshot resolution.
///
/// Device captures yield `platform_device`; browser captures yield
/// `platform_browser_WIDTHxHEIGHT`. Returns `None` when neither branch applies,
/// a browser capture has no known resolution, or a name is not a token (ASCII,
/// no `_`, no whitespace) and so could collide with another key.
pub fn fingerprint(platform: &Platform, dims: Option<(u32, u32)>) -> Option<String> {
    if !platform.has_name() || !platform.has_token_names() {
        return None;
    }

    if let Some(ref device) = platform.device_name {
        return Some(format!("{}_{}", platform.platform_name, device).to_lowercase());
    }

    let browser = platform.browser_name.as_ref()?;
    let (width, height) = dims?;
    Some(format!("{}_{}_{}x{}", platform.platform_name, browser, width, height).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_fingerprint() {
        let platform = Platform::device("ios", "iphone12");
        assert_eq!(
            fingerprint(&platform, Some((390, 844))).as_deref(),
            Some("ios_iphone12")
        );
        // resolution does not matter for devices
        assert_eq!(
            fingerprint(&platform, None).as_deref(),
            Some("ios_iphone12")
        );
    }

    #[test]
    fn test_browser_fingerprint() {
        let platform = Platform::browser("windows", "chrome", 1920, 1080);
        assert_eq!(
            fingerprint(&platform, Some((1920, 1080))).as_deref(),
            Some("windows_chrome_1920x1080")
        );
    }

    #[test]
    fn test_unnormalized_input_is_lowercased() {
        let platform = Platform {
            platform_name: "MacOS".to_string(),
            browser_name: Some("Safari".to_string()),
            ..Default::default()
        };
        assert_eq!(
            fingerprint(&platform, Some((1280, 800))).as_deref(),
            Some("macos_safari_1280x800")
        );
    }

    #[test]
    fn test_ineligible_platforms() {
        let bare = Platform {
            platform_name: "linux".to_string(),
            ..Default::default()
        };
        assert_eq!(fingerprint(&bare, Some((10, 10))), None);

        let nameless = Platform {
            platform_name: "".to_string(),
            device_name: Some("pixel".to_string()),
            ..Default::default()
        };
        assert_eq!(fingerprint(&nameless, None), None);

        let browser = Platform::browser("windows", "edge", 800, 600);
        assert_eq!(fingerprint(&browser, None), None);
    }

    #[test]
    fn test_device_name_cannot_forge_browser_key() {
        let forged = Platform::device("windows", "chrome_1920x1080");
        assert_eq!(fingerprint(&forged, Some((1920, 1080))), None);
        assert_eq!(
            fingerprint(&Platform::browser("windows", "chrome", 1920, 1080), Some((1920, 1080))).as_deref(),
            Some("windows_chrome_1920x1080")
        );
    }

    #[test]
    fn test_deterministic_and_separating() {
        let base = Platform::browser("windows", "chrome", 1920, 1080);
        let dims = Some((1920, 1080));
        assert_eq!(fingerprint(&base, dims), fingerprint(&base, dims));

        let variants = [
            fingerprint(&Platform::browser("linux", "chrome", 1920, 1080), dims),
            fingerprint(&Platform::browser("windows", "firefox", 1920, 1080), dims),
            fingerprint(&base, Some((1920, 1200))),
            fingerprint(&base, Some((1280, 1080))),
            fingerprint(&Platform::device("windows", "chrome"), dims),
        ];
        let original = fingerprint(&base, dims);
        for variant in variants {
            assert_ne!(variant, original);
        }
    }
}
