//! CDN image URL construction.
//!
//! Product images are served through Cloudinary's fetch pipeline, which
//! resizes and re-encodes the origin image on the fly. URLs already pointing
//! at Cloudinary are passed through untouched, and a local placeholder
//! covers products without an image.

/// Path of the placeholder shown for products without an image.
pub const PLACEHOLDER_PATH: &str = "/static/placeholder.svg";

/// Named size presets used across the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePreset {
    /// Cart lines and small chips.
    Thumbnail,
    /// Product listing cards.
    Grid,
    /// Single-product gallery.
    Preview,
    /// Zoomed single-product view.
    Full,
    /// Full-width banners.
    Hero,
}

impl ImagePreset {
    /// Target width in pixels.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::Thumbnail => 100,
            Self::Grid => 400,
            Self::Preview => 800,
            Self::Full => 1200,
            Self::Hero => 1600,
        }
    }
}

/// Builds CDN fetch URLs for a configured Cloudinary account.
///
/// Without a cloud name the service degrades to returning source URLs
/// as-is, which keeps local development working without a CDN account.
#[derive(Debug, Clone)]
pub struct ImageService {
    cloud_name: Option<String>,
}

impl ImageService {
    #[must_use]
    pub fn new(cloud_name: Option<String>) -> Self {
        Self {
            cloud_name: cloud_name.filter(|n| !n.is_empty()),
        }
    }

    /// URL for `source` at the preset's width. Missing sources resolve to
    /// the placeholder.
    #[must_use]
    pub fn url(&self, source: Option<&str>, preset: ImagePreset) -> String {
        self.sized_url(source, preset.width())
    }

    /// URL for `source` at an explicit width.
    #[must_use]
    pub fn sized_url(&self, source: Option<&str>, width: u32) -> String {
        let Some(source) = source.filter(|s| !s.is_empty()) else {
            return PLACEHOLDER_PATH.to_string();
        };

        let Some(cloud_name) = self.cloud_name.as_deref() else {
            return source.to_string();
        };

        // Already-delivered Cloudinary URLs must not be wrapped again.
        if source.contains("res.cloudinary.com") {
            return source.to_string();
        }

        format!(
            "https://res.cloudinary.com/{cloud_name}/image/fetch/w_{width},c_limit,q_auto,f_auto/{}",
            urlencoding::encode(source)
        )
    }

    /// A `srcset` attribute value covering every preset width.
    ///
    /// Empty when no resized candidates exist: missing sources, sources
    /// already served by Cloudinary, and an unconfigured cloud name.
    #[must_use]
    pub fn srcset(&self, source: Option<&str>) -> String {
        let Some(source) = source.filter(|s| !s.is_empty()) else {
            return String::new();
        };
        if self.cloud_name.is_none() || source.contains("res.cloudinary.com") {
            return String::new();
        }

        [
            ImagePreset::Thumbnail,
            ImagePreset::Grid,
            ImagePreset::Preview,
            ImagePreset::Full,
            ImagePreset::Hero,
        ]
        .iter()
        .map(|preset| {
            format!(
                "{} {}w",
                self.sized_url(Some(source), preset.width()),
                preset.width()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ImageService {
        ImageService::new(Some("tidemark".to_string()))
    }

    #[test]
    fn test_fetch_url_includes_width_and_transforms() {
        let url = service().url(Some("https://shop.example.com/a.jpg"), ImagePreset::Grid);
        assert_eq!(
            url,
            "https://res.cloudinary.com/tidemark/image/fetch/w_400,c_limit,q_auto,f_auto/https%3A%2F%2Fshop.example.com%2Fa.jpg"
        );
    }

    #[test]
    fn test_cloudinary_urls_pass_through() {
        let already = "https://res.cloudinary.com/tidemark/image/upload/v1/a.jpg";
        assert_eq!(service().url(Some(already), ImagePreset::Hero), already);
    }

    #[test]
    fn test_missing_source_uses_placeholder() {
        assert_eq!(service().url(None, ImagePreset::Thumbnail), PLACEHOLDER_PATH);
        assert_eq!(service().url(Some(""), ImagePreset::Thumbnail), PLACEHOLDER_PATH);
    }

    #[test]
    fn test_unconfigured_service_returns_source() {
        let service = ImageService::new(None);
        let url = service.url(Some("https://shop.example.com/a.jpg"), ImagePreset::Full);
        assert_eq!(url, "https://shop.example.com/a.jpg");
    }

    #[test]
    fn test_preset_widths() {
        assert_eq!(ImagePreset::Thumbnail.width(), 100);
        assert_eq!(ImagePreset::Grid.width(), 400);
        assert_eq!(ImagePreset::Preview.width(), 800);
        assert_eq!(ImagePreset::Full.width(), 1200);
        assert_eq!(ImagePreset::Hero.width(), 1600);
    }

    #[test]
    fn test_srcset_lists_every_width() {
        let srcset = service().srcset(Some("https://shop.example.com/a.jpg"));
        for width in [100, 400, 800, 1200, 1600] {
            assert!(srcset.contains(&format!("w_{width},")), "missing {width}");
            assert!(srcset.contains(&format!(" {width}w")), "missing {width}w");
        }
    }

    #[test]
    fn test_srcset_empty_for_cloudinary_source() {
        let already = "https://res.cloudinary.com/tidemark/image/upload/v1/a.jpg";
        assert_eq!(service().srcset(Some(already)), "");
    }

    #[test]
    fn test_srcset_empty_for_missing_source() {
        assert_eq!(service().srcset(None), "");
        assert_eq!(service().srcset(Some("")), "");
    }

    #[test]
    fn test_srcset_empty_without_cloud_name() {
        let service = ImageService::new(None);
        assert_eq!(service.srcset(Some("https://shop.example.com/a.jpg")), "");
    }
}
