//! Landing-page widgets: hero slides and notices. Read-only and unauthenticated.

pub mod carousel;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::files::{deserialize_optional_file, FileLocator, StoredFile};
use crate::gateway::GatewayError;

pub use carousel::{spawn_rotation, Carousel, SlideRotation, ROTATION_PERIOD};

pub const NO_SLIDES: &str = "No slide available";
pub const NO_NOTICES: &str = "No notices available at the moment.";
pub const DEFAULT_SLIDE_IMAGE: &str = "/default-slide.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slide {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, deserialize_with = "deserialize_optional_file")]
    pub image: Option<StoredFile>,
}

impl Slide {
    pub fn image_url(&self, files: &FileLocator) -> String {
        match &self.image {
            Some(image) => files.url_for_file(image),
            None => DEFAULT_SLIDE_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notice {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
}

#[async_trait]
pub trait ContentGateway: Send + Sync {
    async fn slides(&self) -> Result<Vec<Slide>, GatewayError>;

    async fn notices(&self) -> Result<Vec<Notice>, GatewayError>;
}

/// Both widgets as loaded together for the landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingContent {
    pub slides: Vec<Slide>,
    pub notices: Vec<Notice>,
}

impl LandingContent {
    /// A widget that fails to load is logged and rendered as its empty state.
    pub async fn load<G>(gateway: &G) -> Self
    where
        G: ContentGateway + ?Sized,
    {
        let slides = gateway.slides().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to fetch hero slides");
            Vec::new()
        });
        let notices = gateway.notices().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to fetch notices");
            Vec::new()
        });
        Self { slides, notices }
    }

    /// Notice titles, or the single empty-state line.
    pub fn notice_lines(&self) -> Vec<String> {
        if self.notices.is_empty() {
            return vec![NO_NOTICES.to_string()];
        }
        self.notices.iter().map(|notice| notice.title.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    struct FlakyContent;

    #[async_trait]
    impl ContentGateway for FlakyContent {
        async fn slides(&self) -> Result<Vec<Slide>, GatewayError> {
            Err(GatewayError::Server {
                status: 502,
                message: "bad gateway".to_string(),
            })
        }

        async fn notices(&self) -> Result<Vec<Notice>, GatewayError> {
            Ok(vec![Notice {
                id: Some("n1".to_string()),
                title: "Scholarship window closes 30 June".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn failing_widget_falls_back_to_empty_state() {
        let content = LandingContent::load(&FlakyContent).await;
        assert!(content.slides.is_empty());
        assert_eq!(
            content.notice_lines(),
            vec!["Scholarship window closes 30 June".to_string()]
        );
    }

    #[test]
    fn empty_notices_render_placeholder() {
        assert_eq!(
            LandingContent::default().notice_lines(),
            vec![NO_NOTICES.to_string()]
        );
    }

    #[test]
    fn slide_without_image_uses_default_picture() {
        let files = FileLocator::new(Url::parse("http://localhost:5000").expect("url"));
        let slide: Slide = serde_json::from_value(serde_json::json!({
            "_id": "s1",
            "title": "Digital Seva",
            "subtitle": "Apply from home",
            "image": { "filename": "" }
        }))
        .expect("slide parses");
        assert_eq!(slide.image_url(&files), DEFAULT_SLIDE_IMAGE);

        let with_image = Slide {
            image: Some(StoredFile::new("hero.jpg")),
            ..slide
        };
        assert_eq!(
            with_image.image_url(&files),
            "http://localhost:5000/api/files/hero.jpg"
        );
    }
}
