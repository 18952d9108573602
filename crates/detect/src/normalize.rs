use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::fetch::{FetchError, ImageFetcher};
use lens_core::SourceKind;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Fetch(#[from] FetchError),
}

/// A local image as the UI submitted it: raw bytes plus declared metadata.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Canonical encoded image. The same `data_uri` serves as preview and as the
/// classifier payload, so what the user sees is exactly what was scored.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub data_uri: String,
    pub source_kind: SourceKind,
    pub original_reference: String,
}

/// Self-describing encoding: `data:<media type>;base64,<payload>`.
pub fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Validate and encode a local file. Every violated rule is reported, not
/// just the first.
pub fn normalize_file(input: &FileInput) -> Result<NormalizedImage, NormalizeError> {
    let mut violations = Vec::new();
    if input.bytes.len() > MAX_IMAGE_BYTES {
        violations.push("Max file size is 5MB.");
    }
    if !ALLOWED_IMAGE_TYPES.contains(&input.content_type.as_str()) {
        violations.push("Only .jpg, .png, .webp, and .gif formats are supported.");
    }
    if !violations.is_empty() {
        return Err(NormalizeError::Validation(violations.join(" ")));
    }

    let data_uri = data_uri(&input.content_type, &input.bytes);
    Ok(NormalizedImage {
        original_reference: data_uri.clone(),
        source_kind: SourceKind::for_file_name(&input.name),
        data_uri,
    })
}

/// Retrieve a remote image through the fetcher collaborator and encode it.
pub async fn normalize_url(
    url: &str,
    fetcher: &dyn ImageFetcher,
) -> Result<NormalizedImage, NormalizeError> {
    let fetched = fetcher.fetch(url).await?;
    Ok(NormalizedImage {
        data_uri: data_uri(&fetched.content_type, &fetched.bytes),
        source_kind: SourceKind::Url,
        original_reference: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchedImage;
    use async_trait::async_trait;

    struct StaticFetcher {
        result: Result<FetchedImage, u16>,
    }

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedImage, FetchError> {
            match &self.result {
                Ok(image) => Ok(image.clone()),
                Err(status) => Err(FetchError::Http {
                    status: *status,
                    message: "upstream error".to_string(),
                }),
            }
        }
    }

    fn jpeg(name: &str, len: usize) -> FileInput {
        FileInput {
            name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn encodes_accepted_file_as_data_uri() {
        let input = FileInput {
            name: "holiday.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };

        let normalized = normalize_file(&input).expect("normalize");

        assert_eq!(normalized.data_uri, "data:image/png;base64,AQID");
        assert_eq!(normalized.source_kind, SourceKind::Upload);
        assert_eq!(normalized.original_reference, normalized.data_uri);
    }

    #[test]
    fn oversized_file_fails_with_size_violation() {
        let input = jpeg("big.jpg", 6 * 1024 * 1024);

        let err = normalize_file(&input).expect_err("must fail");

        match err {
            NormalizeError::Validation(message) => {
                assert!(message.contains("Max file size is 5MB."));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn every_violation_is_listed() {
        let input = FileInput {
            name: "clip.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            bytes: vec![0u8; 6 * 1024 * 1024],
        };

        let err = normalize_file(&input).expect_err("must fail");

        match err {
            NormalizeError::Validation(message) => {
                assert!(message.contains("Max file size is 5MB."));
                assert!(message.contains("formats are supported"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn file_at_limit_is_accepted() {
        let input = jpeg("exact.jpg", MAX_IMAGE_BYTES);
        assert!(normalize_file(&input).is_ok());
    }

    #[test]
    fn camera_named_file_carries_camera_provenance() {
        let normalized = normalize_file(&jpeg("camera_image.jpg", 10)).expect("normalize");
        assert_eq!(normalized.source_kind, SourceKind::Camera);
    }

    #[tokio::test]
    async fn url_input_keeps_the_original_url_as_reference() {
        let fetcher = StaticFetcher {
            result: Ok(FetchedImage {
                bytes: vec![9, 9],
                content_type: "image/webp".to_string(),
            }),
        };

        let normalized = normalize_url("https://example.com/a.webp", &fetcher)
            .await
            .expect("normalize");

        assert_eq!(normalized.original_reference, "https://example.com/a.webp");
        assert_eq!(normalized.source_kind, SourceKind::Url);
        assert!(normalized.data_uri.starts_with("data:image/webp;base64,"));
    }

    #[tokio::test]
    async fn fetch_failure_propagates_status_and_message() {
        let fetcher = StaticFetcher { result: Err(404) };

        let err = normalize_url("https://example.com/gone.png", &fetcher)
            .await
            .expect_err("must fail");

        assert!(err.to_string().contains("404"));
    }
}
