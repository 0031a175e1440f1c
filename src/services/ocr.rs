use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the OCR backend
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("OCR API returned error: {0}")]
    ApiError(String),

    #[error("Invalid OCR response: {0}")]
    InvalidResponse(String),
}

/// How text is read back from an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrMode {
    /// Text as laid out by the OCR engine
    Plain,
    /// Text rebuilt line by line from word bounding polygons
    BoundingPolys,
}

/// Text recognition engine
#[async_trait]
pub trait Ocr: Send + Sync {
    async fn image_to_text(&self, image: &[u8], mode: OcrMode) -> Result<String, OcrError>;
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    full_text_annotation: Option<FullTextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntityAnnotation {
    #[serde(default)]
    pub description: String,
    pub bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

// Vision omits zero coordinates
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Google Cloud Vision text detection client
pub struct GoogleVisionOcr {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl GoogleVisionOcr {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, OcrError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    fn annotate_url(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}?key={}", self.endpoint, urlencoding::encode(key)),
            None => self.endpoint.clone(),
        }
    }
}

#[async_trait]
impl Ocr for GoogleVisionOcr {
    async fn image_to_text(&self, image: &[u8], mode: OcrMode) -> Result<String, OcrError> {
        let payload = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }],
            }]
        });

        tracing::debug!("Sending {} byte image to OCR ({:?})", image.len(), mode);

        let response = self
            .client
            .post(self.annotate_url())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("OCR request failed: {} - {}", status, body);
            return Err(OcrError::ApiError(format!("status {}", status)));
        }

        let annotated: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

        let Some(result) = annotated.responses.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(error) = result.error {
            return Err(OcrError::ApiError(error.message));
        }

        let text = match mode {
            OcrMode::Plain => result
                .full_text_annotation
                .map(|annotation| annotation.text)
                .or_else(|| result.text_annotations.first().map(|a| a.description.clone()))
                .unwrap_or_default(),
            // The first annotation is the whole text block, the rest are words
            OcrMode::BoundingPolys => lines_from_bounding_polys(result.text_annotations.get(1..).unwrap_or(&[])),
        };

        Ok(text)
    }
}

struct PlacedWord<'a> {
    text: &'a str,
    left: f64,
    center_y: f64,
    half_height: f64,
}

/// Rebuild reading order from word annotations.
///
/// Words are grouped into a line while their vertical centre stays within
/// half a word height of the line's first word, then ordered left to right.
pub(crate) fn lines_from_bounding_polys(words: &[EntityAnnotation]) -> String {
    let mut placed: Vec<PlacedWord> = words
        .iter()
        .filter_map(|word| {
            let vertices = &word.bounding_poly.as_ref()?.vertices;
            if vertices.is_empty() {
                return None;
            }
            let min_y = vertices.iter().map(|v| v.y).fold(f64::INFINITY, f64::min);
            let max_y = vertices.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);
            let left = vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min);
            Some(PlacedWord {
                text: word.description.as_str(),
                left,
                center_y: (min_y + max_y) / 2.0,
                half_height: ((max_y - min_y) / 2.0).max(1.0),
            })
        })
        .collect();

    placed.sort_by(|a, b| a.center_y.total_cmp(&b.center_y));

    let mut lines: Vec<Vec<PlacedWord>> = Vec::new();
    for word in placed {
        let same_line = lines
            .last()
            .is_some_and(|line| (word.center_y - line[0].center_y).abs() <= line[0].half_height);

        match lines.last_mut() {
            Some(line) if same_line => line.push(word),
            _ => lines.push(vec![word]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.left.total_cmp(&b.left));
            line.iter().map(|w| w.text).collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: f64, y: f64) -> EntityAnnotation {
        EntityAnnotation {
            description: text.to_string(),
            bounding_poly: Some(BoundingPoly {
                vertices: vec![
                    Vertex { x, y },
                    Vertex { x: x + 20.0, y },
                    Vertex { x: x + 20.0, y: y + 10.0 },
                    Vertex { x, y: y + 10.0 },
                ],
            }),
        }
    }

    #[test]
    fn test_bounding_polys_rebuild_lines() {
        let words = vec![
            word("cotton", 40.0, 1.0),
            word("in", 30.0, 30.0),
            word("100%", 0.0, 0.0),
            word("made", 0.0, 31.0),
            word("portugal", 60.0, 29.0),
        ];

        let text = lines_from_bounding_polys(&words);
        assert_eq!(text, "100% cotton\nmade in portugal");
    }

    #[test]
    fn test_words_without_polygons_are_skipped() {
        let words = vec![
            EntityAnnotation {
                description: "ghost".to_string(),
                bounding_poly: None,
            },
            word("wool", 0.0, 0.0),
        ];

        assert_eq!(lines_from_bounding_polys(&words), "wool");
    }

    #[test]
    fn test_annotate_url_carries_api_key() {
        let ocr = GoogleVisionOcr::new(
            "https://vision.test/v1/images:annotate".to_string(),
            Some("k&y".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(ocr.annotate_url(), "https://vision.test/v1/images:annotate?key=k%26y");
    }

    #[tokio::test]
    async fn test_plain_mode_reads_full_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/images:annotate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"responses":[{"textAnnotations":[{"description":"100% cotton"}],"fullTextAnnotation":{"text":"100% cotton\nmade in peru"}}]}"#)
            .create_async()
            .await;

        let ocr = GoogleVisionOcr::new(
            format!("{}/v1/images:annotate", server.url()),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let text = ocr.image_to_text(b"png", OcrMode::Plain).await.unwrap();
        assert_eq!(text, "100% cotton\nmade in peru");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/annotate")
            .with_status(200)
            .with_body(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#)
            .create_async()
            .await;

        let ocr = GoogleVisionOcr::new(format!("{}/annotate", server.url()), None, Duration::from_secs(5)).unwrap();

        let err = ocr.image_to_text(b"junk", OcrMode::Plain).await.unwrap_err();
        assert!(matches!(err, OcrError::ApiError(message) if message == "Bad image data."));
    }
}
