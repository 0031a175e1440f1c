use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::Preference;

/// Request to score one or more clothing labels
///
/// Inline `images` travel as base64 strings and are decoded on
/// deserialization. URL images are fetched by the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_image_sources"))]
pub struct LabelMessage {
    #[serde(default, with = "base64_images", skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Vec<u8>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_labels: Option<Vec<String>>,
    pub preferences: Vec<Preference>,
    pub user_id: String,
}

fn has_any<T>(list: &Option<Vec<T>>) -> bool {
    list.as_ref().is_some_and(|l| !l.is_empty())
}

fn validate_image_sources(message: &LabelMessage) -> Result<(), ValidationError> {
    if has_any(&message.images) || has_any(&message.images_urls) || has_any(&message.images_labels) {
        Ok(())
    } else {
        let mut error = ValidationError::new("no_image_source");
        error.message = Some("one of images, images_urls or images_labels is required".into());
        Err(error)
    }
}

mod base64_images {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        images: &Option<Vec<Vec<u8>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match images {
            Some(images) => serializer.collect_seq(images.iter().map(|image| STANDARD.encode(image))),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Vec<u8>>>, D::Error> {
        let encoded: Option<Vec<String>> = Option::deserialize(deserializer)?;
        encoded
            .map(|images| {
                images
                    .iter()
                    .map(|image| STANDARD.decode(image.trim()).map_err(D::Error::custom))
                    .collect()
            })
            .transpose()
    }
}

/// Image handed to the client, either already encoded or raw bytes
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    Encoded(String),
    Raw(Vec<u8>),
}

impl From<Vec<u8>> for ImageInput {
    fn from(bytes: Vec<u8>) -> Self {
        ImageInput::Raw(bytes)
    }
}

impl From<String> for ImageInput {
    fn from(encoded: String) -> Self {
        ImageInput::Encoded(encoded)
    }
}

/// Normalize client images to base64 strings
///
/// Strings pass through unchanged, raw bytes are encoded. An absent or
/// empty list yields `None` so the field is left out of the payload.
pub fn images_to_base64(images: Option<Vec<ImageInput>>) -> Option<Vec<String>> {
    let images = images.filter(|images| !images.is_empty())?;

    Some(
        images
            .into_iter()
            .map(|image| match image {
                ImageInput::Encoded(encoded) => encoded,
                ImageInput::Raw(bytes) => STANDARD.encode(bytes),
            })
            .collect(),
    )
}

/// Client-side form of [`LabelMessage`] with images already encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_labels: Option<Vec<String>>,
    pub preferences: Vec<Preference>,
    pub user_id: String,
}

impl SentMessage {
    pub fn new(
        images: Option<Vec<ImageInput>>,
        images_urls: Option<Vec<String>>,
        images_labels: Option<Vec<String>>,
        user_id: impl Into<String>,
        preferences: Vec<Preference>,
    ) -> Self {
        Self {
            images: images_to_base64(images),
            images_urls,
            images_labels,
            preferences,
            user_id: user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_json(extra: &str) -> String {
        format!(
            r#"{{{}"preferences":["environment","societal","animal","health"],"user_id":"u1"}}"#,
            extra
        )
    }

    #[test]
    fn test_images_to_base64_passes_strings_through() {
        let encoded = images_to_base64(Some(vec![
            ImageInput::Encoded("aGVsbG8=".to_string()),
            ImageInput::Raw(b"hello".to_vec()),
        ]))
        .unwrap();

        assert_eq!(encoded, vec!["aGVsbG8=", "aGVsbG8="]);
    }

    #[test]
    fn test_images_to_base64_empty_is_none() {
        assert_eq!(images_to_base64(None), None);
        assert_eq!(images_to_base64(Some(vec![])), None);
    }

    #[test]
    fn test_sent_message_decodes_to_original_bytes() {
        let raw = vec![0u8, 159, 146, 150, 255, 10];
        let sent = SentMessage::new(
            Some(vec![ImageInput::Raw(raw.clone())]),
            None,
            None,
            "u1",
            Preference::ALL.to_vec(),
        );

        let json = serde_json::to_string(&sent).unwrap();
        let received: LabelMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(received.images, Some(vec![raw]));
    }

    #[test]
    fn test_absent_images_field_is_omitted() {
        let sent = SentMessage::new(None, Some(vec!["http://x/a.png".into()]), None, "u1", vec![]);
        let json = serde_json::to_value(&sent).unwrap();

        assert!(json.get("images").is_none());
        assert!(json.get("images_labels").is_none());
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let json = message_json(r#""images":["not base64!!"],"#);
        assert!(serde_json::from_str::<LabelMessage>(&json).is_err());
    }

    #[test]
    fn test_validation_requires_an_image_source() {
        let message: LabelMessage = serde_json::from_str(&message_json("")).unwrap();
        assert!(message.validate().is_err());

        let message: LabelMessage =
            serde_json::from_str(&message_json(r#""images_urls":["http://x/a.png"],"#)).unwrap();
        assert!(message.validate().is_ok());
    }
}
