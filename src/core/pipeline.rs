use std::sync::Arc;
use crate::core::{Interpreter, Scorer};
use crate::error::ScoreError;
use crate::models::{PreferenceRanks, ScoreOutcome};
use crate::services::{Ocr, OcrError, OcrMode};

/// OCR, interpretation and scoring of clothing label images
///
/// # Pipeline Stages
/// 1. Text: pre-known labels, then OCR of each image in order
/// 2. Interpretation into materials, country and label text
/// 3. Scoring against the user's preference ranks
///
/// When interpretation fails and bounding-poly retry is enabled, stages
/// 1-2 run once more with bounding-poly OCR. A second bounding-poly pass
/// over the same bytes reads the same text, so `max_attempts` only caps
/// the passes at 2 and a value of 1 turns the retry off.
pub struct ScorePipeline {
    ocr: Arc<dyn Ocr>,
    interpreter: Interpreter,
    scorer: Scorer,
    max_attempts: usize,
}

impl ScorePipeline {
    pub fn new(ocr: Arc<dyn Ocr>, interpreter: Interpreter, scorer: Scorer, max_attempts: usize) -> Self {
        Self {
            ocr,
            interpreter,
            scorer,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    async fn read_texts(
        &self,
        pre_known_labels: Option<&[String]>,
        images: &[Vec<u8>],
        mode: OcrMode,
    ) -> Result<Vec<String>, OcrError> {
        let mut texts: Vec<String> = pre_known_labels.map(<[String]>::to_vec).unwrap_or_default();

        for image in images {
            texts.push(self.ocr.image_to_text(image, mode).await?);
        }

        Ok(texts)
    }

    /// Score the garment shown by `images` and described by `pre_known_labels`
    pub async fn ocr_and_compute_images_score(
        &self,
        ranks: &PreferenceRanks,
        pre_known_labels: Option<&[String]>,
        images: &[Vec<u8>],
        retry_with_google_bounding_polys: bool,
        return_found_elements: bool,
    ) -> Result<ScoreOutcome, ScoreError> {
        let mut mode = OcrMode::Plain;
        let mut attempt = 1;

        let elements = loop {
            let texts = self.read_texts(pre_known_labels, images, mode).await?;

            match self.interpreter.interpret(&texts) {
                Ok(elements) => break elements,
                Err(err)
                    if retry_with_google_bounding_polys
                        && mode == OcrMode::Plain
                        && attempt < self.max_attempts
                        && !images.is_empty() =>
                {
                    tracing::warn!(
                        "Label interpretation failed on attempt {}/{} ({}), retrying with bounding polys",
                        attempt,
                        self.max_attempts,
                        err
                    );
                    attempt += 1;
                    mode = OcrMode::BoundingPolys;
                }
                Err(err) => return Err(err.into()),
            }
        };

        let score = self.scorer.score(&elements, ranks);
        tracing::debug!(
            "Scored label: {} materials, country {}, score {}",
            elements.materials.len(),
            elements.country,
            score
        );

        Ok(ScoreOutcome {
            score,
            elements: return_found_elements.then_some(elements),
        })
    }
}
