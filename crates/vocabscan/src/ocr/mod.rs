//! OCR engine boundary.
//!
//! The pipeline never talks to a recognizer directly. It goes through the
//! [`OcrEngine`] trait, which takes encoded image bytes and returns plain text
//! plus positioned word tokens. [`TesseractCliEngine`] drives the `tesseract`
//! binary; tests plug in canned engines.

pub mod crop;
pub mod tesseract_cli;
pub mod tsv;
pub mod types;

use async_trait::async_trait;

use crate::Result;
use crate::language::LanguagePair;

pub use crop::{band_rows, crop_band, image_dimensions};
pub use tesseract_cli::TesseractCliEngine;
pub use tsv::parse_tsv;
pub use types::{PsmMode, Recognition, RecognitionRequest};

/// Progress callback receiving a fraction in `[0, 1]` for the current recognition call.
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// A text recognizer.
///
/// Implementations must be `Send + Sync`; a single engine is shared by all
/// passes of a pipeline run.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name, used in logs.
    fn name(&self) -> &str;

    /// Prepare the engine. Failing here is fatal for the whole invocation.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Whether the engine has a model for `code` (e.g. `"kor"`).
    fn supports_language(&self, _code: &str) -> bool {
        true
    }

    /// Recognize one image.
    async fn recognize(
        &self,
        image: &[u8],
        request: &RecognitionRequest,
        progress: ProgressFn<'_>,
    ) -> Result<Recognition>;
}

fn push_unique(set: &mut Vec<String>, model: &str) {
    if !set.iter().any(|m| m == model) {
        set.push(model.to_string());
    }
}

/// Model sets to try, in order, when a recognition call fails.
///
/// 1. Both languages' models, plus `eng` whenever either side is Latin-script.
/// 2. The same with every Latin language collapsed to `eng` (skipped when identical).
/// 3. `eng` alone.
pub fn language_fallback_chain(pair: &LanguagePair) -> Vec<Vec<String>> {
    let sides = [pair.from, pair.to];

    let mut full = Vec::new();
    for language in sides {
        push_unique(&mut full, language.tesseract_model());
    }
    if sides.iter().any(|l| l.is_latin()) {
        push_unique(&mut full, "eng");
    }

    let mut reduced = Vec::new();
    for language in sides {
        let model = if language.is_latin() {
            "eng"
        } else {
            language.tesseract_model()
        };
        push_unique(&mut reduced, model);
    }

    let mut chain = vec![full];
    if !chain.contains(&reduced) {
        chain.push(reduced);
    }
    let english = vec!["eng".to_string()];
    if !chain.contains(&english) {
        chain.push(english);
    }
    chain
}
