//! Recognition, extraction and escalation orchestration.
//!
//! A [`Pipeline`] owns an [`OcrEngine`] and a [`VocabConfig`]. [`Pipeline::run`]
//! recognizes the full image once, extracts candidates with both the table
//! extractor and the line parser, and then decides from a coverage estimate
//! whether to spend more recognition calls (sparse-layout retry, two bands,
//! three bands). Results only ever grow during escalation.
//!
//! Recognition calls are issued one at a time. Cancellation is checked before
//! every call after the first one.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vocabscan::{Pipeline, VocabConfig};
//! use vocabscan::ocr::TesseractCliEngine;
//!
//! # async fn example() -> vocabscan::Result<()> {
//! let config = VocabConfig::default();
//! let engine = Arc::new(TesseractCliEngine::new(&config.ocr));
//! let pipeline = Pipeline::new(engine, config)
//!     .with_progress(|label, progress| eprintln!("{:>3.0}% {}", progress * 100.0, label));
//!
//! let image = std::fs::read("page.jpg")?;
//! let result = pipeline.run(&image).await?;
//! for item in &result.items {
//!     println!("{}", item);
//! }
//! # Ok(())
//! # }
//! ```

pub mod coverage;
pub mod escalation;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::config::{Band, VocabConfig};
use crate::extract::{LineParse, VocabMerger, extract_table, parse_lines};
use crate::language::{LanguagePair, PairRules};
use crate::ocr::{OcrEngine, PsmMode, Recognition, RecognitionRequest, crop_band, language_fallback_chain};
use crate::types::{CoverageEstimate, Diagnostics, ExtractorPath, PipelineResult, VocabCandidate, VocabEntry};
use crate::{Result, VocabError};

pub use coverage::{EscalationReason, estimate_expected_count, escalation_reason, quality_flags};
pub use escalation::{EscalationController, EscalationState};

/// Receives `(status label, progress in [0, 1])`. Advisory only.
pub type ProgressCallback = Arc<dyn Fn(&str, f64) + Send + Sync>;

pub const LABEL_LOADING: &str = "loading OCR engine";
pub const LABEL_RECOGNIZING: &str = "recognizing";
pub const LABEL_POST_PROCESSING: &str = "post-processing";
pub const LABEL_MATCHING: &str = "matching terms";
pub const LABEL_PSM_RETRY: &str = "retrying sparse layout";
pub const LABEL_SPLIT2: &str = "reinforcing (2 bands)";
pub const LABEL_SPLIT3: &str = "reinforcing (3 bands)";
pub const LABEL_DONE: &str = "done";
pub const LABEL_FAILED: &str = "recognition failed";

const NOTE_TABLE_ACCEPTED: &str = "table accepted";
const NOTE_NO_SPLIT: &str = "no split";
const NOTE_SHORT_LIST: &str = "short list";
const NOTE_PSM_ACCEPTED: &str = "psm retry accepted";
const NOTE_SINGLE_PASS: &str = "single pass";

/// Caller-owned cancellation signal, checked between recognition calls.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Candidates produced from one recognition.
struct PassOutput {
    table: Vec<VocabCandidate>,
    lines: LineParse,
    expected: usize,
}

fn extract_pass(recognition: &Recognition, rules: &PairRules, config: &VocabConfig) -> PassOutput {
    PassOutput {
        table: extract_table(&recognition.tokens, rules, &config.layout),
        lines: parse_lines(&recognition.text, rules, &config.parser),
        expected: estimate_expected_count(&recognition.text),
    }
}

/// The table result stands alone when it is large enough and the line parser
/// would not add meaningfully to it.
fn table_suffices(pass: &PassOutput, merger: &VocabMerger, config: &VocabConfig) -> bool {
    let escalation = &config.escalation;
    if pass.table.len() < escalation.min_table_yield {
        return false;
    }
    let mut combined = merger.clone();
    combined.extend(&pass.lines.candidates);
    combined.len() < merger.len() + escalation.min_text_gain
}

fn text_path(table: &[VocabCandidate]) -> ExtractorPath {
    if table.is_empty() {
        ExtractorPath::Text
    } else {
        ExtractorPath::TableText
    }
}

/// Extract from an existing recognition without calling any engine.
///
/// Runs the first-pass logic of [`Pipeline::run`] (table extractor, line parser,
/// merge) and stops; there is no escalation.
pub fn extract_from_recognition(
    recognition: &Recognition,
    config: &VocabConfig,
) -> Result<(Vec<VocabEntry>, Diagnostics)> {
    config.validate()?;
    let rules = PairRules::resolve(&config.languages)?;
    let pass = extract_pass(recognition, &rules, config);

    let mut merger = VocabMerger::new(rules);
    merger.extend(&pass.table);
    let extractor = if table_suffices(&pass, &merger, config) {
        ExtractorPath::Table
    } else {
        merger.extend(&pass.lines.candidates);
        text_path(&pass.table)
    };

    let items = merger.into_entries();
    let diagnostics = Diagnostics {
        extractor,
        token_count: recognition.tokens.len(),
        text_len: recognition.text.chars().count(),
        item_count: items.len(),
        expected_hint: pass.expected,
        recognition_passes: 1,
        languages: None,
        note: Some(NOTE_SINGLE_PASS.to_string()),
        ocr_failed: false,
        cancelled: false,
        quality: quality_flags(
            &config.languages,
            &recognition.text,
            pass.lines.cleaned_lines.len(),
            items.len(),
        ),
    };
    Ok((items, diagnostics))
}

/// Mutable state of one [`Pipeline::run`] invocation.
struct RunState {
    merger: VocabMerger,
    raw_texts: Vec<String>,
    token_count: usize,
    passes: usize,
    cleaned_line_count: usize,
    expected: usize,
    extractor: ExtractorPath,
    note: Option<String>,
    ocr_failed: bool,
    cancelled: bool,
    controller: EscalationController,
}

impl RunState {
    fn new(rules: PairRules) -> Self {
        Self {
            merger: VocabMerger::new(rules),
            raw_texts: Vec::new(),
            token_count: 0,
            passes: 0,
            cleaned_line_count: 0,
            expected: 0,
            extractor: ExtractorPath::None,
            note: None,
            ocr_failed: false,
            cancelled: false,
            controller: EscalationController::new(),
        }
    }

    fn record(&mut self, recognition: Recognition) {
        self.token_count += recognition.tokens.len();
        self.passes += 1;
        self.raw_texts.push(recognition.text);
    }

    /// Merge both extractors' output of an escalation pass; returns the pass's expected count.
    fn absorb(&mut self, recognition: Recognition, rules: &PairRules, config: &VocabConfig) -> usize {
        let pass = extract_pass(&recognition, rules, config);
        self.merger.extend(&pass.table);
        self.merger.extend(&pass.lines.candidates);
        self.record(recognition);
        pass.expected
    }

    fn estimate(&self) -> CoverageEstimate {
        CoverageEstimate {
            expected_count: self.expected,
            extracted_count: self.merger.len(),
        }
    }

    fn fail(&mut self, stage: &str, error: &VocabError) {
        tracing::warn!(stage, error = %error, "Recognition failed, returning accumulated result");
        self.ocr_failed = true;
        self.note = Some(format!("recognition failed during {}: {}", stage, error));
    }

    fn cancel(&mut self) {
        tracing::debug!(state = %self.controller.state(), "Pipeline cancelled");
        self.cancelled = true;
        self.note = Some("cancelled".to_string());
    }

    fn into_result(mut self, pair: &LanguagePair, languages: &[String]) -> PipelineResult {
        self.controller.finish();
        let raw_text = self.raw_texts.join("\n");
        let items = self.merger.into_entries();
        let quality = quality_flags(pair, &raw_text, self.cleaned_line_count, items.len());

        let diagnostics = Diagnostics {
            extractor: self.extractor,
            token_count: self.token_count,
            text_len: raw_text.chars().count(),
            item_count: items.len(),
            expected_hint: self.expected,
            recognition_passes: self.passes,
            languages: Some(languages.join("+")),
            note: self.note,
            ocr_failed: self.ocr_failed,
            cancelled: self.cancelled,
            quality,
        };

        PipelineResult {
            items,
            diagnostics,
            raw_text,
        }
    }
}

/// Progress range covered by one stage of the run.
#[derive(Debug, Clone, Copy)]
struct Stage {
    label: &'static str,
    start: f64,
    span: f64,
}

const FIRST_PASS: Stage = Stage {
    label: LABEL_RECOGNIZING,
    start: 0.06,
    span: 0.70,
};
const PSM_RETRY: Stage = Stage {
    label: LABEL_PSM_RETRY,
    start: 0.85,
    span: 0.01,
};
const SPLIT2: Stage = Stage {
    label: LABEL_SPLIT2,
    start: 0.86,
    span: 0.08,
};
const SPLIT3: Stage = Stage {
    label: LABEL_SPLIT3,
    start: 0.94,
    span: 0.06,
};

/// How a multi-band pass ended.
enum BandOutcome {
    /// Every band was recognized; carries the sum of their expected counts.
    Completed(usize),
    Stopped,
}

/// OCR-to-vocabulary pipeline bound to one engine.
pub struct Pipeline {
    engine: Arc<dyn OcrEngine>,
    config: VocabConfig,
    progress: Option<ProgressCallback>,
    cancellation: CancellationFlag,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("engine", &self.engine.name())
            .field("config", &self.config)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl Pipeline {
    pub fn new(engine: Arc<dyn OcrEngine>, config: VocabConfig) -> Self {
        Self {
            engine,
            config,
            progress: None,
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_progress(mut self, callback: impl Fn(&str, f64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    pub fn config(&self) -> &VocabConfig {
        &self.config
    }

    fn report(&self, label: &str, progress: f64) {
        if let Some(callback) = &self.progress {
            callback(label, progress.clamp(0.0, 1.0));
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Model sets to try for the first recognition, skipping sets the engine
    /// reports as unsupported (unless that would leave none).
    fn language_sets(&self) -> Vec<Vec<String>> {
        let chain = language_fallback_chain(&self.config.languages);
        let supported: Vec<Vec<String>> = chain
            .iter()
            .filter(|set| set.iter().all(|model| self.engine.supports_language(model)))
            .cloned()
            .collect();
        if supported.is_empty() { chain } else { supported }
    }

    async fn recognize(
        &self,
        image: &[u8],
        languages: &[String],
        psm: PsmMode,
        stage: Stage,
    ) -> Result<Recognition> {
        let request = RecognitionRequest::new(languages.to_vec(), psm);
        let progress = |p: f64| self.report(stage.label, stage.start + stage.span * p.clamp(0.0, 1.0));
        self.engine.recognize(image, &request, &progress).await
    }

    /// First recognition with language fallback. `None` when every set failed.
    async fn recognize_first(&self, image: &[u8]) -> Option<(Recognition, Vec<String>)> {
        for (attempt, languages) in self.language_sets().into_iter().enumerate() {
            match self
                .recognize(image, &languages, self.config.ocr.default_psm, FIRST_PASS)
                .await
            {
                Ok(recognition) => return Some((recognition, languages)),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        languages = %languages.join("+"),
                        error = %e,
                        "Recognition failed for language set"
                    );
                }
            }
        }
        None
    }

    async fn run_bands(
        &self,
        image: &[u8],
        bands: &[Band],
        languages: &[String],
        rules: &PairRules,
        state: &mut RunState,
        stage: Stage,
    ) -> BandOutcome {
        let mut expected_sum = 0;
        let count = bands.len().max(1) as f64;

        for (i, band) in bands.iter().enumerate() {
            if self.is_cancelled() {
                state.cancel();
                return BandOutcome::Stopped;
            }

            let band_stage = Stage {
                start: stage.start + stage.span * i as f64 / count,
                span: stage.span / count,
                ..stage
            };
            self.report(stage.label, band_stage.start);

            let crop = match crop_band(image, *band) {
                Ok(crop) => crop,
                Err(e) => {
                    state.fail(stage.label, &e);
                    return BandOutcome::Stopped;
                }
            };

            match self
                .recognize(&crop, languages, self.config.ocr.default_psm, band_stage)
                .await
            {
                Ok(recognition) => expected_sum += state.absorb(recognition, rules, &self.config),
                Err(e) => {
                    state.fail(stage.label, &e);
                    return BandOutcome::Stopped;
                }
            }
        }

        BandOutcome::Completed(expected_sum)
    }

    /// Run the full pipeline on one encoded image.
    ///
    /// Only configuration errors and an engine that cannot be initialized are
    /// returned as errors. Recognition failures degrade to a partial (or empty)
    /// result with diagnostics.
    pub async fn run(&self, image: &[u8]) -> Result<PipelineResult> {
        self.config.validate()?;
        let pair = self.config.languages;
        let rules = PairRules::resolve(&pair)?;

        self.report(LABEL_LOADING, 0.03);
        match self.engine.initialize().await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                return Err(VocabError::engine_unavailable_with_source(
                    format!("{} failed to initialize", self.engine.name()),
                    e,
                ));
            }
        }

        self.report(LABEL_RECOGNIZING, 0.06);
        let Some((first, languages)) = self.recognize_first(image).await else {
            self.report(LABEL_FAILED, 1.0);
            return Ok(PipelineResult::empty_failure("all language sets failed"));
        };
        tracing::debug!(
            engine = self.engine.name(),
            languages = %languages.join("+"),
            tokens = first.tokens.len(),
            text_len = first.text.chars().count(),
            "First recognition finished"
        );

        let mut state = RunState::new(rules.clone());
        let escalation = &self.config.escalation;

        self.report(LABEL_POST_PROCESSING, 0.82);
        let pass = extract_pass(&first, &rules, &self.config);
        state.cleaned_line_count = pass.lines.cleaned_lines.len();
        state.expected = pass.expected;
        let first_text = first.text.clone();
        state.record(first);

        state.merger.extend(&pass.table);
        state.controller.advance(EscalationState::TableTried);

        self.report(LABEL_MATCHING, 0.84);
        if table_suffices(&pass, &state.merger, &self.config) {
            state.extractor = ExtractorPath::Table;
            state.note = Some(NOTE_TABLE_ACCEPTED.to_string());
            return Ok(self.finish(state, &pair, &languages));
        }

        state.merger.extend(&pass.lines.candidates);
        state.extractor = text_path(&pass.table);
        state.controller.advance(EscalationState::TextTried);

        let Some(reason) = escalation_reason(&first_text, state.estimate(), escalation) else {
            let short = coverage::is_short_list(state.estimate(), escalation);
            state.note = Some(if short { NOTE_SHORT_LIST } else { NOTE_NO_SPLIT }.to_string());
            return Ok(self.finish(state, &pair, &languages));
        };
        tracing::debug!(
            reason = %reason,
            expected = state.expected,
            extracted = state.merger.len(),
            "Escalating recognition"
        );

        if coverage::wants_psm_retry(&first_text, state.merger.len(), escalation) {
            if self.is_cancelled() {
                state.cancel();
                return Ok(self.finish(state, &pair, &languages));
            }
            state.controller.advance(EscalationState::PsmRetry);
            self.report(PSM_RETRY.label, PSM_RETRY.start);

            let before = state.merger.len();
            match self
                .recognize(image, &languages, self.config.ocr.retry_psm, PSM_RETRY)
                .await
            {
                Ok(recognition) => {
                    state.absorb(recognition, &rules, &self.config);
                    state.extractor = ExtractorPath::TextPsmRetry;
                }
                Err(e) => {
                    state.fail(LABEL_PSM_RETRY, &e);
                    return Ok(self.finish(state, &pair, &languages));
                }
            }

            if state.merger.len() >= before + escalation.psm_retry_min_gain {
                state.note = Some(NOTE_PSM_ACCEPTED.to_string());
                return Ok(self.finish(state, &pair, &languages));
            }
        }

        state.controller.advance(EscalationState::Split2);
        let split2 = self
            .run_bands(
                image,
                &escalation.split2_bands,
                &languages,
                &rules,
                &mut state,
                SPLIT2,
            )
            .await;
        let BandOutcome::Completed(band_expected) = split2 else {
            return Ok(self.finish(state, &pair, &languages));
        };
        state.extractor = ExtractorPath::TextSplit2;
        state.expected = state.expected.max(band_expected);
        state.note = Some(format!("split2 ({})", reason));

        if !coverage::wants_split3(state.estimate(), escalation) {
            return Ok(self.finish(state, &pair, &languages));
        }

        state.controller.advance(EscalationState::Split3);
        let split3 = self
            .run_bands(
                image,
                &escalation.split3_bands,
                &languages,
                &rules,
                &mut state,
                SPLIT3,
            )
            .await;
        if let BandOutcome::Completed(band_expected) = split3 {
            state.extractor = ExtractorPath::TextSplit3;
            state.expected = state.expected.max(band_expected);
            state.note = Some(format!("split3 ({})", reason));
        }

        Ok(self.finish(state, &pair, &languages))
    }

    fn finish(&self, state: RunState, pair: &LanguagePair, languages: &[String]) -> PipelineResult {
        let visited = state.controller.visited().len();
        let result = state.into_result(pair, languages);
        tracing::debug!(
            extractor = %result.diagnostics.extractor,
            items = result.items.len(),
            passes = result.diagnostics.recognition_passes,
            states = visited,
            "Pipeline finished"
        );
        self.report(LABEL_DONE, 1.0);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, RecognizedToken};

    fn token(text: &str, x0: f64, x1: f64, y: f64) -> RecognizedToken {
        RecognizedToken::new(text, BoundingBox::new(x0, y, x1, y + 20.0))
    }

    fn table_recognition(rows: &[(&str, &str)]) -> Recognition {
        let mut tokens = Vec::new();
        let mut lines = Vec::new();
        for (i, (term, meaning)) in rows.iter().enumerate() {
            let y = i as f64 * 40.0;
            tokens.push(token(term, 20.0, 100.0, y));
            tokens.push(token(meaning, 300.0, 380.0, y));
            lines.push(format!("{} {}", term, meaning));
        }
        Recognition::new(lines.join("\n"), tokens)
    }

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_extract_from_recognition_accepts_table() {
        let recognition = table_recognition(&[
            ("apple", "사과"),
            ("brave", "용감한"),
            ("calm", "침착한"),
            ("dance", "춤추다"),
            ("eager", "열망하는"),
        ]);
        let (items, diagnostics) = extract_from_recognition(&recognition, &VocabConfig::default()).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(diagnostics.extractor, ExtractorPath::Table);
        assert_eq!(diagnostics.token_count, 10);
        assert_eq!(diagnostics.recognition_passes, 1);
    }

    #[test]
    fn test_extract_from_text_only_recognition() {
        let recognition = Recognition::text_only("apple - 사과\nbrave : 용감한");
        let (items, diagnostics) = extract_from_recognition(&recognition, &VocabConfig::default()).unwrap();
        assert_eq!(diagnostics.extractor, ExtractorPath::Text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].term, "apple");
        assert_eq!(items[1].meaning, "용감한");
    }

    #[test]
    fn test_extract_from_empty_recognition() {
        let (items, diagnostics) =
            extract_from_recognition(&Recognition::default(), &VocabConfig::default()).unwrap();
        assert!(items.is_empty());
        assert_eq!(diagnostics.extractor, ExtractorPath::Text);
        assert!(diagnostics.quality.suspect_low_count);
    }
}
