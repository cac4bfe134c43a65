//! Shared fixtures: a synthetic page image and a scripted OCR engine.
//!
//! The page is `PAGE_WIDTH x PAGE_HEIGHT` with a vertical gradient (red = y / 4),
//! so every crop decodes to a distinct `(height, first-row red)` pair that the
//! scripted engine uses to pick its canned answer.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use vocabscan::ocr::{OcrEngine, ProgressFn, PsmMode, Recognition, RecognitionRequest};
use vocabscan::pipeline::CancellationFlag;
use vocabscan::types::{BoundingBox, RecognizedToken};
use vocabscan::{Result, VocabError};

pub const PAGE_WIDTH: u32 = 40;
pub const PAGE_HEIGHT: u32 = 1000;

pub type CropKey = (u32, u8);

pub const FULL: CropKey = (1000, 0);
pub const SPLIT2_TOP: CropKey = (520, 0);
pub const SPLIT2_BOTTOM: CropKey = (520, 120);
pub const SPLIT3_TOP: CropKey = (360, 0);
pub const SPLIT3_MIDDLE: CropKey = (360, 80);
pub const SPLIT3_BOTTOM: CropKey = (360, 160);

pub const WORDS: [(&str, &str); 20] = [
    ("apple", "사과"),
    ("brave", "용감한"),
    ("calm", "침착한"),
    ("dance", "춤추다"),
    ("eager", "열망하는"),
    ("famous", "유명한"),
    ("gentle", "온화한"),
    ("honest", "정직한"),
    ("island", "섬"),
    ("jungle", "정글"),
    ("kitchen", "부엌"),
    ("lemon", "레몬"),
    ("market", "시장"),
    ("narrow", "좁은"),
    ("ocean", "바다"),
    ("pencil", "연필"),
    ("quiet", "조용한"),
    ("river", "강"),
    ("silver", "은"),
    ("travel", "여행하다"),
];

pub fn page_image() -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_fn(PAGE_WIDTH, PAGE_HEIGHT, |_x, y| Rgb([(y / 4) as u8, 0, 0]));
    let mut bytes: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test page");
    bytes
}

fn crop_key(image: &[u8]) -> CropKey {
    let decoded = image::load_from_memory(image)
        .expect("Scripted engine received an undecodable image")
        .to_rgb8();
    (decoded.height(), decoded.get_pixel(0, 0)[0])
}

/// Numbered page text for entries `first..=last` (1-based). Entries listed in
/// `readable` come out as `N. term meaning`, the others as unreadable smudges.
pub fn numbered_text(first: usize, last: usize, readable: impl Fn(usize) -> bool) -> String {
    (first..=last)
        .map(|n| {
            let (term, meaning) = WORDS[n - 1];
            if readable(n) {
                format!("{}. {} {}", n, term, meaning)
            } else {
                format!("{}. smudged text", n)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Token-level two-column table: terms at x 20..100, meanings at x 300..380.
pub fn table_recognition(rows: &[(&str, &str)]) -> Recognition {
    let mut tokens = Vec::new();
    let mut lines = Vec::new();
    for (i, (term, meaning)) in rows.iter().enumerate() {
        let y = 40.0 + i as f64 * 40.0;
        tokens.push(RecognizedToken::new(*term, BoundingBox::new(20.0, y, 100.0, y + 20.0)));
        tokens.push(RecognizedToken::new(*meaning, BoundingBox::new(300.0, y, 380.0, y + 20.0)));
        lines.push(format!("{} {}", term, meaning));
    }
    Recognition::new(lines.join("\n"), tokens)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub key: CropKey,
    pub languages: String,
    pub psm: PsmMode,
}

enum InitBehavior {
    Ok,
    Fail,
    Missing,
}

/// OCR engine answering from a table of canned recognitions.
pub struct ScriptedEngine {
    responses: HashMap<CropKey, Recognition>,
    psm_responses: HashMap<(CropKey, u8), Recognition>,
    accepted_languages: Option<String>,
    failing: HashSet<CropKey>,
    init: InitBehavior,
    cancel_after_first: Option<CancellationFlag>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            psm_responses: HashMap::new(),
            accepted_languages: None,
            failing: HashSet::new(),
            init: InitBehavior::Ok,
            cancel_after_first: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, key: CropKey, recognition: Recognition) -> Self {
        self.responses.insert(key, recognition);
        self
    }

    /// Answer for a specific segmentation mode, taking precedence over [`Self::respond`].
    pub fn respond_with_psm(mut self, key: CropKey, psm: PsmMode, recognition: Recognition) -> Self {
        self.psm_responses.insert((key, psm.as_u8()), recognition);
        self
    }

    /// Fail every recognition whose `-l` argument differs from `languages`.
    pub fn only_languages(mut self, languages: &str) -> Self {
        self.accepted_languages = Some(languages.to_string());
        self
    }

    /// Fail every recognition call.
    pub fn always_fail(self) -> Self {
        self.only_languages("none")
    }

    /// Fail every recognition of the crop `key`.
    pub fn fail_on(mut self, key: CropKey) -> Self {
        self.failing.insert(key);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.init = InitBehavior::Fail;
        self
    }

    pub fn missing_binary(mut self) -> Self {
        self.init = InitBehavior::Missing;
        self
    }

    pub fn cancel_after_first(mut self, flag: CancellationFlag) -> Self {
        self.cancel_after_first = Some(flag);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl OcrEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn initialize(&self) -> Result<()> {
        match self.init {
            InitBehavior::Ok => Ok(()),
            InitBehavior::Fail => Err(VocabError::ocr("model files are corrupt")),
            InitBehavior::Missing => Err(VocabError::MissingDependency("tesseract".to_string())),
        }
    }

    async fn recognize(
        &self,
        image: &[u8],
        request: &RecognitionRequest,
        progress: ProgressFn<'_>,
    ) -> Result<Recognition> {
        let key = crop_key(image);
        let languages = request.language_arg();
        self.calls.lock().expect("calls lock").push(Call {
            key,
            languages: languages.clone(),
            psm: request.psm,
        });

        if let Some(flag) = &self.cancel_after_first {
            flag.cancel();
        }

        if let Some(accepted) = &self.accepted_languages
            && *accepted != languages
        {
            return Err(VocabError::ocr(format!("no traineddata for {}", languages)));
        }

        if self.failing.contains(&key) {
            return Err(VocabError::ocr(format!("engine crashed on crop {:?}", key)));
        }

        progress(0.5);
        progress(1.0);

        let recognition = self
            .psm_responses
            .get(&(key, request.psm.as_u8()))
            .or_else(|| self.responses.get(&key))
            .cloned()
            .unwrap_or_default();
        Ok(recognition)
    }
}

/// Progress events recorded by a pipeline callback.
#[derive(Clone, Default)]
pub struct ProgressLog(Arc<Mutex<Vec<(String, f64)>>>);

impl ProgressLog {
    pub fn callback(&self) -> impl Fn(&str, f64) + Send + Sync + 'static {
        let events = Arc::clone(&self.0);
        move |label: &str, progress: f64| {
            events.lock().expect("progress lock").push((label.to_string(), progress));
        }
    }

    pub fn events(&self) -> Vec<(String, f64)> {
        self.0.lock().expect("progress lock").clone()
    }
}
