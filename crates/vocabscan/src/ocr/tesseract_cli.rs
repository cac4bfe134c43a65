//! OCR engine backed by the `tesseract` command-line binary.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use super::tsv::parse_tsv;
use super::types::{Recognition, RecognitionRequest};
use super::{OcrEngine, ProgressFn};
use crate::core::config::OcrSettings;
use crate::{Result, VocabError};

const DEFAULT_BINARY: &str = "tesseract";

fn install_message() -> &'static str {
    "Install Tesseract 4 or newer (e.g. `apt install tesseract-ocr tesseract-ocr-kor`, \
`brew install tesseract tesseract-lang`) or pass the binary path explicitly."
}

/// Runs `tesseract stdin stdout -l <langs> --psm <n> tsv` once per recognition call.
#[derive(Debug)]
pub struct TesseractCliEngine {
    binary: PathBuf,
    timeout_secs: u64,
    min_confidence: f64,
    installed_languages: OnceCell<Vec<String>>,
}

impl TesseractCliEngine {
    pub fn new(settings: &OcrSettings) -> Self {
        Self::with_binary(DEFAULT_BINARY, settings)
    }

    pub fn with_binary(binary: impl Into<PathBuf>, settings: &OcrSettings) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs: settings.timeout_secs,
            min_confidence: settings.min_confidence,
            installed_languages: OnceCell::new(),
        }
    }

    /// Models reported by `--list-langs`; empty until [`OcrEngine::initialize`] has run.
    pub fn installed_languages(&self) -> &[String] {
        self.installed_languages.get().map(Vec::as_slice).unwrap_or(&[])
    }

    async fn probe_version(&self) -> Result<()> {
        let output = Command::new(&self.binary).arg("--version").output().await;

        match output {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(VocabError::engine_unavailable(format!(
                "Tesseract executable '{}' failed when checking '--version': {}",
                self.binary.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(VocabError::MissingDependency(format!(
                "Tesseract executable '{}' not found. {}",
                self.binary.display(),
                install_message()
            ))),
            Err(err) => Err(VocabError::engine_unavailable_with_source(
                format!("Tesseract executable '{}' could not be executed", self.binary.display()),
                err,
            )),
        }
    }

    async fn list_languages(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .output()
            .await
            .map_err(|e| VocabError::engine_unavailable_with_source("Failed to list Tesseract languages", e))?;

        // Older releases print the list on stderr.
        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        if listing.trim().is_empty() {
            listing = String::from_utf8_lossy(&output.stderr).into_owned();
        }
        Ok(parse_language_list(&listing))
    }
}

/// Parse `tesseract --list-langs` output into model names.
pub(crate) fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
        .filter(|line| !line.contains(' '))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl OcrEngine for TesseractCliEngine {
    fn name(&self) -> &str {
        "tesseract-cli"
    }

    async fn initialize(&self) -> Result<()> {
        if self.installed_languages.get().is_some() {
            return Ok(());
        }

        self.probe_version().await?;

        let languages = self.list_languages().await?;
        tracing::debug!(binary = %self.binary.display(), languages = ?languages, "Tesseract is available");
        let _ = self.installed_languages.set(languages);
        Ok(())
    }

    fn supports_language(&self, code: &str) -> bool {
        match self.installed_languages.get() {
            Some(languages) if !languages.is_empty() => languages.iter().any(|l| l == code),
            _ => true,
        }
    }

    async fn recognize(
        &self,
        image: &[u8],
        request: &RecognitionRequest,
        progress: ProgressFn<'_>,
    ) -> Result<Recognition> {
        progress(0.0);

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(request.language_arg())
            .arg("--psm")
            .arg(request.psm.to_string())
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VocabError::ocr_with_source(format!("Failed to execute {}", self.binary.display()), e))?;

        let stdin = child.stdin.take();
        let exchange = async move {
            if let Some(mut stdin) = stdin {
                stdin
                    .write_all(image)
                    .await
                    .map_err(|e| VocabError::ocr_with_source("Failed to send image to tesseract", e))?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| VocabError::ocr_with_source("Failed to wait for tesseract", e))
        };

        let output = match timeout(Duration::from_secs(self.timeout_secs), exchange).await {
            Ok(result) => result?,
            Err(_) => {
                // dropping the exchange drops the child; kill_on_drop reaps it
                return Err(VocabError::ocr(format!(
                    "Tesseract recognition timed out after {} seconds",
                    self.timeout_secs
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VocabError::ocr(format!(
                "Tesseract failed with return code {} (languages {}): {}",
                output.status.code().unwrap_or(-1),
                request.language_arg(),
                stderr.trim()
            )));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let recognition = parse_tsv(&tsv, self.min_confidence);

        tracing::debug!(
            languages = %request.language_arg(),
            psm = %request.psm,
            tokens = recognition.tokens.len(),
            text_len = recognition.text.chars().count(),
            "Tesseract recognition finished"
        );

        progress(1.0);
        Ok(recognition)
    }
}
