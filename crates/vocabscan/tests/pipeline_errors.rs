//! Error handling: language fallback, engine initialization failures and
//! invalid configuration.

mod helpers;

use helpers::*;
use vocabscan::ocr::Recognition;
use vocabscan::pipeline::LABEL_FAILED;
use vocabscan::types::ExtractorPath;
use vocabscan::{Language, LanguagePair, Pipeline, VocabConfig, VocabError};

fn config(from: Language, to: Language) -> VocabConfig {
    VocabConfig {
        languages: LanguagePair::new(from, to),
        ..Default::default()
    }
}

fn requested_languages(engine: &ScriptedEngine) -> Vec<String> {
    engine.calls().into_iter().map(|call| call.languages).collect()
}

#[tokio::test]
async fn test_all_language_sets_fail() {
    let engine = ScriptedEngine::new()
        .respond(FULL, Recognition::text_only("1. apple 사과"))
        .always_fail()
        .into_arc();
    let log = ProgressLog::default();

    let result = Pipeline::new(engine.clone(), VocabConfig::default())
        .with_progress(log.callback())
        .run(&page_image())
        .await
        .unwrap();

    assert!(result.items.is_empty());
    assert_eq!(result.diagnostics.extractor, ExtractorPath::None);
    assert!(result.diagnostics.ocr_failed);
    assert_eq!(result.raw_text, "");
    assert_eq!(requested_languages(&engine), vec!["eng+kor", "eng"]);
    assert_eq!(
        log.events().last().map(|(label, p)| (label.clone(), *p)),
        Some((LABEL_FAILED.to_string(), 1.0))
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["diagnostics"]["extractor"], "none");
    assert_eq!(json["rawText"], "");
}

#[tokio::test]
async fn test_fallback_order_ends_with_english() {
    let engine = ScriptedEngine::new()
        .respond(FULL, Recognition::text_only("1. manzana 사과"))
        .only_languages("eng")
        .into_arc();

    let result = Pipeline::new(engine.clone(), config(Language::Es, Language::Ko))
        .run(&page_image())
        .await
        .unwrap();

    assert_eq!(requested_languages(&engine), vec!["spa+kor+eng", "eng+kor", "eng"]);
    assert_eq!(result.diagnostics.languages.as_deref(), Some("eng"));
    assert!(!result.diagnostics.ocr_failed);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].term, "manzana");
}

#[tokio::test]
async fn test_reduced_set_is_kept_for_escalation() {
    let engine = ScriptedEngine::new()
        .respond(FULL, Recognition::text_only(numbered_text(1, 20, |n| n <= 6)))
        .only_languages("eng+kor")
        .into_arc();

    let result = Pipeline::new(engine.clone(), config(Language::Fr, Language::Ko))
        .run(&page_image())
        .await
        .unwrap();

    let languages = requested_languages(&engine);
    assert_eq!(languages[0], "fra+kor+eng");
    assert!(languages[1..].iter().all(|l| l == "eng+kor"));
    assert_eq!(result.diagnostics.languages.as_deref(), Some("eng+kor"));
    assert_eq!(result.diagnostics.extractor, ExtractorPath::TextSplit3);
}

#[tokio::test]
async fn test_engine_initialization_failure_is_fatal() {
    let engine = ScriptedEngine::new().failing_init().into_arc();

    let err = Pipeline::new(engine.clone(), VocabConfig::default())
        .run(&page_image())
        .await
        .unwrap_err();

    assert!(matches!(err, VocabError::EngineUnavailable { .. }));
    assert!(err.is_fatal());
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_missing_engine_binary_is_fatal() {
    let engine = ScriptedEngine::new().missing_binary().into_arc();

    let err = Pipeline::new(engine.clone(), VocabConfig::default())
        .run(&page_image())
        .await
        .unwrap_err();

    assert!(matches!(err, VocabError::MissingDependency(_)));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_recognition() {
    let engine = ScriptedEngine::new().into_arc();
    let mut config = VocabConfig::default();
    config.parser.pair_window = 0;

    let err = Pipeline::new(engine.clone(), config)
        .run(&page_image())
        .await
        .unwrap_err();

    assert!(matches!(err, VocabError::Validation { .. }));
    assert!(engine.calls().is_empty());
}
