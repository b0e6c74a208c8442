//! `llamaocr ocr` — transcribe a local image without the web server.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};

use llamaocr_config::LlamaOcrConfig;
use llamaocr_core::{InflightSlot, LlmProvider, UploadedImage};
use llamaocr_understanding::{FollowUpService, ModelSettings, OcrService};

use crate::app::{build_provider, model_settings};
use crate::terminal_output::{note_error, note_info};

pub async fn run(config: &LlamaOcrConfig, image: &Path, questions: &[String]) -> Result<()> {
    let provider = build_provider(&config.model);
    let settings = model_settings(&config.model);
    let answers = transcribe_and_ask(provider, settings, image, questions).await?;

    println!("{}", answers.transcription);
    for (question, answer) in questions.iter().zip(&answers.answers) {
        println!();
        note_info(&format!("Q: {question}"));
        match answer {
            Ok(text) => println!("{text}"),
            Err(message) => note_error(message),
        }
    }
    Ok(())
}

pub struct OcrOutcome {
    pub transcription: String,
    /// One entry per question, in order; `Err` carries a printable message.
    pub answers: Vec<Result<String, String>>,
}

/// Run OCR on `image`, then each question against the transcription.
///
/// A failed question does not stop the ones after it; a failed OCR fails
/// the whole command.
pub async fn transcribe_and_ask(
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
    image: &Path,
    questions: &[String],
) -> Result<OcrOutcome> {
    let filename = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !UploadedImage::new(filename.clone(), Vec::new()).has_accepted_extension() {
        bail!("{filename:?} is not a supported image (jpg, jpeg, png, gif)");
    }

    let ocr = OcrService::new(Arc::clone(&provider), settings.clone());
    let follow_up = FollowUpService::new(provider, settings);
    let slot = InflightSlot::new();

    let transcription = match ocr.extract_text(image, &slot).await {
        Ok(text) => text,
        Err(e) => bail!("OCR failed ({}): {e}", e.kind()),
    };

    let mut answers = Vec::with_capacity(questions.len());
    for question in questions {
        if question.trim().is_empty() {
            answers.push(Err("Question is empty".to_string()));
            continue;
        }
        let answer = follow_up
            .answer(&transcription, question, &slot)
            .await
            .map_err(|e| format!("The model could not answer ({}): {e}", e.kind()));
        answers.push(answer);
    }

    Ok(OcrOutcome {
        transcription,
        answers,
    })
}
