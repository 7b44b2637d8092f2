//! Vision-language model backend using llama-cpp-2 (behind the "vlm"
//! feature).
//!
//! The model is prompted to transcribe the note one task per line; the
//! output lines flow into the same segmentation/extraction pipeline as
//! every other backend, so the model never has to emit structured fields.
//! Weights are fetched from Hugging Face Hub on first use when a repo is
//! configured and cached under the model directory.

use std::io::Cursor;
use std::path::PathBuf;

use base64::Engine as _;
use image::DynamicImage;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::token::data_array::LlamaTokenDataArray;
use log::{debug, info, warn};

use crate::error::RecognitionError;
use crate::recognition::{LazyEngine, RawLine, RawRecognition, RecognitionBackend};

const MODEL_FILE: &str = "model.gguf";
const MAX_OUTPUT_TOKENS: usize = 512;

/// Transcriptions from the model carry no per-line geometry, so a flat
/// confidence is reported for the whole image.
const VLM_CONFIDENCE: f32 = 0.90;

const PROMPT_TEMPLATE: &str = "<|im_start|>system\n\
You transcribe handwritten task lists. Output every task on its own line, \
keeping list markers, assignee arrows, dates and priority marks exactly as \
written. Output nothing else.<|im_end|>\n\
<|im_start|>user\n{image}\n<|im_end|>\n<|im_start|>assistant\n";

struct VlmEngine {
    model: LlamaModel,
    backend: LlamaBackend,
    ctx_params: LlamaContextParams,
}

// SAFETY: all inference goes through &self methods that create a fresh
// context per call; the loaded model and backend are only read. The engine
// is shared via LazyEngine's Arc and never mutated after load.
unsafe impl Send for VlmEngine {}
unsafe impl Sync for VlmEngine {}

pub struct VlmBackend {
    model_dir: PathBuf,
    model_repo: Option<String>,
    engine: LazyEngine<VlmEngine>,
}

impl VlmBackend {
    pub fn new(model_dir: impl Into<PathBuf>, model_repo: Option<String>) -> Self {
        Self {
            model_dir: model_dir.into(),
            model_repo,
            engine: LazyEngine::new(),
        }
    }

    fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    /// Downloads the weights from Hugging Face Hub when missing. hf-hub
    /// keeps its own cache; a symlink avoids duplicating the file.
    fn ensure_weights(&self) -> Result<PathBuf, RecognitionError> {
        let model_path = self.model_path();
        if model_path.exists() {
            return Ok(model_path);
        }

        let repo_name = self.model_repo.clone().ok_or_else(|| {
            RecognitionError::Init(format!("model weights not found at {}", model_path.display()))
        })?;

        std::fs::create_dir_all(&self.model_dir)
            .map_err(|e| RecognitionError::Init(format!("create model dir: {}", e)))?;

        info!("Downloading {} from {}...", MODEL_FILE, repo_name);
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| RecognitionError::Init(format!("hf-hub: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::new(repo_name, hf_hub::RepoType::Model));
        let downloaded = repo
            .get(MODEL_FILE)
            .map_err(|e| RecognitionError::Init(format!("download: {}", e)))?;

        #[cfg(unix)]
        if let Err(e) = std::os::unix::fs::symlink(&downloaded, &model_path) {
            warn!("Failed to create symlink, copying instead: {}", e);
            std::fs::copy(&downloaded, &model_path)
                .map_err(|e| RecognitionError::Init(format!("copy weights: {}", e)))?;
        }

        #[cfg(not(unix))]
        std::fs::copy(&downloaded, &model_path)
            .map_err(|e| RecognitionError::Init(format!("copy weights: {}", e)))?;

        Ok(model_path)
    }

    fn load_engine(&self) -> Result<VlmEngine, RecognitionError> {
        let model_path = self.ensure_weights()?;
        info!("Loading VLM weights from {}", model_path.display());

        let backend = LlamaBackend::init()
            .map_err(|e| RecognitionError::Init(format!("llama backend: {}", e)))?;

        let model_params = LlamaModelParams::default();
        let model = LlamaModel::load_from_file(&backend, &model_path, &model_params)
            .map_err(|e| RecognitionError::Init(format!("model load: {}", e)))?;

        let ctx_params =
            LlamaContextParams::default().with_n_ctx(std::num::NonZeroU32::new(4096));

        info!("VLM initialized successfully");
        Ok(VlmEngine {
            model,
            backend,
            ctx_params,
        })
    }

    fn generate(&self, engine: &VlmEngine, prompt: &str) -> Result<String, RecognitionError> {
        let mut ctx = engine
            .model
            .new_context(&engine.backend, engine.ctx_params.clone())
            .map_err(|e| RecognitionError::Failed(format!("context: {}", e)))?;

        let tokens = engine
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(|e| RecognitionError::Failed(format!("tokenize: {}", e)))?;

        let n_tokens = tokens.len();
        let mut batch = LlamaBatch::new(4096, 1);
        for (i, token) in tokens.iter().enumerate() {
            let is_last = i == n_tokens - 1;
            batch
                .add(*token, i as i32, &[0], is_last)
                .map_err(|e| RecognitionError::Failed(format!("batch add: {}", e)))?;
        }

        ctx.decode(&mut batch)
            .map_err(|e| RecognitionError::Failed(format!("decode prompt: {}", e)))?;

        let mut output = String::new();
        let mut n_cur = n_tokens;

        for _ in 0..MAX_OUTPUT_TOKENS {
            let candidates = ctx.candidates_ith(batch.n_tokens() - 1);
            let mut candidates_array = LlamaTokenDataArray::from_iter(candidates, false);

            // Greedy enough for transcription; temperature sampling only
            // hurts fidelity here.
            let new_token = candidates_array.sample_token(0);

            if engine.model.is_eog_token(new_token) {
                break;
            }

            let token_str = engine
                .model
                .token_to_str(new_token, Special::Tokenize)
                .map_err(|e| RecognitionError::Failed(format!("detokenize: {}", e)))?;
            output.push_str(&token_str);

            batch.clear();
            batch
                .add(new_token, n_cur as i32, &[0], true)
                .map_err(|e| RecognitionError::Failed(format!("batch add: {}", e)))?;
            ctx.decode(&mut batch)
                .map_err(|e| RecognitionError::Failed(format!("decode: {}", e)))?;

            n_cur += 1;
        }

        Ok(output)
    }
}

impl RecognitionBackend for VlmBackend {
    fn name(&self) -> &'static str {
        "vlm"
    }

    fn is_available(&self) -> bool {
        self.model_path().exists() || self.model_repo.is_some()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition, RecognitionError> {
        let _span = tracing::info_span!("recognition.vlm").entered();

        let engine = self.engine.get_or_try_init(|| self.load_engine())?;

        // Keep memory bounded on large photos before the image enters the
        // vision encoder.
        let max_dim = 1024;
        let resized;
        let image = if image.width().max(image.height()) > max_dim {
            resized = image.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3);
            &resized
        } else {
            image
        };

        let mut png_data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| RecognitionError::Failed(format!("image encode: {}", e)))?;

        let image_tag = format!(
            "<img src=\"data:image/png;base64,{}\">",
            base64::engine::general_purpose::STANDARD.encode(&png_data)
        );
        let prompt = PROMPT_TEMPLATE.replace("{image}", &image_tag);

        let output = self.generate(&engine, &prompt)?;
        debug!("VLM raw output: {}", crate::sanitize::snippet(&output));

        let lines: Vec<RawLine> = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(RawLine::new)
            .collect();

        Ok(RawRecognition {
            lines,
            confidence: VLM_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_without_weights_or_repo() {
        let dir = tempfile::tempdir().unwrap();
        let backend = VlmBackend::new(dir.path(), None);
        assert!(!backend.is_available());
    }

    #[test]
    fn test_available_when_weights_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_FILE), b"not a real model").unwrap();
        let backend = VlmBackend::new(dir.path(), None);
        assert!(backend.is_available());
    }

    #[test]
    fn test_available_when_repo_configured() {
        let dir = tempfile::tempdir().unwrap();
        let backend = VlmBackend::new(dir.path(), Some("acme/notes-vlm".to_string()));
        assert!(backend.is_available());
    }
}
