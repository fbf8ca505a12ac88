//! Dispatch step: ordered chapters → completion endpoint → `responses/`.
//!
//! Reads the order file, prepends the instruction preamble to each
//! chapter, POSTs it to an OpenAI-style chat-completions endpoint with a
//! blocking client, and writes the reply to
//! `responses/<stem>_response.md`. Sequential, no retries.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::info;

use lectern_shared::{DispatchConfig, DocumentStore, FsStore, LecternError, Result, read_order};

/// Subdirectory of the book directory that replies are written to.
const RESPONSES_DIR: &str = "responses";

/// Blocking client for the configured chat-completions endpoint.
pub struct Dispatcher {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    system_message: String,
    api_key: String,
}

impl Dispatcher {
    /// Build a dispatcher from config, resolving the API key from the
    /// configured environment variable.
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            LecternError::config(format!(
                "API key not found. Set the {} environment variable.",
                config.api_key_env
            ))
        })?;

        Ok(Self {
            client: reqwest::blocking::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            system_message: config.system_message.clone(),
            api_key,
        })
    }

    /// Send every chapter listed in the book's order file, in order,
    /// writing each reply under `responses/`. Returns the written paths.
    pub fn dispatch_book(&self, book_dir: &Path, base_prompt: &str) -> Result<Vec<PathBuf>> {
        let store = FsStore::open(book_dir)?;
        let order = read_order(&store)?;
        let total = order.len();

        let responses_dir = book_dir.join(RESPONSES_DIR);
        std::fs::create_dir_all(&responses_dir).map_err(|e| LecternError::io(&responses_dir, e))?;

        let mut written = Vec::with_capacity(total);
        for (i, name) in order.iter().enumerate() {
            info!(file = %name, n = i + 1, total, "sending prompt");

            let content = store.read(name)?;
            let prompt = format!("{base_prompt}\n\n{content}");
            let reply = self.send_prompt(&prompt)?;

            let stem = Path::new(name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            let out_path = responses_dir.join(format!("{stem}_response.md"));
            std::fs::write(&out_path, reply).map_err(|e| LecternError::io(&out_path, e))?;

            info!(file = %out_path.display(), "response saved");
            written.push(out_path);
        }

        Ok(written)
    }

    /// One round trip to the completion endpoint.
    fn send_prompt(&self, prompt: &str) -> Result<String> {
        let body = build_request_body(&self.model, &self.system_message, prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| LecternError::Dispatch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LecternError::Dispatch(format!(
                "endpoint returned {status}"
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| LecternError::Dispatch(format!("invalid response body: {e}")))?;
        extract_reply(&body)
    }
}

/// Build the chat-completions request payload.
fn build_request_body(model: &str, system_message: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system_message },
            { "role": "user", "content": prompt },
        ],
    })
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_reply(body: &Value) -> Result<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| {
            LecternError::Dispatch("response has no choices[0].message.content".into())
        })
}

/// Read the instruction preamble file named in config.
pub fn read_base_prompt(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| LecternError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = build_request_body("gpt-4o-mini", "You are a helpful assistant.", "Summarize.");

        assert_eq!(body["model"], "gpt-4o-mini");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Summarize.");
    }

    #[test]
    fn extract_reply_reads_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "the summary" } },
                { "message": { "role": "assistant", "content": "ignored" } },
            ]
        });
        assert_eq!(extract_reply(&body).unwrap(), "the summary");
    }

    #[test]
    fn extract_reply_rejects_malformed_response() {
        let body = json!({ "error": { "message": "rate limited" } });
        let err = extract_reply(&body).unwrap_err();
        assert!(matches!(err, LecternError::Dispatch(_)));
    }
}
