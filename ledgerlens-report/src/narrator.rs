//! Narrative-text collaborator: a prompt goes out, prose comes back.
//!
//! The production implementation talks to an OpenAI-compatible chat
//! completions endpoint. It is a black box with unbounded latency: no
//! client-side timeout, no retry, and its failures propagate to the caller.

use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Prose generation behind a narrow interface.
pub trait Narrator {
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// OpenAI-compatible chat completions client.
pub struct ChatNarrator {
    config: NarratorConfig,
}

impl ChatNarrator {
    pub fn new(config: NarratorConfig) -> Self {
        Self { config }
    }
}

impl Narrator for ChatNarrator {
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        // The CLI runs under #[tokio::main], so we may already be inside a
        // runtime; creating a nested runtime and calling block_on would
        // panic. Reuse the running handle when there is one.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| {
                handle.block_on(chat_complete(&self.config, prompt, system_prompt))
            })
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(chat_complete(&self.config, prompt, system_prompt))
        }
    }
}

async fn chat_complete(config: &NarratorConfig, prompt: &str, system_prompt: &str) -> Result<String> {
    #[derive(Serialize)]
    struct Msg {
        role: String,
        content: String,
    }

    #[derive(Serialize)]
    struct Req {
        model: String,
        messages: Vec<Msg>,
        temperature: f32,
        max_tokens: u32,
    }

    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let body = Req {
        model: config.model.clone(),
        messages: vec![
            Msg {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            },
            Msg {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.api_key))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .headers(headers)
        .json(&body)
        .send()
        .await
        .context("chat completions request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("chat completions error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse chat completions response")?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}

/// Narrator substitute for runs without network access or credentials.
pub struct OfflineNarrator;

impl Narrator for OfflineNarrator {
    fn generate(&self, _prompt: &str, _system_prompt: &str) -> Result<String> {
        Ok("（离线模式，未生成智能解读。）".to_string())
    }
}
