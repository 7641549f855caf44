//! Transcript persistence: the session record shape and file sinks.
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::message::Transcript;

// ---------------------------------------------------------------------------
// Session record
// ---------------------------------------------------------------------------

/// What a finished conversation session persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Local time, `YYYYMMDD_HHMMSS`.
    pub timestamp: String,
    pub participants: Vec<String>,
    pub history: Transcript,
    pub engine: String,
}

impl SessionRecord {
    pub fn new(participants: Vec<String>, history: Transcript, engine: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            participants,
            history,
            engine: engine.into(),
        }
    }

    /// File stem: `chat_<A>_<B>_<timestamp>`.
    pub fn file_stem(&self) -> String {
        let names = self
            .participants
            .iter()
            .map(|p| sanitize_component(p))
            .collect::<Vec<_>>()
            .join("_");
        format!("chat_{}_{}", names, self.timestamp)
    }
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// Destination for finished session records.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Persist the record, returning where it went.
    async fn persist(&self, record: &SessionRecord) -> Result<PathBuf>;
}

// ---------------------------------------------------------------------------
// JSON file sink
// ---------------------------------------------------------------------------

/// Writes each session as pretty-printed JSON into a directory.
pub struct JsonFileSink {
    pub output_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }
}

#[async_trait]
impl TranscriptSink for JsonFileSink {
    async fn persist(&self, record: &SessionRecord) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let json = serde_json::to_string_pretty(record).context("Failed to serialize session")?;
        let path = write_new(&self.output_dir, &record.file_stem(), "json", json.as_bytes()).await?;
        info!("[SessionExport] Saved transcript → {}", path.display());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// HTML export
// ---------------------------------------------------------------------------

pub struct HtmlExporter {
    pub output_dir: PathBuf,
}

impl HtmlExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub async fn export(&self, record: &SessionRecord) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let html = render_html(record);
        let path = write_new(&self.output_dir, &record.file_stem(), "html", html.as_bytes()).await?;
        info!("[SessionExport] Exported HTML → {}", path.display());
        Ok(path)
    }
}

fn render_html(record: &SessionRecord) -> String {
    let first = record.participants.first().map(String::as_str).unwrap_or("");
    let msg_html = record.history.iter().map(|e| {
        let side_class = if e.is_system() {
            "msg-system"
        } else if e.speaker == first {
            "msg-a"
        } else {
            "msg-b"
        };
        format!(
            r#"<div class="message {sc}"><span class="speaker">{speaker}</span><div class="content">{content}</div></div>"#,
            sc = side_class,
            speaker = html_escape(&e.speaker),
            content = html_escape(&e.content),
        )
    }).collect::<String>();

    let title = record.participants.join(" × ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; background: #0d1117; color: #c9d1d9; }}
.message {{ margin-bottom: 1rem; border-radius: 8px; padding: 0.75rem 1rem; }}
.msg-a {{ background: #1f2937; }}
.msg-b {{ background: #111827; border-left: 3px solid #ec4899; }}
.msg-system {{ background: #1a1a1a; color: #6b7280; font-style: italic; }}
.speaker {{ font-weight: 700; font-size: 0.75rem; text-transform: uppercase; color: #6b7280; display: block; margin-bottom: 0.25rem; }}
.content {{ white-space: pre-wrap; line-height: 1.6; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>{timestamp} · {engine}</p>
{messages}
</body>
</html>"#,
        title = html_escape(&title),
        timestamp = html_escape(&record.timestamp),
        engine = html_escape(&record.engine),
        messages = msg_html,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Write to `<stem>.<ext>`, or `<stem>_<n>.<ext>` when earlier names are
/// taken. Never overwrites an existing file.
async fn write_new(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
    for n in 0u32.. {
        let name = match n {
            0 => format!("{stem}.{ext}"),
            n => format!("{stem}_{n}.{ext}"),
        };
        let path = dir.join(name);
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        };
        file.write_all(bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.flush().await?;
        return Ok(path);
    }
    anyhow::bail!("No free file name for {stem}.{ext} in {}", dir.display())
}
