//! How `enrol` prints listings, records, confirmations and errors.
//!
//! The mode is picked once in `main` and threaded into every handler. Lookup
//! order: `--format`, then `--json`, then the `FORMAT` variable, then
//! `output` from the user config. With none of those set, a terminal gets
//! [`OutputMode::Pretty`] and a pipe gets [`OutputMode::Text`].

use clap::ValueEnum;
use enrol_core::error::ErrorCode;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(72))
}

/// Heading line underlined with [`pretty_rule`].
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `Label:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Cards and headings for a person at a terminal.
    Pretty,
    /// One tab-separated line per record, headed by column names.
    Text,
    /// Pretty-printed JSON; lists become arrays.
    Json,
}

impl OutputMode {
    fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    user_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    // Unknown values fall through to the next layer.
    if let Some(mode) = format_env.and_then(OutputMode::parse_loose) {
        return mode;
    }
    if let Some(mode) = user_output.and_then(OutputMode::parse_loose) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Pick the mode for this invocation. See the module docs for the order.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), user_output, is_tty)
}

/// A row in a listing (program, university, application, check entry).
pub trait Renderable {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// One JSON value, no trailing newline required.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// The text-mode line for this row.
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column names printed above the first text-mode row.
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

pub fn write_json<T: Serialize + ?Sized>(w: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *w, value).map_err(io::Error::other)
}

/// Print a listing to stdout. An empty listing prints no header in text
/// mode and `[]` in JSON mode.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_list(items, mode, &mut out)
}

fn write_list<R: Renderable>(items: &[R], mode: OutputMode, out: &mut dyn Write) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = R::table_headers();
            if !items.is_empty() && !headers.is_empty() {
                writeln!(out, "{}", headers.join("\t"))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                rows.push(String::from_utf8_lossy(&buf).trim_end().to_string());
            }
            if rows.is_empty() {
                writeln!(out, "[]")?;
            } else {
                writeln!(out, "[\n{}\n]", rows.join(",\n"))?;
            }
        }
    }
    Ok(())
}

/// Print one record. JSON is derived from `value`; the two closures
/// cover text and pretty mode.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Like [`render_mode`] when text and pretty output are the same.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// What a failed command reports on stderr. In JSON mode this is the body
/// of `{"error": ...}`.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####`, see [`ErrorCode`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Field name to message, nested for per-program errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
}

impl CliError {
    /// `suggestion` comes from the code's hint.
    pub fn coded(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(code.hint().to_string()),
            error_code: Some(code.code().to_string()),
            fields: None,
        }
    }

    #[must_use]
    pub fn with_fields<T: Serialize>(mut self, fields: &T) -> Self {
        self.fields = serde_json::to_value(fields).ok();
        self
    }
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(serde_json::Value::Object(fields)) = &error.fields {
                write_fields(out, "", fields)?;
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

fn write_fields(
    out: &mut dyn Write,
    prefix: &str,
    fields: &serde_json::Map<String, serde_json::Value>,
) -> io::Result<()> {
    for (name, value) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else if name.chars().all(|c| c.is_ascii_digit()) {
            format!("{prefix}[{name}]")
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            serde_json::Value::Object(nested) => write_fields(out, &path, nested)?,
            serde_json::Value::String(message) => writeln!(out, "  {path}: {message}")?,
            other => writeln!(out, "  {path}: {other}")?,
        }
    }
    Ok(())
}

/// An error whose report is already on stderr. `main` exits non-zero
/// without printing it a second time.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Whether `err` was already reported through [`fail`].
pub fn is_reported(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<Reported>())
}

/// Report `error` on stderr and turn it into the `anyhow::Error` that ends
/// the command.
pub fn fail(mode: OutputMode, error: CliError) -> anyhow::Error {
    if let Err(render_err) = write_error(mode, &error, &mut io::stderr().lock()) {
        tracing::debug!(error = %render_err, "failed to render error");
    }
    Reported(error.message).into()
}

/// `✓ message`, or `{"ok": true, "message": ...}` in JSON mode.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, &serde_json::json!({ "ok": true, "message": message }))?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "✓ {message}")?;
        }
    }
    Ok(())
}
