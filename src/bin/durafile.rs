//! durafile -- inspect a bencoded file as JSON.
//!
//! Usage: durafile <file>

use std::path::Path;

use anyhow::Context;
use durafile::Entry;

/// Byte strings longer than this are shown as a truncated hex preview.
const MAX_HEX_PREVIEW: usize = 64;

fn main() -> anyhow::Result<()> {
    // Tracing goes to stderr so the JSON on stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let file = std::env::args()
        .nth(1)
        .context("usage: durafile <file>")?;

    let entry = durafile::load_entry(Path::new(&file), None)
        .with_context(|| format!("failed to read {file}"))?;

    println!("{}", serde_json::to_string_pretty(&to_json(&entry))?);
    Ok(())
}

/// Render an entry for humans: UTF-8 byte strings as text, binary ones as
/// hex (truncated past [`MAX_HEX_PREVIEW`] bytes).
fn to_json(entry: &Entry) -> serde_json::Value {
    match entry {
        Entry::Int(value) => serde_json::Value::from(*value),
        Entry::Bytes(bytes) => serde_json::Value::from(render_bytes(bytes)),
        Entry::List(items) => serde_json::Value::from(
            items.iter().map(to_json).collect::<Vec<_>>(),
        ),
        Entry::Dict(pairs) => serde_json::Value::Object(
            pairs
                .iter()
                .map(|(key, value)| (render_bytes(key), to_json(value)))
                .collect(),
        ),
    }
}

fn render_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) if bytes.len() > MAX_HEX_PREVIEW => format!(
            "0x{}... ({} bytes)",
            hex::encode(&bytes[..MAX_HEX_PREVIEW]),
            bytes.len()
        ),
        Err(_) => format!("0x{}", hex::encode(bytes)),
    }
}
