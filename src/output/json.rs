use std::io::Write;

use anyhow::Result;
use serde::Serialize;

/// Write `value` as pretty JSON to stdout, followed by a newline.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Acknowledge a created row, e.g. `{"kind": "transfer", "id": 4}`.
pub fn print_created(kind: &str, id: i64) -> Result<()> {
    print_json(&serde_json::json!({ "kind": kind, "id": id }))
}
