//! YAML rendering of command output.

use anyhow::Context;
use serde::Serialize;
use std::io::Write;

/// Writes `value` as a YAML document preceded by a `---` line.
pub fn output_as_yaml<T, W>(value: &T, mut w: W) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let text = marshal_yaml(value)?;
    writeln!(w, "---")?;
    w.write_all(text.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// Converts `value` to YAML by way of its JSON representation.
pub fn marshal_yaml<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let json = serde_json::to_value(value).context("marshalling to JSON")?;
    serde_yaml::to_string(&json).context("converting JSON to YAML")
}
