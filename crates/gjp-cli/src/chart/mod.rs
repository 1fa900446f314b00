//! Vega-Lite chart specifications
//!
//! Charts are written as self-contained Vega-Lite v5 documents
//! (`*.vl.json`) with their data inlined, so they can be rendered by any
//! Vega-Lite viewer without access to the source tables.

use std::path::Path;

use serde_json::{Value, json};

use crate::util::Output;

pub(crate) mod correlation;
pub(crate) mod histogram;
pub(crate) mod timeline;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Extension of written chart files.
pub(crate) const EXTENSION: &str = "vl.json";

/// Wraps a chart body with the schema, title and inline data.
fn spec(title: &str, values: Vec<Value>, body: Value) -> Value {
    let mut spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title,
        "data": { "values": values },
    });
    if let (Value::Object(spec), Value::Object(body)) = (&mut spec, body) {
        spec.extend(body);
    }
    spec
}

/// Writes `spec` to `path`, creating parent directories.
pub(crate) fn save(spec: &Value, path: &Path) -> anyhow::Result<()> {
    let mut output = Output::open(path)?;
    output.write_json(spec)?;
    tracing::info!(path = %path.display(), "wrote chart");
    Ok(())
}
