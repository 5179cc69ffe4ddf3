//! Turning built objects back into canonical descriptions
//!
//! Only file schemas round-trip. A record comparator holds references to
//! schemas and opaque descriptors and has no canonical description.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::checksum::Checksum;
use crate::config::OutputFormat;
use crate::descriptor::SchemaDescription;
use crate::error::{LinkageError, Result};
use crate::script::Compiled;

/// Canonical description of `object`, or a type error for non-schemas
pub fn describe(object: &Compiled) -> Result<SchemaDescription> {
    match object {
        Compiled::Schema(schema) => Ok(schema.describe()),
        Compiled::Comparator(_) => Err(LinkageError::Unsupported("record comparator")),
    }
}

/// Canonical description as a JSON value
pub fn to_canonical(object: &Compiled) -> Result<Value> {
    Ok(serde_json::to_value(describe(object)?)?)
}

/// Canonical description rendered as text, without a trailing newline
pub fn to_text(object: &Compiled, format: OutputFormat) -> Result<String> {
    let description = describe(object)?;
    let text = match format {
        OutputFormat::Compact => serde_json::to_string(&description)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(&description)?,
    };
    Ok(text)
}

/// Write the canonical description of `object` to `path`
///
/// Nothing is created when `object` cannot be described. The returned
/// checksum identifies the written description.
pub fn write(object: &Compiled, path: &Path, format: OutputFormat) -> Result<Checksum> {
    let text = to_text(object, format)?;
    let checksum = Checksum::from_json(&to_canonical(object)?);

    let write_err = |source: std::io::Error| LinkageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", text).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    tracing::info!(path = %path.display(), checksum = %checksum.short(), "saved description");
    Ok(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::RecordComparator;
    use crate::descriptor::StandardComparator;
    use crate::error::ErrorKind;
    use crate::schema::{FileSchema, FixedWidthFileSchema};
    use serde_json::json;
    use std::sync::Arc;

    fn fixed() -> Arc<FileSchema> {
        let mut b = FixedWidthFileSchema::builder();
        b.column("name", 0, 10).unwrap().column("dob", 10, 8).unwrap();
        b.blocking_field("dob").unwrap();
        Arc::new(b.build().unwrap().into())
    }

    #[test]
    fn test_canonical_fixed_width() {
        let value = to_canonical(&Compiled::Schema(fixed())).unwrap();
        assert_eq!(
            value,
            json!({
                "columns": [["name", 0, 10], ["dob", 10, 8]],
                "blockingFields": ["dob"],
                "idFields": []
            })
        );
    }

    #[test]
    fn test_compact_is_one_line() {
        let text = to_text(&Compiled::Schema(fixed()), OutputFormat::Compact).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_comparator_has_no_description() {
        let mut b = RecordComparator::within(fixed());
        b.compare("name", StandardComparator::String).unwrap();
        let cmp = Compiled::Comparator(Arc::new(b.build().unwrap()));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmp.json");
        let err = write(&cmp, &path, OutputFormat::Compact).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write(&Compiled::Schema(fixed()), &path, OutputFormat::Compact).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("out.json"));
    }
}
