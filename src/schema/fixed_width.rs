//! Fixed-width file layouts

use super::record::{RecordSchema, RecordSchemaBuilder};
use crate::descriptor::FixedWidthSchemaDescription;
use crate::error::{LinkageError, Result};

/// Character range of one column within a line
///
/// Only the builder creates spans, so `start + length` always fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnSpan {
    start: usize,
    length: usize,
}

impl ColumnSpan {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// One past the last character of the column
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Layout of a file whose columns sit at fixed character offsets
///
/// Spans may overlap and need not be contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthFileSchema {
    record: RecordSchema,
    spans: Vec<ColumnSpan>,
}

impl FixedWidthFileSchema {
    pub fn builder() -> FixedWidthFileSchemaBuilder {
        FixedWidthFileSchemaBuilder::default()
    }

    /// Run the builder over a decoded description
    pub fn from_description(description: &FixedWidthSchemaDescription) -> Result<Self> {
        let mut b = Self::builder();
        for (name, start, length) in &description.columns {
            b.column(name.as_str(), *start, *length)?;
        }
        for name in &description.blocking_fields {
            b.blocking_field(name.as_str())?;
        }
        for name in &description.id_fields {
            b.id_field(name.as_str())?;
        }
        b.build()
    }

    pub fn record(&self) -> &RecordSchema {
        &self.record
    }

    /// Spans in column order
    pub fn spans(&self) -> &[ColumnSpan] {
        &self.spans
    }

    pub fn span(&self, name: &str) -> Option<ColumnSpan> {
        self.record.column_index(name).map(|i| self.spans[i])
    }

    /// Canonical description of this layout
    pub fn describe(&self) -> FixedWidthSchemaDescription {
        FixedWidthSchemaDescription {
            columns: self
                .record
                .columns()
                .iter()
                .zip(&self.spans)
                .map(|(name, span)| (name.clone(), span.start(), span.length()))
                .collect(),
            blocking_fields: self.record.blocking_fields().to_vec(),
            id_fields: self.record.id_fields().to_vec(),
        }
    }
}

/// Accumulates columns for a [`FixedWidthFileSchema`]
#[derive(Debug, Default)]
pub struct FixedWidthFileSchemaBuilder {
    record: RecordSchemaBuilder,
    spans: Vec<ColumnSpan>,
}

impl FixedWidthFileSchemaBuilder {
    pub fn column(&mut self, name: impl Into<String>, start: usize, length: usize) -> Result<&mut Self> {
        let name = name.into();
        if length == 0 {
            return Err(LinkageError::EmptySpan(name));
        }
        if start.checked_add(length).is_none() {
            return Err(LinkageError::SpanOverflow { name, start, length });
        }
        self.record.column(name)?;
        self.spans.push(ColumnSpan { start, length });
        Ok(self)
    }

    pub fn blocking_field(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.record.blocking_field(name.into())?;
        Ok(self)
    }

    pub fn id_field(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.record.id_field(name.into())?;
        Ok(self)
    }

    pub fn build(self) -> Result<FixedWidthFileSchema> {
        let record = self.record.build("fixed-width schema")?;
        tracing::debug!(columns = record.columns().len(), "built fixed-width schema");
        Ok(FixedWidthFileSchema {
            record,
            spans: self.spans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let mut b = FixedWidthFileSchema::builder();
        b.column("name", 0, 10)
            .unwrap()
            .column("dob", 10, 8)
            .unwrap()
            .blocking_field("dob")
            .unwrap();
        let schema = b.build().unwrap();

        assert_eq!(schema.record().columns(), ["name", "dob"]);
        assert_eq!(schema.span("dob"), Some(ColumnSpan { start: 10, length: 8 }));
        assert_eq!(schema.span("dob").unwrap().end(), 18);
        assert!(!schema.record().has_id());
    }

    #[test]
    fn test_overlapping_spans_allowed() {
        let mut b = FixedWidthFileSchema::builder();
        b.column("date", 0, 8).unwrap();
        b.column("year", 0, 4).unwrap();
        assert_eq!(b.build().unwrap().spans().len(), 2);
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut b = FixedWidthFileSchema::builder();
        assert!(matches!(b.column("x", 3, 0), Err(LinkageError::EmptySpan(n)) if n == "x"));
    }

    #[test]
    fn test_span_past_usize_rejected() {
        let mut b = FixedWidthFileSchema::builder();
        let err = b.column("tail", usize::MAX, 1).unwrap_err();
        assert!(matches!(err, LinkageError::SpanOverflow { start: usize::MAX, length: 1, .. }));

        b.column("last", usize::MAX - 1, 1).unwrap();
        let schema = b.build().unwrap();
        assert_eq!(schema.span("last").unwrap().end(), usize::MAX);
        assert!(schema.span("tail").is_none());
    }

    #[test]
    fn test_describe_preserves_order() {
        let description = FixedWidthSchemaDescription {
            columns: vec![("b".into(), 5, 5), ("a".into(), 0, 5)],
            blocking_fields: vec!["a".into()],
            id_fields: vec!["b".into()],
        };
        let schema = FixedWidthFileSchema::from_description(&description).unwrap();
        assert_eq!(schema.describe(), description);
    }
}
