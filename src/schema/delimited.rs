//! Delimited (CSV-like) file layouts

use super::record::{RecordSchema, RecordSchemaBuilder};
use crate::descriptor::DelimitedSchemaDescription;
use crate::error::Result;

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_HEADER: bool = false;

/// Layout of a file whose columns are separated by a delimiter
///
/// Column names are always given explicitly; `header` only says whether the
/// first physical line must be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedFileSchema {
    record: RecordSchema,
    delimiter: char,
    header: bool,
}

impl DelimitedFileSchema {
    pub fn builder() -> DelimitedFileSchemaBuilder {
        DelimitedFileSchemaBuilder::default()
    }

    /// Run the builder over a decoded description
    pub fn from_description(description: &DelimitedSchemaDescription) -> Result<Self> {
        let mut b = Self::builder();
        for name in &description.columns {
            b.column(name.as_str())?;
        }
        for name in &description.blocking_fields {
            b.blocking_field(name.as_str())?;
        }
        for name in &description.id_fields {
            b.id_field(name.as_str())?;
        }
        if let Some(d) = description.delimiter {
            b.delimiter(d);
        }
        if let Some(h) = description.header {
            b.header(h);
        }
        b.build()
    }

    pub fn record(&self) -> &RecordSchema {
        &self.record
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Whether the first line is a header to skip
    pub fn header(&self) -> bool {
        self.header
    }

    /// Canonical description of this layout, defaults made explicit
    pub fn describe(&self) -> DelimitedSchemaDescription {
        DelimitedSchemaDescription {
            columns: self.record.columns().to_vec(),
            blocking_fields: self.record.blocking_fields().to_vec(),
            id_fields: self.record.id_fields().to_vec(),
            delimiter: Some(self.delimiter),
            header: Some(self.header),
        }
    }
}

/// Accumulates columns and format flags for a [`DelimitedFileSchema`]
#[derive(Debug)]
pub struct DelimitedFileSchemaBuilder {
    record: RecordSchemaBuilder,
    delimiter: char,
    header: bool,
}

impl Default for DelimitedFileSchemaBuilder {
    fn default() -> Self {
        Self {
            record: RecordSchemaBuilder::default(),
            delimiter: DEFAULT_DELIMITER,
            header: DEFAULT_HEADER,
        }
    }
}

impl DelimitedFileSchemaBuilder {
    pub fn column(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.record.column(name.into())?;
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

    pub fn delimiter(&mut self, delimiter: char) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn header(&mut self, header: bool) -> &mut Self {
        self.header = header;
        self
    }

    pub fn build(self) -> Result<DelimitedFileSchema> {
        let record = self.record.build("delimited schema")?;
        tracing::debug!(
            columns = record.columns().len(),
            delimiter = %self.delimiter,
            header = self.header,
            "built delimited schema"
        );
        Ok(DelimitedFileSchema {
            record,
            delimiter: self.delimiter,
            header: self.header,
        })
    }
}
