//! File schemas: how a row of input data maps onto named columns

mod delimited;
mod fixed_width;
mod record;

pub use delimited::{
    DelimitedFileSchema, DelimitedFileSchemaBuilder, DEFAULT_DELIMITER, DEFAULT_HEADER,
};
pub use fixed_width::{ColumnSpan, FixedWidthFileSchema, FixedWidthFileSchemaBuilder};
pub use record::RecordSchema;

use crate::descriptor::SchemaDescription;

/// A built, immutable file schema of either layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSchema {
    FixedWidth(FixedWidthFileSchema),
    Delimited(DelimitedFileSchema),
}

impl FileSchema {
    /// Column, blocking and id bookkeeping common to both layouts
    pub fn record(&self) -> &RecordSchema {
        match self {
            FileSchema::FixedWidth(s) => s.record(),
            FileSchema::Delimited(s) => s.record(),
        }
    }

    pub fn columns(&self) -> &[String] {
        self.record().columns()
    }

    pub fn blocking_fields(&self) -> &[String] {
        self.record().blocking_fields()
    }

    pub fn id_fields(&self) -> &[String] {
        self.record().id_fields()
    }

    pub fn has_id(&self) -> bool {
        self.record().has_id()
    }

    pub fn fields(&self) -> &[String] {
        self.record().fields()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.record().column_index(name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.record().field_index(name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.record().contains_column(name)
    }

    /// Short name of the layout
    pub fn layout(&self) -> &'static str {
        match self {
            FileSchema::FixedWidth(_) => "fixed-width",
            FileSchema::Delimited(_) => "delimited",
        }
    }

    /// Canonical description, accepted back by the matching builder
    pub fn describe(&self) -> SchemaDescription {
        match self {
            FileSchema::FixedWidth(s) => SchemaDescription::FixedWidth(s.describe()),
            FileSchema::Delimited(s) => SchemaDescription::Delimited(s.describe()),
        }
    }
}

impl From<FixedWidthFileSchema> for FileSchema {
    fn from(schema: FixedWidthFileSchema) -> Self {
        FileSchema::FixedWidth(schema)
    }
}

impl From<DelimitedFileSchema> for FileSchema {
    fn from(schema: DelimitedFileSchema) -> Self {
        FileSchema::Delimited(schema)
    }
}
