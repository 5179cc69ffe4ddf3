//! Column, blocking and id bookkeeping shared by both file layouts

use std::collections::HashMap;

use crate::error::{LinkageError, Result};

/// Which columns a record has and which of them are blocking or id fields
///
/// Throughout this crate "column" means a column of incoming data and
/// "field" means a column that can take part in a record comparison, i.e.
/// one that is neither a blocking field nor an id field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    columns: Vec<String>,
    blocking_fields: Vec<String>,
    id_fields: Vec<String>,
    fields: Vec<String>,
    column_index: HashMap<String, usize>,
    field_index: HashMap<String, usize>,
}

impl RecordSchema {
    /// Column names in source order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn blocking_fields(&self) -> &[String] {
        &self.blocking_fields
    }

    pub fn id_fields(&self) -> &[String] {
        &self.id_fields
    }

    /// Columns that are neither blocking nor id fields, in column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether any id field was declared
    pub fn has_id(&self) -> bool {
        !self.id_fields.is_empty()
    }

    /// Position of `name` in a source row
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Position of `name` within [`fields`](Self::fields)
    ///
    /// `None` for blocking and id fields as well as for unknown names.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }
}

/// Mutable accumulator behind both file schema builders
///
/// Enforces unique column names and that blocking and id fields name a
/// column declared earlier.
#[derive(Debug, Default)]
pub(crate) struct RecordSchemaBuilder {
    columns: Vec<String>,
    blocking_fields: Vec<String>,
    id_fields: Vec<String>,
    column_index: HashMap<String, usize>,
}

impl RecordSchemaBuilder {
    pub(crate) fn column(&mut self, name: String) -> Result<()> {
        if self.column_index.contains_key(&name) {
            return Err(LinkageError::DuplicateColumn(name));
        }
        self.column_index.insert(name.clone(), self.columns.len());
        self.columns.push(name);
        Ok(())
    }

    pub(crate) fn blocking_field(&mut self, name: String) -> Result<()> {
        self.require_column("blocking", &name)?;
        self.blocking_fields.push(name);
        Ok(())
    }

    pub(crate) fn id_field(&mut self, name: String) -> Result<()> {
        self.require_column("id", &name)?;
        self.id_fields.push(name);
        Ok(())
    }

    fn require_column(&self, role: &'static str, name: &str) -> Result<()> {
        if self.column_index.contains_key(name) {
            Ok(())
        } else {
            Err(LinkageError::UnknownColumn {
                role,
                name: name.to_string(),
            })
        }
    }

    pub(crate) fn build(self, what: &'static str) -> Result<RecordSchema> {
        if self.columns.is_empty() {
            return Err(LinkageError::Empty(what, "columns"));
        }

        let fields: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !self.blocking_fields.contains(c) && !self.id_fields.contains(c))
            .cloned()
            .collect();
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Ok(RecordSchema {
            columns: self.columns,
            blocking_fields: self.blocking_fields,
            id_fields: self.id_fields,
            fields,
            column_index: self.column_index,
            field_index,
        })
    }
}
