//! Script façade: validate, build, bind, save
//!
//! The free functions compile a single description. A [`Script`] adds a
//! name → object environment so that comparators can refer to schemas built
//! earlier, and [`Script::run`] executes a JSON script document:
//!
//! ```json
//! [
//!   {"let": "census", "newFixedWidthFileSchema": "census-schema.json"},
//!   {"let": "survey", "newDelimitedFileSchema": {"columns": ["name", "dob"]}},
//!   {"let": "cmp", "newRecordComparator": {
//!       "schema": [{"ref": "census"}, {"ref": "survey"}],
//!       "compare": [["name", "STRING"], ["dob", "YEAR"]]
//!   }},
//!   {"save": "census", "path": "census-out.json"},
//!   {"run": "more.json"}
//! ]
//! ```
//!
//! String descriptions and every path are resolved against the directory of
//! the script being run.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::checksum::Checksum;
use crate::comparator::RecordComparator;
use crate::config::{LinkageConfig, OutputFormat};
use crate::descriptor::{
    DelimitedSchemaDescription, FixedWidthSchemaDescription, RecordComparatorDescription,
};
use crate::error::{LinkageError, Result};
use crate::schema::{DelimitedFileSchema, FileSchema, FixedWidthFileSchema};
use crate::serialize;
use crate::validate::{validate, DescriptorKind};

/// Any object the façade can produce
#[derive(Debug, Clone)]
pub enum Compiled {
    Schema(Arc<FileSchema>),
    Comparator(Arc<RecordComparator>),
}

impl Compiled {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Compiled::Schema(s) => match s.as_ref() {
                FileSchema::FixedWidth(_) => "fixed-width schema",
                FileSchema::Delimited(_) => "delimited schema",
            },
            Compiled::Comparator(_) => "record comparator",
        }
    }

    pub fn as_schema(&self) -> Option<&Arc<FileSchema>> {
        match self {
            Compiled::Schema(s) => Some(s),
            Compiled::Comparator(_) => None,
        }
    }

    pub fn as_comparator(&self) -> Option<&Arc<RecordComparator>> {
        match self {
            Compiled::Comparator(c) => Some(c),
            Compiled::Schema(_) => None,
        }
    }
}

impl From<FileSchema> for Compiled {
    fn from(schema: FileSchema) -> Self {
        Compiled::Schema(Arc::new(schema))
    }
}

impl From<RecordComparator> for Compiled {
    fn from(comparator: RecordComparator) -> Self {
        Compiled::Comparator(Arc::new(comparator))
    }
}

/// Validate and build a fixed-width file schema
pub fn new_fixed_width_file_schema(description: &Value) -> Result<FileSchema> {
    validate(DescriptorKind::FixedWidthSchema, description)?;
    let description: FixedWidthSchemaDescription = serde_json::from_value(description.clone())?;
    Ok(FixedWidthFileSchema::from_description(&description)?.into())
}

/// Validate and build a delimited file schema
pub fn new_delimited_file_schema(description: &Value) -> Result<FileSchema> {
    validate(DescriptorKind::DelimitedSchema, description)?;
    let description: DelimitedSchemaDescription = serde_json::from_value(description.clone())?;
    Ok(DelimitedFileSchema::from_description(&description)?.into())
}

/// Validate and build a record comparator whose schemas are given inline
pub fn new_record_comparator(description: &Value) -> Result<RecordComparator> {
    Script::new().new_record_comparator(description)
}

/// Read and parse a JSON description file
pub fn load(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LinkageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        if source.is_io() {
            LinkageError::Read {
                path: path.to_path_buf(),
                source: source.into(),
            }
        } else {
            LinkageError::Parse {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Write the canonical description of a schema as one line of JSON
pub fn save(object: &Compiled, path: impl AsRef<Path>) -> Result<Checksum> {
    serialize::write(object, path.as_ref(), OutputFormat::Compact)
}

/// Raw statement as it appears in a script document
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct StatementDoc {
    #[serde(rename = "let")]
    binding: Option<String>,
    new_fixed_width_file_schema: Option<Value>,
    new_delimited_file_schema: Option<Value>,
    new_record_comparator: Option<Value>,
    save: Option<String>,
    path: Option<PathBuf>,
    run: Option<PathBuf>,
}

#[derive(Debug)]
enum Statement {
    Define {
        binding: Option<String>,
        kind: DescriptorKind,
        source: Value,
    },
    Save { name: String, path: PathBuf },
    Run(PathBuf),
}

impl StatementDoc {
    fn into_statement(self, index: usize) -> Result<Statement> {
        let invalid = |reason: &str| LinkageError::Statement {
            index,
            reason: reason.to_string(),
        };

        let mut defines = [
            (DescriptorKind::FixedWidthSchema, self.new_fixed_width_file_schema),
            (DescriptorKind::DelimitedSchema, self.new_delimited_file_schema),
            (DescriptorKind::RecordComparator, self.new_record_comparator),
        ]
        .into_iter()
        .filter_map(|(kind, source)| source.map(|s| (kind, s)));

        let define = defines.next();
        let operations = usize::from(define.is_some())
            + defines.count()
            + usize::from(self.save.is_some())
            + usize::from(self.run.is_some());
        if operations != 1 {
            return Err(invalid("expected exactly one operation"));
        }

        if let Some((kind, source)) = define {
            if self.path.is_some() {
                return Err(invalid("'path' only applies to 'save'"));
            }
            return Ok(Statement::Define {
                binding: self.binding,
                kind,
                source,
            });
        }

        if self.binding.is_some() {
            return Err(invalid("'let' only applies to newFixedWidthFileSchema, newDelimitedFileSchema and newRecordComparator"));
        }

        match (self.save, self.path, self.run) {
            (Some(name), Some(path), None) => Ok(Statement::Save { name, path }),
            (Some(_), None, None) => Err(invalid("'save' needs a 'path'")),
            (None, None, Some(path)) => Ok(Statement::Run(path)),
            _ => Err(invalid("'path' only applies to 'save'")),
        }
    }
}

/// Environment of named schemas and comparators
#[derive(Debug, Clone)]
pub struct Script {
    bindings: BTreeMap<String, Compiled>,
    format: OutputFormat,
    max_depth: usize,
    depth: usize,
}

impl Default for Script {
    fn default() -> Self {
        Self::with_config(&LinkageConfig::default())
    }
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &LinkageConfig) -> Self {
        Self {
            bindings: BTreeMap::new(),
            format: config.output.format,
            max_depth: config.script.max_depth,
            depth: 0,
        }
    }

    /// Bind `object` to `name`, replacing any earlier binding
    pub fn bind(&mut self, name: impl Into<String>, object: impl Into<Compiled>) {
        let name = name.into();
        let object = object.into();
        tracing::debug!(name = %name, kind = object.kind_name(), "bound");
        self.bindings.insert(name, object);
    }

    pub fn get(&self, name: &str) -> Option<&Compiled> {
        self.bindings.get(name)
    }

    /// Schema bound to `name`
    pub fn schema(&self, name: &str) -> Result<Arc<FileSchema>> {
        match self.bindings.get(name) {
            Some(Compiled::Schema(s)) => Ok(Arc::clone(s)),
            Some(Compiled::Comparator(_)) => Err(LinkageError::NotASchema(name.to_string())),
            None => Err(LinkageError::Unbound(name.to_string())),
        }
    }

    /// Comparator bound to `name`
    pub fn comparator(&self, name: &str) -> Result<Arc<RecordComparator>> {
        match self.bindings.get(name) {
            Some(Compiled::Comparator(c)) => Ok(Arc::clone(c)),
            Some(Compiled::Schema(_)) => Err(LinkageError::NotAComparator(name.to_string())),
            None => Err(LinkageError::Unbound(name.to_string())),
        }
    }

    /// Bound names, sorted
    pub fn ls(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }

    pub fn new_fixed_width_file_schema(&self, description: &Value) -> Result<FileSchema> {
        new_fixed_width_file_schema(description)
    }

    pub fn new_delimited_file_schema(&self, description: &Value) -> Result<FileSchema> {
        new_delimited_file_schema(description)
    }

    /// Validate and build a record comparator
    ///
    /// Schema entries may be `{"ref": name}` or inline schema descriptions.
    /// A single entry compares a file against itself.
    pub fn new_record_comparator(&self, description: &Value) -> Result<RecordComparator> {
        validate(DescriptorKind::RecordComparator, description)?;
        let description: RecordComparatorDescription = serde_json::from_value(description.clone())?;

        let (first, second) = description.schema.sides();
        let (schema1, schema2) = match second {
            Some(value) => (
                self.resolve_schema(first, "/schema/0")?,
                self.resolve_schema(value, "/schema/1")?,
            ),
            None => {
                let schema = self.resolve_schema(first, "/schema")?;
                (Arc::clone(&schema), schema)
            }
        };

        RecordComparator::from_description(&description, schema1, schema2)
    }

    /// `pointer` locates `value` in the comparator description, for error paths
    fn resolve_schema(&self, value: &Value, pointer: &str) -> Result<Arc<FileSchema>> {
        if let Some(name) = value.get("ref").and_then(Value::as_str) {
            return self.schema(name);
        }

        let fixed_width = value
            .get("columns")
            .and_then(Value::as_array)
            .and_then(|columns| columns.first())
            .map_or(false, Value::is_array);

        let schema = if fixed_width {
            new_fixed_width_file_schema(value)
        } else {
            new_delimited_file_schema(value)
        };
        schema.map(Arc::new).map_err(|e| e.within(pointer))
    }

    /// Save the schema bound to `name`
    pub fn save(&self, name: &str, path: impl AsRef<Path>) -> Result<Checksum> {
        let object = self
            .bindings
            .get(name)
            .ok_or_else(|| LinkageError::Unbound(name.to_string()))?;
        serialize::write(object, path.as_ref(), self.format)
    }

    /// Execute a script document, returning the object produced last
    pub fn run(&mut self, path: impl AsRef<Path>) -> Result<Option<Compiled>> {
        let path = path.as_ref();
        if self.depth >= self.max_depth {
            return Err(LinkageError::TooDeep(self.max_depth));
        }

        let document = load(path)?;
        let Value::Array(items) = document else {
            return Err(LinkageError::Statement {
                index: 0,
                reason: "a script is a JSON array of statements".to_string(),
            });
        };

        let statements = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<StatementDoc>(item)
                    .map_err(|e| LinkageError::Statement {
                        index,
                        reason: e.to_string(),
                    })
                    .and_then(|doc| doc.into_statement(index))
            })
            .collect::<Result<Vec<_>>>()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::info!(script = %path.display(), statements = statements.len(), "running script");

        self.depth += 1;
        let result = self.execute(statements, base);
        self.depth -= 1;

        if let Err(e) = &result {
            tracing::warn!(script = %path.display(), error = %e, "script aborted");
        }
        result
    }

    fn execute(&mut self, statements: Vec<Statement>, base: &Path) -> Result<Option<Compiled>> {
        let mut last = None;

        for statement in statements {
            match statement {
                Statement::Define {
                    binding,
                    kind,
                    source,
                } => {
                    let description = match source {
                        Value::String(file) => load(base.join(file))?,
                        inline => inline,
                    };
                    let object: Compiled = match kind {
                        DescriptorKind::FixedWidthSchema => {
                            self.new_fixed_width_file_schema(&description)?.into()
                        }
                        DescriptorKind::DelimitedSchema => {
                            self.new_delimited_file_schema(&description)?.into()
                        }
                        DescriptorKind::RecordComparator => {
                            self.new_record_comparator(&description)?.into()
                        }
                    };
                    tracing::info!(kind = %kind, binding = ?binding, "compiled description");
                    if let Some(name) = binding {
                        self.bind(name, object.clone());
                    }
                    last = Some(object);
                }
                Statement::Save { name, path } => {
                    self.save(&name, base.join(path))?;
                }
                Statement::Run(path) => {
                    last = self.run(base.join(path))?;
                }
            }
        }

        Ok(last)
    }
}
