//! Record-linkage configuration compiler
//!
//! Compiles small JSON descriptions of file layouts and record comparison
//! plans into immutable objects for a matching engine, and writes file
//! layouts back out as canonical descriptions.
//!
//! ## Pipeline
//!
//! ```text
//! raw JSON ──validate──▶ typed description ──builder──▶ FileSchema / RecordComparator
//!                                                           │
//!                                     canonical JSON ◀──describe/serialize (schemas only)
//! ```
//!
//! ## Example
//!
//! ```
//! use linkage_config::{new_fixed_width_file_schema, new_record_comparator};
//! use serde_json::json;
//!
//! let census = json!({
//!     "columns": [["name", 0, 10], ["dob", 10, 8]],
//!     "blockingFields": ["dob"],
//!     "idFields": ["name"]
//! });
//! let schema = new_fixed_width_file_schema(&census).unwrap();
//! assert_eq!(schema.columns().len(), 2);
//!
//! let cmp = new_record_comparator(&json!({
//!     "schema": census,
//!     "compare": [["name", "STRING"], ["dob", "YEAR"]]
//! }))
//! .unwrap();
//! assert_eq!(cmp.len(), 2);
//! ```

pub mod checksum;
pub mod comparator;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod schema;
pub mod script;
pub mod serialize;
pub mod validate;

pub use checksum::Checksum;
pub use comparator::{CompareStep, RecordComparator, RecordComparatorBuilder};
pub use config::{LinkageConfig, OutputFormat};
pub use descriptor::{
    ComparatorDescriptor, DelimitedSchemaDescription, FixedWidthSchemaDescription,
    RecordComparatorDescription, SchemaDescription, StandardComparator,
};
pub use error::{ErrorKind, LinkageError, Result};
pub use schema::{
    ColumnSpan, DelimitedFileSchema, DelimitedFileSchemaBuilder, FileSchema,
    FixedWidthFileSchema, FixedWidthFileSchemaBuilder, RecordSchema,
};
pub use script::{
    load, new_delimited_file_schema, new_fixed_width_file_schema, new_record_comparator, save,
    Compiled, Script,
};
pub use validate::{validate, DescriptorKind};
