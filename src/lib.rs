pub mod api;
pub mod code;
pub mod comments;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod render;
pub mod schema;
pub mod utils;

pub use api::{compile, compile_file, generate_externs, CompiledSchema, ExternsFile};
pub use config::{GeneratorConfig, Provenance};
pub use error::{ExternsError, ModelError, SchemaError};
pub use generator::ExternsGenerator;
