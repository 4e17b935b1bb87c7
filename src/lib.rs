pub mod ast;
pub mod bridge;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod store;
pub mod utils;
pub mod value;

pub use ast::Document;
pub use bridge::{build_metadata_pair, run_script, run_templated_script, Bridge, MetadataPair};
pub use config::{RunConfig, Syntax};
pub use error::GeeError;
pub use parser::parse_template;
pub use render::Renderer;
pub use store::Store;
pub use value::Value;
