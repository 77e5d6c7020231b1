pub mod loader;
pub mod schema;

pub use loader::{discover, find_config, load_from_path, load_from_str, ConfigError, CONFIG_FILE_NAME};
pub use schema::{
    CodegenConfig, FileHeaderSection, FormatSection, MergeSection, NamingSection, SourceSection,
    ValidationError, ValidationIssue,
};
