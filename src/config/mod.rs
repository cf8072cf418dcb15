pub mod settings;

pub use settings::{
    default_config_path, GenerationConfig, LoggingConfig, Provider, ReportConfig, Settings,
    StorageConfig,
};
