pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str, validate_config};
pub use schema::{
    ClassifierConfig, Config, MailboxAuthSettings, MailboxConfig, TriageConfig,
    DEFAULT_PHISHY_THRESHOLD,
};
