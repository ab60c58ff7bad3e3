pub mod config;
pub mod env;
pub mod logger;
pub mod settings_toml;

pub use config::*;
pub use env::{apply_env_to_settings, apply_env_with, env_value, load_dotenv};
pub use logger::{set_verbose, setup_logging};
pub use settings_toml::settings_from_toml_str;
