//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{CONFIG_KEYS, Config};
use crate::error::{ConsoleError, Result};

/// Reject unknown keys, suggesting dot notation for `section_key` typos
fn validate_config_key(key: &str) -> Result<&str> {
    if CONFIG_KEYS.contains(&key) {
        return Ok(key);
    }

    if let Some(pos) = key.find('_') {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        if CONFIG_KEYS.contains(&dot_version.as_str()) {
            return Err(ConsoleError::Config(format!(
                "invalid config key '{key}'. Use dot notation: '{dot_version}'"
            )));
        }
    }

    Err(ConsoleError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    )))
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let mut json_output = Map::new();
    let mut text_output = format!("{}\n\n", "Configuration:".cyan().bold());

    for key in CONFIG_KEYS {
        let value = config.get(key)?;
        text_output.push_str(&format!("{}: {}\n", key.cyan(), value));
        json_output.insert((*key).to_string(), Value::String(value));
    }
    json_output.insert(
        "config_file".to_string(),
        Value::String(Config::config_path().display().to_string()),
    );

    text_output.push('\n');
    text_output.push_str(
        &format!("Config file: {}", Config::config_path().display())
            .dimmed()
            .to_string(),
    );

    CommandOutput::new(Value::Object(json_output))
        .with_text(text_output)
        .print(output)
}

/// Print a single configuration value
pub fn cmd_config_get(key: &str) -> Result<()> {
    validate_config_key(key)?;
    let config = Config::load()?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let shown = config.get(key)?;
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_key() {
        assert!(validate_config_key("queue.rows_per_page").is_ok());
        assert!(validate_config_key("api_base_url").is_ok());

        let err = validate_config_key("queue_rows_per_page").unwrap_err();
        assert!(err.to_string().contains("queue.rows_per_page"));

        let err = validate_config_key("theme").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }
}
