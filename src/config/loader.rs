//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HarvesterConfig;
use super::secret_string;
use crate::domain::errors::HarvesterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "FLICKR_HARVESTER_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`HarvesterConfig`]
/// 4. Applies `FLICKR_HARVESTER_*` environment overrides
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`HarvesterError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use flickr_harvester::config::load_config;
///
/// let config = load_config("harvester.toml").expect("Failed to load config");
/// println!("group: {}", config.flickr.group_id);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HarvesterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HarvesterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HarvesterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn parse_config(contents: &str) -> Result<HarvesterConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: HarvesterConfig = toml::from_str(&contents)
        .map_err(|e| HarvesterError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        HarvesterError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(HarvesterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn parsed_override<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_override(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            HarvesterError::Configuration(format!(
                "Environment variable {ENV_PREFIX}{key} has invalid value '{raw}'"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `FLICKR_HARVESTER_` prefix
///
/// Variables follow the pattern `FLICKR_HARVESTER_<SECTION>_<KEY>`, for
/// example `FLICKR_HARVESTER_FLICKR_API_KEY` or `FLICKR_HARVESTER_HARVEST_WORKERS`.
fn apply_env_overrides(config: &mut HarvesterConfig) -> Result<()> {
    if let Some(val) = env_override("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Flickr overrides
    if let Some(val) = env_override("FLICKR_API_KEY") {
        config.flickr.api_key = secret_string(val);
    }
    if let Some(val) = env_override("FLICKR_SHARED_SECRET") {
        config.flickr.shared_secret = Some(secret_string(val));
    }
    if let Some(val) = env_override("FLICKR_BASE_URL") {
        config.flickr.base_url = val;
    }
    if let Some(val) = env_override("FLICKR_GROUP_ID") {
        config.flickr.group_id = val;
    }
    if let Some(val) = env_override("FLICKR_USER_ID") {
        config.flickr.user_id = Some(val);
    }
    if let Some(per_page) = parsed_override("FLICKR_PER_PAGE")? {
        config.flickr.per_page = per_page;
    }

    // Harvest overrides
    if let Some(workers) = parsed_override("HARVEST_WORKERS")? {
        config.harvest.workers = workers;
    }
    if let Some(val) = env_override("HARVEST_OUTPUT_DIR") {
        config.harvest.output_dir = val;
    }
    if let Some(val) = env_override("HARVEST_OUTPUT_FILE") {
        config.harvest.output_file = val;
    }

    // Queue overrides
    if let Some(limit) = parsed_override("QUEUE_RATE_LIMIT")? {
        config.queue.rate_limit = limit;
    }
    if let Some(window) = parsed_override("QUEUE_RATE_WINDOW_MS")? {
        config.queue.rate_window_ms = window;
    }

    // Logging overrides
    if let Some(enabled) = parsed_override("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = env_override("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FH_LOADER_TEST_VAR", "test_value");
        let input = "api_key = \"${FH_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "api_key = \"test_value\"\n");
        std::env::remove_var("FH_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FH_LOADER_MISSING_VAR");
        let input = "api_key = \"${FH_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("FH_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FH_LOADER_COMMENTED_VAR");
        let input = "# api_key = \"${FH_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[flickr]
api_key = "key"
group_id = "806927@N20"
machine_tags = ["taxonomy:"]

[flickr.dates]
min_update_date = "2015-01-01"
max_update_date = ""
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.flickr.group_id, "806927@N20");
        assert_eq!(config.flickr.per_page, 100);
        assert_eq!(config.harvest.workers, 3);
        assert_eq!(config.queue.rate_limit, 10);
    }

    #[test]
    fn test_parse_config_rejects_bad_date() {
        let toml_content = r#"
[flickr]
api_key = "key"
group_id = "806927@N20"

[flickr.dates]
max_update_date = "2015/01/01"
"#;
        let err = parse_config(toml_content).unwrap_err();
        assert!(matches!(err, HarvesterError::Configuration(_)));
        assert!(err.to_string().contains("max_update_date"));
    }
}
