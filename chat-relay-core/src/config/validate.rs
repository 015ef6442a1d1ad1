//! Configuration validation rules.

use super::schema::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }
    if config.server.port == 0 {
        errors.push("server.port must be > 0".to_string());
    }

    let gemini = &config.providers.gemini;
    if gemini.api_base.trim().is_empty() {
        errors.push("providers.gemini.api_base must not be empty".to_string());
    }
    if gemini.timeout_secs == 0 {
        errors.push("providers.gemini.timeout_secs must be > 0".to_string());
    }
    if gemini.models.is_empty() {
        errors.push("providers.gemini.models must list at least one model".to_string());
    }
    if gemini.models.iter().any(|m| m.trim().is_empty()) {
        errors.push("providers.gemini.models must not contain empty ids".to_string());
    }
    if !gemini.models.is_empty() && !gemini.models.contains(&gemini.default_model) {
        errors.push(format!(
            "providers.gemini.default_model '{}' is not listed in providers.gemini.models",
            gemini.default_model
        ));
    }

    if config.chat.max_tokens == 0 {
        errors.push("chat.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&config.chat.temperature) {
        errors.push("chat.temperature must be in [0.0, 2.0]".to_string());
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "logging.level must be one of {}",
            LOG_LEVELS.join(", ")
        ));
    }
    let format = config.logging.format.to_ascii_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(format!(
            "logging.format must be one of {}",
            LOG_FORMATS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_default_model_must_be_listed() {
        let mut config = Config::default();
        config.providers.gemini.default_model = "gemini-ultra".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("providers.gemini.default_model"));
    }

    #[test]
    fn test_validate_aggregates_errors() {
        let mut config = Config::default();
        config.server.port = 0;
        config.chat.max_tokens = 0;
        config.logging.format = "xml".to_string();

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("server.port"));
        assert!(err.contains("chat.max_tokens"));
        assert!(err.contains("logging.format"));
    }

    #[test]
    fn test_validate_rejects_empty_model_list() {
        let mut config = Config::default();
        config.providers.gemini.models.clear();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("at least one model"));
    }
}
