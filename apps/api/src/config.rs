use std::str::FromStr;

use anyhow::{Context, Result};

use crate::pagination::ProbeBackend;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// AI endpoints answer 503 when unset.
    pub anthropic_api_key: Option<String>,
    /// Quiet period before a submitted draft is paginated.
    pub preview_debounce_ms: u64,
    /// `command` (default) or `metric`. The metric estimate is opt-in only.
    pub probe_backend: ProbeBackend,
    /// Headless renderer command used to measure pages.
    pub probe_command: Option<String>,
    /// Stylesheet linked into probe documents so the renderer sees the template CSS.
    pub probe_stylesheet: Option<String>,
    pub page_padding_px: f32,
    /// Let a company's positions fall on different pages.
    pub split_company_groups: bool,
    /// Hide section headings on pages without any of the section's entries.
    pub omit_empty_sections: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Config {
            port: parse_or(&optional, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            preview_debounce_ms: parse_or(&optional, "PREVIEW_DEBOUNCE_MS", 300)?,
            probe_backend: parse_or(&optional, "PROBE_BACKEND", ProbeBackend::Command)?,
            probe_command: optional("PROBE_COMMAND"),
            probe_stylesheet: optional("PROBE_STYLESHEET"),
            page_padding_px: parse_or(&optional, "PAGE_PADDING_PX", 0.0)?,
            split_company_groups: parse_or(&optional, "SPLIT_COMPANY_GROUPS", false)?,
            omit_empty_sections: parse_or(&optional, "OMIT_EMPTY_SECTIONS", false)?,
        })
    }
}

fn parse_or<T>(optional: &dyn Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.preview_debounce_ms, 300);
        assert_eq!(config.page_padding_px, 0.0);
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.probe_backend, ProbeBackend::Command);
        assert!(config.probe_command.is_none());
        assert!(!config.split_company_groups);
        assert!(!config.omit_empty_sections);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PREVIEW_DEBOUNCE_MS", "50"),
            ("PROBE_COMMAND", "node measure.js"),
            ("PAGE_PADDING_PX", "24.5"),
            ("SPLIT_COMPANY_GROUPS", "true"),
            ("PROBE_BACKEND", "metric"),
            ("OMIT_EMPTY_SECTIONS", "true"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.preview_debounce_ms, 50);
        assert_eq!(config.probe_command.as_deref(), Some("node measure.js"));
        assert_eq!(config.page_padding_px, 24.5);
        assert!(config.split_company_groups);
        assert_eq!(config.probe_backend, ProbeBackend::Metric);
        assert!(config.omit_empty_sections);
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config(&[("ANTHROPIC_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("SPLIT_COMPANY_GROUPS", "maybe")]).is_err());
        assert!(config(&[("PROBE_BACKEND", "guess")]).is_err());
    }
}
