use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub json_logs: bool,
    /// Directive used when `RUST_LOG` is unset or unparsable.
    pub default_filter: String,
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str, default_service_version: &str) -> Self {
        Self::from_lookup(default_service_name, default_service_version, |key| {
            env::var(key).ok()
        })
    }

    pub fn from_lookup<F>(
        default_service_name: &str,
        default_service_version: &str,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = lookup("CARDKIT_SERVICE_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_service_name.to_string());
        let json_logs = lookup("LOG_FORMAT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "text" | "pretty" | "plain"))
            .unwrap_or(true);

        Self {
            service_name,
            service_version: default_service_version.to_string(),
            json_logs,
            default_filter: "info".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_the_default_format() {
        let cfg = TelemetryConfig::from_lookup("cardkit", "0.1.0", |_| None);
        assert!(cfg.json_logs);
        assert_eq!(cfg.service_name, "cardkit");
        assert_eq!(cfg.default_filter, "info");
    }

    #[test]
    fn plain_formats_disable_json() {
        for format in ["text", "PRETTY", "plain"] {
            let cfg = TelemetryConfig::from_lookup("cardkit", "0.1.0", |key| {
                (key == "LOG_FORMAT").then(|| format.to_string())
            });
            assert!(!cfg.json_logs, "{format}");
        }
    }

    #[test]
    fn service_name_can_be_overridden() {
        let cfg = TelemetryConfig::from_lookup("cardkit", "0.1.0", |key| {
            (key == "CARDKIT_SERVICE_NAME").then(|| "card-bot".to_string())
        });
        assert_eq!(cfg.service_name, "card-bot");
    }
}
