const DEFAULT_PLAN_DAYS: u32 = 14;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub default_plan_days: u32,
    pub log_level: String,
    /// Directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let default_plan_days = env_u64("PLAN_DEFAULT_DAYS")
            .map(|v| v as u32)
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_PLAN_DAYS);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs_enabled = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs_enabled
            .then(|| std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()));

        Self {
            default_plan_days,
            log_level,
            log_dir,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_plan_days: DEFAULT_PLAN_DAYS,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_plan_days, 14);
        assert_eq!(config.log_level, "info");
        assert!(config.log_dir.is_none());
    }
}
