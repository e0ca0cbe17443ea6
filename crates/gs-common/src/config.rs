use std::collections::HashMap;
use std::env;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub storage_root: String,
    pub public_file_base: String,
    pub session_ttl_hours: i64,
}

impl ServerConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_map(&env_map())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> AppResult<Self> {
        Ok(Self {
            bind_addr: get(vars, "GS_BIND_ADDR", "0.0.0.0:8080"),
            database_url: get(vars, "GS_DATABASE_URL", "sqlite://greenstay.db?mode=rwc"),
            storage_root: get(vars, "GS_STORAGE_ROOT", "./bill-files"),
            public_file_base: get(vars, "GS_PUBLIC_FILE_BASE", "file://bill-files"),
            session_ttl_hours: get(vars, "GS_SESSION_TTL_HOURS", "24")
                .parse()
                .unwrap_or(24),
        })
    }
}

fn env_map() -> HashMap<String, String> {
    env::vars().collect()
}

fn get(vars: &HashMap<String, String>, key: &str, default: &str) -> String {
    vars.get(key)
        .cloned()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::ServerConfig;

    #[test]
    fn server_config_defaults_apply() {
        let vars = HashMap::new();
        let cfg = ServerConfig::from_map(&vars).expect("server config");

        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.database_url, "sqlite://greenstay.db?mode=rwc");
        assert_eq!(cfg.storage_root, "./bill-files");
        assert_eq!(cfg.session_ttl_hours, 24);
    }

    #[test]
    fn server_config_reads_overrides() {
        let mut vars = HashMap::new();
        vars.insert("GS_BIND_ADDR".into(), "127.0.0.1:9090".into());
        vars.insert("GS_SESSION_TTL_HOURS".into(), "6".into());

        let cfg = ServerConfig::from_map(&vars).expect("server config");
        assert_eq!(cfg.bind_addr, "127.0.0.1:9090");
        assert_eq!(cfg.session_ttl_hours, 6);
    }

    #[test]
    fn bad_ttl_falls_back_to_default() {
        let mut vars = HashMap::new();
        vars.insert("GS_SESSION_TTL_HOURS".into(), "soon".into());

        let cfg = ServerConfig::from_map(&vars).expect("server config");
        assert_eq!(cfg.session_ttl_hours, 24);
    }
}
