use qrcode::EcLevel;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub capture: CaptureConfig,
    pub render: RenderConfig,
    pub store: StoreConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    /// Public origin that scanned QR codes point at, e.g. `https://crm.example.com`.
    pub base_origin: String,
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub default_size: u32,
    pub error_correction: EcLevel,
    /// Renders with fewer dark pixels than this are treated as blank.
    pub blank_threshold: usize,
    pub surface_attempts: u32,
    pub surface_poll: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub leads_file: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_size: 256,
            error_correction: EcLevel::M,
            blank_threshold: 100,
            surface_attempts: 10,
            surface_poll: Duration::from_millis(100),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let base_url = "http://localhost:8080".to_string();
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                base_url: base_url.clone(),
            },
            capture: CaptureConfig {
                base_origin: base_url,
            },
            render: RenderConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let get_str = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let get_opt = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get_opt("SERVER_PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("SERVER_PORT '{v}' is not a valid port: {e}"))?,
            None => defaults.server.port,
        };
        let base_url = get_str("SERVER_BASE_URL", &defaults.server.base_url);

        let default_size = match get_opt("QR_SIZE") {
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("QR_SIZE '{v}' is not a pixel size: {e}"))?,
            None => defaults.render.default_size,
        };
        let error_correction = match get_opt("QR_EC_LEVEL") {
            Some(v) => parse_ec_level(&v)
                .ok_or_else(|| anyhow::anyhow!("QR_EC_LEVEL '{v}' must be one of L, M, Q, H"))?,
            None => defaults.render.error_correction,
        };
        let blank_threshold = get_opt("QR_BLANK_THRESHOLD")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.render.blank_threshold);
        let surface_attempts = get_opt("QR_SURFACE_ATTEMPTS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.render.surface_attempts);
        let surface_poll = get_opt("QR_SURFACE_POLL_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.render.surface_poll);

        Ok(AppConfig {
            server: ServerConfig {
                host: get_str("SERVER_HOST", &defaults.server.host),
                port,
                base_url: base_url.clone(),
            },
            capture: CaptureConfig {
                base_origin: get_str("CAPTURE_BASE_ORIGIN", &base_url),
            },
            render: RenderConfig {
                default_size,
                error_correction,
                blank_threshold,
                surface_attempts: surface_attempts.max(1),
                surface_poll,
            },
            store: StoreConfig {
                database_url: get_opt("DATABASE_URL"),
                leads_file: get_opt("LEADS_FILE").map(PathBuf::from),
            },
        })
    }
}

pub fn parse_ec_level(value: &str) -> Option<EcLevel> {
    match value.trim().to_ascii_uppercase().as_str() {
        "L" => Some(EcLevel::L),
        "M" => Some(EcLevel::M),
        "Q" => Some(EcLevel::Q),
        "H" => Some(EcLevel::H),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, anyhow::Error> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.capture.base_origin, "http://localhost:8080");
        assert_eq!(config.render.default_size, 256);
        assert_eq!(config.render.error_correction, EcLevel::M);
        assert!(config.store.database_url.is_none());
        assert!(config.store.leads_file.is_none());
    }

    #[test]
    fn test_capture_origin_follows_base_url() {
        let config = config_from(&[("SERVER_BASE_URL", "https://crm.example.com")]).unwrap();
        assert_eq!(config.capture.base_origin, "https://crm.example.com");

        let config = config_from(&[
            ("SERVER_BASE_URL", "https://crm.example.com"),
            ("CAPTURE_BASE_ORIGIN", "https://leads.example.com"),
        ])
        .unwrap();
        assert_eq!(config.capture.base_origin, "https://leads.example.com");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("SERVER_PORT", "eighty")]).is_err());
    }

    #[test]
    fn test_render_overrides() {
        let config = config_from(&[
            ("QR_EC_LEVEL", "h"),
            ("QR_SIZE", "512"),
            ("QR_SURFACE_ATTEMPTS", "0"),
            ("QR_SURFACE_POLL_MS", "5"),
        ])
        .unwrap();
        assert_eq!(config.render.error_correction, EcLevel::H);
        assert_eq!(config.render.default_size, 512);
        assert_eq!(config.render.surface_attempts, 1);
        assert_eq!(config.render.surface_poll, Duration::from_millis(5));
        assert!(config_from(&[("QR_EC_LEVEL", "X")]).is_err());
    }
}
