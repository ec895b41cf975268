use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from `CURIO_ALLOWED_ORIGINS` (comma-separated).
    /// When empty, any origin is allowed.
    pub allowed_origins: Vec<String>,
    /// Externally visible base URL, used to build magic links.
    pub public_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let allowed_origins = env::var("CURIO_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: env::var("CURIO_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("CURIO_API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            allowed_origins,
            public_url: env::var("CURIO_PUBLIC_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        }
    }

    /// Cookies get the `Secure` flag when the service is reached over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(public_url: &str) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: Vec::new(),
            public_url: public_url.to_string(),
        }
    }

    #[test]
    fn test_secure_cookies_follow_public_url() {
        assert!(config("https://curio.example.org").secure_cookies());
        assert!(!config("http://localhost:8000").secure_cookies());
    }
}
