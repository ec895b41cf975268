use std::env;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    /// HS256 secret for magic-link codes. A temporary one is generated when unset.
    pub magic_link_secret: Option<String>,
    pub magic_link_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            session_ttl_hours: env::var("CURIO_SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(168),
            magic_link_secret: env::var("CURIO_MAGIC_LINK_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            magic_link_ttl_minutes: env::var("CURIO_MAGIC_LINK_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(15),
        }
    }
}
