use std::env;

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP relay host; mail is only logged when unset
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("CURIO_SMTP_HOST")
                .ok()
                .filter(|h| !h.trim().is_empty()),
            smtp_port: env::var("CURIO_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: env::var("CURIO_SMTP_USERNAME").ok(),
            smtp_password: env::var("CURIO_SMTP_PASSWORD").ok(),
            from_address: env::var("CURIO_MAIL_FROM")
                .unwrap_or_else(|_| "Curio <no-reply@curio.local>".to_string()),
        }
    }
}
