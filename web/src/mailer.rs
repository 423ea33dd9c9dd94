use async_trait::async_trait;

use crate::utils::{config::Config, result::Result};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        log::info!(target: "zetta", "mail to {}: {}\n{}", to, subject, body);
        Ok(())
    }
}

pub fn reset_url(config: &Config, token: &str, email: &str) -> String {
    format!(
        "{}/auth/reset-password?token={}&email={}",
        config.frontend_url.trim_end_matches('/'),
        token,
        email
    )
}

pub fn welcome(config: &Config, name: &str) -> (String, String) {
    (
        format!("Welcome to {}", config.app_name),
        format!("Hello {},\n\nYour {} account is ready.", name, config.app_name),
    )
}

pub fn password_reset(config: &Config, url: &str) -> (String, String) {
    (
        format!("{} password reset", config.app_name),
        format!(
            "Use the link below to reset your password. It expires in one hour.\n\n{}",
            url
        ),
    )
}
