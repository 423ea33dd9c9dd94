use serde::Deserialize;

use crate::result::Result;

const PREFIX: &str = "ZETTA_";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub db_uri: String,
    pub db_database: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: i64,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_list_timeout_ms")]
    pub list_timeout_ms: u64,
    #[serde(default = "default_json_limit_bytes")]
    pub json_limit_bytes: usize,
}

fn default_port() -> u16 {
    3004
}

fn default_uploads_dir() -> String {
    String::from("uploads")
}

fn default_jwt_expiration_hours() -> i64 {
    24
}

fn default_frontend_url() -> String {
    String::from("http://localhost:3000")
}

fn default_app_name() -> String {
    String::from("ZettaNews")
}

fn default_admin_name() -> String {
    String::from("Admin")
}

fn default_admin_email() -> String {
    String::from("admin@example.com")
}

fn default_admin_password() -> String {
    String::from("admin123")
}

fn default_list_timeout_ms() -> u64 {
    5000
}

fn default_json_limit_bytes() -> usize {
    50 * 1024 * 1024
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Ok(envy::prefixed(PREFIX).from_env::<Config>()?)
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Config>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(PREFIX).from_iter::<_, Config>(pairs)?)
    }

    pub fn bind_name(&self) -> String {
        format!("{host}:{port}", host = self.host, port = self.port)
    }

    /// Public origin used to build `original_url` links.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.port),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut v = vec![
            ("ZETTA_HOST", "0.0.0.0"),
            ("ZETTA_DB_URI", "mongodb://localhost:27017"),
            ("ZETTA_DB_DATABASE", "zetta"),
            ("ZETTA_JWT_SECRET", "secret"),
        ];
        v.extend_from_slice(extra);
        v.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_pairs(pairs(&[])).unwrap();
        assert_eq!(3004, config.port);
        assert_eq!("uploads", config.uploads_dir);
        assert_eq!("0.0.0.0:3004", config.bind_name());
        assert_eq!("http://localhost:3004", config.base_url());
        assert_eq!(5000, config.list_timeout_ms);
    }

    #[test]
    fn test_base_url_override() {
        let config = Config::from_pairs(pairs(&[
            ("ZETTA_PORT", "8080"),
            ("ZETTA_BASE_URL", "https://cdn.example.com/"),
        ]))
        .unwrap();
        assert_eq!(8080, config.port);
        assert_eq!("https://cdn.example.com", config.base_url());
    }

    #[test]
    fn test_missing_required() {
        let only_host = vec![(String::from("ZETTA_HOST"), String::from("localhost"))];
        assert!(Config::from_pairs(only_host).is_err());
    }
}
