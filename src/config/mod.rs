//! Configuration module for the gateway

use serde::{Deserialize, Deserializer};
use config::{Config, ConfigError, Environment, File};
use std::path::{Path, PathBuf};

use crate::domain::{FieldMap, MissingPricePolicy, SortPolicy};

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub airhub: AirhubSettings,
    pub qpay: QpaySettings,
    pub catalog: CatalogSettings,
    pub countries: CountrySettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Outbound HTTP transport shared by the vendor clients
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub rate_limit_per_minute: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            timeout_secs: 30,
            rate_limit_per_minute: 120,
        }
    }
}

/// Plan provider (Airhub) credentials and query tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirhubSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub partner_code: String,
    /// Country codes per plan query
    pub batch_size: usize,
    /// Plan queries in flight at once
    pub max_concurrency: usize,
    pub token_ttl_secs: u64,
    /// Code universe; empty means every code of the continent table
    #[serde(deserialize_with = "code_list")]
    pub country_codes: Vec<String>,
    pub fields: FieldMap,
}

impl Default for AirhubSettings {
    fn default() -> Self {
        AirhubSettings {
            base_url: "https://api.airhubapp.com".to_string(),
            username: String::new(),
            password: String::new(),
            partner_code: String::new(),
            batch_size: 25,
            max_concurrency: 4,
            token_ttl_secs: 300,
            country_codes: Vec::new(),
            fields: FieldMap::default(),
        }
    }
}

/// Accepts a TOML array or a comma-separated string such as `JP,KR`
fn code_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Codes {
        List(Vec<String>),
        Csv(String),
    }

    let codes = match Codes::deserialize(deserializer)? {
        Codes::List(codes) => codes,
        Codes::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(codes
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect())
}

impl AirhubSettings {
    pub const MAX_BATCH_SIZE: usize = 50;
    pub const MAX_CONCURRENCY: usize = 10;

    /// Check that everything needed for a plan query is present
    pub fn require(&self) -> Result<(), MissingSettings> {
        MissingSettings::check(&[
            ("airhub.username", &self.username),
            ("airhub.password", &self.password),
            ("airhub.partner_code", &self.partner_code),
        ])
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, Self::MAX_BATCH_SIZE)
    }

    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.clamp(1, Self::MAX_CONCURRENCY)
    }
}

/// Payment provider (QPay) credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QpaySettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub invoice_code: String,
    /// Public base URL of this service; the callback URL is omitted when empty
    pub callback_base_url: String,
}

impl Default for QpaySettings {
    fn default() -> Self {
        QpaySettings {
            base_url: "https://merchant.qpay.mn".to_string(),
            username: String::new(),
            password: String::new(),
            invoice_code: String::new(),
            callback_base_url: String::new(),
        }
    }
}

impl QpaySettings {
    /// Credentials needed by every payment endpoint
    pub fn require_credentials(&self) -> Result<(), MissingSettings> {
        MissingSettings::check(&[
            ("qpay.username", &self.username),
            ("qpay.password", &self.password),
        ])
    }

    /// Everything needed to create an invoice
    pub fn require_invoicing(&self) -> Result<(), MissingSettings> {
        MissingSettings::check(&[
            ("qpay.username", &self.username),
            ("qpay.password", &self.password),
            ("qpay.invoice_code", &self.invoice_code),
        ])
    }

    /// Payment callback URL; none when no public base URL is configured
    pub fn callback_url(&self) -> Option<String> {
        let base = self.callback_base_url.trim().trim_end_matches('/');
        (!base.is_empty()).then(|| format!("{base}/payment-callback"))
    }
}

/// Country catalog caching and output policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub ttl_secs: u64,
    pub sort_policy: SortPolicy,
    pub missing_price_policy: MissingPricePolicy,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            ttl_secs: 600,
            sort_policy: SortPolicy::default(),
            missing_price_policy: MissingPricePolicy::default(),
        }
    }
}

/// Optional public country registry used for name to ISO2 resolution
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CountrySettings {
    pub reference_url: Option<String>,
    pub reference_ttl_secs: u64,
}

impl Default for CountrySettings {
    fn default() -> Self {
        CountrySettings {
            reference_url: None,
            reference_ttl_secs: 86_400,
        }
    }
}

/// Required settings that were empty at request time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSettings(pub Vec<&'static str>);

impl MissingSettings {
    fn check(values: &[(&'static str, &str)]) -> Result<(), MissingSettings> {
        let missing: Vec<&'static str> = values
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| *k)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingSettings(missing))
        }
    }
}

impl std::fmt::Display for MissingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing configuration: {}", self.0.join(", "))
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with ESIM_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        Self::load_from(&config_dir)
    }

    /// Same layering, reading the TOML files from `config_dir`
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // ESIM_AIRHUB__USERNAME, ESIM_QPAY__INVOICE_CODE, etc.
            // Values stay strings so numeric-looking credentials keep leading zeros
            .add_source(
                Environment::with_prefix("ESIM")
                    .prefix_separator("_")
                    .separator("__"),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_have_no_credentials() {
        let settings = Settings::default();
        let missing = settings.airhub.require().unwrap_err();
        assert_eq!(
            missing.0,
            vec!["airhub.username", "airhub.password", "airhub.partner_code"]
        );
        assert_eq!(settings.catalog.ttl_secs, 600);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut qpay = QpaySettings::default();
        qpay.username = "merchant".to_string();
        qpay.password = "   ".to_string();

        let missing = qpay.require_credentials().unwrap_err();
        assert_eq!(missing.0, vec!["qpay.password"]);
        assert!(missing.to_string().contains("qpay.password"));
    }

    #[test]
    fn test_batch_tuning_is_clamped() {
        let mut airhub = AirhubSettings::default();
        airhub.batch_size = 500;
        airhub.max_concurrency = 0;

        assert_eq!(airhub.effective_batch_size(), 50);
        assert_eq!(airhub.effective_concurrency(), 1);
    }

    #[test]
    fn test_callback_url_trims_trailing_slash() {
        let mut qpay = QpaySettings::default();
        qpay.callback_base_url = "https://shop.example.com/".to_string();
        assert_eq!(
            qpay.callback_url().as_deref(),
            Some("https://shop.example.com/payment-callback")
        );

        qpay.callback_base_url = "  ".to_string();
        assert_eq!(qpay.callback_url(), None);
    }

    const ENV_KEYS: &[&str] = &[
        "ESIM_AIRHUB__USERNAME",
        "ESIM_AIRHUB__PASSWORD",
        "ESIM_AIRHUB__PARTNER_CODE",
        "ESIM_AIRHUB__COUNTRY_CODES",
        "ESIM_QPAY__INVOICE_CODE",
        "ESIM_SERVER__PORT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn config_dir(default_toml: &str, local_toml: Option<&str>) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), default_toml).unwrap();
        if let Some(local) = local_toml {
            fs::write(dir.path().join("local.toml"), local).unwrap();
        }
        dir
    }

    #[test]
    #[serial]
    fn test_env_overrides_use_single_underscore_prefix() {
        clear_env();
        let dir = config_dir("[airhub]\nusername = \"from-file\"\n", None);
        std::env::set_var("ESIM_AIRHUB__USERNAME", "agent@example.com");
        std::env::set_var("ESIM_AIRHUB__COUNTRY_CODES", "JP, KR");
        std::env::set_var("ESIM_QPAY__INVOICE_CODE", "SHOP_INVOICE");
        std::env::set_var("ESIM_SERVER__PORT", "9090");

        let settings = Settings::load_from(dir.path());
        clear_env();
        let settings = settings.unwrap();

        assert_eq!(settings.airhub.username, "agent@example.com");
        assert_eq!(settings.airhub.country_codes, vec!["JP".to_string(), "KR".to_string()]);
        assert_eq!(settings.qpay.invoice_code, "SHOP_INVOICE");
        assert_eq!(settings.server.port, 9090);
    }

    #[test]
    #[serial]
    fn test_numeric_looking_credentials_keep_leading_zeros() {
        clear_env();
        let dir = config_dir("", None);
        std::env::set_var("ESIM_AIRHUB__PASSWORD", "007");
        std::env::set_var("ESIM_AIRHUB__PARTNER_CODE", "0776059345");

        let settings = Settings::load_from(dir.path());
        clear_env();
        let settings = settings.unwrap();

        assert_eq!(settings.airhub.password, "007");
        assert_eq!(settings.airhub.partner_code, "0776059345");
    }

    #[test]
    #[serial]
    fn test_local_file_overrides_default_file() {
        clear_env();
        let dir = config_dir(
            "[airhub]\nusername = \"default\"\ncountry_codes = [\"JP\", \"TH\"]\n\n[catalog]\nttl_secs = 120\n",
            Some("[airhub]\nusername = \"local\"\n"),
        );

        let settings = Settings::load_from(dir.path()).unwrap();

        assert_eq!(settings.airhub.username, "local");
        assert_eq!(settings.airhub.country_codes, vec!["JP".to_string(), "TH".to_string()]);
        assert_eq!(settings.catalog.ttl_secs, 120);
        // Untouched sections keep their defaults
        assert_eq!(settings.airhub.batch_size, 25);
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    #[serial]
    fn test_missing_files_fall_back_to_defaults() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings::load_from(dir.path()).unwrap();

        assert!(settings.airhub.country_codes.is_empty());
        assert!(settings.airhub.require().is_err());
    }
}
