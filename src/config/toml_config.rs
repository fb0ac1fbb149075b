use crate::domain::model::{ScoringWeights, SearchCriteria};
use crate::utils::error::{HunterError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const RENTCAST_KEY_ENV: &str = "RENTCAST_API_KEY";
pub const RAPIDAPI_KEY_ENV: &str = "RAPIDAPI_KEY";

/// 頂層設定，所有區段皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchCriteria,
    pub scoring: ScoringWeights,
    pub output: OutputConfig,
    pub fetch: FetchConfig,
    pub keys: ApiKeys,
    pub providers: ProviderEndpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
    pub dashboard_filename: String,
    pub data_filename: String,
    pub csv_filename: String,
    pub max_dashboard_listings: usize,
    /// Listings at most this many days old are tagged as new.
    pub new_listing_days: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let output_dir = std::env::var("HOME")
            .map(|home| format!("{}/apartment-hunter/output", home))
            .unwrap_or_else(|_| "./output".to_string());

        Self {
            output_dir,
            dashboard_filename: "dashboard.html".to_string(),
            data_filename: "listings.json".to_string(),
            csv_filename: "listings.csv".to_string(),
            max_dashboard_listings: 50,
            new_listing_days: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    /// Wait before the single retry after an HTTP 429.
    pub rate_limit_backoff_seconds: u64,
    pub verify_links: bool,
    pub verify_workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            rate_limit_backoff_seconds: 60,
            verify_links: true,
            verify_workers: 8,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub rentcast: String,
    /// Shared by the Zillow and Redfin adapters.
    pub rapidapi: String,
}

impl ApiKeys {
    pub fn is_empty(&self) -> bool {
        self.rentcast.is_empty() && self.rapidapi.is_empty()
    }
}

// 不要把金鑰印到日誌裡
impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(key: &str) -> &'static str {
            if key.is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("ApiKeys")
            .field("rentcast", &mask(&self.rentcast))
            .field("rapidapi", &mask(&self.rapidapi))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub rentcast_url: String,
    pub zillow_url: String,
    pub zillow_host: String,
    pub redfin_url: String,
    pub redfin_host: String,
    /// Public site used to build and verify rental search links.
    pub zillow_web_url: String,
    pub google_search_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            rentcast_url: "https://api.rentcast.io/v1".to_string(),
            zillow_url: "https://zillow-com1.p.rapidapi.com".to_string(),
            zillow_host: "zillow-com1.p.rapidapi.com".to_string(),
            redfin_url: "https://redfin-com.p.rapidapi.com".to_string(),
            redfin_host: "redfin-com.p.rapidapi.com".to_string(),
            zillow_web_url: "https://www.zillow.com".to_string(),
            google_search_url: "https://www.google.com/search".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HunterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let mut config: AppConfig = toml::from_str(&processed_content)?;
        config.apply_env_keys();
        Ok(config)
    }

    /// Defaults plus API keys from the environment.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();
        config.apply_env_keys();
        config
    }

    /// 替換環境變數 (例如 ${RAPIDAPI_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            HunterError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Keys left empty in the file, or still holding an unresolved `${VAR}`,
    /// fall back to the environment.
    fn apply_env_keys(&mut self) {
        if needs_env_key(&self.keys.rentcast) {
            self.keys.rentcast = std::env::var(RENTCAST_KEY_ENV).unwrap_or_default();
        }
        if needs_env_key(&self.keys.rapidapi) {
            self.keys.rapidapi = std::env::var(RAPIDAPI_KEY_ENV).unwrap_or_default();
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("search.city", &self.search.city)?;
        validate_non_empty_string("search.state", &self.search.state)?;
        validate_range("search.bedrooms", self.search.bedrooms, 0, 10)?;

        if let (Some(min), Some(max)) = (self.search.min_price, self.search.max_price) {
            if min > max {
                return Err(HunterError::InvalidConfigValueError {
                    field: "search.min_price".to_string(),
                    value: min.to_string(),
                    reason: format!("min_price must not exceed max_price ({})", max),
                });
            }
        }

        for (name, weight) in self.scoring.entries() {
            validate_range(&format!("scoring.{}", name), weight, 0.0, 1.0)?;
        }

        validate_path("output.output_dir", &self.output.output_dir)?;
        validate_path("output.dashboard_filename", &self.output.dashboard_filename)?;
        validate_path("output.data_filename", &self.output.data_filename)?;
        validate_path("output.csv_filename", &self.output.csv_filename)?;
        validate_positive_number(
            "output.max_dashboard_listings",
            self.output.max_dashboard_listings,
            1,
        )?;
        validate_range("output.new_listing_days", self.output.new_listing_days, 0, 365)?;

        validate_positive_number("fetch.verify_workers", self.fetch.verify_workers, 1)?;
        validate_range("fetch.timeout_seconds", self.fetch.timeout_seconds, 1, 300)?;

        validate_url("providers.rentcast_url", &self.providers.rentcast_url)?;
        validate_url("providers.zillow_url", &self.providers.zillow_url)?;
        validate_url("providers.redfin_url", &self.providers.redfin_url)?;
        validate_url("providers.zillow_web_url", &self.providers.zillow_web_url)?;
        validate_url("providers.google_search_url", &self.providers.google_search_url)?;

        Ok(())
    }

    /// Live runs need at least one provider key.
    pub fn require_api_keys(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(HunterError::MissingConfigError {
                field: format!("{} or {}", RENTCAST_KEY_ENV, RAPIDAPI_KEY_ENV),
            });
        }
        Ok(())
    }
}

// 未替換的佔位符不算金鑰
fn needs_env_key(key: &str) -> bool {
    key.trim().is_empty() || key.contains("${")
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
