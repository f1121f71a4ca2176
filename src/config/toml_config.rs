use crate::adapters::memory::DEFAULT_RETAINED_SNAPSHOTS;
use crate::domain::ports::ConfigProvider;
use crate::domain::services::AggregationPolicy;
use crate::utils::error::{RecordsError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_CONCURRENT_RECORDS: usize = 8;
const MAX_CONCURRENT_RECORDS: usize = 256;
const LOG_FORMATS: [&str; 2] = ["compact", "json"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    pub name: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            name: "academic-records".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub require_published_outcome: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub max_concurrent_records: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: Option<String>,
    pub retained_snapshots: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl EngineConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RecordsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RecordsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RECORDS_DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RecordsError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("engine.name", &self.engine.name)?;

        if let Some(path) = &self.data.path {
            validation::validate_dataset_path("data.path", path)?;
        }

        if let Some(concurrent) = self.concurrency.max_concurrent_records {
            validation::validate_range(
                "concurrency.max_concurrent_records",
                concurrent,
                1,
                MAX_CONCURRENT_RECORDS,
            )?;
        }

        if let Some(retained) = self.data.retained_snapshots {
            validation::validate_range("data.retained_snapshots", retained, 1, 64)?;
        }

        if let Some(level) = &self.logging.level {
            validation::validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }

        if let Some(format) = &self.logging.format {
            validation::validate_one_of("logging.format", format, &LOG_FORMATS)?;
        }

        Ok(())
    }

    /// 取得資料集路徑 (CLI 可覆蓋)
    pub fn data_path(&self) -> Result<&str> {
        validation::validate_required_field("data.path", &self.data.path).map(String::as_str)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.as_deref() == Some("json")
    }
}

impl ConfigProvider for EngineConfig {
    fn aggregation_policy(&self) -> AggregationPolicy {
        AggregationPolicy {
            require_published_outcome: self
                .aggregation
                .require_published_outcome
                .unwrap_or(AggregationPolicy::default().require_published_outcome),
        }
    }

    fn max_concurrent_records(&self) -> usize {
        self.concurrency
            .max_concurrent_records
            .unwrap_or(DEFAULT_MAX_CONCURRENT_RECORDS)
    }

    fn retained_snapshots(&self) -> usize {
        self.data
            .retained_snapshots
            .unwrap_or(DEFAULT_RETAINED_SNAPSHOTS)
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
