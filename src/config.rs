use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 每批发送的行数
    pub batch_size: usize,
    /// 批与批之间的强制停顿（秒），与批次成败无关
    pub batch_pause_secs: u64,
    /// 单批最大尝试次数
    pub max_attempts: usize,
    /// 重试基础延迟（秒）
    pub retry_base_delay_secs: u64,
    /// 重试延迟倍增系数
    pub retry_backoff_multiplier: u32,
    /// 频率限制时的固定长延迟（秒），等配额窗口恢复
    pub rate_limit_delay_secs: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 推理强度: low / medium / high
    pub reasoning_effort: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 30,
            batch_pause_secs: 5,
            max_attempts: 3,
            retry_base_delay_secs: 2,
            retry_backoff_multiplier: 2,
            rate_limit_delay_secs: 60,
            request_timeout_secs: 90,
            verbose_logging: false,
            output_log_file: "run_log.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            llm_model_name: "gemini-3-flash-preview".to_string(),
            reasoning_effort: "low".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_size),
            batch_pause_secs: std::env::var("BATCH_PAUSE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_pause_secs),
            max_attempts: std::env::var("MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_attempts),
            retry_base_delay_secs: std::env::var("RETRY_BASE_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_base_delay_secs),
            retry_backoff_multiplier: std::env::var("RETRY_BACKOFF_MULTIPLIER").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_backoff_multiplier),
            rate_limit_delay_secs: std::env::var("RATE_LIMIT_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.rate_limit_delay_secs),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("GOOGLE_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            reasoning_effort: std::env::var("REASONING_EFFORT").unwrap_or(default.reasoning_effort),
        }
    }

    /// 从环境变量加载配置，并尝试用 secrets.toml 补齐 API 密钥
    ///
    /// 环境变量优先；secrets.toml 只在环境变量未提供密钥时生效
    pub fn load(secrets_path: &Path) -> Self {
        let mut config = Self::from_env();
        if config.llm_api_key.is_empty() {
            match read_secrets_file(secrets_path) {
                Ok(Some(key)) => {
                    debug!("已从 {} 读取 API 密钥", secrets_path.display());
                    config.llm_api_key = key;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("读取 {} 失败: {}", secrets_path.display(), e);
                }
            }
        }
        config
    }
}

/// secrets.toml 的内容（与原部署环境的密钥文件保持同名键）
#[derive(Debug, Deserialize)]
struct Secrets {
    #[serde(rename = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,
}

fn read_secrets_file(path: &Path) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let secrets: Secrets = toml::from_str(&content)?;
    Ok(secrets.google_api_key.filter(|k| !k.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.batch_size, 30);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.rate_limit_delay_secs, 60);
        assert!(config.llm_api_key.is_empty());
    }

    #[test]
    fn test_missing_secrets_file_is_not_an_error() {
        let result = read_secrets_file(Path::new("does_not_exist_secrets.toml"));
        assert!(matches!(result, Ok(None)));
    }
}
