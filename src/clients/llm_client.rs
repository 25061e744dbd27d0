//! 分类服务客户端 - 能力层
//!
//! 一个无状态的单次调用适配器：一次提示词进、一次原始文本出。
//! 不做重试（重试归编排层的重试控制器管），同一时刻只有一个在途请求
//! （调用方严格串行，目标服务有请求频率上限）。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型（兼容 OpenAI API 的服务，
//!   默认指向 Gemini 的 OpenAI 兼容端点）

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ReasoningEffort,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ServiceError};

/// 分类调用能力
///
/// 流水线只依赖这一个口子，测试里用脚本化的假后端替换真实服务
#[async_trait]
pub trait ClassifyBackend: Send + Sync {
    /// 发送一次分类请求，返回服务的原始回复文本
    async fn classify(&self, system_message: &str, user_message: &str) -> AppResult<String>;
}

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    reasoning_effort: ReasoningEffort,
    request_timeout: Duration,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            reasoning_effort: parse_effort(&config.reasoning_effort),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// 创建自定义模型的客户端
    pub fn with_model(config: &Config, model_name: impl Into<String>) -> Self {
        let mut client = Self::new(config);
        client.model_name = model_name.into();
        client
    }
}

#[async_trait]
impl ClassifyBackend for LlmClient {
    async fn classify(&self, system_message: &str, user_message: &str) -> AppResult<String> {
        debug!("调用分类服务，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| classify_error(&self.model_name, e))?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| classify_error(&self.model_name, e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.2)
            .reasoning_effort(self.reasoning_effort.clone())
            .build()
            .map_err(|e| classify_error(&self.model_name, e))?;

        // 调用 API（带超时）
        let chat = self.client.chat();
        let call = chat.create(request);
        let response = match timeout(self.request_timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("分类服务调用失败: {}", e);
                return Err(classify_error(&self.model_name, e));
            }
            Err(_) => {
                warn!("分类服务调用超时 ({}秒)", self.request_timeout.as_secs());
                return Err(AppError::Service(ServiceError::Timeout {
                    seconds: self.request_timeout.as_secs(),
                }));
            }
        };

        debug!("分类服务调用成功");

        // 提取响应内容；choices 为空按瞬时错误处理，
        // 内容为空交给对齐层补齐，不在这里报错
        let content = response
            .choices
            .first()
            .ok_or_else(|| {
                AppError::Service(ServiceError::EmptyReply {
                    model: self.model_name.clone(),
                })
            })?
            .message
            .content
            .clone()
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

/// 解析推理强度配置
fn parse_effort(effort: &str) -> ReasoningEffort {
    match effort.to_ascii_lowercase().as_str() {
        "high" => ReasoningEffort::High,
        "medium" => ReasoningEffort::Medium,
        _ => ReasoningEffort::Low,
    }
}

/// 把 async-openai 的错误归类为带瞬时性的服务错误
///
/// 频率限制单独区分出来，重试控制器对它使用长等待；
/// 请求构造 / 鉴权 / 4xx 类失败判为永久拒绝，不重试
fn classify_error(model: &str, err: OpenAIError) -> AppError {
    match err {
        OpenAIError::ApiError(api) => {
            let type_hint = api.r#type.clone().unwrap_or_default();
            let haystack = format!("{} {}", api.message, type_hint).to_lowercase();

            if haystack.contains("rate limit")
                || haystack.contains("rate_limit")
                || haystack.contains("quota")
                || haystack.contains("resource_exhausted")
                || haystack.contains("429")
            {
                AppError::Service(ServiceError::RateLimited {
                    message: api.message,
                })
            } else if haystack.contains("internal")
                || haystack.contains("unavailable")
                || haystack.contains("overloaded")
                || haystack.contains("timeout")
                || haystack.contains("500")
                || haystack.contains("502")
                || haystack.contains("503")
            {
                AppError::Service(ServiceError::Upstream {
                    message: api.message,
                })
            } else {
                AppError::Service(ServiceError::Rejected {
                    message: api.message,
                })
            }
        }
        // 请求还没发出去就失败了，重试也不会有不同结果
        OpenAIError::InvalidArgument(message) => {
            AppError::Service(ServiceError::Rejected { message })
        }
        // 其余（网络层、反序列化等）按瞬时故障处理
        other => AppError::Service(ServiceError::Upstream {
            message: format!("{} (模型: {})", other, model),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(message: &str, r#type: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(async_openai::error::ApiError {
            message: message.to_string(),
            r#type: r#type.map(|s| s.to_string()),
            param: None,
            code: None,
        })
    }

    fn service_error(err: OpenAIError) -> ServiceError {
        match classify_error("test-model", err) {
            AppError::Service(e) => e,
            other => panic!("应归类为服务错误: {}", other),
        }
    }

    #[test]
    fn test_rate_limit_is_retriable_and_rate_limited() {
        let e = service_error(api_error(
            "Resource has been exhausted (e.g. check quota).",
            Some("resource_exhausted"),
        ));
        assert!(e.is_retriable());
        assert!(e.is_rate_limited());
    }

    #[test]
    fn test_server_failure_is_retriable() {
        let e = service_error(api_error("The service is temporarily unavailable", None));
        assert!(e.is_retriable());
        assert!(!e.is_rate_limited());
    }

    #[test]
    fn test_auth_failure_is_fatal() {
        let e = service_error(api_error("API key not valid", Some("invalid_request_error")));
        assert!(!e.is_retriable());
    }

    #[test]
    fn test_invalid_argument_is_fatal() {
        let e = service_error(OpenAIError::InvalidArgument("bad request".to_string()));
        assert!(!e.is_retriable());
    }

    #[test]
    fn test_parse_effort() {
        assert!(matches!(parse_effort("high"), ReasoningEffort::High));
        assert!(matches!(parse_effort("MEDIUM"), ReasoningEffort::Medium));
        assert!(matches!(parse_effort("low"), ReasoningEffort::Low));
        assert!(matches!(parse_effort("whatever"), ReasoningEffort::Low));
    }
}
