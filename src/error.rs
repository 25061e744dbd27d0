use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 配置错误（列选择、类目定义等）
    Config(ConfigError),
    /// 分类服务调用错误
    Service(ServiceError),
    /// 文件操作错误
    File(FileError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Service(e) => write!(f, "服务错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Service(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 配置错误
///
/// 全部为致命错误：在第一批请求发出之前就向调用方报告，流水线不启动
#[derive(Debug)]
pub enum ConfigError {
    /// 未选择任何上下文列
    EmptyColumnSelection,
    /// 所选列在数据集表头中不存在
    UnknownColumn {
        name: String,
    },
    /// 类目列表为空
    EmptySchema,
    /// 类目名为空
    EmptyCategoryName {
        position: usize,
    },
    /// 类目名重复
    DuplicateCategory {
        name: String,
    },
    /// 批大小非法（必须为正整数）
    InvalidBatchSize {
        value: usize,
    },
    /// 未知的分析模式
    UnknownMode {
        value: String,
    },
    /// 缺少 API 密钥
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyColumnSelection => write!(f, "未选择任何上下文列"),
            ConfigError::UnknownColumn { name } => {
                write!(f, "所选列 '{}' 在数据集表头中不存在", name)
            }
            ConfigError::EmptySchema => write!(f, "类目列表不能为空"),
            ConfigError::EmptyCategoryName { position } => {
                write!(f, "第 {} 个类目的名称为空", position + 1)
            }
            ConfigError::DuplicateCategory { name } => {
                write!(f, "类目名 '{}' 重复", name)
            }
            ConfigError::InvalidBatchSize { value } => {
                write!(f, "批大小非法: {} (必须为正整数)", value)
            }
            ConfigError::UnknownMode { value } => {
                write!(f, "未知的分析模式: '{}' (支持 thematic / pattern)", value)
            }
            ConfigError::MissingApiKey => {
                write!(f, "缺少 API 密钥 (请设置 GOOGLE_API_KEY 或 secrets.toml)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 分类服务调用错误
///
/// 每个变体都带有明确的瞬时性：`is_retriable` 为 true 的错误由重试
/// 控制器在尝试上限内本地恢复，其余立即降级为哨兵标签
#[derive(Debug)]
pub enum ServiceError {
    /// 请求超时
    Timeout {
        seconds: u64,
    },
    /// 请求频率限制（配额窗口耗尽）
    RateLimited {
        message: String,
    },
    /// 上游瞬时故障（5xx、连接失败等）
    Upstream {
        message: String,
    },
    /// 永久拒绝（请求格式错误、鉴权失败等），不重试
    Rejected {
        message: String,
    },
    /// 服务返回空结果（choices 为空）
    EmptyReply {
        model: String,
    },
}

impl ServiceError {
    /// 该错误是否值得重试
    pub fn is_retriable(&self) -> bool {
        !matches!(self, ServiceError::Rejected { .. })
    }

    /// 该错误是否为频率限制（需要长等待让配额窗口恢复）
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ServiceError::RateLimited { .. })
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Timeout { seconds } => {
                write!(f, "请求超时 ({}秒)", seconds)
            }
            ServiceError::RateLimited { message } => {
                write!(f, "请求频率限制: {}", message)
            }
            ServiceError::Upstream { message } => {
                write!(f, "上游服务故障: {}", message)
            }
            ServiceError::Rejected { message } => {
                write!(f, "请求被拒绝: {}", message)
            }
            ServiceError::EmptyReply { model } => {
                write!(f, "服务返回空结果 (模型: {})", model)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound {
        path: String,
    },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CSV 解析失败
    CsvParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::CsvParseFailed { path, source } => {
                write!(f, "CSV解析失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::CsvParseFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::File(FileError::CsvParseFailed {
            path: String::new(), // csv 错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Other(format!("正则表达式错误: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建未知列错误
    pub fn unknown_column(name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::UnknownColumn { name: name.into() })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建瞬时服务错误
    pub fn service_upstream(message: impl Into<String>) -> Self {
        AppError::Service(ServiceError::Upstream {
            message: message.into(),
        })
    }

    /// 创建永久拒绝错误
    pub fn service_rejected(message: impl Into<String>) -> Self {
        AppError::Service(ServiceError::Rejected {
            message: message.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = std::result::Result<T, AppError>;
