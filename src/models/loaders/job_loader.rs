use serde::Deserialize;
use std::path::Path;
use tokio::fs;

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::schema::{AnalysisMode, Category, LabelSchema};

/// 任务描述文件 (job.toml)
///
/// 把原来交互式表单收集的内容（输入文件、上下文列、类目定义）
/// 固化为一份不可变的任务描述，流水线启动前读取一次
#[derive(Debug, Deserialize)]
pub struct JobFile {
    /// 输入数据集（CSV）
    pub input_file: String,
    /// 结果输出文件
    #[serde(default = "default_output_file")]
    pub output_file: String,
    /// 参与上下文构造的列名
    pub columns: Vec<String>,
    /// 分析模式: "thematic"（类目分类）或 "pattern"（模式提炼）
    #[serde(default = "default_mode")]
    pub mode: String,
    /// 类目定义（thematic 模式必填）
    #[serde(default)]
    pub categories: Vec<Category>,
    /// 覆盖配置中的批大小（可选）
    pub batch_size: Option<usize>,
}

fn default_output_file() -> String {
    "results.csv".to_string()
}

fn default_mode() -> String {
    "thematic".to_string()
}

impl JobFile {
    /// 把模式字符串 + 类目定义转换为分析模式（构造时完成全部校验）
    pub fn analysis_mode(&self) -> AppResult<AnalysisMode> {
        match self.mode.as_str() {
            "thematic" => {
                let schema = LabelSchema::from_categories(self.categories.clone())?;
                Ok(AnalysisMode::Thematic(schema))
            }
            "pattern" => Ok(AnalysisMode::Pattern),
            other => Err(AppError::Config(ConfigError::UnknownMode {
                value: other.to_string(),
            })),
        }
    }
}

/// 从 TOML 文件加载任务描述
pub async fn load_job_file(job_file_path: &Path) -> AppResult<JobFile> {
    if !job_file_path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: job_file_path.display().to_string(),
        }));
    }

    let content = fs::read_to_string(job_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(job_file_path.display().to_string(), e))?;

    let job: JobFile = toml::from_str(&content)?;
    Ok(job)
}
