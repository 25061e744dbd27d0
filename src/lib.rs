//! # Thematic Classifier
//!
//! 一个把表格数据按用户类目批量分类的 Rust 应用程序：
//! 把自由文本行成批发给生成式模型，再把自由文本回复对齐回每一行。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 数据集、类目体系、批次划分与文件加载
//! - `Dataset` - 有序表头 + 有序数据行，行位置从不重排
//! - `LabelSchema` / `AnalysisMode` - 构造即校验的类目体系与模式开关
//!
//! ### ② 业务能力层（Services / Clients）
//! - `services/` - 描述"我能做什么"，只处理单个批次或单个数据集
//! - `build_contexts` - 选中列 → 每行一条上下文字符串
//! - `prompt_builder` - 批次 + 模式 → 单次请求的消息对
//! - `reconcile` - 自由文本回复 → 定长标签序列
//! - `clients/LlmClient` - 单次调用适配器（超时、错误瞬时性归类）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个批次"的完整处理流程
//! - `BatchCtx` - 上下文封装（批次编号 + 行区间）
//! - `BatchFlow` - 流程编排（提示词 → 调用 → 对齐）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 串行调度、批间停顿、进度、取消、长度兜底
//! - `orchestrator/retry` - 单批重试控制，失败降级为哨兵标签
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ClassifyBackend, LlmClient};
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, ServiceError};
pub use models::{
    split_batches, AnalysisMode, Batch, Category, Dataset, LabelSchema, LABEL_API_ERROR,
    LABEL_PATTERN_UNKNOWN, LABEL_UNCATEGORIZED,
};
pub use orchestrator::{App, JobSpec, Pipeline, RetryPolicy};
pub use services::{build_contexts, reconcile, ResultWriter};
pub use workflow::{BatchCtx, BatchFlow};
