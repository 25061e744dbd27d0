//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次的串行调度、重试控制和结果累积，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 分类流水线
//! - 管理应用生命周期（初始化、运行）
//! - 预检任务配置（列选择、类目体系、批大小）
//! - 串行驱动所有批次，批间强制停顿
//! - 持有唯一的结果累积序列，兜底保证长度不变式
//! - 上报进度、响应取消
//!
//! ### `retry` - 重试控制器
//! - 包住单个批次的尝试：瞬时失败按策略延迟重试
//! - 频率限制使用固定长延迟，等配额窗口恢复
//! - 致命失败或尝试耗尽时整批降级为哨兵标签
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (处理 Vec<Batch>)
//!     ↓
//! retry (包住单个 Batch 的尝试)
//!     ↓
//! workflow::BatchFlow (处理单个 Batch)
//!     ↓
//! services (能力层：context / prompt / reconcile / write)
//!     ↓
//! clients (分类服务适配器)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：pipeline 管批量，retry 管单批的失败恢复
//! 2. **错误不过批次边界**：批内任何故障都转成同长度的哨兵序列
//! 3. **向下依赖**：编排层 → workflow → services → clients
//! 4. **无并发**：严格串行 + 批间停顿是对服务频率上限的主动让步

pub mod pipeline;
pub mod retry;

// 重新导出主要类型
pub use pipeline::{App, JobSpec, Pipeline, ProgressFn};
pub use retry::{run_with_retry, RetryPolicy};
