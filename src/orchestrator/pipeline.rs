//! 流水线编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批次的串行调度和结果累积。
//!
//! ## 核心功能
//!
//! 1. **预检**：列选择、类目体系、批大小在发出第一条请求之前校验完毕
//! 2. **串行调度**：批次严格按序处理，前一批定论之前不发下一批
//! 3. **主动限流**：每批之后强制停顿，与批次成败无关
//! 4. **进度上报**：每批之后回调 `已处理行数 / 总行数`（封顶 1.0）
//! 5. **取消**：批次边界检查取消信号，未处理的行以占位标签补齐
//! 6. **兜底不变式**：交还的标签序列长度恒等于数据行数
//!
//! ## 设计特点
//!
//! - **唯一写者**：累积中的标签序列只归本层持有，下层只返回批内结果
//! - **无并发**：目标服务有请求频率上限，并发扇出会直接撞上去
//! - **任务描述不可变**：`JobSpec` 按值传入，运行中不读任何可变外部状态

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::clients::{ClassifyBackend, LlmClient};
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{load_csv_to_dataset, load_job_file, split_batches, AnalysisMode, Dataset};
use crate::orchestrator::retry::{run_with_retry, RetryPolicy};
use crate::services::{build_contexts, ResultWriter};
use crate::utils::logging;
use crate::workflow::{BatchCtx, BatchFlow};

/// 一次分类任务的不可变描述
///
/// 在流水线启动之前构造完毕，之后只读
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// 参与上下文构造的列名
    pub selected_columns: Vec<String>,
    /// 分析模式（含类目体系）
    pub mode: AnalysisMode,
    /// 批大小
    pub batch_size: usize,
}

/// 进度回调：参数为 [0, 1] 区间内的完成比例
pub type ProgressFn = Box<dyn Fn(f64) + Send + Sync>;

/// 分类流水线
pub struct Pipeline<C: ClassifyBackend> {
    backend: C,
    policy: RetryPolicy,
    batch_pause: Duration,
    verbose_logging: bool,
    progress: Option<ProgressFn>,
    cancel_flag: Arc<AtomicBool>,
}

impl<C: ClassifyBackend> Pipeline<C> {
    /// 创建新的流水线
    pub fn new(backend: C, config: &Config) -> Self {
        Self {
            backend,
            policy: RetryPolicy::new(config),
            batch_pause: Duration::from_secs(config.batch_pause_secs),
            verbose_logging: config.verbose_logging,
            progress: None,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 设置进度回调
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// 取消句柄：置 true 后流水线在下一个批次边界干净停止
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }

    /// 执行整个分类任务
    ///
    /// 返回与数据集行序对齐的标签序列，长度恒等于行数。
    /// 批次内部的任何服务故障都已在下层转成哨兵标签，
    /// 这里只会因为配置问题（预检）提前失败
    pub async fn run(&self, dataset: &Dataset, job: &JobSpec) -> AppResult<Vec<String>> {
        // ========== 预检：发出任何请求之前完成全部校验 ==========
        if job.batch_size == 0 {
            return Err(AppError::Config(ConfigError::InvalidBatchSize { value: 0 }));
        }
        let contexts = build_contexts(dataset, &job.selected_columns)?;

        let total_rows = contexts.len();
        let batches = split_batches(&contexts, job.batch_size);
        let total_batches = batches.len();
        logging::log_run_plan(total_rows, total_batches, job.batch_size);

        let mut results: Vec<String> = Vec::with_capacity(total_rows);
        let flow = BatchFlow::new(&self.backend, &job.mode, self.verbose_logging);

        for batch in &batches {
            // 取消信号只在批次边界检查，停止后干净返回
            if self.cancel_flag.load(Ordering::Relaxed) {
                warn!(
                    "⚠️ 收到取消信号，剩余 {} 行以 '{}' 填充",
                    total_rows - results.len(),
                    job.mode.pad_label()
                );
                break;
            }

            let ctx = BatchCtx::new(batch.index + 1, total_batches, batch.start_row, batch.len());
            logging::log_batch_start(&ctx);

            // 成功 → 对齐结果；致命/耗尽 → 整批哨兵。永远是定长序列
            let labels = run_with_retry(&self.policy, &ctx, || flow.run(batch, &ctx)).await;
            results.extend(labels);

            self.report_progress(results.len(), total_rows);
            logging::log_batch_complete(&ctx, results.len(), total_rows);

            // 批间强制停顿：主动限流，不是对故障的反应
            sleep(self.batch_pause).await;
        }

        // ========== 兜底：结果长度必须恰好等于行数 ==========
        if results.len() != total_rows {
            results.resize(total_rows, job.mode.pad_label().to_string());
        }

        Ok(results)
    }

    fn report_progress(&self, rows_done: usize, total_rows: usize) {
        if let Some(progress) = &self.progress {
            let fraction = if total_rows == 0 {
                1.0
            } else {
                (rows_done as f64 / total_rows as f64).min(1.0)
            };
            progress(fraction);
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Pipeline<LlmClient>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        // 密钥缺失在这里就报，不等到第一条请求
        if config.llm_api_key.is_empty() {
            return Err(AppError::Config(ConfigError::MissingApiKey));
        }

        let client = LlmClient::new(&config);
        let pipeline = Pipeline::new(client, &config);

        Ok(Self { config, pipeline })
    }

    /// 运行应用主逻辑
    ///
    /// 读取任务描述和数据集，跑完流水线后把结果列写回 CSV
    pub async fn run(&self, job_file_path: &Path) -> AppResult<()> {
        let job_file = load_job_file(job_file_path).await?;
        let mode = job_file.analysis_mode()?;

        let mut dataset = load_csv_to_dataset(Path::new(&job_file.input_file)).await?;

        let job = JobSpec {
            selected_columns: job_file.columns.clone(),
            mode,
            batch_size: job_file.batch_size.unwrap_or(self.config.batch_size),
        };

        let labels = self.pipeline.run(&dataset, &job).await?;

        dataset.append_column(job.mode.output_column(), &labels);
        ResultWriter::with_path(job_file.output_file.clone())
            .write(&dataset)
            .await?;

        logging::print_final_stats(&labels, &job_file.output_file, &self.config.output_log_file);

        Ok(())
    }
}
