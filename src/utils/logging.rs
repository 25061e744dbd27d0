use std::collections::HashMap;
use std::fs;
use tracing::info;

/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::workflow::BatchCtx;

/// 初始化 tracing 日志输出
///
/// 默认 info 级别，可通过 RUST_LOG 覆盖
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n批量分类任务日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量主题分类模式");
    info!("📊 批大小: {} | 批间停顿: {}秒", config.batch_size, config.batch_pause_secs);
    info!(
        "🤖 模型: {} | 推理强度: {}",
        config.llm_model_name, config.reasoning_effort
    );
    info!("{}", "=".repeat(60));
}

/// 记录任务规模信息
///
/// # 参数
/// - `total_rows`: 数据行总数
/// - `total_batches`: 批次总数
/// - `batch_size`: 批大小
pub fn log_run_plan(total_rows: usize, total_batches: usize, batch_size: usize) {
    info!("✓ 共 {} 行待分类", total_rows);
    info!("📋 将以每批 {} 行的方式处理，共 {} 批", batch_size, total_batches);
    info!("💡 批次严格串行，每批之间强制停顿\n");
}

/// 记录批次开始信息
pub fn log_batch_start(ctx: &BatchCtx) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理 {}", ctx);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `ctx`: 批次上下文
/// - `rows_done`: 已累积的行数
/// - `total_rows`: 行总数
pub fn log_batch_complete(ctx: &BatchCtx, rows_done: usize, total_rows: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ {} 完成: 进度 {}/{} 行", ctx, rows_done, total_rows);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息（含标签分布）
pub fn print_final_stats(labels: &[String], output_file: &str, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 共输出 {} 条标签", labels.len());

    // 标签分布（按数量降序）
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    let mut distribution: Vec<(&str, usize)> = counts.into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (label, count) in distribution {
        info!("   {} × {}", count, label);
    }

    info!("{}", "=".repeat(60));
    info!("结果已保存至: {}", output_file);
    info!("日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
