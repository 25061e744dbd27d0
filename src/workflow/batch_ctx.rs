//! 批次处理上下文
//!
//! 封装"我正在处理第几批、对应数据集的哪些行"这一信息

use std::fmt::Display;

/// 批次处理上下文
///
/// 只用于日志显示和哨兵序列定长，不携带业务数据
#[derive(Debug, Clone)]
pub struct BatchCtx {
    /// 批次编号（从 1 开始，仅用于日志显示）
    pub batch_number: usize,

    /// 批次总数
    pub total_batches: usize,

    /// 本批第一行的行位置（0 开始）
    pub start_row: usize,

    /// 本批行数
    pub len: usize,
}

impl BatchCtx {
    /// 创建新的批次上下文
    pub fn new(batch_number: usize, total_batches: usize, start_row: usize, len: usize) -> Self {
        Self {
            batch_number,
            total_batches,
            start_row,
            len,
        }
    }
}

impl Display for BatchCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 {}/{} 行 {}-{}]",
            self.batch_number,
            self.total_batches,
            self.start_row,
            self.start_row + self.len.saturating_sub(1)
        )
    }
}
