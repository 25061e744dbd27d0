//! 批次处理流程 - 流程层
//!
//! 核心职责：定义"一个批次"的单次完整处理流程
//!
//! 流程顺序：
//! 1. 提示词构造（按分析模式选模板）
//! 2. 调用分类服务（单次，不重试）
//! 3. 回复对齐（定长标签序列）
//!
//! 重试、批间停顿、结果累积都不在这里——那些归编排层管

use tracing::{debug, info};

use crate::clients::ClassifyBackend;
use crate::error::AppResult;
use crate::models::{AnalysisMode, Batch};
use crate::services::{prompt_builder, reconciler};
use crate::utils::logging::truncate_text;
use crate::workflow::batch_ctx::BatchCtx;

/// 批次处理流程
///
/// - 编排一个批次的"提示词 → 调用 → 对齐"
/// - 不持有任何资源，只借用后端
/// - 不出现 Vec<Batch>
/// - 不关心批次之间的顺序
pub struct BatchFlow<'a, C: ClassifyBackend> {
    backend: &'a C,
    mode: &'a AnalysisMode,
    verbose_logging: bool,
}

impl<'a, C: ClassifyBackend> BatchFlow<'a, C> {
    /// 创建新的批次处理流程
    pub fn new(backend: &'a C, mode: &'a AnalysisMode, verbose_logging: bool) -> Self {
        Self {
            backend,
            mode,
            verbose_logging,
        }
    }

    /// 处理一个批次（单次尝试）
    ///
    /// 成功时返回与批次行序对齐的定长标签序列；
    /// 服务调用失败时原样抛出，由重试控制器判断瞬时性
    pub async fn run(&self, batch: &Batch, ctx: &BatchCtx) -> AppResult<Vec<String>> {
        if self.verbose_logging {
            self.log_entries(ctx, batch);
        }

        let (system_message, user_message) = prompt_builder::build_messages(self.mode, batch);
        debug!("{} 提示词长度: {} 字符", ctx, user_message.len());

        let raw = self.backend.classify(&system_message, &user_message).await?;

        let labels = reconciler::reconcile(&raw, batch.len(), self.mode.pad_label())?;

        // 不校验标签是否在类目体系内（原样接受），只记个数字供排查
        if let AnalysisMode::Thematic(schema) = self.mode {
            let stray = labels.iter().filter(|l| !schema.contains(l)).count();
            if stray > 0 {
                debug!("{} 有 {} 条标签不在类目体系内，原样保留", ctx, stray);
            }
        }

        info!("{} ✓ 已对齐 {} 条标签", ctx, labels.len());

        Ok(labels)
    }

    // ========== 日志辅助方法 ==========

    /// 显示本批前几条上下文预览
    fn log_entries(&self, ctx: &BatchCtx, batch: &Batch) {
        for (i, entry) in batch.entries.iter().take(2).enumerate() {
            info!("{}   {}. {}", ctx, i + 1, truncate_text(entry, 80));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ServiceError};
    use crate::models::{LabelSchema, LABEL_UNCATEGORIZED};
    use async_trait::async_trait;

    /// 固定回复的假后端
    struct FixedBackend {
        reply: String,
    }

    #[async_trait]
    impl ClassifyBackend for FixedBackend {
        async fn classify(&self, _system: &str, _user: &str) -> AppResult<String> {
            Ok(self.reply.clone())
        }
    }

    /// 始终失败的假后端
    struct FailingBackend;

    #[async_trait]
    impl ClassifyBackend for FailingBackend {
        async fn classify(&self, _system: &str, _user: &str) -> AppResult<String> {
            Err(AppError::Service(ServiceError::Upstream {
                message: "boom".to_string(),
            }))
        }
    }

    fn thematic_mode() -> AnalysisMode {
        AnalysisMode::Thematic(
            LabelSchema::new(vec![
                ("Billing".to_string(), "b".to_string()),
                ("Shipping".to_string(), "s".to_string()),
            ])
            .unwrap(),
        )
    }

    fn batch(n: usize) -> Batch {
        Batch {
            index: 0,
            start_row: 0,
            entries: (0..n).map(|i| format!("entry-{}", i)).collect(),
        }
    }

    fn ctx(len: usize) -> BatchCtx {
        BatchCtx::new(1, 1, 0, len)
    }

    #[tokio::test]
    async fn test_flow_aligns_reply_to_batch_len() {
        let backend = FixedBackend {
            reply: "Billing\nShipping".to_string(),
        };
        let mode = thematic_mode();
        let flow = BatchFlow::new(&backend, &mode, false);

        let labels = flow.run(&batch(4), &ctx(4)).await.unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], "Billing");
        assert_eq!(labels[3], LABEL_UNCATEGORIZED);
    }

    #[tokio::test]
    async fn test_flow_propagates_service_error() {
        let backend = FailingBackend;
        let mode = thematic_mode();
        let flow = BatchFlow::new(&backend, &mode, false);

        let result = flow.run(&batch(3), &ctx(3)).await;
        assert!(matches!(
            result,
            Err(AppError::Service(ServiceError::Upstream { .. }))
        ));
    }
}
