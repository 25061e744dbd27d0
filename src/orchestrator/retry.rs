//! 重试控制 - 编排层
//!
//! 包住"一个批次的一次尝试"，状态机：尝试 → {成功, 重试, 耗尽}。
//!
//! - 瞬时错误且未到尝试上限 → 睡一段递增的延迟后重试；
//!   失败带频率限制味道时改用固定长延迟，等配额窗口恢复
//! - 致命错误或尝试耗尽 → 整批降级为 `API_Error` 哨兵序列
//! - 永不向上抛错：一个坏批次只影响它自己的那些行

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::LABEL_API_ERROR;
use crate::workflow::BatchCtx;

/// 重试策略
///
/// 延迟数值是针对某家服务免费档观察出来的经验值，
/// 全部可配置，不写死在控制流里
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 单批最大尝试次数
    pub max_attempts: usize,
    /// 基础延迟
    pub base_delay: Duration,
    /// 延迟倍增系数
    pub backoff_multiplier: u32,
    /// 频率限制时的固定长延迟
    pub rate_limit_delay: Duration,
}

impl RetryPolicy {
    /// 从配置创建重试策略
    pub fn new(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_secs(config.retry_base_delay_secs),
            backoff_multiplier: config.retry_backoff_multiplier,
            rate_limit_delay: Duration::from_secs(config.rate_limit_delay_secs),
        }
    }

    /// 第 `failures` 次失败后的等待时长（failures 从 1 开始计）
    fn delay_after(&self, failures: usize, rate_limited: bool) -> Duration {
        if rate_limited {
            return self.rate_limit_delay;
        }
        let exp = failures.saturating_sub(1).min(u32::MAX as usize) as u32;
        self.base_delay * self.backoff_multiplier.saturating_pow(exp)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// 带重试地执行一个批次
///
/// `attempt` 是一次完整的批次尝试（提示词 → 调用 → 对齐）。
/// 返回值永远是长度为 `ctx.len` 的标签序列：成功时是对齐结果，
/// 失败时是 `API_Error` 哨兵序列
pub async fn run_with_retry<F, Fut>(policy: &RetryPolicy, ctx: &BatchCtx, mut attempt: F) -> Vec<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = crate::error::AppResult<Vec<String>>>,
{
    for attempt_number in 1..=policy.max_attempts {
        match attempt().await {
            Ok(labels) => {
                if attempt_number > 1 {
                    info!("{} ✓ 第 {} 次尝试成功", ctx, attempt_number);
                }
                return labels;
            }
            Err(err) => {
                let (retriable, rate_limited) = match &err {
                    AppError::Service(e) => (e.is_retriable(), e.is_rate_limited()),
                    // 服务错误之外的失败不值得重试
                    _ => (false, false),
                };

                if !retriable {
                    error!("{} ❌ 不可重试的错误: {}，整批降级为哨兵标签", ctx, err);
                    break;
                }

                if attempt_number == policy.max_attempts {
                    error!(
                        "{} ❌ 已尝试 {} 次仍然失败: {}，整批降级为哨兵标签",
                        ctx, policy.max_attempts, err
                    );
                    break;
                }

                let delay = policy.delay_after(attempt_number, rate_limited);
                warn!(
                    "{} ⚠️ 调用失败 (尝试 {}/{}): {}，{}秒后重试...",
                    ctx,
                    attempt_number,
                    policy.max_attempts,
                    err,
                    delay.as_secs()
                );
                sleep(delay).await;
            }
        }
    }

    vec![LABEL_API_ERROR.to_string(); ctx.len]
}
