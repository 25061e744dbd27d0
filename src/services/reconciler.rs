//! 回复对齐 - 业务能力层
//!
//! 把服务返回的自由文本整理成与批次行序对齐的定长标签序列。
//!
//! 对齐策略（宁可降级也不让整批失败）：
//! - 多出的行直接丢弃（模型偶尔会超量输出）
//! - 不足的行用占位标签补齐，不报错
//! - 输出长度恒等于批次长度

use regex::Regex;
use tracing::{debug, warn};

use crate::error::AppResult;

/// 把原始回复整理为恰好 `expected_len` 条标签
///
/// 步骤：按行切分 → 去空白、丢空行 → 去掉模型自作主张加的
/// 修饰符号（列表符、粗体、编号）→ 截断到前 `expected_len` 行 →
/// 不足部分用 `pad_label` 补齐
pub fn reconcile(raw: &str, expected_len: usize, pad_label: &str) -> AppResult<Vec<String>> {
    // 模型无视指令时常见的行首修饰：'- ' '* ' '• ' 以及回显的 '3.' '3)' 编号
    let markup = Regex::new(r"^(?:[-*•]\s*|\d+\s*[.)]\s*)+")?;

    let mut labels: Vec<String> = raw
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| {
            let stripped = markup.replace(line, "");
            stripped.trim_matches('*').trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    if labels.len() > expected_len {
        debug!(
            "回复行数超出: 期望 {} 实际 {}，丢弃多余 {} 行",
            expected_len,
            labels.len(),
            labels.len() - expected_len
        );
        labels.truncate(expected_len);
    } else if labels.len() < expected_len {
        warn!(
            "⚠️ 回复行数不足: 期望 {} 实际 {}，以 '{}' 补齐",
            expected_len,
            labels.len(),
            pad_label
        );
        labels.resize(expected_len, pad_label.to_string());
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LABEL_UNCATEGORIZED;

    #[test]
    fn test_exact_reply_passes_through() {
        let labels = reconcile("Billing\nShipping\nBilling\n", 3, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec!["Billing", "Shipping", "Billing"]);
    }

    #[test]
    fn test_short_reply_padded() {
        // 10 行的批次只回了 7 行 → 后 3 条是占位标签
        let raw = (0..7).map(|_| "Billing").collect::<Vec<_>>().join("\n");
        let labels = reconcile(&raw, 10, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels.len(), 10);
        assert!(labels[..7].iter().all(|l| l == "Billing"));
        assert!(labels[7..].iter().all(|l| l == LABEL_UNCATEGORIZED));
    }

    #[test]
    fn test_long_reply_truncated() {
        // 5 行的批次回了 8 行 → 只保留前 5 行
        let raw = (0..8).map(|i| format!("Label{}", i)).collect::<Vec<_>>().join("\n");
        let labels = reconcile(&raw, 5, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[4], "Label4");
    }

    #[test]
    fn test_empty_reply_fully_padded() {
        let labels = reconcile("", 4, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec![LABEL_UNCATEGORIZED; 4]);

        let labels = reconcile("\n\n   \n", 2, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec![LABEL_UNCATEGORIZED; 2]);
    }

    #[test]
    fn test_strips_bullets_and_bold() {
        let raw = "- Billing\n* Shipping\n• Billing\n**Shipping**\n";
        let labels = reconcile(raw, 4, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec!["Billing", "Shipping", "Billing", "Shipping"]);
    }

    #[test]
    fn test_strips_echoed_numbering() {
        // 提示词里的条目是编号的，模型有时会把编号回显出来
        let raw = "1. Billing\n2) Shipping\n12. Billing\n";
        let labels = reconcile(raw, 3, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec!["Billing", "Shipping", "Billing"]);
    }

    #[test]
    fn test_whitespace_trimmed_and_blank_lines_dropped() {
        let raw = "  Billing  \n\n   Shipping\n";
        let labels = reconcile(raw, 2, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec!["Billing", "Shipping"]);
    }

    #[test]
    fn test_out_of_schema_label_kept_verbatim() {
        // 不校验标签是否属于类目体系，原样接受
        let labels = reconcile("Something Else\n", 1, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec!["Something Else"]);
    }

    #[test]
    fn test_label_with_internal_digits_untouched() {
        let labels = reconcile("Tier 2 Escalation\n", 1, LABEL_UNCATEGORIZED).unwrap();
        assert_eq!(labels, vec!["Tier 2 Escalation"]);
    }
}
