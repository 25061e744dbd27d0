//! 提示词构造 - 业务能力层
//!
//! 把一个批次 + 分析模式渲染成单次请求的 (系统消息, 用户消息)。
//!
//! 两条硬约束：
//! - 类目定义走 JSON 序列化嵌入，用户输入的引号、括号、货币符号
//!   不会破坏按行解析的输出契约
//! - 输出契约是"每条输入恰好一行输出"，因为唯一的回传通道是自由文本

use crate::models::{AnalysisMode, Batch};

/// 构造一个批次的 (系统消息, 用户消息)
pub fn build_messages(mode: &AnalysisMode, batch: &Batch) -> (String, String) {
    match mode {
        AnalysisMode::Thematic(schema) => {
            let system_message = "You are a precise text classification assistant. \
                 You assign each entry to exactly one of the user-defined categories, \
                 strictly following the category definitions."
                .to_string();

            // 类目名列表和定义都走 JSON，特殊字符安全
            let names_json =
                serde_json::to_string(&schema.names()).unwrap_or_default();
            let definitions_json =
                serde_json::to_string_pretty(schema.categories()).unwrap_or_default();

            let user_message = format!(
                r#"TASK: Categorize each numbered entry below into exactly one of these categories: {}

DEFINITIONS (JSON):
{}

RULES:
- Return ONLY the exact category name for each entry.
- Output exactly one line per entry, in the same order as the entries.
- Do not add numbering, commentary or any other text.

ENTRIES:
{}"#,
                names_json,
                definitions_json,
                numbered_entries(batch)
            );

            (system_message, user_message)
        }
        AnalysisMode::Pattern => {
            let system_message = "You are an analyst who distills noisy records into \
                 high-level standard archetypes, focusing on the underlying cause or pattern."
                .to_string();

            let user_message = format!(
                r#"TASK: Identify the high-level 'Standard Archetype' for each numbered entry below.

RULES:
- Use a professional 3-word theme (e.g. 'Systemic Workflow Delay').
- Focus on the underlying cause or pattern.
- Return ONLY the list of themes, one per line, in the same order as the entries.
- Do not add numbering, commentary or any other text.

ENTRIES:
{}"#,
                numbered_entries(batch)
            );

            (system_message, user_message)
        }
    }
}

/// 把批次条目编号列出（1 开始），帮助模型保持对齐
///
/// 单元格里可能带换行，列出时压成空格，保证"一条目一行"
fn numbered_entries(batch: &Batch) -> String {
    batch
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, entry.replace(['\r', '\n'], " ")))
        .collect::<Vec<_>>()
        .join("\n")
}
