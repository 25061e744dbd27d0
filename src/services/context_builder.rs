//! 上下文构造 - 业务能力层
//!
//! 只负责"选中列 → 每行一条上下文字符串"这一件事，不关心批次和流程

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::Dataset;

/// 列值之间的拼接分隔符
pub const CONTEXT_DELIMITER: &str = " | ";

/// 把选中列合并为每行一条上下文字符串
///
/// 缺失单元格按空字符串参与拼接而不是跳过，这样每行拼出的
/// 列数恒定，模型对齐更稳。纯函数：同样的输入永远得到同样的输出
///
/// # 错误
/// - 未选择任何列 → `ConfigError::EmptyColumnSelection`
/// - 列名不在表头中 → `ConfigError::UnknownColumn`
pub fn build_contexts(dataset: &Dataset, selected_columns: &[String]) -> AppResult<Vec<String>> {
    if selected_columns.is_empty() {
        return Err(AppError::Config(ConfigError::EmptyColumnSelection));
    }

    // 先把列名解析成下标，任何未知列在发出请求之前就报错
    let mut indices = Vec::with_capacity(selected_columns.len());
    for name in selected_columns {
        match dataset.column_index(name) {
            Some(idx) => indices.push(idx),
            None => return Err(AppError::unknown_column(name.clone())),
        }
    }

    let contexts = (0..dataset.row_count())
        .map(|row| {
            indices
                .iter()
                .map(|&col| dataset.cell(row, col))
                .collect::<Vec<_>>()
                .join(CONTEXT_DELIMITER)
        })
        .collect();

    Ok(contexts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["id".to_string(), "subject".to_string(), "body".to_string()],
            vec![
                vec!["1".to_string(), "refund".to_string(), "want my $5 back".to_string()],
                vec!["2".to_string(), "late".to_string()], // body 缺失
                vec!["3".to_string(), "".to_string(), "no subject".to_string()],
            ],
        )
    }

    #[test]
    fn test_joins_selected_columns_in_order() {
        let contexts =
            build_contexts(&sample(), &["subject".to_string(), "body".to_string()]).unwrap();
        assert_eq!(contexts[0], "refund | want my $5 back");
    }

    #[test]
    fn test_missing_cell_becomes_empty_string() {
        let contexts =
            build_contexts(&sample(), &["subject".to_string(), "body".to_string()]).unwrap();
        // 缺失单元格不省略，列数恒定
        assert_eq!(contexts[1], "late | ");
        assert_eq!(contexts[2], " | no subject");
    }

    #[test]
    fn test_one_context_per_row() {
        let ds = sample();
        let contexts = build_contexts(&ds, &["subject".to_string()]).unwrap();
        assert_eq!(contexts.len(), ds.row_count());
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let ds = sample();
        let cols = vec!["subject".to_string(), "body".to_string()];
        let first = build_contexts(&ds, &cols).unwrap();
        let second = build_contexts(&ds, &cols).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let result = build_contexts(&sample(), &[]);
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::EmptyColumnSelection))
        ));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let result = build_contexts(&sample(), &["nope".to_string()]);
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::UnknownColumn { .. }))
        ));
    }
}
