use csv::ReaderBuilder;
use std::path::Path;
use tokio::fs;

use crate::error::{AppError, AppResult, FileError};
use crate::models::dataset::Dataset;

/// 解析 CSV 文本为数据集
///
/// 要求首行为表头；行宽允许不一致（短行的缺失单元格按空字符串处理）。
/// 不做任何去空白处理，保证单元格内容逐字节保留
pub fn parse_csv_str(content: &str) -> AppResult<Dataset> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(Dataset::new(headers, rows))
}

/// 从 CSV 文件加载数据集
pub async fn load_csv_to_dataset(csv_file_path: &Path) -> AppResult<Dataset> {
    if !csv_file_path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: csv_file_path.display().to_string(),
        }));
    }

    let content = fs::read_to_string(csv_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(csv_file_path.display().to_string(), e))?;

    let dataset = parse_csv_str(&content)?;

    tracing::info!(
        "已加载 {}: {} 行 × {} 列",
        csv_file_path.display(),
        dataset.row_count(),
        dataset.headers.len()
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_csv() {
        let ds = parse_csv_str("id,text\n1,hello\n2,world\n").unwrap();
        assert_eq!(ds.headers, vec!["id", "text"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.cell(1, 1), "world");
    }

    #[test]
    fn test_parse_short_rows_tolerated() {
        let ds = parse_csv_str("id,text,notes\n1,hello\n").unwrap();
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.cell(0, 2), "");
    }

    #[test]
    fn test_parse_preserves_quoted_punctuation() {
        let ds = parse_csv_str("text\n\"costs $5, not \"\"free\"\"\"\n").unwrap();
        assert_eq!(ds.cell(0, 0), "costs $5, not \"free\"");
    }

    #[test]
    fn test_load_missing_file() {
        let result = tokio_test::block_on(load_csv_to_dataset(Path::new(
            "does_not_exist_dataset.csv",
        )));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
