//! 结果写出 - 业务能力层
//!
//! 只负责"把数据集写成 CSV 文件"能力，不关心流程

use csv::WriterBuilder;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Dataset;

/// 结果写出服务
pub struct ResultWriter {
    output_path: String,
}

impl ResultWriter {
    pub fn new() -> Self {
        Self {
            output_path: "results.csv".to_string(),
        }
    }

    /// 使用自定义输出路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            output_path: path.into(),
        }
    }

    /// 把数据集写成 CSV 文件
    ///
    /// 每行先补齐到表头宽度再写出，保证输出文件行宽一致
    pub async fn write(&self, dataset: &Dataset) -> AppResult<()> {
        let content = render_csv(dataset)?;

        tokio::fs::write(&self.output_path, content)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_path.clone(), e))?;

        debug!(
            "已写出 {} ({} 行)",
            self.output_path,
            dataset.row_count()
        );

        Ok(())
    }
}

impl Default for ResultWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 把数据集渲染成 CSV 文本
pub fn render_csv(dataset: &Dataset) -> AppResult<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(&dataset.headers)?;

    let width = dataset.headers.len();
    for row in &dataset.rows {
        let mut record: Vec<&str> = row.iter().map(|s| s.as_str()).collect();
        record.resize(width, "");
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Other(format!("CSV 缓冲写出失败: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::Other(format!("CSV 编码失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pads_short_rows() {
        let ds = Dataset::new(
            vec!["id".to_string(), "text".to_string(), "AI_Result".to_string()],
            vec![
                vec!["1".to_string(), "hello".to_string(), "Billing".to_string()],
                vec!["2".to_string()],
            ],
        );
        let csv = render_csv(&ds).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,text,AI_Result");
        assert_eq!(lines[1], "1,hello,Billing");
        assert_eq!(lines[2], "2,,");
    }

    #[test]
    fn test_render_quotes_special_characters() {
        let ds = Dataset::new(
            vec!["text".to_string()],
            vec![vec!["costs $5, not \"free\"".to_string()]],
        );
        let csv = render_csv(&ds).unwrap();
        // 逗号和引号按 CSV 规则转义，往返解析后内容不变
        let reparsed = crate::models::parse_csv_str(&csv).unwrap();
        assert_eq!(reparsed.cell(0, 0), "costs $5, not \"free\"");
    }

    #[test]
    fn test_write_and_read_back() {
        let path = std::env::temp_dir().join("thematic_classifier_writer_test.csv");
        let ds = Dataset::new(
            vec!["a".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );

        let writer = ResultWriter::with_path(path.to_string_lossy().to_string());
        tokio_test::block_on(writer.write(&ds)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        let _ = std::fs::remove_file(&path);
    }
}
