//! 表格数据集
//!
//! 行位置从 0 开始、与文件顺序一致，整个流水线期间从不重排

/// 表格数据集：有序表头 + 有序数据行
///
/// 行可以比表头短（源文件缺值），读取缺失单元格时按空字符串处理
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 按列名查找列下标
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 读取单元格，缺失按空字符串处理
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// 追加一列
    ///
    /// 先把每行补齐到当前表头宽度，再写入新列的值；
    /// `values` 多出的部分丢弃，不足的部分以空字符串补齐
    pub fn append_column(&mut self, name: &str, values: &[String]) {
        let width = self.headers.len();
        self.headers.push(name.to_string());
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.resize(width, String::new());
            row.push(values.get(i).cloned().unwrap_or_default());
        }
    }
}
