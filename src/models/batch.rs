//! 批次划分
//!
//! 把按行的上下文序列切成连续、不重叠、保持原序的定长批次，
//! 最后一批可以不足额

/// 一个批次：上下文序列中的一段连续切片
#[derive(Debug, Clone)]
pub struct Batch {
    /// 批次下标（0 开始）
    pub index: usize,
    /// 本批第一行在数据集中的行位置
    pub start_row: usize,
    /// 本批的上下文条目
    pub entries: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 把上下文序列划分为 `ceil(N/B)` 个批次
///
/// 不变式：所有批次的行位置恰好覆盖 `[0, N)`，无空洞无重叠，顺序不变。
/// 调用方保证 `batch_size > 0`（流水线预检阶段校验）
pub fn split_batches(contexts: &[String], batch_size: usize) -> Vec<Batch> {
    debug_assert!(batch_size > 0, "批大小必须为正整数");

    let mut batches = Vec::with_capacity(contexts.len().div_ceil(batch_size));
    for (index, chunk) in contexts.chunks(batch_size).enumerate() {
        batches.push(Batch {
            index,
            start_row: index * batch_size,
            entries: chunk.to_vec(),
        });
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("row-{}", i)).collect()
    }

    #[test]
    fn test_65_rows_batch_30_gives_30_30_5() {
        let batches = split_batches(&contexts(65), 30);
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![30, 30, 5]);
    }

    #[test]
    fn test_partition_is_exact_and_ordered() {
        for (n, b) in [(0usize, 30usize), (1, 30), (29, 30), (30, 30), (31, 30), (90, 30), (200, 7)] {
            let batches = split_batches(&contexts(n), b);
            assert_eq!(batches.len(), n.div_ceil(b));

            let mut covered = Vec::new();
            for (i, batch) in batches.iter().enumerate() {
                assert_eq!(batch.index, i);
                assert_eq!(batch.start_row, covered.len());
                for (offset, entry) in batch.entries.iter().enumerate() {
                    assert_eq!(entry, &format!("row-{}", batch.start_row + offset));
                    covered.push(batch.start_row + offset);
                }
            }
            // 行位置恰好是 [0, N)
            assert_eq!(covered, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let batches = split_batches(&contexts(60), 30);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 30));
    }

    #[test]
    fn test_fewer_rows_than_batch_size() {
        let batches = split_batches(&contexts(5), 30);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[0].start_row, 0);
    }
}
