//! 标签体系与分析模式
//!
//! 两个近似重复的前端（按用户类目分类 / 自由模式提炼）在这里收敛为
//! 一个带模式开关的数据模型，提示词模板与兜底标签都由模式决定

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ConfigError};

/// 哨兵标签：回复行数不足或未处理行的占位
pub const LABEL_UNCATEGORIZED: &str = "Uncategorized";
/// 哨兵标签：批次耗尽重试或遇到致命错误
pub const LABEL_API_ERROR: &str = "API_Error";
/// 哨兵标签：模式提炼模式下的占位
pub const LABEL_PATTERN_UNKNOWN: &str = "Pattern Unknown";

/// 用户定义的类目
///
/// 定义文本可以包含任意字符（引号、括号、货币符号等），
/// 嵌入提示词时一律走 JSON 序列化，不做裸文本拼接
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub definition: String,
}

/// 标签体系：有序的类目列表
///
/// 不变式：至少一个类目，类目名非空且互不重复。
/// 构造即校验，分类开始后不再变化（始终以不可变引用传递）
#[derive(Debug, Clone)]
pub struct LabelSchema {
    categories: Vec<Category>,
}

impl LabelSchema {
    /// 从 (名称, 定义) 列表构造并校验标签体系
    pub fn new(pairs: Vec<(String, String)>) -> AppResult<Self> {
        let categories: Vec<Category> = pairs
            .into_iter()
            .map(|(name, definition)| Category { name, definition })
            .collect();
        Self::from_categories(categories)
    }

    /// 从类目列表构造并校验标签体系
    pub fn from_categories(categories: Vec<Category>) -> AppResult<Self> {
        if categories.is_empty() {
            return Err(AppError::Config(ConfigError::EmptySchema));
        }
        let mut seen = Vec::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(AppError::Config(ConfigError::EmptyCategoryName { position }));
            }
            if seen.contains(&category.name.as_str()) {
                return Err(AppError::Config(ConfigError::DuplicateCategory {
                    name: category.name.clone(),
                }));
            }
            seen.push(category.name.as_str());
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// 类目名列表（保持定义顺序）
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// 判断标签是否属于本体系
    pub fn contains(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c.name == label)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// 分析模式
///
/// - `Thematic`: 按用户定义的类目做受限分类
/// - `Pattern`: 无类目，让模型自由归纳高层级模式
#[derive(Debug, Clone)]
pub enum AnalysisMode {
    Thematic(LabelSchema),
    Pattern,
}

impl AnalysisMode {
    /// 回复对不齐时用于补齐的占位标签
    pub fn pad_label(&self) -> &'static str {
        match self {
            AnalysisMode::Thematic(_) => LABEL_UNCATEGORIZED,
            AnalysisMode::Pattern => LABEL_PATTERN_UNKNOWN,
        }
    }

    /// 结果列名
    pub fn output_column(&self) -> &'static str {
        match self {
            AnalysisMode::Thematic(_) => "AI_Result",
            AnalysisMode::Pattern => "Standard_Pattern",
        }
    }

    pub fn schema(&self) -> Option<&LabelSchema> {
        match self {
            AnalysisMode::Thematic(schema) => Some(schema),
            AnalysisMode::Pattern => None,
        }
    }
}
