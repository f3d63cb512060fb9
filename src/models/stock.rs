use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::parse_trade_date;

/// 输出文件的固定表头
pub const OUTPUT_HEADER: &str = "code,date,open,highest,lowest,close,volume,amount";

/// 输入数据行的列数（输出表头去掉 code 列）
pub const INPUT_COLUMN_COUNT: usize = 7;

/// 股票代码与名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StockName {
    pub code: String,
    pub name: String,
}

impl StockName {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for StockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.name)
    }
}

/// 单条日线记录
///
/// 除 code 外各列均按输入原文保存，日期排序键由 `trade_date` 解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub code: String,
    pub date: String,
    pub open: String,
    #[serde(rename = "highest")]
    pub high: String,
    #[serde(rename = "lowest")]
    pub low: String,
    pub close: String,
    pub volume: String,
    pub amount: String,
}

impl DailyRecord {
    /// 由已拆分的输入列构造记录，`columns` 不含 code 列
    pub fn from_columns(code: &str, columns: &[&str]) -> Option<Self> {
        if columns.len() != INPUT_COLUMN_COUNT {
            return None;
        }

        Some(Self {
            code: code.to_string(),
            date: columns[0].to_string(),
            open: columns[1].to_string(),
            high: columns[2].to_string(),
            low: columns[3].to_string(),
            close: columns[4].to_string(),
            volume: columns[5].to_string(),
            amount: columns[6].to_string(),
        })
    }

    /// 交易日期，支持导出工具的多种日期格式
    pub fn trade_date(&self) -> Option<NaiveDate> {
        parse_trade_date(&self.date)
    }

    /// 成交量（整数形式），无法解析时返回 None
    pub fn volume_value(&self) -> Option<i64> {
        self.volume.trim().parse::<i64>().ok()
    }
}
