use crate::errors::{IngestError, Result};
use chrono::NaiveDate;
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

/// 输入文件默认编码（导出工具写出的是 GB2312）
pub const DEFAULT_INPUT_ENCODING: &str = "gb2312";

/// 闭区间日期窗口 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 不做任何日期过滤的窗口
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: PathBuf,
    pub window: DateWindow,
    pub max_workers: Option<usize>, // None 表示不限制并发
    pub fail_fast: bool,
    pub input_encoding: &'static Encoding,
}

impl Config {
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            window: DateWindow::unbounded(),
            max_workers: None,
            fail_fast: true,
            input_encoding: encoding_rs::GBK,
        }
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_date_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.window.start = start;
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.window.end = end;
        self
    }

    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// 按编码标签（如 "gb2312"、"gbk"、"utf-8"）设置输入编码
    pub fn with_input_encoding(mut self, label: &str) -> Result<Self> {
        self.input_encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| IngestError::ConfigError(format!("Unknown input encoding: {}", label)))?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.start > self.window.end {
            return Err(IngestError::ConfigError(format!(
                "Start date {} is later than end date {}",
                self.window.start, self.window.end
            )));
        }

        if self.max_workers == Some(0) {
            return Err(IngestError::ConfigError("Worker count must be positive".to_string()));
        }

        Ok(())
    }

    /// 完整历史文件路径 `<code>.day.csv`
    pub fn full_data_path(&self, code: &str) -> PathBuf {
        self.output_dir.join(format!("{}.day.csv", code))
    }

    /// 增量文件路径 `<code>.day.delta.csv`
    pub fn delta_data_path(&self, code: &str) -> PathBuf {
        self.output_dir.join(format!("{}.day.delta.csv", code))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
