use crate::registry::StockNameRegistry;
use serde::Serialize;

/// 单个文件的致命错误
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub error: String,
}

/// 一次批处理的汇总结果
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub registry: StockNameRegistry,
    pub converted: usize,
    pub skipped: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> usize {
        self.converted + self.skipped.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 以 JSON 格式保存汇总结果
    pub fn save_json(&self, path: &str) -> crate::errors::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
