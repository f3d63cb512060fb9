use log::info;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::Result;
use crate::models::stock::StockName;

/// 股票名称表，按代码去重，保留插入顺序
///
/// 批处理中只由汇总方持有并写入，工作线程通过通道提交结果。
#[derive(Debug, Default, Clone, Serialize)]
pub struct StockNameRegistry {
    names: Vec<StockName>,
    // 索引用于快速查重
    #[serde(skip)]
    code_index: HashMap<String, usize>,
}

impl StockNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加股票，代码已存在时忽略并返回 false
    pub fn add(&mut self, name: StockName) -> bool {
        if self.code_index.contains_key(&name.code) {
            return false;
        }

        self.code_index.insert(name.code.clone(), self.names.len());
        self.names.push(name);
        true
    }

    pub fn get(&self, code: &str) -> Option<&StockName> {
        self.code_index.get(code).map(|&idx| &self.names[idx])
    }

    /// 按插入顺序返回所有股票
    pub fn names(&self) -> &[StockName] {
        &self.names
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 输出名称文件，每行 `<code> <name>`
    pub fn write_name_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        info!("Output name file: {}", path.as_ref().display());
        write_lines(path.as_ref(), self.names.iter().map(|n| n.to_string()))
    }

    /// 输出代码文件，每行一个代码
    pub fn write_code_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        info!("Output code file: {}", path.as_ref().display());
        write_lines(path.as_ref(), self.codes().map(|c| c.to_string()))
    }
}

fn write_lines<I: Iterator<Item = String>>(path: &Path, lines: I) -> Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}
