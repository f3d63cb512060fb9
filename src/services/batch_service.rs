use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::config::Config;
use crate::errors::{IngestError, Result};
use crate::models::report::{BatchReport, FileFailure};
use crate::models::stock::StockName;
use crate::services::convert_service::ConvertService;
use crate::util;

// 工作线程提交给汇总方的单文件结果
struct FileOutcome {
    path: String,
    result: Result<Option<StockName>>,
}

/// 批处理服务，并发转换多个输入文件并汇总股票名称表
pub struct BatchService {
    converter: Arc<ConvertService>,
}

impl BatchService {
    pub fn new(config: Config) -> Self {
        Self {
            converter: Arc::new(ConvertService::new(config)),
        }
    }

    pub fn config(&self) -> &Config {
        self.converter.config()
    }

    /// 处理单个输入文件
    pub fn process_single_file(&self, file: &str) -> Result<BatchReport> {
        let file = file.trim();
        let mut report = BatchReport::new();

        match self.converter.convert_file(file)? {
            Some(name) => {
                report.converted += 1;
                report.registry.add(name);
            }
            None => report.skipped.push(file.to_string()),
        }

        Ok(report)
    }

    /// 处理列表文件中的所有输入文件
    pub async fn process_file_list<P: AsRef<Path>>(&self, list_file: P) -> Result<BatchReport> {
        let files = util::read_file_list(list_file)?;
        self.process_files(files).await
    }

    /// 并发处理多个输入文件，空白路径被忽略
    ///
    /// `fail_fast` 为 true 时，任一文件出现致命错误即停止派发新任务并返回该错误；
    /// 否则继续处理其余文件，失败记录在 `BatchReport::failures` 中。
    pub async fn process_files(&self, files: Vec<String>) -> Result<BatchReport> {
        let files: Vec<String> = files
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        let total = files.len();
        let mut report = BatchReport::new();
        if total == 0 {
            warn!("No input files to process");
            return Ok(report);
        }

        let fail_fast = self.config().fail_fast;
        let permits = self
            .config()
            .max_workers
            .unwrap_or(Semaphore::MAX_PERMITS)
            .min(Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let (tx, mut rx) = mpsc::unbounded_channel::<FileOutcome>();

        info!("Processing {} input files", total);

        let producer = {
            let semaphore = semaphore.clone();
            let converter = self.converter.clone();
            tokio::spawn(async move {
                for path in files {
                    // 信号量关闭表示批处理已中止
                    let permit = match semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };
                    let converter = converter.clone();
                    let tx = tx.clone();
                    tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        let result = converter.convert_file(&path);
                        let _ = tx.send(FileOutcome { path, result });
                    });
                }
            })
        };

        // 名称表只在这里写入
        let mut received = 0;
        while let Some(outcome) = rx.recv().await {
            received += 1;
            info!("[{}/{}] {}", received, total, outcome.path);

            match outcome.result {
                Ok(Some(name)) => {
                    report.converted += 1;
                    let code = name.code.clone();
                    if !report.registry.add(name) {
                        warn!("Duplicate stock code {} from {}, keep the first one", code, outcome.path);
                    }
                }
                Ok(None) => report.skipped.push(outcome.path),
                Err(e) if fail_fast => {
                    semaphore.close();
                    error!("Abort batch: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("{}", e);
                    report.failures.push(FileFailure {
                        path: outcome.path,
                        error: e.to_string(),
                    });
                }
            }
        }

        producer
            .await
            .map_err(|e| IngestError::Unknown(format!("Batch producer failed: {}", e)))?;

        if received < total {
            return Err(IngestError::Unknown(format!(
                "{} of {} workers terminated without a result",
                total - received,
                total
            )));
        }

        info!(
            "Batch finished: {} converted, {} skipped, {} failed",
            report.converted,
            report.skipped.len(),
            report.failures.len()
        );

        Ok(report)
    }
}
