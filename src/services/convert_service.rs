use log::{debug, info, warn};
use std::path::Path;

use crate::config::Config;
use crate::errors::{IngestError, Result};
use crate::models::stock::{DailyRecord, StockName};
use crate::parsers::header;
use crate::parsers::row_filter::{DropStats, RowFilter, RowOutcome};
use crate::services::merge_service;
use crate::util::{self, csv_utils};

/// 单文件转换服务：原始导出文件 -> 完整历史文件或增量文件
pub struct ConvertService {
    config: Config,
    row_filter: RowFilter,
}

impl ConvertService {
    pub fn new(config: Config) -> Self {
        let row_filter = RowFilter::new(config.window);
        Self { config, row_filter }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 转换单个输入文件
    ///
    /// 返回 `Ok(None)` 表示文件被跳过（行数不足或首行格式错误），
    /// 其他错误均附带文件路径返回。
    pub fn convert_file(&self, file: &str) -> Result<Option<StockName>> {
        match self.convert_inner(Path::new(file)) {
            Ok(name) => Ok(Some(name)),
            Err(e) if e.is_recoverable() => {
                warn!("Ignore input {}: {}", file, e);
                Ok(None)
            }
            Err(e) => Err(e.with_path(file)),
        }
    }

    fn convert_inner(&self, path: &Path) -> Result<StockName> {
        let text = util::read_text_with_encoding(path, self.config.input_encoding)?;
        let lines: Vec<&str> = text.lines().collect();

        // 至少两行表头加一行数据
        if lines.len() <= 2 {
            return Err(IngestError::TooShort {
                path: path.display().to_string(),
                lines: lines.len(),
            });
        }

        let stock_name = header::resolve_stock_name(lines[0], path)?;

        let full_path = self.config.full_data_path(&stock_name.code);
        let delta_path = self.config.delta_data_path(&stock_name.code);
        let generate_delta = full_path.exists();
        let output_path = if generate_delta { &delta_path } else { &full_path };

        // 第二行为列名，最后一行为数据来源说明
        let mut stats = DropStats::default();
        let mut records: Vec<DailyRecord> = Vec::with_capacity(lines.len() - 3);
        for line in &lines[2..lines.len() - 1] {
            match self.row_filter.filter_line(&stock_name.code, line) {
                RowOutcome::Keep(record) => records.push(record),
                other => stats.record(&other),
            }
        }

        if stats.total() > 0 {
            debug!(
                "{}: dropped {} rows (width {}, date {}, window {}, zero volume {})",
                stock_name.code,
                stats.total(),
                stats.wrong_width,
                stats.bad_date,
                stats.out_of_window,
                stats.zero_volume
            );
        }

        // 新建的完整历史同样需要按日期升序且无重复
        if !generate_delta {
            let dated = merge_service::key_by_date(records, path)?;
            records = merge_service::dedup_and_sort(dated)
                .into_iter()
                .map(|(_, record)| record)
                .collect();
        }

        csv_utils::write_daily_records(output_path, &records)?;
        info!(
            "Wrote {} rows of {} to {}",
            records.len(),
            stock_name.code,
            output_path.display()
        );

        if generate_delta {
            merge_service::merge_files(&full_path, &delta_path)?;
        }

        Ok(stock_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_gbk(path: &Path, content: &str) {
        let (bytes, _, _) = encoding_rs::GBK.encode(content);
        fs::write(path, &bytes).unwrap();
    }

    #[test]
    fn too_short_file_is_skipped() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("600000.txt");
        write_gbk(&input, "600000 浦发银行 日线 前复权\n日期,开盘,最高,最低,收盘,成交量,成交额\n");

        let service = ConvertService::new(Config::new().with_output_dir(dir.path()));
        assert_eq!(service.convert_file(input.to_str().unwrap()).unwrap(), None);
        assert!(!dir.path().join("600000.day.csv").exists());
    }

    #[test]
    fn malformed_header_is_skipped() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("600000.txt");
        write_gbk(
            &input,
            "600000 日线\n日期\n2024/01/02,1,1,1,1,100,100\n数据来源:通达信\n",
        );

        let service = ConvertService::new(Config::new().with_output_dir(dir.path()));
        assert_eq!(service.convert_file(input.to_str().unwrap()).unwrap(), None);
    }

    #[test]
    fn missing_input_is_fatal_with_path() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("missing.txt");
        let service = ConvertService::new(Config::new().with_output_dir(dir.path()));

        let err = service.convert_file(input.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, IngestError::FileError { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn rows_carry_file_name_code() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("SH600000.txt");
        write_gbk(
            &input,
            "600000 浦发银行 日线 前复权\n日期,开盘,最高,最低,收盘,成交量,成交额\n\
             2024/01/02,10.00,10.50,9.90,10.20,123456,1234567.00\n数据来源:通达信\n",
        );

        let service = ConvertService::new(Config::new().with_output_dir(dir.path()));
        let name = service.convert_file(input.to_str().unwrap()).unwrap().unwrap();
        assert_eq!(name, StockName::new("SH600000", "浦发银行"));

        let records = csv_utils::read_daily_records(&dir.path().join("SH600000.day.csv")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "SH600000");
    }

    #[test]
    fn new_export_merges_into_slash_dated_history() {
        let dir = tempdir().unwrap();
        let full_path = dir.path().join("600000.day.csv");
        fs::write(
            &full_path,
            "code,date,open,highest,lowest,close,volume,amount\n\
             600000,2024/01/02,10.00,10.50,9.90,10.20,123456,1234567.00\n",
        )
        .unwrap();

        let input = dir.path().join("600000.txt");
        write_gbk(
            &input,
            "600000 浦发银行 日线 前复权\n日期,开盘,最高,最低,收盘,成交量,成交额\n\
             2024/01/03,10.20,10.80,10.10,10.70,223456,2234567.00\n数据来源:通达信\n",
        );

        let service = ConvertService::new(Config::new().with_output_dir(dir.path()));
        let name = service.convert_file(input.to_str().unwrap()).unwrap();
        assert_eq!(name, Some(StockName::new("600000", "浦发银行")));
        assert!(!dir.path().join("600000.day.delta.csv").exists());

        let content = fs::read_to_string(&full_path).unwrap();
        let rows: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(
            rows,
            vec![
                "600000,2024/01/02,10.00,10.50,9.90,10.20,123456,1234567.00",
                "600000,2024/01/03,10.20,10.80,10.10,10.70,223456,2234567.00",
            ]
        );
    }
}
