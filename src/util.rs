use chrono::NaiveDate;
use encoding_rs::Encoding;
use log::warn;
use std::fs;
use std::path::Path;

use crate::errors::Result;

// 导出工具可能使用的日期格式
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y", "%Y.%m.%d"];

/// 解析交易日期，支持常见的几种导出格式
pub fn parse_trade_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// 按指定编码读取文本文件
pub fn read_text_with_encoding(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path)?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            "File {} contains bytes that are not valid {}",
            path.display(),
            encoding.name()
        );
    }
    Ok(text.into_owned())
}

/// 读取输入文件列表（UTF-8，每行一个路径，忽略空行）
pub fn read_file_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

// 日线CSV读写工具
pub mod csv_utils {
    use super::*;
    use crate::models::stock::{DailyRecord, OUTPUT_HEADER};
    use csv::{ReaderBuilder, WriterBuilder};

    /// 读取日线CSV文件，保持文件中的原始顺序
    pub fn read_daily_records(path: &Path) -> Result<Vec<DailyRecord>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<DailyRecord>() {
            records.push(row?);
        }

        Ok(records)
    }

    /// 写出日线CSV文件，没有数据行时也写表头
    pub fn write_daily_records(path: &Path, records: &[DailyRecord]) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;

        writer.write_record(OUTPUT_HEADER.split(','))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stock::{DailyRecord, OUTPUT_HEADER};
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_export_date_formats() {
        for text in ["2024-01-02", "2024/01/02", "20240102", "01/02/2024", " 2024.01.02 "] {
            assert_eq!(parse_trade_date(text), Some(date(2024, 1, 2)), "{}", text);
        }
        assert_eq!(parse_trade_date("2024-13-40"), None);
        assert_eq!(parse_trade_date("日期"), None);
    }

    #[test]
    fn decodes_gbk_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SH600000.txt");
        let (bytes, _, _) = encoding_rs::GBK.encode("600000 浦发银行 日线 前复权\r\n");
        fs::write(&path, &bytes).unwrap();

        let text = read_text_with_encoding(&path, encoding_rs::GBK).unwrap();
        assert_eq!(text.lines().next(), Some("600000 浦发银行 日线 前复权"));
    }

    #[test]
    fn file_list_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "a.txt\n\n   \n  b.txt  \r\n").unwrap();

        assert_eq!(read_file_list(&path).unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn empty_record_set_still_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("600000.day.csv");
        csv_utils::write_daily_records(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{}\n", OUTPUT_HEADER));
        assert!(csv_utils::read_daily_records(&path).unwrap().is_empty());
    }

    #[test]
    fn written_rows_keep_source_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("600000.day.csv");
        let record = DailyRecord {
            code: "600000".to_string(),
            date: "2024/01/02".to_string(),
            open: "10.00".to_string(),
            high: "10.50".to_string(),
            low: "9.90".to_string(),
            close: "10.20".to_string(),
            volume: "123456".to_string(),
            amount: "1234567.00".to_string(),
        };
        csv_utils::write_daily_records(&path, &[record.clone()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().nth(1),
            Some("600000,2024/01/02,10.00,10.50,9.90,10.20,123456,1234567.00")
        );
        assert_eq!(csv_utils::read_daily_records(&path).unwrap(), vec![record]);
    }
}
