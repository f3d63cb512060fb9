use chrono::NaiveDate;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::errors::{IngestError, Result};
use crate::models::stock::DailyRecord;
use crate::util::csv_utils;

/// 带排序键（交易日期）的记录
pub type DatedRecord = (NaiveDate, DailyRecord);

/// 解析每条记录的交易日期，任一日期无法解析即返回错误
pub fn key_by_date(records: Vec<DailyRecord>, source: &Path) -> Result<Vec<DatedRecord>> {
    records
        .into_iter()
        .map(|record| match record.trade_date() {
            Some(date) => Ok((date, record)),
            None => Err(IngestError::DataError(format!(
                "Failed to parse date {} in {}",
                record.date,
                source.display()
            ))),
        })
        .collect()
}

/// 同一来源内按日期去重（保留文件中第一次出现的行），再按日期升序排序
pub fn dedup_and_sort(records: Vec<DatedRecord>) -> Vec<DatedRecord> {
    let mut seen: HashSet<NaiveDate> = HashSet::with_capacity(records.len());
    let mut unique: Vec<DatedRecord> = records
        .into_iter()
        .filter(|(date, _)| seen.insert(*date))
        .collect();

    unique.sort_by_key(|(date, _)| *date);
    unique
}

/// 合并两个已按日期升序排列且无重复日期的序列
///
/// 日期相同时以增量数据为准。
pub fn merge_sorted(full: Vec<DatedRecord>, delta: Vec<DatedRecord>) -> Vec<DailyRecord> {
    let mut merged = Vec::with_capacity(full.len() + delta.len());
    let mut full_iter = full.into_iter().peekable();
    let mut delta_iter = delta.into_iter().peekable();

    loop {
        let order = match (full_iter.peek(), delta_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((f, _)), Some((d, _))) => f.cmp(d),
        };

        match order {
            Ordering::Less => merged.extend(full_iter.next().map(|(_, r)| r)),
            Ordering::Greater => merged.extend(delta_iter.next().map(|(_, r)| r)),
            Ordering::Equal => {
                full_iter.next();
                merged.extend(delta_iter.next().map(|(_, r)| r));
            }
        }
    }

    merged
}

// 读取一个合并来源，返回去重并排序后的记录
fn load_source(path: &Path) -> Result<Vec<DatedRecord>> {
    let records = csv_utils::read_daily_records(path)?;
    Ok(dedup_and_sort(key_by_date(records, path)?))
}

/// 把增量文件合并进完整历史文件，成功后删除增量文件
///
/// 任一文件不存在时只记录日志并返回 `Ok(false)`。
pub fn merge_files(full_path: &Path, delta_path: &Path) -> Result<bool> {
    if !full_path.exists() || !delta_path.exists() {
        warn!(
            "file {} or {} does not exist, skip merging",
            full_path.display(),
            delta_path.display()
        );
        return Ok(false);
    }

    let full = load_source(full_path)?;
    let delta = load_source(delta_path)?;
    let (full_len, delta_len) = (full.len(), delta.len());

    let merged = merge_sorted(full, delta);

    // 写入临时文件后整体替换完整历史
    let tmp_path = full_path.with_extension("csv.tmp");
    csv_utils::write_daily_records(&tmp_path, &merged)?;
    fs::rename(&tmp_path, full_path)?;

    fs::remove_file(delta_path)?;

    debug!(
        "Merged {} full rows and {} delta rows into {} rows",
        full_len,
        delta_len,
        merged.len()
    );
    info!("Merged {} into {}", delta_path.display(), full_path.display());

    Ok(true)
}
