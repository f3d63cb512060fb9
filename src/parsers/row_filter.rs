use crate::config::DateWindow;
use crate::models::stock::{DailyRecord, INPUT_COLUMN_COUNT};
use crate::util::parse_trade_date;

/// 单行过滤结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Keep(DailyRecord),
    WrongWidth,
    BadDate,
    OutOfWindow,
    ZeroVolume,
}

/// 各类被丢弃行的计数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropStats {
    pub wrong_width: usize,
    pub bad_date: usize,
    pub out_of_window: usize,
    pub zero_volume: usize,
}

impl DropStats {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Keep(_) => {}
            RowOutcome::WrongWidth => self.wrong_width += 1,
            RowOutcome::BadDate => self.bad_date += 1,
            RowOutcome::OutOfWindow => self.out_of_window += 1,
            RowOutcome::ZeroVolume => self.zero_volume += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.wrong_width + self.bad_date + self.out_of_window + self.zero_volume
    }
}

/// 数据行过滤：列数、日期、日期窗口、零成交量
#[derive(Debug, Clone, Copy)]
pub struct RowFilter {
    window: DateWindow,
}

impl RowFilter {
    pub fn new(window: DateWindow) -> Self {
        Self { window }
    }

    pub fn filter_line(&self, code: &str, line: &str) -> RowOutcome {
        let columns: Vec<&str> = line.trim().split(',').collect();
        if columns.len() != INPUT_COLUMN_COUNT {
            return RowOutcome::WrongWidth;
        }

        let date = match parse_trade_date(columns[0]) {
            Some(date) => date,
            None => return RowOutcome::BadDate,
        };

        if !self.window.contains(&date) {
            return RowOutcome::OutOfWindow;
        }

        let record = match DailyRecord::from_columns(code, &columns) {
            Some(record) => record,
            None => return RowOutcome::WrongWidth,
        };

        // 停牌日成交量为0，不计入历史；成交量无法解析为整数时保留该行
        if record.volume_value() == Some(0) {
            return RowOutcome::ZeroVolume;
        }

        RowOutcome::Keep(record)
    }
}
