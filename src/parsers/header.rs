use std::path::Path;

use crate::errors::{IngestError, Result};
use crate::models::stock::StockName;

/// 从文件名（去掉扩展名）中提取代码
pub fn code_from_file_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// 解析首行得到股票代码与名称，并与文件名中的代码交叉校验
///
/// 首行格式：`<代码> <名称...> <周期> <复权方式>`，名称可能被空格拆成多段。
/// 若文件名包含首行代码（如 `SH600000.txt` 包含 `600000`），以文件名为准。
pub fn resolve_stock_name(header_line: &str, file_path: &Path) -> Result<StockName> {
    let fields: Vec<&str> = header_line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(IngestError::MalformedHeader(header_line.trim().to_string()));
    }

    let declared_code = fields[0];
    let name: String = fields[1..fields.len() - 2].concat();

    let code = match code_from_file_name(file_path) {
        Some(file_code) if file_code.contains(declared_code) => file_code,
        _ => declared_code.to_string(),
    };

    Ok(StockName::new(code, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_with_plain_file_name() {
        let name = resolve_stock_name("600000 浦发银行 日线 前复权", Path::new("/in/600000.txt")).unwrap();
        assert_eq!(name, StockName::new("600000", "浦发银行"));
    }

    #[test]
    fn file_name_code_wins_when_it_contains_header_code() {
        let name = resolve_stock_name("600000 浦发银行 日线 前复权", Path::new("/in/SH600000.txt")).unwrap();
        assert_eq!(name.code, "SH600000");
    }

    #[test]
    fn header_code_used_when_file_name_unrelated() {
        let name = resolve_stock_name("000001 平安银行 日线 前复权", Path::new("/in/export-1.txt")).unwrap();
        assert_eq!(name.code, "000001");
    }

    #[test]
    fn multi_token_name_is_concatenated() {
        let name = resolve_stock_name("000002 万 科Ａ 日线 不复权", Path::new("000002.txt")).unwrap();
        assert_eq!(name.name, "万科Ａ");
    }

    #[test]
    fn short_header_is_rejected() {
        let err = resolve_stock_name("600000 日线 前复权", Path::new("600000.txt")).unwrap_err();
        assert!(matches!(err, IngestError::MalformedHeader(_)));
        assert!(err.is_recoverable());
    }
}
