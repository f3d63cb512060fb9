pub mod header;
pub mod row_filter;
