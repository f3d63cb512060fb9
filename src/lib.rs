// 公开导出的模块，供外部使用
pub mod config;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod registry;
pub mod services;
pub mod util;

// 重新导出常用类型，方便使用
pub use config::{Config, DateWindow};
pub use errors::{IngestError, Result};
pub use models::report::BatchReport;
pub use models::stock::{DailyRecord, StockName};
pub use registry::StockNameRegistry;
pub use services::batch_service::BatchService;
