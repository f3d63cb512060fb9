pub mod batch_service;
pub mod convert_service;
pub mod merge_service;
