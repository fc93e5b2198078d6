pub mod storage;
pub mod uploads;
