pub mod break_assignment;
pub mod cleaning_record;
pub mod inspection;
pub mod task;
pub mod user;
