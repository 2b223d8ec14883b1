pub mod clock;
pub mod error;
pub mod query;
pub mod storage;
pub mod summary;
pub mod task;

mod task_tests;
