pub mod task_list;
pub mod task_store;
