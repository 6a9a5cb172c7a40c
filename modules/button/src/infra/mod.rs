pub mod json_users;
pub mod storage;
