pub mod matcher;
pub mod table;
