pub mod operations;
pub mod wav;
