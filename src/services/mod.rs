pub mod ai;
pub mod dialogue;
pub mod interpreter;
pub mod records;
