pub mod input;
pub mod run;
pub mod typing;
