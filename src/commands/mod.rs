pub mod endpoint;
pub mod run;
pub mod shell;
