// Command handlers, one module per command group

pub mod run;
pub mod utils;
pub mod worker;
