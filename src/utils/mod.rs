pub mod command;
pub mod fastx;
pub mod file;
pub mod samples;
pub mod script;
pub mod system;
