pub mod args;

use clap::Parser;
pub use args::{Arguments, SanitizerKind};

pub fn parse() -> Arguments {
    Arguments::parse()
}
