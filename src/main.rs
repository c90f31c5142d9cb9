mod driver;
mod io;
mod machine;
mod memory;
mod ops;
mod program;
#[cfg(test)]
mod regression;
mod syntax;
mod types;
mod xml;

use std::process::ExitCode;

fn main() -> ExitCode {
    driver::main()
}
