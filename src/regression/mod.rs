mod bad_programs;
mod programs;

use crate::io::IgnoreOutput;
use crate::machine::{self, Machine};
use crate::memory::Memory;
use crate::program::Program;
use crate::syntax;
use crate::xml;

/// Run `source` end to end, both directly and through a serialize/reread
/// round trip, and check the PRINT output. `stdin` lines are consumed in
/// order by READINT/READSTR.
pub fn run(source: &str, stdin: &[&str], stdout: &str) {
    let program = Program::new("test", syntax::parse(source).unwrap());
    let inputs: Vec<String> = stdin.iter().rev().map(|s| s.to_string()).collect();

    let mut memory = Memory::new();
    let mut input = inputs.clone();
    let mut output = String::new();
    Machine::new(&mut memory, &mut input, &mut output)
        .run(&program)
        .unwrap();
    assert_eq!(output, stdout);
    assert!(input.is_empty(), "unconsumed input lines: {:?}", input);

    // the serialized form must behave identically
    let reread = xml::read(&xml::write(&program)).unwrap();
    let mut memory = Memory::new();
    let mut input = inputs;
    let mut output = String::new();
    Machine::new(&mut memory, &mut input, &mut output)
        .run(&reread)
        .unwrap();
    assert_eq!(output, stdout);
}

/// Run `source` expecting a runtime failure; returns the error.
pub fn fails(source: &str, stdin: &[&str]) -> machine::Error {
    let program = Program::new("test", syntax::parse(source).unwrap());
    let mut inputs: Vec<String> = stdin.iter().rev().map(|s| s.to_string()).collect();

    let mut memory = Memory::new();
    let mut output = IgnoreOutput;
    Machine::new(&mut memory, &mut inputs, &mut output)
        .run(&program)
        .unwrap_err()
}
