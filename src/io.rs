use std::fs::File;
use std::io::{self, BufWriter, Stdin, Write};

pub trait InputStream {
    fn read(&mut self) -> Option<String>;
}

pub trait OutputStream {
    fn write(&mut self, text: &str);
}

// IO streams implementations
impl InputStream for Stdin {
    fn read(&mut self) -> Option<String> {
        let mut line = String::new();
        if self.read_line(&mut line).ok()? == 0 {
            return None; // EOF
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Some(line)
    }
}

// Lines are stored reversed; read pops from the back
impl InputStream for Vec<String> {
    fn read(&mut self) -> Option<String> {
        self.pop()
    }
}

pub struct EmptyInput;
impl InputStream for EmptyInput {
    fn read(&mut self) -> Option<String> {
        None
    }
}

impl OutputStream for io::Stdout {
    fn write(&mut self, text: &str) {
        let _ = self.write_all(text.as_bytes());
    }
}

impl OutputStream for BufWriter<File> {
    fn write(&mut self, text: &str) {
        let _ = self.write_all(text.as_bytes());
    }
}

impl OutputStream for String {
    fn write(&mut self, text: &str) {
        self.push_str(text)
    }
}

pub struct IgnoreOutput;
impl OutputStream for IgnoreOutput {
    fn write(&mut self, _: &str) {}
}

/// Where READINT/READSTR values come from: a buffered list of lines
/// consumed in order, or the interactive console.
pub enum Input {
    Lines(Vec<String>),
    Console(Stdin),
}

impl Input {
    /// Buffers `text` split into lines, first line read first.
    pub fn buffered(text: &str) -> Self {
        Input::Lines(text.lines().rev().map(String::from).collect())
    }

    pub fn console() -> Self {
        Input::Console(io::stdin())
    }
}

impl InputStream for Input {
    fn read(&mut self) -> Option<String> {
        match self {
            Input::Lines(lines) => lines.read(),
            Input::Console(stdin) => stdin.read(),
        }
    }
}

/// Where PRINT/PRINTLN text goes.
pub enum Output {
    Console(io::Stdout),
    File(BufWriter<File>),
}

impl Output {
    pub fn console() -> Self {
        Output::Console(io::stdout())
    }

    pub fn file(file: File) -> Self {
        Output::File(BufWriter::new(file))
    }
}

impl OutputStream for Output {
    fn write(&mut self, text: &str) {
        match self {
            Output::Console(stdout) => OutputStream::write(stdout, text),
            Output::File(file) => OutputStream::write(file, text),
        }
    }
}
