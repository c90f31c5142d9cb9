use thiserror::Error;

use crate::program::{BuildError, Instruction, Opcode, Operand, Role};
use crate::types::parse::exact;
use crate::types::{self, Int};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown operation code '{0}'")]
    UnknownOpcode(String),

    #[error("Wrong number of operands for {opcode}: expected {expected} tokens, found {found}")]
    Arity {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("Too many operands: {0} tokens on one line")]
    TooManyTokens(usize),

    #[error("Bad kind of operand for {0}")]
    BadOperand(Role),

    #[error("Integer literal '{0}' is out of range")]
    IntegerRange(String),
}

impl Error {
    pub fn code(&self) -> u8 {
        match self {
            Error::UnknownOpcode(_) => 11,
            Error::Arity { .. } | Error::TooManyTokens(_) => 12,
            Error::BadOperand(_) => 14,
            Error::IntegerRange(_) => 17,
        }
    }
}

/// Validate a whole source text into an instruction sequence.
pub fn parse(source: &str) -> Result<Vec<Instruction>, Error> {
    let mut instructions = Vec::new();
    for line in source.lines() {
        if let Some(instruction) = self::instruction(line)? {
            instructions.push(instruction);
        }
    }

    Ok(instructions)
}

/// Validate one source line: blank and comment lines produce nothing.
pub fn instruction(line: &str) -> Result<Option<Instruction>, Error> {
    let line = strip_comment(line);
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.is_empty() {
        return Ok(None);
    }

    // checked before opcode dispatch: no grammar needs more
    if tokens.len() > 4 {
        return Err(Error::TooManyTokens(tokens.len()));
    }

    let opcode = Opcode::parse(tokens[0])
        .ok_or_else(|| Error::UnknownOpcode(tokens[0].to_string()))?;

    if tokens.len() != opcode.arity() {
        return Err(Error::Arity {
            opcode,
            expected: opcode.arity(),
            found: tokens.len(),
        });
    }

    let mut args = Vec::with_capacity(tokens.len() - 1);
    for (&token, &role) in tokens[1..].iter().zip(opcode.roles()) {
        args.push(classify(token, role)?);
    }

    let instruction = Instruction::build(opcode, args).map_err(|e| match e {
        BuildError::Arity { expected, found } => Error::Arity {
            opcode,
            expected,
            found,
        },
        BuildError::Operand(role) => Error::BadOperand(role),
    })?;

    Ok(Some(instruction))
}

/// Cut an unquoted `#` and everything after it. Quote state toggles on
/// unescaped double quotes; a backslash escapes the following character.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }

    line
}

// Classification precedence: variable, integer, string, label.
fn classify(token: &str, role: Role) -> Result<Operand, Error> {
    if let Some(name) = exact(types::parse::variable, token) {
        return Ok(Operand::Variable(name));
    }

    if let Some(text) = exact(types::parse::integer, token) {
        let value = text
            .parse::<Int>()
            .map_err(|_| Error::IntegerRange(token.to_string()))?;
        return Ok(Operand::Int(value));
    }

    if let Some(text) = exact(types::parse::string_literal, token) {
        return Ok(Operand::Text(text));
    }

    if let Some(name) = exact(types::parse::label, token) {
        return Ok(Operand::Label(name));
    }

    Err(Error::BadOperand(role))
}
