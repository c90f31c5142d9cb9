use std::cmp::Ordering;

use thiserror::Error;

use crate::io::{InputStream, OutputStream};
use crate::memory::Memory;
use crate::ops;
use crate::program::{Instruction, Label, Labels, Program, Source};
use crate::types::{self, Int, Value, Var};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Semantic(#[from] crate::program::Error),

    #[error("Jump/call to a non-existing label '{0}'")]
    UndefinedLabel(Label),

    #[error("Read access to a non-defined variable '{0}'")]
    UndefinedVariable(Var),

    #[error(transparent)]
    Arithmetic(#[from] ops::Error),

    #[error("Unexpected end of input")]
    EndOfInput,

    #[error("Invalid integer value '{0}' on input")]
    InvalidInteger(String),

    #[error("Operands of incompatible type ({lhs} and {rhs})")]
    IncompatibleOperands {
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("Pop from the empty data stack")]
    DataStackUnderflow,

    #[error("Return with the empty call stack")]
    CallStackUnderflow,
}

impl Error {
    pub fn code(&self) -> u8 {
        match self {
            Error::Semantic(_) => 21,
            Error::UndefinedLabel(_) => 23,
            Error::UndefinedVariable(_) => 24,
            Error::Arithmetic(_) => 25,
            Error::EndOfInput | Error::InvalidInteger(_) => 26,
            Error::IncompatibleOperands { .. } => 27,
            Error::DataStackUnderflow | Error::CallStackUnderflow => 28,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

enum Retcode {
    Continue,
    Jump(usize),
}

pub struct Machine<'a, I, O> {
    memory: &'a mut Memory,
    input: &'a mut I,
    output: &'a mut O,
    stack: Vec<Value>,
    control_stack: Vec<usize>, // return addresses
}

impl<I, O> Machine<'_, I, O>
where
    I: InputStream,
    O: OutputStream,
{
    pub fn new<'a>(
        memory: &'a mut Memory,
        input: &'a mut I,
        output: &'a mut O,
    ) -> Machine<'a, I, O> {
        Machine {
            memory,
            input,
            output,
            stack: Vec::new(),
            control_stack: Vec::new(),
        }
    }

    fn eval(&self, source: &Source) -> Result<Value> {
        match source {
            Source::Variable(name) => self
                .memory
                .load(name)
                .cloned()
                .ok_or_else(|| Error::UndefinedVariable(name.clone())),
            Source::Int(value) => Ok(Value::Int(*value)),
            Source::Text(text) => Ok(Value::Text(text.clone())),
        }
    }

    fn location(labels: &Labels, target: &Label) -> Result<usize> {
        labels
            .get(target)
            .copied()
            .ok_or_else(|| Error::UndefinedLabel(target.clone()))
    }

    fn compare(lhs: &Value, rhs: &Value) -> Result<Ordering> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            // strings order by code point
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            _ => Err(Error::IncompatibleOperands {
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            }),
        }
    }

    fn read_line(&mut self) -> Result<String> {
        self.input.read().ok_or(Error::EndOfInput)
    }

    fn read_int(&mut self) -> Result<Int> {
        let line = self.read_line()?;
        let text = line.trim();

        let literal = match types::parse::integer(text) {
            Ok(("", literal)) => literal,
            _ => return Err(Error::InvalidInteger(line.clone())),
        };

        literal
            .parse::<Int>()
            .map_err(|_| Error::InvalidInteger(line.clone()))
    }

    fn execute(
        &mut self,
        instruction: &Instruction,
        labels: &Labels,
        pc: usize,
    ) -> Result<Retcode> {
        match instruction {
            Instruction::Mov { dst, src1 } => {
                let value = self.eval(src1)?;
                self.memory.store(dst, value);
            }
            Instruction::Arith { op, dst, src1, src2 } => {
                let lhs = self.eval(src1)?;
                let rhs = self.eval(src2)?;
                let (a, b) = match (&lhs, &rhs) {
                    (Value::Int(a), Value::Int(b)) => (*a, *b),
                    _ => {
                        return Err(Error::IncompatibleOperands {
                            lhs: lhs.type_name(),
                            rhs: rhs.type_name(),
                        })
                    }
                };

                let value = op.apply(a, b)?;
                self.memory.store(dst, Value::Int(value));
            }
            Instruction::ReadInt(dst) => {
                let value = self.read_int()?;
                self.memory.store(dst, Value::Int(value));
            }
            Instruction::ReadStr(dst) => {
                let line = self.read_line()?;
                self.memory.store(dst, Value::Text(line));
            }
            Instruction::Print(src) => {
                let value = self.eval(src)?;
                self.output.write(&value.to_string());
            }
            Instruction::PrintLn(src) => {
                let value = self.eval(src)?;
                self.output.write(&value.to_string());
                self.output.write("\n");
            }
            Instruction::Label(_) => { /* resolved before the run */ }
            Instruction::Jump(target) => {
                return Ok(Retcode::Jump(Self::location(labels, target)?));
            }
            Instruction::JumpIfEq { target, src1, src2 } => {
                let location = Self::location(labels, target)?;
                let lhs = self.eval(src1)?;
                let rhs = self.eval(src2)?;
                if Self::compare(&lhs, &rhs)? == Ordering::Equal {
                    return Ok(Retcode::Jump(location));
                }
            }
            Instruction::JumpIfLt { target, src1, src2 } => {
                let location = Self::location(labels, target)?;
                let lhs = self.eval(src1)?;
                let rhs = self.eval(src2)?;
                if Self::compare(&lhs, &rhs)? == Ordering::Less {
                    return Ok(Retcode::Jump(location));
                }
            }
            Instruction::Call(target) => {
                // resolve first so a failed call leaves the stack alone
                let location = Self::location(labels, target)?;
                self.control_stack.push(pc + 1);
                return Ok(Retcode::Jump(location));
            }
            Instruction::Return => {
                let location = self.control_stack.pop().ok_or(Error::CallStackUnderflow)?;
                return Ok(Retcode::Jump(location));
            }
            Instruction::Push(src) => {
                let value = self.eval(src)?;
                self.stack.push(value);
            }
            Instruction::Pop(dst) => {
                let value = self.stack.pop().ok_or(Error::DataStackUnderflow)?;
                self.memory.store(dst, value);
            }
        };

        Ok(Retcode::Continue)
    }

    pub fn run(&mut self, program: &Program) -> Result<()> {
        let labels = program.labels()?;
        let instructions = program.instructions();

        let mut pc = 0;
        while pc < instructions.len() {
            match self.execute(&instructions[pc], &labels, pc)? {
                Retcode::Continue => pc += 1,
                Retcode::Jump(location) => pc = location,
            };
        }

        Ok(())
    }
}
