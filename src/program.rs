use std::fmt;

use thiserror::Error;

use crate::ops::Op;
use crate::types::{Int, Var};

pub type Label = String;
pub type Labels = fnv::FnvHashMap<Label, usize>; // label name -> instruction index

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Label '{0}' is defined several times")]
    DuplicateLabel(Label),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Mov,
    Add,
    Sub,
    Mul,
    Div,
    ReadInt,
    ReadStr,
    Print,
    PrintLn,
    Label,
    Jump,
    JumpIfEq,
    JumpIfLt,
    Call,
    Return,
    Push,
    Pop,
}

impl Opcode {
    pub fn parse(token: &str) -> Option<Opcode> {
        const OPCODES: &[Opcode] = &[
            Opcode::Mov,
            Opcode::Add,
            Opcode::Sub,
            Opcode::Mul,
            Opcode::Div,
            Opcode::ReadInt,
            Opcode::ReadStr,
            Opcode::Print,
            Opcode::PrintLn,
            Opcode::Label,
            Opcode::Jump,
            Opcode::JumpIfEq,
            Opcode::JumpIfLt,
            Opcode::Call,
            Opcode::Return,
            Opcode::Push,
            Opcode::Pop,
        ];

        OPCODES
            .iter()
            .find(|opcode| token.eq_ignore_ascii_case(opcode.as_str()))
            .copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Mov => "MOV",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::ReadInt => "READINT",
            Opcode::ReadStr => "READSTR",
            Opcode::Print => "PRINT",
            Opcode::PrintLn => "PRINTLN",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfLt => "JUMPIFLT",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
        }
    }

    /// Operand roles in positional order.
    pub fn roles(self) -> &'static [Role] {
        match self {
            Opcode::Mov => &[Role::Dst, Role::Src1],
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                &[Role::Dst, Role::Src1, Role::Src2]
            }
            Opcode::ReadInt | Opcode::ReadStr | Opcode::Pop => &[Role::Dst],
            Opcode::Print | Opcode::PrintLn | Opcode::Push => &[Role::Src1],
            Opcode::Label | Opcode::Jump | Opcode::Call => &[Role::Dst],
            Opcode::JumpIfEq | Opcode::JumpIfLt => &[Role::Dst, Role::Src1, Role::Src2],
            Opcode::Return => &[],
        }
    }

    /// Required token count, opcode included.
    pub fn arity(self) -> usize {
        self.roles().len() + 1
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural role of an operand within an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Dst,
    Src1,
    Src2,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Dst => "dst",
            Role::Src1 => "src1",
            Role::Src2 => "src2",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Variable,
    Integer,
    String,
    Label,
}

impl OperandType {
    pub fn parse(text: &str) -> Option<OperandType> {
        match text {
            "variable" => Some(OperandType::Variable),
            "integer" => Some(OperandType::Integer),
            "string" => Some(OperandType::String),
            "label" => Some(OperandType::Label),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperandType::Variable => "variable",
            OperandType::Integer => "integer",
            OperandType::String => "string",
            OperandType::Label => "label",
        }
    }
}

impl fmt::Display for OperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified operand token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Variable(Var),
    Int(Int),
    Text(String),
    Label(Label),
}

/// A value-producing operand: what the engine can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Variable(Var),
    Int(Int),
    Text(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("expected {expected} tokens, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("bad kind of operand for {0}")]
    Operand(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov { dst: Var, src1: Source },
    Arith { op: Op, dst: Var, src1: Source, src2: Source },
    ReadInt(Var),
    ReadStr(Var),
    Print(Source),
    PrintLn(Source),
    Label(Label),
    Jump(Label),
    JumpIfEq { target: Label, src1: Source, src2: Source },
    JumpIfLt { target: Label, src1: Source, src2: Source },
    Call(Label),
    Return,
    Push(Source),
    Pop(Var),
}

fn variable(arg: Operand, role: Role) -> Result<Var, BuildError> {
    match arg {
        Operand::Variable(name) => Ok(name),
        _ => Err(BuildError::Operand(role)),
    }
}

fn label(arg: Operand, role: Role) -> Result<Label, BuildError> {
    match arg {
        Operand::Label(name) => Ok(name),
        _ => Err(BuildError::Operand(role)),
    }
}

fn source(arg: Operand, role: Role) -> Result<Source, BuildError> {
    match arg {
        Operand::Variable(name) => Ok(Source::Variable(name)),
        Operand::Int(value) => Ok(Source::Int(value)),
        Operand::Text(text) => Ok(Source::Text(text)),
        Operand::Label(_) => Err(BuildError::Operand(role)),
    }
}

impl Instruction {
    /// The one constructor shared by the text front end and the codec:
    /// checks arity and per-role operand acceptance.
    pub fn build(opcode: Opcode, args: Vec<Operand>) -> Result<Instruction, BuildError> {
        if args.len() != opcode.roles().len() {
            return Err(BuildError::Arity {
                expected: opcode.arity(),
                found: args.len() + 1,
            });
        }

        let mut args = args.into_iter();
        let mut next = move || args.next().expect("arity checked above");

        let instruction = match opcode {
            Opcode::Mov => Instruction::Mov {
                dst: variable(next(), Role::Dst)?,
                src1: source(next(), Role::Src1)?,
            },
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                let op = match opcode {
                    Opcode::Add => Op::Add,
                    Opcode::Sub => Op::Sub,
                    Opcode::Mul => Op::Mul,
                    _ => Op::Div,
                };

                Instruction::Arith {
                    op,
                    dst: variable(next(), Role::Dst)?,
                    src1: source(next(), Role::Src1)?,
                    src2: source(next(), Role::Src2)?,
                }
            }
            Opcode::ReadInt => Instruction::ReadInt(variable(next(), Role::Dst)?),
            Opcode::ReadStr => Instruction::ReadStr(variable(next(), Role::Dst)?),
            Opcode::Print => Instruction::Print(source(next(), Role::Src1)?),
            Opcode::PrintLn => Instruction::PrintLn(source(next(), Role::Src1)?),
            Opcode::Label => Instruction::Label(label(next(), Role::Dst)?),
            Opcode::Jump => Instruction::Jump(label(next(), Role::Dst)?),
            Opcode::JumpIfEq => Instruction::JumpIfEq {
                target: label(next(), Role::Dst)?,
                src1: source(next(), Role::Src1)?,
                src2: source(next(), Role::Src2)?,
            },
            Opcode::JumpIfLt => Instruction::JumpIfLt {
                target: label(next(), Role::Dst)?,
                src1: source(next(), Role::Src1)?,
                src2: source(next(), Role::Src2)?,
            },
            Opcode::Call => Instruction::Call(label(next(), Role::Dst)?),
            Opcode::Return => Instruction::Return,
            Opcode::Push => Instruction::Push(source(next(), Role::Src1)?),
            Opcode::Pop => Instruction::Pop(variable(next(), Role::Dst)?),
        };

        Ok(instruction)
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Mov { .. } => Opcode::Mov,
            Instruction::Arith { op, .. } => match op {
                Op::Add => Opcode::Add,
                Op::Sub => Opcode::Sub,
                Op::Mul => Opcode::Mul,
                Op::Div => Opcode::Div,
            },
            Instruction::ReadInt(_) => Opcode::ReadInt,
            Instruction::ReadStr(_) => Opcode::ReadStr,
            Instruction::Print(_) => Opcode::Print,
            Instruction::PrintLn(_) => Opcode::PrintLn,
            Instruction::Label(_) => Opcode::Label,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIfEq { .. } => Opcode::JumpIfEq,
            Instruction::JumpIfLt { .. } => Opcode::JumpIfLt,
            Instruction::Call(_) => Opcode::Call,
            Instruction::Return => Opcode::Return,
            Instruction::Push(_) => Opcode::Push,
            Instruction::Pop(_) => Opcode::Pop,
        }
    }

    /// Operands in role order as (role, type, text), the shape the codec
    /// serializes.
    pub fn operands(&self) -> Vec<(Role, OperandType, String)> {
        fn src(role: Role, source: &Source) -> (Role, OperandType, String) {
            match source {
                Source::Variable(name) => (role, OperandType::Variable, name.clone()),
                Source::Int(value) => (role, OperandType::Integer, value.to_string()),
                Source::Text(text) => (role, OperandType::String, text.clone()),
            }
        }

        fn dst(name: &Var) -> (Role, OperandType, String) {
            (Role::Dst, OperandType::Variable, name.clone())
        }

        fn target(name: &Label) -> (Role, OperandType, String) {
            (Role::Dst, OperandType::Label, name.clone())
        }

        match self {
            Instruction::Mov { dst: d, src1 } => vec![dst(d), src(Role::Src1, src1)],
            Instruction::Arith { dst: d, src1, src2, .. } => {
                vec![dst(d), src(Role::Src1, src1), src(Role::Src2, src2)]
            }
            Instruction::ReadInt(d) | Instruction::ReadStr(d) | Instruction::Pop(d) => {
                vec![dst(d)]
            }
            Instruction::Print(s) | Instruction::PrintLn(s) | Instruction::Push(s) => {
                vec![src(Role::Src1, s)]
            }
            Instruction::Label(l) | Instruction::Jump(l) | Instruction::Call(l) => {
                vec![target(l)]
            }
            Instruction::JumpIfEq { target: t, src1, src2 }
            | Instruction::JumpIfLt { target: t, src1, src2 } => {
                vec![target(t), src(Role::Src1, src1), src(Role::Src2, src2)]
            }
            Instruction::Return => Vec::new(),
        }
    }
}

/// A validated instruction sequence. Immutable once produced by a front
/// end; the label table is derived in a separate pre-pass so that
/// validation alone never rejects duplicate labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Program {
            name: name.into(),
            instructions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Label resolution pre-pass: runs once, before execution starts.
    pub fn labels(&self) -> Result<Labels, Error> {
        let mut labels = Labels::default();
        for (index, instruction) in self.instructions.iter().enumerate() {
            if let Instruction::Label(name) = instruction {
                if labels.insert(name.clone(), index).is_some() {
                    return Err(Error::DuplicateLabel(name.clone()));
                }
            }
        }

        Ok(labels)
    }
}
