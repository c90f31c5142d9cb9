use thiserror::Error;

use crate::types::Int;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Division by zero using DIV instruction")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn apply(self, lhs: Int, rhs: Int) -> Result<Int, Error> {
        let n = match self {
            Op::Add => lhs.wrapping_add(rhs),
            Op::Sub => lhs.wrapping_sub(rhs),
            Op::Mul => lhs.wrapping_mul(rhs),
            Op::Div => {
                if rhs == 0 {
                    return Err(Error::DivisionByZero);
                }

                // quotient rounds toward negative infinity
                let q = lhs.wrapping_div(rhs);
                let r = lhs.wrapping_rem(rhs);
                if r != 0 && (r < 0) != (rhs < 0) {
                    q - 1
                } else {
                    q
                }
            }
        };

        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        assert_eq!(Op::Add.apply(2, 3), Ok(5));
        assert_eq!(Op::Sub.apply(2, 3), Ok(-1));
        assert_eq!(Op::Mul.apply(-4, 3), Ok(-12));
    }

    #[test]
    fn division_floors() {
        assert_eq!(Op::Div.apply(7, 2), Ok(3));
        assert_eq!(Op::Div.apply(-7, 2), Ok(-4));
        assert_eq!(Op::Div.apply(7, -2), Ok(-4));
        assert_eq!(Op::Div.apply(-7, -2), Ok(3));
        assert_eq!(Op::Div.apply(6, 3), Ok(2));
        assert_eq!(Op::Div.apply(-6, 3), Ok(-2));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(Op::Div.apply(42, 0), Err(Error::DivisionByZero));
        assert_eq!(Op::Div.apply(0, 0), Err(Error::DivisionByZero));
        assert_eq!(Op::Div.apply(-42, 0), Err(Error::DivisionByZero));
    }
}
