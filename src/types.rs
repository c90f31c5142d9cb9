use std::fmt;

pub type Int = i64;
pub type Var = String;

/// A runtime value: variables, stack slots and evaluated literals all
/// carry one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(Int),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

pub mod parse {
    use super::*;
    use nom::branch::alt;
    use nom::bytes::complete::{is_not, tag, take_while, take_while_m_n};
    use nom::character::complete::{anychar, char, digit0, one_of};
    use nom::combinator::{opt, recognize};
    use nom::multi::many0;
    use nom::sequence::{delimited, pair, preceded};
    use nom::IResult;

    fn is_name_start(c: char) -> bool {
        c.is_alphabetic() || matches!(c, '_' | '$' | '&' | '%')
    }

    fn is_name_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '$' | '&' | '%')
    }

    fn name(input: &str) -> IResult<&str, &str> {
        recognize(pair(
            take_while_m_n(1, 1, is_name_start),
            take_while(is_name_char),
        ))(input)
    }

    pub fn variable(input: &str) -> IResult<&str, Var> {
        let (input, name) = name(input)?;
        Ok((input, Var::from(name)))
    }

    // '@' is part of the label name
    pub fn label(input: &str) -> IResult<&str, String> {
        let (input, name) = recognize(preceded(char('@'), name))(input)?;
        Ok((input, name.to_string()))
    }

    /// Matches the integer literal shape (no leading zeros) and returns
    /// the literal text; the caller converts to `Int`.
    pub fn integer(input: &str) -> IResult<&str, &str> {
        recognize(preceded(
            opt(one_of("+-")),
            alt((tag("0"), recognize(pair(one_of("123456789"), digit0)))),
        ))(input)
    }

    /// Applies `parser` to a whole token: anything left over is a miss.
    pub fn exact<'a, T>(
        parser: impl Fn(&'a str) -> IResult<&'a str, T>,
        token: &'a str,
    ) -> Option<T> {
        match parser(token) {
            Ok(("", value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the text between the quotes, escape sequences untouched.
    pub fn string_literal(input: &str) -> IResult<&str, String> {
        let (input, body) = delimited(
            char('"'),
            recognize(many0(alt((
                recognize(pair(char('\\'), anychar)),
                is_not("\"\\"),
            )))),
            char('"'),
        )(input)?;

        Ok((input, body.to_string()))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn variable_names() {
            for name in ["x", "counter", "_tmp", "$a", "&b", "%c", "a1_2$"] {
                assert_eq!(exact(variable, name), Some(Var::from(name)));
            }

            for name in ["1x", "@x", "", "a b", "x-y", "\"x\""] {
                assert_eq!(exact(variable, name), None);
            }
        }

        #[test]
        fn labels() {
            assert_eq!(exact(label, "@loop"), Some("@loop".to_string()));
            assert_eq!(exact(label, "@_l1"), Some("@_l1".to_string()));
            assert_eq!(exact(label, "loop"), None);
            assert_eq!(exact(label, "@"), None);
            assert_eq!(exact(label, "@1"), None);
        }

        #[test]
        fn integer_literals() {
            for text in ["0", "7", "42", "+5", "-17", "-0", "1000000"] {
                assert_eq!(exact(integer, text), Some(text));
            }

            // no leading zeros, no bare signs
            for text in ["007", "00", "+", "-", "", "1.5", "0x1f"] {
                assert_eq!(exact(integer, text), None);
            }
        }

        #[test]
        fn string_literals() {
            assert_eq!(exact(string_literal, "\"\""), Some(String::new()));
            assert_eq!(exact(string_literal, "\"abc\""), Some("abc".to_string()));
            // escapes are kept verbatim, including escaped quotes
            assert_eq!(
                exact(string_literal, r#""a\"b""#),
                Some(r#"a\"b"#.to_string())
            );
            assert_eq!(
                exact(string_literal, r#""tab\there""#),
                Some(r"tab\there".to_string())
            );

            assert_eq!(exact(string_literal, "\"unterminated"), None);
            assert_eq!(exact(string_literal, "bare"), None);
            // trailing backslash swallows the closing quote
            assert_eq!(exact(string_literal, r#""a\""#), None);
        }

        #[test]
        fn value_display() {
            assert_eq!(Value::Int(-3).to_string(), "-3");
            assert_eq!(Value::Text(r"a\nb".to_string()).to_string(), r"a\nb");
        }
    }
}
