use thiserror::Error;

use crate::program::{Instruction, Opcode, Operand, OperandType, Program};
use crate::types::parse::exact;
use crate::types::{self, Int};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid program representation: {0}")]
    Malformed(String),

    #[error("Unknown operation code '{0}'")]
    UnknownOpcode(String),

    #[error("Broken instruction order: expected {expected}, found '{found}'")]
    Order { expected: usize, found: String },
}

/// Serialize a validated program. Strings keep their escape sequences;
/// only characters that collide with the markup are re-encoded.
pub fn write(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<program language=\"IPPeCode\" name=\"{}\">\n",
        escape_attr(program.name())
    ));

    for (index, instruction) in program.instructions().iter().enumerate() {
        out.push_str(&format!(
            "  <tac order=\"{}\" opcode=\"{}\">\n",
            index + 1,
            instruction.opcode()
        ));

        for (role, ty, text) in instruction.operands() {
            out.push_str(&format!(
                "    <{role} type=\"{ty}\">{text}</{role}>\n",
                role = role,
                ty = ty,
                text = escape_text(&text)
            ));
        }

        out.push_str("  </tac>\n");
    }

    out.push_str("</program>\n");
    out
}

/// Read a serialized program back, re-validating the schema: root and
/// language, contiguous 1-based order, opcode, operand roles and types.
pub fn read(source: &str) -> Result<Program, Error> {
    let root = match parse::document(source) {
        Ok(("", root)) => root,
        _ => return Err(Error::Malformed("not a well-formed document".to_string())),
    };

    if root.name != "program" {
        return Err(Error::Malformed(format!(
            "unexpected root element '{}'",
            root.name
        )));
    }

    match root.attr("language") {
        Some("IPPeCode") => {}
        Some(other) => {
            return Err(Error::Malformed(format!("unsupported language '{}'", other)))
        }
        None => return Err(Error::Malformed("missing 'language' attribute".to_string())),
    }

    let name = unescape(root.attr("name").unwrap_or_default())?;

    let mut instructions = Vec::with_capacity(root.children.len());
    for (index, tac) in root.children.iter().enumerate() {
        instructions.push(instruction(tac, index + 1)?);
    }

    Ok(Program::new(name, instructions))
}

fn instruction(tac: &parse::Element, expected_order: usize) -> Result<Instruction, Error> {
    if tac.name != "tac" {
        return Err(Error::Malformed(format!(
            "unexpected element '{}'",
            tac.name
        )));
    }

    let order = tac
        .attr("order")
        .ok_or_else(|| Error::Malformed("missing 'order' attribute".to_string()))?;
    if order.parse::<usize>() != Ok(expected_order) {
        return Err(Error::Order {
            expected: expected_order,
            found: order.to_string(),
        });
    }

    let opcode = tac
        .attr("opcode")
        .ok_or_else(|| Error::Malformed("missing 'opcode' attribute".to_string()))?;
    let opcode =
        Opcode::parse(opcode).ok_or_else(|| Error::UnknownOpcode(opcode.to_string()))?;

    let roles = opcode.roles();
    if tac.children.len() != roles.len() {
        return Err(Error::Malformed(format!(
            "{} takes {} operand(s), found {}",
            opcode,
            roles.len(),
            tac.children.len()
        )));
    }

    let mut args = Vec::with_capacity(roles.len());
    for (child, role) in tac.children.iter().zip(roles) {
        if child.name != role.as_str() {
            return Err(Error::Malformed(format!(
                "expected <{}> operand of {}, found <{}>",
                role, opcode, child.name
            )));
        }

        args.push(operand(child)?);
    }

    Instruction::build(opcode, args)
        .map_err(|e| Error::Malformed(format!("{}: {}", opcode, e)))
}

fn operand(element: &parse::Element) -> Result<Operand, Error> {
    if !element.children.is_empty() {
        return Err(Error::Malformed(format!(
            "operand <{}> has child elements",
            element.name
        )));
    }

    let ty = element
        .attr("type")
        .ok_or_else(|| Error::Malformed(format!("operand <{}> has no type", element.name)))?;
    let ty = OperandType::parse(ty)
        .ok_or_else(|| Error::Malformed(format!("unknown operand type '{}'", ty)))?;

    let text = unescape(element.text.trim())?;

    let operand = match ty {
        OperandType::Variable => {
            let name = exact(types::parse::variable, &text).ok_or_else(|| {
                Error::Malformed(format!("'{}' is not a variable name", text))
            })?;
            Operand::Variable(name)
        }
        OperandType::Integer => {
            let literal = exact(types::parse::integer, text.trim()).ok_or_else(|| {
                Error::Malformed(format!("'{}' is not an integer literal", text))
            })?;
            let value = literal
                .parse::<Int>()
                .map_err(|_| Error::Malformed(format!("'{}' is out of range", text)))?;
            Operand::Int(value)
        }
        OperandType::String => Operand::Text(text),
        OperandType::Label => {
            let name = exact(types::parse::label, &text).ok_or_else(|| {
                Error::Malformed(format!("'{}' is not a label name", text))
            })?;
            Operand::Label(name)
        }
    };

    Ok(operand)
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn escape_attr(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn unescape(text: &str) -> Result<String, Error> {
    if !text.contains('&') {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let end = rest
            .find(';')
            .ok_or_else(|| Error::Malformed(format!("bad entity in '{}'", text)))?;
        out.push(match &rest[..=end] {
            "&lt;" => '<',
            "&gt;" => '>',
            "&amp;" => '&',
            "&quot;" => '"',
            "&apos;" => '\'',
            entity => {
                return Err(Error::Malformed(format!("unknown entity '{}'", entity)))
            }
        });

        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Just enough of an XML reader for the one schema this tool speaks:
/// elements, double-quoted attributes, text, one prolog. No namespaces,
/// CDATA or processing instructions beyond the prolog.
mod parse {
    use nom::bytes::complete::{tag, take_until, take_while, take_while1};
    use nom::character::complete::{char, multispace0, multispace1};
    use nom::combinator::opt;
    use nom::multi::many0;
    use nom::sequence::delimited;
    use nom::IResult;

    #[derive(Debug)]
    pub struct Element<'a> {
        pub name: &'a str,
        pub attrs: Vec<(&'a str, &'a str)>,
        pub children: Vec<Element<'a>>,
        pub text: String,
    }

    impl<'a> Element<'a> {
        pub fn attr(&self, key: &str) -> Option<&'a str> {
            self.attrs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| *value)
        }
    }

    fn name(input: &str) -> IResult<&str, &str> {
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
    }

    fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
        let (input, _) = multispace1(input)?;
        let (input, key) = name(input)?;
        let (input, _) = char('=')(input)?;
        let (input, value) =
            delimited(char('"'), take_while(|c| c != '"'), char('"'))(input)?;

        Ok((input, (key, value)))
    }

    fn fail<T>(input: &str) -> IResult<&str, T> {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )))
    }

    pub fn element(input: &str) -> IResult<&str, Element> {
        let (input, _) = char('<')(input)?;
        let (input, element_name) = name(input)?;
        let (input, attrs) = many0(attribute)(input)?;
        let (input, _) = multispace0(input)?;

        if let Some(rest) = input.strip_prefix("/>") {
            let element = Element {
                name: element_name,
                attrs,
                children: Vec::new(),
                text: String::new(),
            };
            return Ok((rest, element));
        }

        let (mut input, _) = char('>')(input)?;
        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            let (rest, chunk) = take_while(|c| c != '<')(input)?;
            text.push_str(chunk);
            input = rest;

            if let Some(rest) = input.strip_prefix("</") {
                let (rest, close) = name(rest)?;
                let (rest, _) = multispace0(rest)?;
                let (rest, _) = char('>')(rest)?;
                if close != element_name {
                    return fail(input);
                }

                let element = Element {
                    name: element_name,
                    attrs,
                    children,
                    text,
                };
                return Ok((rest, element));
            }

            let (rest, child) = element(input)?;
            children.push(child);
            input = rest;
        }
    }

    fn prolog(input: &str) -> IResult<&str, &str> {
        delimited(tag("<?"), take_until("?>"), tag("?>"))(input)
    }

    pub fn document(input: &str) -> IResult<&str, Element> {
        let (input, _) = multispace0(input)?;
        let (input, _) = opt(prolog)(input)?;
        let (input, _) = multispace0(input)?;
        let (input, root) = element(input)?;
        let (input, _) = multispace0(input)?;

        Ok((input, root))
    }
}
