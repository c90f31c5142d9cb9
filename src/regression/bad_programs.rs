use super::fails;
use crate::machine::Error;
use crate::ops;
use crate::program;

#[test]
fn duplicate_label_before_anything_runs() {
    // the duplicate sits after an infinite loop; resolution still sees it
    let source = "
        LABEL @spin
        JUMP @spin
        LABEL @spin
    ";

    assert_eq!(
        fails(source, &[]),
        Error::Semantic(program::Error::DuplicateLabel("@spin".to_string()))
    );
}

#[test]
fn jump_to_nowhere() {
    assert_eq!(
        fails("JUMP @nowhere", &[]),
        Error::UndefinedLabel("@nowhere".to_string())
    );
}

#[test]
fn call_to_nowhere() {
    assert_eq!(
        fails("CALL @missing", &[]),
        Error::UndefinedLabel("@missing".to_string())
    );
}

#[test]
fn read_of_undefined_variable() {
    assert_eq!(
        fails("PUSH ghost", &[]),
        Error::UndefinedVariable("ghost".to_string())
    );
}

#[test]
fn division_by_zero_after_a_while() {
    let source = "
        MOV x 100
        LABEL @halve
        DIV x x 2
        JUMPIFLT @zero x 1
        JUMP @halve
        LABEL @zero
        DIV x 1 x
    ";

    assert_eq!(
        fails(source, &[]),
        Error::Arithmetic(ops::Error::DivisionByZero)
    );
}

#[test]
fn strings_do_not_add() {
    assert_eq!(
        fails("ADD x \"1\" 2", &[]),
        Error::IncompatibleOperands {
            lhs: "string",
            rhs: "integer"
        }
    );
}

#[test]
fn comparing_across_types() {
    assert_eq!(
        fails("MOV s \"7\"\nJUMPIFEQ @t s 7\nLABEL @t", &[]),
        Error::IncompatibleOperands {
            lhs: "string",
            rhs: "integer"
        }
    );
}

#[test]
fn readint_rejects_junk() {
    assert_eq!(
        fails("READINT x", &["seven"]),
        Error::InvalidInteger("seven".to_string())
    );
}

#[test]
fn input_runs_dry() {
    assert_eq!(
        fails("READSTR a\nREADSTR b", &["only one"]),
        Error::EndOfInput
    );
}

#[test]
fn pop_with_nothing_pushed() {
    assert_eq!(fails("PUSH 1\nPOP a\nPOP b", &[]), Error::DataStackUnderflow);
}

#[test]
fn return_without_call() {
    // the first RETURN consumes the only frame; the second underflows
    let source = "
        CALL @f
        RETURN
        LABEL @f
        RETURN
    ";

    assert_eq!(fails(source, &[]), Error::CallStackUnderflow);
}

#[test]
fn conditional_jump_checks_its_target() {
    // the target must resolve even when the jump would not be taken
    assert_eq!(
        fails("JUMPIFEQ @gone 1 2", &[]),
        Error::UndefinedLabel("@gone".to_string())
    );
}
