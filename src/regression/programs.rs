use super::run;

#[test]
fn countdown() {
    let source = "
        # countdown
        MOV n 3
        LABEL @loop
        JUMPIFLT @done n 1
        PRINTLN n
        SUB n n 1
        JUMP @loop
        LABEL @done
        PRINTLN \"liftoff\"
    ";

    run(source, &[], "3\n2\n1\nliftoff\n");
}

#[test]
fn sum_of_inputs() {
    let source = "
        # reads a count, then that many numbers
        READINT count
        MOV sum 0
        LABEL @next
        JUMPIFEQ @done count 0
        READINT n
        ADD sum sum n
        SUB count count 1
        JUMP @next
        LABEL @done
        PRINT \"sum: \"
        PRINTLN sum
    ";

    run(source, &["3", "10", "-4", "6"], "sum: 12\n");
}

#[test]
fn factorial_with_a_call_stack() {
    // iterative factorial behind a CALL; the data stack carries the
    // argument in and the result out
    let source = "
        MOV n 5
        PUSH n
        CALL @fact
        POP result
        PRINTLN result

        JUMP @end

        LABEL @fact
        POP k
        MOV acc 1
        LABEL @mul
        JUMPIFLT @ret k 2
        MUL acc acc k
        SUB k k 1
        JUMP @mul
        LABEL @ret
        PUSH acc
        RETURN

        LABEL @end
    ";

    run(source, &[], "120\n");
}

#[test]
fn nested_calls_return_in_order() {
    let source = "
        CALL @outer
        PRINTLN \"top\"
        JUMP @end

        LABEL @outer
        CALL @inner
        PRINTLN \"outer\"
        RETURN

        LABEL @inner
        PRINTLN \"inner\"
        RETURN

        LABEL @end
    ";

    run(source, &[], "inner\nouter\ntop\n");
}

#[test]
fn string_sorting_with_jumpiflt() {
    let source = "
        READSTR a
        READSTR b
        JUMPIFLT @ordered a b
        MOV t a
        MOV a b
        MOV b t
        LABEL @ordered
        PRINTLN a
        PRINTLN b
    ";

    run(source, &["pear", "apple"], "apple\npear\n");
    run(source, &["apple", "pear"], "apple\npear\n");
}

#[test]
fn stack_reverses_values() {
    let source = "
        PUSH 1
        PUSH \"two\"
        PUSH 3
        POP a
        POP b
        POP c
        PRINTLN a
        PRINTLN b
        PRINTLN c
    ";

    run(source, &[], "3\ntwo\n1\n");
}

#[test]
fn mov_rebinds_types() {
    let source = "
        MOV x 1
        MOV x \"one\"
        PRINTLN x
        MOV x 2
        ADD x x 2
        PRINTLN x
    ";

    run(source, &[], "one\n4\n");
}

#[test]
fn floor_division_program() {
    let source = "
        DIV a -7 2
        DIV b 7 -2
        DIV c -7 -2
        PRINTLN a
        PRINTLN b
        PRINTLN c
    ";

    run(source, &[], "-4\n-4\n3\n");
}

#[test]
fn readstr_keeps_spacing() {
    run(
        "READSTR line\nPRINT line",
        &["  two  words "],
        "  two  words ",
    );
}

#[test]
fn comments_and_blank_lines_are_invisible() {
    let source = "

        # header
        PRINT \"a\"   # trailing
        # middle

        PRINT \"b\"
    ";

    run(source, &[], "ab");
}
