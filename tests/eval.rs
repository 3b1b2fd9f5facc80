use super_ini::compile_source;

#[test]
fn eval_scope_computes_expressions() {
    let result = compile_source("constants.ini", "[constants] :: eval\nmax_u8 = 2**8 - 1\n");

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!("[constants]\nmax_u8=255\n", result.ini.unwrap());
}

#[test]
fn eval_is_idempotent() {
    let first = compile_source("constants.ini", "[constants] :: eval\nmax_u8 = 2**8 - 1\n")
        .ini
        .unwrap();
    let second = compile_source("constants.ini", "[constants] :: eval\nmax_u8 = 255\n")
        .ini
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn eval_sees_resolved_references() {
    let src = "\
[limits] :: internal
max_u8 = 255

[derived] :: eval
halfway := limits::max_u8 - 127
";
    let result = compile_source("constants.ini", src);

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!("[derived]\nhalfway=128\n", result.ini.unwrap());
}

#[test]
fn eval_marker_outside_eval_scope_stays_literal() {
    let result = compile_source("constants.ini", "[constants]\nmax_u8 := 2**8 - 1\n");

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!("[constants]\nmax_u8=2**8 - 1\n", result.ini.unwrap());
}
