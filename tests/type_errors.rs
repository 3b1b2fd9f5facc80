use super_ini::{compile_source, diagnostics::Code};

fn first_code(src: &str) -> Option<Code> {
    compile_source("types.ini", src)
        .diagnostics
        .first()
        .map(|diagnostic| diagnostic.code)
}

#[test]
fn quoted_numeric_fails_integer_tag() {
    let result = compile_source("types.ini", "[Melltith]\ndamage: i32 = \"355\"\n");

    assert!(!result.succeeded());
    assert_eq!(Code::IncorrectType, result.diagnostics[0].code);
    assert!(result.diagnostics[0].message.contains("'i32'"));
}

#[test]
fn u8_bounds() {
    assert_eq!(Some(Code::IncorrectType), first_code("[C]\nv: u8 = 256"));
    assert_eq!(Some(Code::IncorrectType), first_code("[C]\nv: u8 = -1"));
    assert_eq!(None, first_code("[C]\nv: u8 = 255"));
}

#[test]
fn i8_binary_bounds() {
    assert_eq!(None, first_code("[C]\nv: i8 = 0b01111111"));
    assert_eq!(Some(Code::IncorrectType), first_code("[C]\nv: i8 = 0b10000000"));
}

#[test]
fn eval_result_satisfies_declared_type() {
    // after eval rewrote the text, 255 fits u8
    let result = compile_source("types.ini", "[constants] :: eval\nmax: u8 = 2**8 - 1\n");

    assert!(result.succeeded(), "{:?}", result.diagnostics);
    assert_eq!("[constants]\nmax=255\n", result.ini.unwrap());
}
