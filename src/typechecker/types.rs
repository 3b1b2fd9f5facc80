use std::fmt::Display;

/// Declared (or inferred) type of a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeTag {
    #[default]
    None,
    Int,
    I8,
    I16,
    I32,
    I64,
    U8,
    Float,
    F32,
    Str,
    Bool,
}

impl TypeTag {
    /// Parse a type tag as written in source. Unknown names are rejected by
    /// the caller, not silently treated as `str`.
    pub fn parse(name: &str) -> Option<TypeTag> {
        let tag = match name {
            "int" => TypeTag::Int,
            "i8" => TypeTag::I8,
            "i16" => TypeTag::I16,
            "i32" => TypeTag::I32,
            "i64" => TypeTag::I64,
            "u8" => TypeTag::U8,
            "float" => TypeTag::Float,
            "f32" => TypeTag::F32,
            "str" => TypeTag::Str,
            "bool" => TypeTag::Bool,
            _ => return None,
        };
        Some(tag)
    }

    /// The narrowest tag fitting a literal, used for untyped values. Signed
    /// widths are preferred; `u8` covers the 128..=255 gap.
    pub fn infer(text: &str) -> TypeTag {
        if text == "True" || text == "False" {
            return TypeTag::Bool;
        }

        if let Some(value) = parse_int(text) {
            return match value {
                -128..=127 => TypeTag::I8,
                128..=255 => TypeTag::U8,
                -32768..=32767 => TypeTag::I16,
                -2147483648..=2147483647 => TypeTag::I32,
                _ if i64::try_from(value).is_ok() => TypeTag::I64,
                _ => TypeTag::Int,
            };
        }

        if is_float(text) {
            return TypeTag::Float;
        }

        TypeTag::Str
    }

    /// Whether a literal satisfies this tag. `None` accepts everything, as
    /// untyped values are never checked.
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            TypeTag::None | TypeTag::Str => true,
            TypeTag::Int => parse_int(text).is_some(),
            TypeTag::I8 => in_signed_range(text, 8),
            TypeTag::I16 => in_signed_range(text, 16),
            TypeTag::I32 => in_signed_range(text, 32),
            TypeTag::I64 => in_signed_range(text, 64),
            TypeTag::U8 => matches!(parse_int(text), Some(value) if (0..=255).contains(&value)),
            TypeTag::Float => parse_int(text).is_some() || is_float(text),
            TypeTag::F32 => {
                let value = match parse_int(text) {
                    Some(int) => int as f64,
                    None if is_float(text) => match text.parse::<f64>() {
                        Ok(float) => float,
                        Err(_) => return false,
                    },
                    None => return false,
                };
                (value as f32).is_finite()
            }
            TypeTag::Bool => text == "True" || text == "False",
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeTag::None => "none",
            TypeTag::Int => "int",
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::U8 => "u8",
            TypeTag::Float => "float",
            TypeTag::F32 => "f32",
            TypeTag::Str => "str",
            TypeTag::Bool => "bool",
        };
        f.write_str(name)
    }
}

fn in_signed_range(text: &str, bits: u32) -> bool {
    let Some(value) = parse_int(text) else {
        return false;
    };
    let max = (1i128 << (bits - 1)) - 1;
    let min = -(1i128 << (bits - 1));
    (min..=max).contains(&value)
}

/// Parse an integer literal: decimal, `0x…` hex or `0b…` binary, with an
/// optional leading sign.
pub fn parse_int(text: &str) -> Option<i128> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i128::from_str_radix(bin, 2).ok()?
    } else {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<i128>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// Whether a literal has float shape: a `.` or an exponent, and parses.
pub fn is_float(text: &str) -> bool {
    (text.contains('.') || text.contains(['e', 'E']))
        && !text.contains(['x', 'X'])
        && text.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_radixes() {
        assert_eq!(Some(255), parse_int("255"));
        assert_eq!(Some(255), parse_int("0xFF"));
        assert_eq!(Some(10), parse_int("0b1010"));
        assert_eq!(Some(-31), parse_int("-0x1F"));
        assert_eq!(None, parse_int("3.5"));
        assert_eq!(None, parse_int("abc"));
        assert_eq!(None, parse_int(""));
    }

    #[test]
    fn test_u8_bounds() {
        assert!(TypeTag::U8.accepts("255"));
        assert!(!TypeTag::U8.accepts("256"));
        assert!(!TypeTag::U8.accepts("-1"));
    }

    #[test]
    fn test_i8_binary_bounds() {
        assert!(TypeTag::I8.accepts("0b01111111"));
        assert!(!TypeTag::I8.accepts("0b10000000"));
    }

    #[test]
    fn test_quoted_numeric_is_not_an_int() {
        assert!(!TypeTag::I32.accepts("\"355\""));
        assert!(TypeTag::Str.accepts("\"355\""));
    }

    #[test]
    fn test_float_accepts_any_numeric() {
        assert!(TypeTag::Float.accepts("3"));
        assert!(TypeTag::Float.accepts("3.5"));
        assert!(TypeTag::Float.accepts("1e10"));
        assert!(!TypeTag::Float.accepts("weapon"));
    }

    #[test]
    fn test_f32_rejects_overflow_to_infinity() {
        assert!(TypeTag::F32.accepts("3.5"));
        assert!(!TypeTag::F32.accepts("1e39"));
    }

    #[test]
    fn test_bool_is_exact() {
        assert!(TypeTag::Bool.accepts("True"));
        assert!(TypeTag::Bool.accepts("False"));
        assert!(!TypeTag::Bool.accepts("true"));
        assert!(!TypeTag::Bool.accepts("1"));
    }

    #[test]
    fn test_infer_narrowest() {
        assert_eq!(TypeTag::I8, TypeTag::infer("127"));
        assert_eq!(TypeTag::U8, TypeTag::infer("200"));
        assert_eq!(TypeTag::I16, TypeTag::infer("-300"));
        assert_eq!(TypeTag::I32, TypeTag::infer("70000"));
        assert_eq!(TypeTag::Float, TypeTag::infer("2.5"));
        assert_eq!(TypeTag::Bool, TypeTag::infer("True"));
        assert_eq!(TypeTag::Str, TypeTag::infer("Eirlithrad"));
    }
}
