use std::collections::HashSet;

use super_ini::compile_source;

const SRC: &str = "\
[Weapons] :: abstract :damage :level
damage :i32
level :u8

[Eirlithrad] :: inline :Weapons
damage = 275
level = 18

[Melltith] :: inline :Weapons
damage = 355
level = 26
";

/// A deliberately strict key=value INI reader: every line must be a header
/// or a `key=value` pair, keys unique per scope.
fn parse_strict_ini(ini: &str) -> Result<Vec<(String, Vec<(String, String)>)>, String> {
    let mut scopes: Vec<(String, Vec<(String, String)>)> = vec![(String::new(), vec![])];

    for line in ini.lines() {
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            scopes.push((name.to_owned(), vec![]));
        } else if let Some((key, value)) = line.split_once('=') {
            let items = &mut scopes.last_mut().unwrap().1;
            if items.iter().any(|(existing, _)| existing == key) {
                return Err(format!("duplicate key '{key}'"));
            }
            items.push((key.to_owned(), value.to_owned()));
        } else {
            return Err(format!("unparsable line '{line}'"));
        }
    }

    Ok(scopes)
}

#[test]
fn output_parses_under_a_strict_ini_reader() {
    let ini = compile_source("weapons.ini", SRC).ini.unwrap();

    let scopes = parse_strict_ini(&ini).unwrap();
    assert_eq!(
        vec![(
            "Weapons".to_owned(),
            vec![
                ("Eirlithrad".to_owned(), "275 18".to_owned()),
                ("Melltith".to_owned(), "355 26".to_owned()),
            ],
        )],
        scopes.into_iter().filter(|(_, items)| !items.is_empty()).collect::<Vec<_>>()
    );
}

#[test]
fn stripping_annotations_keeps_the_item_set() {
    let typed = compile_source("t.ini", "[a]\nx: i32 = 5\ny: str = hello\n");
    let untyped = compile_source("t.ini", "[a]\nx = 5\ny = hello\n");

    assert_eq!(typed.ini, untyped.ini);
}

#[test]
fn sorted_output_is_a_permutation() {
    let plain = compile_source("s.ini", "[b]\nx = 1\n[a]\ny = 2\n[c]\nz = 3\n")
        .ini
        .unwrap();
    let sorted = compile_source(
        "s.ini",
        "[] :: internal, setenv\nsorted = True\n[b]\nx = 1\n[a]\ny = 2\n[c]\nz = 3\n",
    )
    .ini
    .unwrap();

    let names = |ini: &str| {
        parse_strict_ini(ini)
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
    };

    assert_eq!(vec!["b", "a", "c"], names(&plain));
    assert_eq!(vec!["a", "b", "c"], names(&sorted));
    assert_eq!(
        names(&plain).into_iter().collect::<HashSet<_>>(),
        names(&sorted).into_iter().collect::<HashSet<_>>()
    );
}
