//! # sini
//!
//! This binary is the compiler of Super INI. It combines the source reader,
//! the closure runtime, the reference resolver, the type checker and the
//! emitter into a single application.

mod cli;

use cli::*;

use std::{error::Error, fs};

use log::{debug, error};
use super_ini::compile_file;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let result = compile_file(&args.file);

    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }

    let Some(ini) = &result.ini else {
        std::process::exit(-1);
    };

    if args.dump {
        print!("{ini}");
        return Ok(());
    }

    let output = match args.output.or(result.environment.output.clone()) {
        Some(path) => path,
        None => args.file.with_extension("ini"),
    };

    if output == args.file {
        error!(
            "refusing to overwrite input file '{file}', pass an output path or --dump",
            file = args.file.display()
        );
        std::process::exit(-1);
    }

    fs::write(&output, ini)?;
    debug!("wrote '{output}'", output = output.display());

    Ok(())
}
