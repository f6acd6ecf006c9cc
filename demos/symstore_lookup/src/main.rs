use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, Command};

use symstore_id::{identify_pdb, identify_pe};

fn print_error(mut error: &dyn std::error::Error) {
    eprintln!("Error: {}", error);

    while let Some(source) = error.source() {
        eprintln!("   caused by {}", source);
        error = source;
    }
}

fn main() -> ExitCode {
    let matches = Command::new("symstore-lookup")
        .about("Prints the symbol store identifier for a .exe, .dll or .pdb file")
        .arg(
            Arg::new("path")
                .required(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the file")
                .index(1),
        )
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").unwrap();
    if !path.exists() {
        eprintln!("File does not exist!");
        return ExitCode::FAILURE;
    }

    let is_pdb = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdb"));
    let result = if is_pdb {
        identify_pdb(path)
    } else {
        identify_pe(path)
    };

    match result {
        Ok(id) => {
            println!("{id}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}
