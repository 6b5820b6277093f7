//! Footprint library regression test
//!
//! Parses every footprint of the given libraries, prints it, parses the
//! printed text again and checks that nothing changed on the way.
//!
//! Usage:
//!   KISYSMOD=/usr/share/kicad/modules kicad-regression LEDs Resistors_SMD \
//!     --blacklist Crystals:HC-18UV

use std::process::ExitCode;

use clap::Parser;
use kicad_format::{
    common::footprint::Module, convert::Element, library::LibraryPath, KiCadParseError,
};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "kicad-regression")]
#[command(about = "Round-trip every footprint of a set of KiCad libraries")]
struct Args {
    /// Libraries to test (default: every library on the KISYSMOD search path)
    libraries: Vec<String>,

    /// Footprint to skip, as LIBRARY:MODULE (can be specified multiple times)
    #[arg(long, value_parser = parse_module_id)]
    blacklist: Vec<(String, String)>,

    /// Stop at the first failure
    #[arg(long)]
    debug: bool,
}

fn parse_module_id(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find(':')
        .ok_or_else(|| format!("Invalid LIBRARY:MODULE pair: {}", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Why a footprint failed to round-trip
#[derive(Debug)]
enum Failure {
    Parse(KiCadParseError),
    Reparse { printed: String, error: KiCadParseError },
    Mismatch { first: String, second: String },
}

fn check_module(text: &str) -> Result<(), Failure> {
    let module = Module::parse(text).map_err(Failure::Parse)?;
    let printed = module.serialize().map_err(Failure::Parse)?;

    let reparsed = match Module::parse(&printed) {
        Ok(reparsed) => reparsed,
        Err(error) => return Err(Failure::Reparse { printed, error }),
    };

    if reparsed != module {
        return Err(Failure::Mismatch {
            first: format!("{module:#?}"),
            second: format!("{reparsed:#?}"),
        });
    }

    Ok(())
}

fn report(library: &str, module: &str, failure: &Failure) {
    println!("Failed at {library} {module}");

    match failure {
        Failure::Parse(error) => println!("    {error}"),
        Failure::Reparse { printed, error } => {
            println!("    printed text does not parse: {error}");
            for (i, line) in printed.lines().enumerate() {
                println!("{:4}: {}", i + 1, line);
            }
        }
        Failure::Mismatch { first, second } => {
            println!("    reparsed module differs:");
            for line in changed_lines(first, second) {
                println!("    {line}");
            }
        }
    }
}

/// The lines only one of the two texts has, `-` for the first and `+` for
/// the second, in diff order
fn changed_lines(first: &str, second: &str) -> Vec<String> {
    diff::lines(first, second)
        .into_iter()
        .filter_map(|line| match line {
            diff::Result::Left(l) => Some(format!("- {l}")),
            diff::Result::Right(r) => Some(format!("+ {r}")),
            diff::Result::Both(..) => None,
        })
        .collect()
}

fn run(args: Args) -> Result<bool, KiCadParseError> {
    let libraries = LibraryPath::from_env()?;

    let selected = if args.libraries.is_empty() {
        libraries.list_libraries()
    } else {
        args.libraries
    };

    let num_modules = libraries.list_all_modules()?.len();
    let mut num_tested = 0;
    let mut failed = Vec::new();

    for library in &selected {
        for module in libraries.list_modules(library)? {
            let skip = args
                .blacklist
                .iter()
                .any(|(l, m)| l == library && *m == module);

            if skip {
                println!("Skipping {library} {module}");
                continue;
            }

            debug!("Testing {library} {module}");

            let result = libraries
                .read_module(library, &module)
                .map_err(Failure::Parse)
                .and_then(|text| check_module(&text));

            if let Err(failure) = result {
                report(library, &module, &failure);
                failed.push((library.clone(), module));

                if args.debug {
                    error!("Stopping at the first failure");
                    break;
                }
            }

            num_tested += 1;
            println!("Tested {num_tested} out of {num_modules} modules");
        }

        if args.debug && !failed.is_empty() {
            break;
        }
    }

    println!("====================================");
    println!("Failed to parse {} out of {} modules", failed.len(), num_modules);
    println!("====================================");

    for (library, module) in &failed {
        println!("{library}:{module}");
    }

    info!(tested = num_tested, failed = failed.len(), "regression run finished");

    Ok(failed.is_empty())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
