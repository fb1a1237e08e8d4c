/*!
Merges partner administrative regions into one layer, and tags river basins with the partner regions overlapping
them. The GIS work is done by GRASS GIS modules, so this has to be run from within a GRASS session.
*/

#![warn(noop_method_call)]
#![warn(single_use_lifetimes)]
#![warn(unused_lifetimes)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_crate_dependencies)] // This is useful for those times when you bring in a crate, then get rid of it when you realize it's the wrong solution.
#![warn(unused_qualifications)]
#![warn(unused_results)] // Most of the warnings should occur with map inserts. It's easy to get around by adding a `_ = ` before the code.

use clap::Parser;

pub(crate) mod errors;
pub(crate) mod commands;
pub(crate) mod toolkit;
pub(crate) mod workspace;
pub(crate) mod attributes;
pub(crate) mod progress;

use errors::ProgramError;

use commands::EcmwfRegions;
use progress::ConsoleProgressBar;

/**
Runs with arbitrary arguments. The first item in the arguments will be ignored. All output will be printed to Stdout or Stderr.
*/
pub(crate) fn run<Arg, Args>(args: &mut Args) -> Result<(),ProgramError>
where
    Arg: Clone + Into<std::ffi::OsString>,
    Args: Iterator<Item = Arg>
{
    let mut progress = ConsoleProgressBar::new();
    let command = EcmwfRegions::try_parse_from(args)?;
    command.run(&mut progress)?;
    Ok(())
}

fn main() -> std::process::ExitCode {
    let mut args = std::env::args();
    // Returning a Result from main would format the error with debug instead of display.
    match run(&mut args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        // clap knows which exit code and stream to use for help and version requests
        Err(ProgramError::ArgumentError(err)) => err.exit(),
        Err(err) => {
            eprintln!("{err}");
            std::process::ExitCode::FAILURE
        }
    }
}
