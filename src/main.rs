//! canary-adhoc CLI
//!
//! Exit codes: 0 when the run finished (whatever the verdict), 1 on bad
//! arguments, 2 when the request could not be assembled or submitted.

use canary_adhoc::cli::{init_logging, run_cli, Args, EXIT_FAILURE, EXIT_SUCCESS};
use clap::error::ErrorKind;
use clap::Parser;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_FAILURE,
            };
            std::process::exit(code);
        }
    };

    if let Err(e) = init_logging(args.verbose, args.log_json) {
        eprintln!("Error: {}", e);
    }

    std::process::exit(run_cli(args));
}
