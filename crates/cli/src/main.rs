use std::process::ExitCode;

fn main() -> ExitCode {
    palmsure_cli::run()
}
