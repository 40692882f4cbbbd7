use std::process::ExitCode;

fn main() -> ExitCode {
    shelfrec_cli::run()
}
