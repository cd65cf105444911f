use std::process::ExitCode;

fn main() -> ExitCode {
    marcena_cli::run()
}
