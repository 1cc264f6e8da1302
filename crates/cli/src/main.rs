use std::process::ExitCode;

fn main() -> ExitCode {
    edubot_cli::run()
}
