use std::process::ExitCode;

fn main() -> ExitCode {
    match forksync::cli::run() {
        Ok(code) => code,
        Err(err) => {
            forksync::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
