use std::process::ExitCode;

fn main() -> ExitCode {
    match ridge_logit::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("exiting with {err:?}");
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
