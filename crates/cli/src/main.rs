use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();
    intake_cli::run()
}
