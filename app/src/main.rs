use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    jobscout_app::run().await
}
