use std::sync::Arc;

use clap::Parser;
use graphlesson::config::setup_logging;
use graphlesson::model::GeminiClient;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = graphlesson::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let model = match GeminiClient::new(&cli.api_base, &cli.model) {
        Ok(model) => model,
        Err(err) => {
            error!("Failed to build the model client: {}", err);
            return;
        }
    };

    if let Err(err) = graphlesson::web::setup_server(
        &cli.listen_address,
        cli.port,
        cli.max_upload_bytes,
        Arc::new(model),
    )
    .await
    {
        error!("Application error: {}", err);
    }
}
