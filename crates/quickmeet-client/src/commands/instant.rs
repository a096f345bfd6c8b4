//! `quickmeet instant`.

use tracing::info;

use crate::actions::run_actions;
use crate::api::ApiClient;
use crate::cli::OutputArgs;
use crate::error::{ClientError, ClientResult};
use crate::render::{OutputFormat, Renderer};

pub async fn run(output: &OutputArgs, api: &ApiClient) -> ClientResult<()> {
    let response = api.instant_meet().await?;
    let url = response
        .meet_url
        .clone()
        .ok_or_else(|| ClientError::InvalidResponse("missing meetUrl".into()))?;
    info!(url = %url, "instant meeting created");

    let renderer = Renderer::new(OutputFormat::from_json_flag(output.json));
    println!("{}", renderer.instant(&response)?);
    run_actions(&url, output)
}
