//! Inspect command - decodes a token without verifying it

use clap::Args;
use serde_json::json;

/// Arguments for the inspect command
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Token to decode
    pub token: String,
}

/// Run the inspect command
pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    let factory = super::bootstrap()?;
    let token = factory.parse_token(&args.token)?;

    let known = factory.context().scopes().snapshot().await;
    let blobs = token.blobs();
    let mut granted: Vec<String> = known
        .iter()
        .flat_map(|(domain, scopes)| {
            scopes
                .iter()
                .filter(move |(_, index)| blobs.contains(domain, **index))
                .map(move |(scope, _)| format!("{}|{}", domain, scope))
        })
        .collect();
    granted.sort();

    super::print_json(&json!({
        "header": token.header(),
        "claims": token.claims(),
        "scopes": granted,
    }))
}
