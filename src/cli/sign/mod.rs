//! Sign command - issues a token with the configured keys and scopes

use clap::Args;
use serde_json::json;
use tracing::info;

use crate::domain::{ScopeSet, SigningOptions};

/// Arguments for the sign command
#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// Key id to sign with
    #[arg(long)]
    pub kid: String,

    /// Token subject
    #[arg(long)]
    pub subject: String,

    /// Scope to grant as `domain|scope` (or just `scope` for the app domain)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Audience (overrides config)
    #[arg(long)]
    pub audience: Option<String>,

    /// Issuer (overrides config)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Lifetime in seconds (overrides config)
    #[arg(long)]
    pub expires_in: Option<u64>,
}

impl SignArgs {
    fn signing_options(&self) -> SigningOptions {
        let mut options = SigningOptions::new().with_subject(self.subject.clone());
        if let Some(audience) = &self.audience {
            options = options.with_audience(audience.clone());
        }
        if let Some(issuer) = &self.issuer {
            options = options.with_issuer(issuer.clone());
        }
        if let Some(secs) = self.expires_in {
            options = options.with_expires_in_secs(secs);
        }
        options
    }
}

/// Run the sign command
pub async fn run(args: SignArgs) -> anyhow::Result<()> {
    let factory = super::bootstrap()?;

    let mut token = factory.create_token();
    token
        .grant_scopes(&ScopeSet::from_combined(&args.scopes))
        .await?;
    let wire = token.sign(&args.kid, args.signing_options()).await?;

    info!(kid = %args.kid, scopes = args.scopes.len(), "Issued token");
    super::print_json(&json!({
        "token": wire,
        "claims": token.claims(),
    }))
}
