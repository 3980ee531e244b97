//! Verify command - checks a token and prints its claims

use clap::Args;
use serde_json::json;

use crate::domain::{SigningAlgorithm, VerificationOptions};

/// Arguments for the verify command
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Token to verify
    pub token: String,

    /// Accept tokens past their expiry
    #[arg(long)]
    pub ignore_expiration: bool,

    /// Maximum token age in seconds
    #[arg(long)]
    pub max_age: Option<u64>,

    /// Expected audience
    #[arg(long)]
    pub audience: Option<String>,

    /// Expected issuer
    #[arg(long)]
    pub issuer: Option<String>,

    /// Expected nonce
    #[arg(long)]
    pub nonce: Option<String>,

    /// Allowed algorithm; may be repeated
    #[arg(long = "algorithm")]
    pub algorithms: Vec<SigningAlgorithm>,
}

impl VerifyArgs {
    fn verification_options(&self) -> VerificationOptions {
        let mut options = VerificationOptions::new();
        if self.ignore_expiration {
            options = options.ignoring_expiration();
        }
        if let Some(secs) = self.max_age {
            options = options.with_max_age_secs(secs);
        }
        if let Some(audience) = &self.audience {
            options = options.with_audience(audience.clone());
        }
        if let Some(issuer) = &self.issuer {
            options = options.with_issuer(issuer.clone());
        }
        if let Some(nonce) = &self.nonce {
            options = options.with_nonce(nonce.clone());
        }
        if !self.algorithms.is_empty() {
            options = options.with_algorithms(self.algorithms.iter().copied());
        }
        options
    }
}

/// Run the verify command
pub async fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let factory = super::bootstrap()?;

    let token = factory.parse_token(&args.token)?;
    match token.verify(args.verification_options()).await {
        Ok(claims) => super::print_json(&json!({ "valid": true, "claims": claims })),
        Err(e) => {
            super::print_json(&json!({
                "valid": false,
                "status": e.status(),
                "error": e.to_string(),
            }))?;
            Err(e.into())
        }
    }
}
