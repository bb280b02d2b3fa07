//! `daotx eligibility` - resolve which DAOs an account can vote in.
//!
//! Candidate DAOs come from `--dao` flags, or from the configured
//! indexer's membership listing when none are given.

use serde_json::json;

use daotx::indexer::{HttpIndexerGateway, IndexerGateway};
use daotx::{AccountId, EligibilityResolver, JsonRpcGateway};

use super::config::DaotxConfig;

pub async fn execute(
    config: &DaotxConfig,
    account: String,
    daos: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let account = AccountId::new(account);

    let candidates: Vec<AccountId> = if daos.is_empty() {
        let indexer =
            HttpIndexerGateway::new(config.network.indexer_url.clone(), config.request_timeout());
        indexer.dao_memberships(&account).await?
    } else {
        daos.into_iter().map(AccountId::new).collect()
    };

    let gateway = JsonRpcGateway::new(config.network.rpc_url.clone(), config.request_timeout());
    let resolver = EligibilityResolver::new(&gateway, config.composer_config());
    let report = resolver.resolve(&account, &candidates).await;

    let output = json!({
        "account": account,
        "eligible": report.eligible,
        "failures": report
            .failures
            .iter()
            .map(|f| json!({"dao": f.dao, "error": f.error.to_string()}))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
