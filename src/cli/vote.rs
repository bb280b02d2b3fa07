//! `daotx vote` - compose a vote transaction.

use daotx::{AccountId, Composer, JsonRpcGateway, PublicKey, VoteAction};

use super::config::DaotxConfig;

pub async fn execute(
    config: &DaotxConfig,
    signer: String,
    public_key: String,
    dao: String,
    proposal_id: u64,
    action: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let vote: VoteAction = action.parse()?;

    let gateway = JsonRpcGateway::new(config.network.rpc_url.clone(), config.request_timeout());
    let composer = Composer::new(&gateway, config.composer_config());

    let tx = composer
        .compose_vote(
            &AccountId::new(signer),
            &PublicKey::new(public_key),
            &AccountId::new(dao),
            proposal_id,
            vote,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&tx)?);
    Ok(())
}
