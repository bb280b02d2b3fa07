//! `daotx transfer` - compose a transfer-proposal transaction.

use daotx::{AccountId, Composer, JsonRpcGateway, PublicKey};

use super::config::DaotxConfig;

pub async fn execute(
    config: &DaotxConfig,
    signer: String,
    public_key: String,
    dao: String,
    receiver: String,
    quantity: String,
    token_id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = JsonRpcGateway::new(config.network.rpc_url.clone(), config.request_timeout());
    let composer = Composer::new(&gateway, config.composer_config());

    let tx = composer
        .compose_transfer_proposal(
            &AccountId::new(signer),
            &PublicKey::new(public_key),
            &AccountId::new(dao),
            &AccountId::new(receiver),
            &quantity,
            &AccountId::new(token_id),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&tx)?);
    Ok(())
}
