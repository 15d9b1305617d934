use super::broadcast::{await_confirmation, broadcast_with_retry};
use super::TransferSolArgs;
use crate::error::ToolError;
use crate::ports::ToolContext;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use solana_sdk::message::Message;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;

/// Stage a SOL transfer. Nothing is signed or broadcast here: the result is
/// a pending marker the frontend presents for wallet approval, after which
/// `execute_transfer` runs the actual send.
pub async fn transfer_sol(ctx: &ToolContext, args: &TransferSolArgs) -> Result<Value, ToolError> {
    let lamports = sol_to_lamports(args.amount)?;
    Ok(json!({
        "type": "PENDING_TRANSACTION",
        "recipient": args.recipient.to_string(),
        "amount_sol": args.amount.normalize().to_string(),
        "lamports": lamports,
        "network": ctx.network,
        "message": format!(
            "A transfer of {} SOL to {} is ready. Approve it in your wallet to send.",
            args.amount.normalize(), args.recipient
        ),
    }))
}

/// The approval step: build the transfer against the latest blockhash, ask
/// the wallet capability to sign, broadcast with bounded retries and wait
/// for confirmation.
pub async fn execute_transfer(
    ctx: &ToolContext,
    recipient: &str,
    lamports: u64,
) -> Result<Value, ToolError> {
    let recipient =
        Pubkey::from_str(recipient).map_err(|_| ToolError::InvalidAddress(recipient.into()))?;
    if lamports == 0 {
        return Err(ToolError::InvalidAmount("0".into()));
    }

    let payer = ctx.wallet.connect().await?;
    let blockhash = ctx.rpc.latest_blockhash().await?;

    let instruction = system_instruction::transfer(&payer, &recipient, lamports);
    let message = Message::new_with_blockhash(&[instruction], Some(&payer), &blockhash);
    let tx = Transaction::new_unsigned(message);

    let signed = ctx.wallet.sign_transaction(tx).await?;
    let encoded = BASE64.encode(
        bincode::serialize(&signed)
            .map_err(|e| ToolError::Upstream(format!("transaction encoding failed: {}", e)))?,
    );

    let signature = broadcast_with_retry(ctx, &encoded, false).await?;
    await_confirmation(ctx, &signature).await?;

    let sol = Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL);
    Ok(json!({
        "status": "confirmed",
        "signature": signature,
        "message": format!("Sent {} SOL to {}.", sol.normalize(), recipient),
    }))
}

fn sol_to_lamports(amount: Decimal) -> Result<u64, ToolError> {
    (amount * Decimal::from(LAMPORTS_PER_SOL))
        .trunc()
        .to_u64()
        .ok_or_else(|| ToolError::InvalidAmount(amount.to_string()))
}
