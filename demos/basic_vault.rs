//! Basic vault usage example
//!
//! Run with `RUST_LOG=debug` to see the vault's structured logs.

use custody_core::{
    AcceptTransfers, Amount, Call, MemoryStore, Principal, RejectTransfers, TransferError,
    TransferHook, Vault, VaultConfig,
};
use tracing_subscriber::EnvFilter;

/// A recipient that tries to withdraw a second time while being paid
struct GreedyRecipient;

impl TransferHook<MemoryStore> for GreedyRecipient {
    fn on_transfer(
        &mut self,
        vault: &mut Vault,
        recipient: Principal,
        amount: Amount,
    ) -> Result<(), TransferError> {
        match vault.withdraw(recipient, amount, &mut AcceptTransfers) {
            Ok(()) => println!("  ! nested withdrawal succeeded"),
            Err(e) => println!("  ✓ nested withdrawal refused: {}", e),
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🏦 Custody Core - Basic Vault Example\n");

    let config = VaultConfig::from_toml_str(
        r#"
        prune_zero_balances = false
        max_call_depth = 8
        "#,
    )?;

    let owner: Principal = "0x1111111111111111111111111111111111111111".parse()?;
    let alice: Principal = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse()?;
    let bob: Principal = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".parse()?;
    let successor: Principal = "0x2222222222222222222222222222222222222222".parse()?;

    let mut vault = Vault::with_config(owner, config)?;
    println!("📋 Vault owned by {}\n", vault.owner());

    // 1. Deposits
    println!("💰 Deposits...");
    vault.deposit(alice, 700)?;
    vault.dispatch(bob, Call::Deposit, 300, &mut AcceptTransfers)?;
    println!("  ✓ alice: {}", vault.user_balance(&alice));
    println!("  ✓ bob:   {}", vault.user_balance(&bob));
    println!("  ✓ total: {} / held: {}\n", vault.total_deposits(), vault.contract_balance());

    // 2. Withdrawals
    println!("💸 Withdrawals...");
    vault.withdraw(alice, 200, &mut AcceptTransfers)?;
    println!("  ✓ alice withdrew 200, balance {}", vault.user_balance(&alice));

    if let Err(e) = vault.withdraw(bob, 300, &mut RejectTransfers) {
        println!("  ✓ bob's refused transfer failed cleanly: {}", e);
        println!("    bob still holds {}", vault.user_balance(&bob));
    }

    vault.withdraw(alice, 500, &mut GreedyRecipient)?;
    println!("  ✓ alice drained to {}\n", vault.user_balance(&alice));

    // 3. Unsolicited value
    println!("🚫 Unsolicited value...");
    if let Err(e) = vault.dispatch(bob, Call::Bare, 50, &mut AcceptTransfers) {
        println!("  ✓ bare transfer refused: {}\n", e);
    }

    // 4. Ownership
    println!("🔑 Ownership...");
    vault.transfer_ownership(owner, successor)?;
    println!("  ✓ owner is now {}", vault.owner());
    if let Err(e) = vault.transfer_ownership(owner, owner) {
        println!("  ✓ previous owner locked out: {}\n", e);
    }

    // 5. Integrity
    let report = vault.check_integrity();
    println!("🔍 Integrity: {}", if report.is_valid { "OK" } else { "BROKEN" });
    println!("  total deposits:  {}", report.total_deposits);
    println!("  sum of balances: {}", report.sum_of_balances);
    println!("  held funds:      {}", report.held_funds);

    println!("\n📜 Event log:");
    for record in vault.events().records() {
        println!("  #{} {:?}", record.sequence, record.event);
    }

    println!("\n📦 Snapshot: {}", serde_json::to_string_pretty(&vault.snapshot())?);

    Ok(())
}
