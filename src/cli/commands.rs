//! CLI commands for the vault
//!
//! Implements all command handlers for the CLI interface.

use crate::multisig::{
    Address, ExecutionController, ExecutionOutcome, GuardianRegistry, GuardianSet, LogListener,
    LoggingInvoker, VaultAuthority, VaultState,
};
use crate::storage::{StorageConfig, VaultSnapshot, VaultStorage};
use std::path::PathBuf;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub controller: ExecutionController<GuardianSet>,
    pub authority: VaultAuthority,
    pub state: VaultState,
    pub storage: VaultStorage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from the data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };
        let storage = VaultStorage::new(storage_config)?;

        if !storage.exists() {
            return Err(format!(
                "No vault found at {:?}. Create one with: vault init",
                data_dir
            )
            .into());
        }

        log::debug!("Loading vault from {:?}", data_dir);
        let snapshot = storage.load()?;
        let (controller, authority, state) = Self::resume(snapshot);

        Ok(Self {
            controller,
            authority,
            state,
            storage,
            data_dir,
        })
    }

    fn resume(
        snapshot: VaultSnapshot,
    ) -> (ExecutionController<GuardianSet>, VaultAuthority, VaultState) {
        let (mut controller, authority) =
            ExecutionController::with_history(snapshot.address, snapshot.guardians, snapshot.history);
        controller.subscribe(Box::new(LogListener));
        (controller, authority, snapshot.state)
    }

    fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot::new(
            self.controller.registry().clone(),
            self.state.clone(),
            self.controller.history().clone(),
        )
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.snapshot())?;
        Ok(())
    }
}

/// Parse a hex payload, with or without a `0x` prefix
fn parse_data(data: Option<&str>) -> CliResult<Vec<u8>> {
    match data {
        None => Ok(Vec::new()),
        Some(hex_str) => {
            let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
            Ok(hex::decode(trimmed)?)
        }
    }
}

/// Initialize a new vault
pub fn cmd_init(
    data_dir: &PathBuf,
    guardians: &[String],
    quorum: usize,
    label: Option<String>,
) -> CliResult<()> {
    let storage_config = StorageConfig {
        data_dir: data_dir.clone(),
        ..Default::default()
    };
    let storage = VaultStorage::new(storage_config)?;

    if storage.exists() {
        println!("⚠️  Vault already exists at {:?}", data_dir);
        println!("   Remove the data directory to start over");
        return Ok(());
    }

    let guardian_set = GuardianSet::new(
        guardians.iter().map(|g| Address::from(g.as_str())).collect(),
        quorum,
        label,
    )?;
    let (controller, _) = ExecutionController::new(guardian_set.vault_address(), guardian_set);
    let state = controller.new_state();

    storage.save(&VaultSnapshot::new(
        controller.registry().clone(),
        state,
        controller.history().clone(),
    ))?;

    println!("✅ Vault initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   📍 Address: {}", controller.address());
    println!(
        "   🛡️  Policy: {} guardians",
        controller.registry().description()
    );
    if let Some(l) = &controller.registry().label {
        println!("   🏷️  Label: {}", l);
    }

    Ok(())
}

/// Deposit value into the treasury
pub fn cmd_deposit(app: &mut AppState, from: &str, amount: u128) -> CliResult<()> {
    let balance = app
        .controller
        .deposit(&mut app.state, &Address::from(from), amount)?;
    app.save()?;

    println!("📥 Deposited {} from {}", amount, from);
    println!("   💰 Treasury: {}", balance);

    Ok(())
}

/// Submit a transaction on behalf of a guardian
pub fn cmd_submit(
    app: &mut AppState,
    guardian: &str,
    to: &str,
    value: u128,
    data: Option<&str>,
    recovery: bool,
) -> CliResult<()> {
    let payload = parse_data(data)?;
    let capability = app.authority.act_for(&Address::from(guardian));

    let id = app.controller.submit(
        &mut app.state,
        &capability,
        Address::from(to),
        value,
        payload,
        recovery,
    )?;
    app.save()?;

    let required = app.controller.registry().required_quorum();
    println!("📤 Transaction #{} submitted", id);
    println!("   To: {}", to);
    println!("   Value: {}", value);
    if recovery {
        println!("   🚑 Recovery transaction");
    }
    println!("   ✍️  Confirmations: 1 of {}", required);

    Ok(())
}

/// Confirm a transaction
pub fn cmd_confirm(app: &mut AppState, guardian: &str, id: u64) -> CliResult<()> {
    app.controller
        .confirm(&mut app.state, id, &Address::from(guardian))?;
    app.save()?;

    let report = app.controller.report(&app.state);
    println!("✍️  Transaction #{} confirmed by {}", id, guardian);
    println!(
        "   Confirmations: {} of {}",
        report.confirmation_count(id)?,
        app.controller.registry().required_quorum()
    );
    if report.is_confirmed(id)? {
        println!("   ✅ Ready to execute");
    }

    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(app: &mut AppState, guardian: &str, id: u64) -> CliResult<()> {
    app.controller
        .revoke(&mut app.state, id, &Address::from(guardian))?;
    app.save()?;

    println!("↩️  Confirmation on #{} revoked by {}", id, guardian);
    println!(
        "   Confirmations: {} of {}",
        app.controller.quorum(&app.state).confirmation_count(id)?,
        app.controller.registry().required_quorum()
    );

    Ok(())
}

/// Execute a transaction
pub fn cmd_execute(
    app: &mut AppState,
    guardian: &str,
    id: u64,
    simulate_failure: bool,
) -> CliResult<()> {
    let mut invoker = if simulate_failure {
        LoggingInvoker::failing()
    } else {
        LoggingInvoker::new()
    };

    let outcome = app.controller.execute(
        &mut app.state,
        id,
        &Address::from(guardian),
        &mut invoker,
    )?;

    match outcome {
        ExecutionOutcome::Pending {
            confirmations,
            required,
        } => {
            println!("⏳ Transaction #{} is not confirmed yet", id);
            println!("   Confirmations: {} of {}", confirmations, required);
            return Ok(());
        }
        ExecutionOutcome::Executed => {
            println!("🚀 Transaction #{} executed", id);
            println!(
                "   💰 Treasury: {}",
                app.state.balances().treasury_balance()
            );
        }
        ExecutionOutcome::Failed(reason) => {
            println!("❌ Transaction #{} failed: {}", id, reason);
            println!("   The attempt was rolled back; any confirmed guardian may retry.");
        }
    }

    app.save()?;
    Ok(())
}

/// Sign a recovery transaction
pub fn cmd_sign(app: &mut AppState, guardian: &str, id: u64) -> CliResult<()> {
    let payout = app
        .controller
        .sign(&mut app.state, id, &Address::from(guardian))?;
    app.save()?;

    println!("🖊️  Recovery #{} signed by {}", id, guardian);
    match payout {
        Some(p) => println!("   💸 Paid {} (signer #{})", p.amount, p.position + 1),
        None => println!("   No bounty left for this signer"),
    }

    Ok(())
}

/// Show one transaction
pub fn cmd_tx_show(app: &AppState, id: u64) -> CliResult<()> {
    let view = app.controller.report(&app.state).transaction(id)?;

    println!("📄 Transaction #{}", view.id);
    println!("   ├─ Status: {:?}", view.status);
    println!("   ├─ Destination: {}", view.destination);
    println!("   ├─ Value: {}", view.value);
    println!("   ├─ Data: 0x{}", hex::encode(&view.data));
    println!("   ├─ Recovery: {}", view.is_recovery);
    println!(
        "   ├─ Confirmations: {} of {}",
        view.confirmations, view.required
    );
    for confirmer in &view.confirmers {
        println!("   │  └─ {}", confirmer);
    }
    if view.is_recovery {
        println!("   ├─ Signers: {}", view.signers.len());
    }
    if view.failed_attempts > 0 {
        println!("   ├─ Failed attempts: {}", view.failed_attempts);
    }
    println!(
        "   ├─ Submitted: {}",
        view.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );
    match view.executed_at {
        Some(at) => println!("   └─ Executed: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("   └─ Executed: no"),
    }

    Ok(())
}

/// List transactions
pub fn cmd_tx_list(app: &AppState, pending: bool, executed: bool) -> CliResult<()> {
    // No filter means everything
    let (pending, executed) = if !pending && !executed {
        (true, true)
    } else {
        (pending, executed)
    };

    let views = app
        .controller
        .report(&app.state)
        .transactions(pending, executed);

    if views.is_empty() {
        println!("📭 No transactions found");
        return Ok(());
    }

    println!("📋 Transactions:");
    for view in views {
        println!(
            "   #{} | {:?} | {} -> {} | {}/{}{}",
            view.id,
            view.status,
            view.value,
            view.destination,
            view.confirmations,
            view.required,
            if view.is_recovery { " | recovery" } else { "" }
        );
    }

    Ok(())
}

/// Show balances
pub fn cmd_balance(app: &AppState, address: Option<&str>) -> CliResult<()> {
    let balances = app.state.balances();

    match address {
        Some(a) => {
            println!("💰 Balance for {}", a);
            println!("   {}", balances.balance_of(&Address::from(a)));
        }
        None => {
            println!("💰 Treasury: {}", balances.treasury_balance());
            println!("   Total deposited: {}", balances.total_deposited());
            println!("   Total paid out: {}", balances.total_paid_out());
            for (holder, amount) in balances.holders() {
                if holder != balances.treasury() {
                    println!("   └─ {}: {}", holder, amount);
                }
            }
        }
    }

    Ok(())
}

/// Show recent events
pub fn cmd_events(app: &AppState, count: usize) -> CliResult<()> {
    let history = app.controller.history();

    if history.is_empty() {
        println!("📭 No events recorded");
        return Ok(());
    }

    println!("📜 Recent events:");
    for recorded in history.recent(count) {
        println!(
            "   {} | {}",
            recorded.timestamp.format("%Y-%m-%d %H:%M:%S"),
            recorded.event
        );
    }

    Ok(())
}

/// Display vault info
pub fn cmd_info(app: &AppState) -> CliResult<()> {
    let registry = app.controller.registry();
    let report = app.controller.report(&app.state);
    let stats = app.storage.stats()?;

    println!("🏦 Vault Info");
    println!("   ├─ Address: {}", app.controller.address());
    if let Some(l) = &registry.label {
        println!("   ├─ Label: {}", l);
    }
    println!("   ├─ Policy: {}", registry.description());
    for guardian in registry.guardian_list() {
        println!("   │  └─ {}", guardian);
    }
    println!(
        "   ├─ Treasury: {}",
        app.state.balances().treasury_balance()
    );
    println!(
        "   ├─ Transactions: {} pending, {} executed",
        report.transaction_count(true, false),
        report.transaction_count(false, true)
    );
    println!("   ├─ Events: {}", app.controller.history().len());
    println!(
        "   └─ Storage: {} bytes, {} backups",
        stats.file_size, stats.backup_count
    );

    Ok(())
}

/// Export the vault to a file
pub fn cmd_export(app: &AppState, path: &PathBuf) -> CliResult<()> {
    crate::storage::save_to_file(&app.snapshot(), path)?;
    println!("📦 Vault exported to {:?}", path);
    Ok(())
}

/// Import a vault from a file, replacing the current one
pub fn cmd_import(app: &mut AppState, path: &PathBuf) -> CliResult<()> {
    let snapshot = crate::storage::load_from_file(path)?;
    let (controller, authority, state) = AppState::resume(snapshot);

    app.controller = controller;
    app.authority = authority;
    app.state = state;
    app.save()?;

    println!("📥 Vault imported from {:?}", path);
    println!("   Address: {}", app.controller.address());
    println!("   Transactions: {}", app.state.store().len());

    Ok(())
}
