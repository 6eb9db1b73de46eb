//! Simulation results and merging them into a draft transaction.

use serde::{Deserialize, Serialize};

use crate::transaction::{SorobanData, Transaction, TransactionBuilder};

/// Node-side dry run of a draft transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Minimum resource fee the node will accept, in stroops.
    pub min_resource_fee: i64,
    /// Finalized footprint and resource figures.
    pub transaction_data: SorobanData,
    pub latest_ledger: u32,
    pub cost: SimulationCost,
    /// Present when archived entries must be restored before the draft can succeed.
    pub restore_preamble: Option<RestorePreamble>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationCost {
    pub cpu_instructions: u64,
    pub memory_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePreamble {
    pub min_resource_fee: i64,
    pub transaction_data: SorobanData,
}

/// Merge a simulation into `tx`, returning a builder for further configuration.
///
/// The simulation's resource declaration replaces the draft's, with the
/// resource fee set to the simulated minimum, so the rebuilt fee is the
/// draft's inclusion fee plus `min_resource_fee`.
pub fn assemble_transaction(tx: &Transaction, sim: &SimulationResult) -> TransactionBuilder {
    let data = SorobanData {
        resource_fee: sim.min_resource_fee,
        ..sim.transaction_data.clone()
    };
    tracing::debug!(
        min_resource_fee = sim.min_resource_fee,
        read_only = data.footprint.read_only_keys().len(),
        read_write = data.footprint.read_write_keys().len(),
        "assembling simulated transaction"
    );
    TransactionBuilder::from_transaction(tx).set_soroban_data(data)
}
