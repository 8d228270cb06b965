//! Runs a scenario against an emulated ledger, the configured store and a live task channel.

use anyhow::{Context, Result};
use bubble_contract::{BubbleContract, ContractCfg, Services};
use bubble_db::{BubbleStore, InMemoryKv, KvStore, SledKv};
use bubble_primitives::{
    hashing::keccak256,
    host::EvmHost,
    tasks::CrossChainTask,
    types::{TxHash, ESTIMATION_TX_HASH},
};
use bubble_test_utils::{
    ledger::InMemoryLedger,
    services::{FixedNonceHistory, StaticNodePool},
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::{
    cli::SimulateArgs,
    config::{load_params, parse_toml, Config},
    scenario::{Scenario, Step},
};

/// What one step produced.
#[derive(Debug, Serialize)]
struct StepReport {
    step: usize,
    method: String,
    tx_hash: TxHash,
    gas_used: u64,
    /// The code of a transaction or the document of a query.
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
    /// The data of the log the step emitted, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<String>,
    /// The error that aborted the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    fatal: Option<String>,
}

pub(crate) async fn handle_simulate(args: SimulateArgs) -> Result<()> {
    let params = load_params(&args.params)?;
    let config: Config = parse_toml(&args.config)?;
    let scenario = Scenario::from_path(&args.scenario)?;
    let cfg = ContractCfg::new(params, config.local_node_id);

    let (sender, mut receiver) = mpsc::unbounded_channel::<CrossChainTask>();
    let dispatcher = tokio::spawn(async move {
        let mut dispatched = 0usize;
        while let Some(task) = receiver.recv().await {
            let (rpc, op_addr) = task.route();
            info!(%task, tx_hash = ?task.tx_hash(), %rpc, ?op_addr, "dispatching cross-chain task");
            dispatched += 1;
        }
        dispatched
    });

    let reports = match &config.datadir {
        Some(datadir) => {
            let kv = SledKv::open(datadir)
                .with_context(|| format!("opening store at {}", datadir.display()))?;
            let mut store = BubbleStore::new(kv);
            let reports = run_steps(&cfg, &config, &scenario, &mut store, &sender);
            store.kv().flush().context("flushing store")?;
            reports
        }
        None => {
            let mut store = BubbleStore::new(InMemoryKv::new());
            run_steps(&cfg, &config, &scenario, &mut store, &sender)
        }
    };

    drop(sender);
    let dispatched = dispatcher.await.context("task dispatcher panicked")?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    info!(steps = reports.len(), dispatched, "simulation finished");

    Ok(())
}

fn run_steps<S: KvStore>(
    cfg: &ContractCfg,
    config: &Config,
    scenario: &Scenario,
    store: &mut BubbleStore<S>,
    tasks: &UnboundedSender<CrossChainTask>,
) -> Vec<StepReport> {
    let mut ledger = scenario.ledger();
    let pool = StaticNodePool::new(scenario.nodes.clone());
    let nonces = FixedNonceHistory::new(scenario.nonces());
    let services = Services {
        node_pool: &pool,
        nonce_history: &nonces,
        tasks,
    };

    scenario
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| run_step(cfg, config, services, &mut ledger, store, index, step))
        .collect()
}

fn run_step<S: KvStore>(
    cfg: &ContractCfg,
    config: &Config,
    services: Services<'_>,
    ledger: &mut InMemoryLedger,
    store: &mut BubbleStore<S>,
    index: usize,
    step: &Step,
) -> StepReport {
    let tx_hash = if step.estimate {
        ESTIMATION_TX_HASH
    } else {
        keccak256(format!("simulated-step-{index}"))
    };
    ledger.set_tx_hash(tx_hash);
    ledger.set_origin(step.origin.unwrap_or(step.caller));

    let logs_before = ledger.logs().len();
    let snapshot = ledger.snapshot();

    let mut contract = BubbleContract::new(
        cfg,
        ledger,
        store,
        services,
        step.caller,
        config.gas_limit,
    );
    let result = contract.execute(step.call.clone());
    let gas_used = contract.gas_used();

    let mut report = StepReport {
        step: index,
        method: step.call.selector().to_string(),
        tx_hash,
        gas_used,
        output: None,
        log: None,
        fatal: None,
    };

    match result {
        Ok(output) => {
            report.output = output.map(|bytes| {
                serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
            });
            if ledger.logs().len() > logs_before {
                report.log = ledger.logs().last().map(|log| hex::encode(&log.data));
            }
            if !step.estimate {
                let nonce = ledger.nonce(&step.caller);
                ledger.set_nonce(step.caller, nonce.saturating_add(1));
            }
        }
        Err(err) => {
            // the host reverts the whole transaction; store rows are not rolled back here
            warn!(step = index, %err, "step aborted");
            ledger.revert_to_snapshot(snapshot);
            report.fatal = Some(err.to_string());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use bubble_params::BubbleParams;

    use super::*;

    const SAMPLE: &str = include_str!("../../samples/scenario.json");

    fn sample_config(scenario: &Scenario) -> Config {
        Config {
            local_node_id: scenario.nodes[0].node_id,
            gas_limit: 5_000_000,
            datadir: None,
        }
    }

    #[test]
    fn sample_scenario_runs() {
        let scenario = Scenario::from_json_str(SAMPLE).unwrap();
        let config = sample_config(&scenario);
        let cfg = ContractCfg::new(BubbleParams::default(), config.local_node_id);
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let mut store = BubbleStore::new(InMemoryKv::new());
        let reports = run_steps(&cfg, &config, &scenario, &mut store, &sender);

        assert_eq!(reports.len(), scenario.steps.len());
        assert!(reports.iter().all(|report| report.fatal.is_none()));
        assert_eq!(reports[0].output, Some(Value::from(0)));
        assert!(receiver.try_recv().is_ok(), "the stake posts a mint task");
    }

    #[test]
    fn persistent_store_survives_reopening() {
        let scenario = Scenario::from_json_str(SAMPLE).unwrap();
        let config = sample_config(&scenario);
        let cfg = ContractCfg::new(BubbleParams::default(), config.local_node_id);
        let (sender, _receiver) = mpsc::unbounded_channel();
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = BubbleStore::new(SledKv::open(dir.path()).unwrap());
            run_steps(&cfg, &config, &scenario, &mut store, &sender);
            store.kv().flush().unwrap();
        }

        let store = BubbleStore::new(SledKv::open(dir.path()).unwrap());
        assert!(store
            .get_basics(&primitive_types::U256::one())
            .unwrap()
            .is_some());
    }
}
