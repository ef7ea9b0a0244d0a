//! In-process stand-ins for the wallet, the registry contract, and the FHE
//! relayer, wired together so the dashboard runs without a network.

pub mod chain;
pub mod codec;
pub mod fhe;
pub mod wallet;

pub use chain::{CiphertextLedger, DevnetChain, DevnetSigner, SeedRecord};
pub use fhe::DevnetFhe;
pub use wallet::DevnetWallet;

use ipvault_core::config::IpvaultConfig;
use ipvault_core::{Backends, Category, IpvaultError, IpvaultResult};
use log::info;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;

const DEMO_PEER: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

/// A wired devnet: every collaborator shares one registry and one ledger.
#[derive(Clone)]
pub struct Devnet {
    pub chain: DevnetChain,
    pub wallet: Arc<DevnetWallet>,
    pub fhe: Arc<DevnetFhe>,
}

impl Devnet {
    /// Empty registry at `contract_address` with instant confirmations.
    pub fn new(contract_address: impl Into<String>, account: impl Into<String>) -> Self {
        let ledger = CiphertextLedger::default();
        let fhe = DevnetFhe::new(ledger.clone());
        let chain = DevnetChain::new(contract_address, fhe.commitment(), ledger);
        let wallet = DevnetWallet::new(account, chain.clone());
        Self {
            chain,
            wallet: Arc::new(wallet),
            fhe: Arc::new(fhe),
        }
    }

    /// Build from configuration, deploying at a random address when none is set.
    pub fn from_config(cfg: &IpvaultConfig) -> IpvaultResult<Self> {
        let contract = cfg
            .network
            .contract_address
            .clone()
            .unwrap_or_else(random_address);
        let delay = Duration::from_millis(cfg.devnet.confirmation_delay_ms);

        let ledger = CiphertextLedger::default();
        let fhe = DevnetFhe::new(ledger.clone()).with_init_delay(delay);
        let chain = DevnetChain::new(contract.clone(), fhe.commitment(), ledger)
            .with_confirmation_delay(delay);
        let wallet = DevnetWallet::new(cfg.wallet.address.clone(), chain.clone());
        let devnet = Self {
            chain,
            wallet: Arc::new(wallet),
            fhe: Arc::new(fhe),
        };

        if cfg.devnet.seed_demo_records {
            devnet.seed_demo_records(&cfg.wallet.address)?;
        }
        info!(
            "devnet registry deployed on {} at {contract}",
            cfg.network.chain_name
        );
        Ok(devnet)
    }

    pub fn backends(&self) -> Backends {
        Backends::new(
            self.wallet.clone(),
            Arc::new(self.chain.clone()),
            self.fhe.clone(),
        )
    }

    /// Populate the registry with a few records owned by `account` and a peer.
    pub fn seed_demo_records(&self, account: &str) -> IpvaultResult<()> {
        let demo = [
            (
                "Solar Cell Patent",
                120_000,
                Category::Technology,
                "Technology: thin-film perovskite layering process",
                account,
                None,
            ),
            (
                "Brand Trademark",
                45_000,
                Category::Legal,
                "Legal: registered word mark and logo",
                DEMO_PEER,
                Some(45_000),
            ),
            (
                "Album Master Rights",
                80_000,
                Category::Creative,
                "Creative: master recordings of a debut album",
                DEMO_PEER,
                None,
            ),
        ];

        for (idx, (name, value, category, description, creator, verified)) in
            demo.into_iter().enumerate()
        {
            let record = SeedRecord {
                id: format!("ip-demo-{idx}"),
                name: name.to_string(),
                ciphertext: self.fhe.seal(value),
                public_value1: value,
                public_value2: category.code(),
                description: description.to_string(),
                creator: creator.to_string(),
                verified_value: verified,
            };
            self.chain
                .seed(record)
                .map_err(|err| IpvaultError::Contract(format!("seeding {name}: {err}")))?;
        }
        Ok(())
    }
}

fn random_address() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
