//! Configuration model and helpers used by the IP Vault binaries.

use crate::error::{IpvaultError, IpvaultResult};
use crate::record::Category;
use directories_next::ProjectDirs;
use log::{info, warn};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub const DEFAULT_CONFIG_PATH: &str = "ipvault.toml";
pub const CONFIG_PATH_ENV: &str = "IPVAULT_CONFIG";
const BOOTSTRAP_FILE_NAME: &str = "ipvault.toml";
const APP_QUALIFIER: &str = "io";
const APP_ORGANIZATION: &str = "IpVault";
const APP_NAME: &str = "ipvault";
const MAX_HISTORY_LIMIT: usize = 100;

pub const DEVNET_ACCOUNT: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

/// True for a `0x`-prefixed, 20-byte hex address.
pub fn looks_like_address(candidate: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(candidate.trim()))
}

pub fn bootstrap_template() -> String {
    format!(
        "# Auto-generated IP Vault configuration bootstrap.\n\n[network]\nchain_name = \"devnet\"\n# Leave empty to let the devnet deploy its own registry.\ncontract_address = \"\"\n\n[wallet]\naddress = \"{DEVNET_ACCOUNT}\"\nauto_connect = false\n\n[ui]\nsuccess_toast_ms = 2000\nerror_toast_ms = 3000\nhistory_limit = 10\ndefault_category = \"legal\"\n\n[devnet]\nconfirmation_delay_ms = 400\nseed_demo_records = true\n"
    )
}

/// Chain endpoint the dashboard talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkCfg {
    #[serde(default = "default_chain_name")]
    pub chain_name: String,

    #[serde(default)]
    pub contract_address: Option<String>,
}

fn default_chain_name() -> String {
    "devnet".to_string()
}

impl Default for NetworkCfg {
    fn default() -> Self {
        Self {
            chain_name: default_chain_name(),
            contract_address: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WalletCfg {
    #[serde(default = "default_wallet_address")]
    pub address: String,

    /// Connect as soon as the dashboard starts.
    #[serde(default)]
    pub auto_connect: bool,
}

fn default_wallet_address() -> String {
    DEVNET_ACCOUNT.to_string()
}

impl Default for WalletCfg {
    fn default() -> Self {
        Self {
            address: default_wallet_address(),
            auto_connect: false,
        }
    }
}

/// Dashboard presentation knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UiCfg {
    #[serde(default = "default_success_toast_ms")]
    pub success_toast_ms: u64,

    #[serde(default = "default_error_toast_ms")]
    pub error_toast_ms: u64,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub default_category: Category,
}

fn default_success_toast_ms() -> u64 {
    2_000
}

fn default_error_toast_ms() -> u64 {
    3_000
}

fn default_history_limit() -> usize {
    10
}

impl Default for UiCfg {
    fn default() -> Self {
        Self {
            success_toast_ms: default_success_toast_ms(),
            error_toast_ms: default_error_toast_ms(),
            history_limit: default_history_limit(),
            default_category: Category::default(),
        }
    }
}

/// In-process chain stand-in tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DevnetCfg {
    #[serde(default = "default_confirmation_delay_ms")]
    pub confirmation_delay_ms: u64,

    #[serde(default = "default_seed_demo_records")]
    pub seed_demo_records: bool,
}

fn default_confirmation_delay_ms() -> u64 {
    400
}

fn default_seed_demo_records() -> bool {
    true
}

impl Default for DevnetCfg {
    fn default() -> Self {
        Self {
            confirmation_delay_ms: default_confirmation_delay_ms(),
            seed_demo_records: default_seed_demo_records(),
        }
    }
}

/// Top-level configuration snapshot loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IpvaultConfig {
    #[serde(default)]
    pub network: NetworkCfg,

    #[serde(default)]
    pub wallet: WalletCfg,

    #[serde(default)]
    pub ui: UiCfg,

    #[serde(default)]
    pub devnet: DevnetCfg,

    #[serde(skip)]
    pub path: PathBuf,

    #[serde(skip)]
    pub format: ConfigFormat,
}

/// Tracks whether we parsed TOML or YAML so writes preserve format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Toml,
        }
    }
}

impl IpvaultConfig {
    /// Resolve the per-user configuration path used for bootstrapping.
    pub fn user_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(BOOTSTRAP_FILE_NAME))
    }

    /// Pick the configuration path: explicit flag, then `IPVAULT_CONFIG`, then
    /// the per-user location, then `ipvault.toml` in the working directory.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(from_env) = env::var(CONFIG_PATH_ENV) {
            if !from_env.trim().is_empty() {
                return PathBuf::from(from_env);
            }
        }
        Self::user_config_path().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from disk, creating a bootstrap copy when missing.
    ///
    /// When the requested location cannot be written, the bootstrap falls back
    /// to the per-user configuration directory.
    pub fn load_or_bootstrap<P: AsRef<Path>>(path: P) -> IpvaultResult<Self> {
        let target = path.as_ref();
        if target.exists() {
            return Self::load(target);
        }

        match ensure_bootstrap_file(target) {
            Ok(created) => {
                if created {
                    info!("ipvault config bootstrap created at {}", target.display());
                }
                Self::load(target)
            }
            Err(err) => {
                let user_path = Self::user_config_path().ok_or_else(|| {
                    IpvaultError::InvalidConfig(format!(
                        "failed to initialise configuration at {}: {err}",
                        target.display()
                    ))
                })?;
                if user_path == target {
                    return Err(IpvaultError::InvalidConfig(format!(
                        "failed to initialise configuration at {}: {err}",
                        target.display()
                    )));
                }

                let created_user = ensure_bootstrap_file(&user_path).map_err(|io_err| {
                    IpvaultError::InvalidConfig(format!(
                        "failed to prepare bootstrap configuration at {}: {io_err}",
                        user_path.display()
                    ))
                })?;
                if created_user {
                    info!(
                        "ipvault config bootstrap created at {}",
                        user_path.display()
                    );
                }

                warn!(
                    "configuration unavailable at {}; using per-user bootstrap at {}",
                    target.display(),
                    user_path.display()
                );
                Self::load(&user_path)
            }
        }
    }

    /// Read a config file from disk and detect its format from the extension.
    pub fn load<P: AsRef<Path>>(path: P) -> IpvaultResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let format = ConfigFormat::from_path(path);
        let mut cfg = match format {
            ConfigFormat::Toml => toml::from_str::<Self>(&contents)?,
            ConfigFormat::Yaml => serde_yaml::from_str::<Self>(&contents)?,
        };
        cfg.path = path.to_path_buf();
        cfg.format = format;

        if cfg.network.contract_address.as_deref().map(str::trim) == Some("") {
            cfg.network.contract_address = None;
        }
        Ok(cfg)
    }

    /// Perform a best-effort validation pass and return human-readable issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.network.chain_name.trim().is_empty() {
            issues.push("network.chain_name must not be empty".to_string());
        }
        if let Some(address) = self
            .network
            .contract_address
            .as_deref()
            .filter(|address| !address.trim().is_empty())
        {
            if !looks_like_address(address) {
                issues.push(format!(
                    "network.contract_address is not a 0x-prefixed 20-byte hex address: {address}"
                ));
            }
        }
        if !looks_like_address(&self.wallet.address) {
            issues.push(format!(
                "wallet.address is not a 0x-prefixed 20-byte hex address: {}",
                self.wallet.address
            ));
        }

        if self.ui.success_toast_ms == 0 {
            issues.push("ui.success_toast_ms must be greater than 0".to_string());
        }
        if self.ui.error_toast_ms == 0 {
            issues.push("ui.error_toast_ms must be greater than 0".to_string());
        }
        if self.ui.history_limit == 0 || self.ui.history_limit > MAX_HISTORY_LIMIT {
            issues.push(format!(
                "ui.history_limit must be between 1 and {MAX_HISTORY_LIMIT}"
            ));
        }

        issues
    }

    /// Fail with every validation issue joined into one message.
    pub fn ensure_valid(&self) -> IpvaultResult<()> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(IpvaultError::InvalidConfig(issues.join("; ")))
        }
    }

    pub fn success_toast(&self) -> Duration {
        Duration::from_millis(self.ui.success_toast_ms)
    }

    pub fn error_toast(&self) -> Duration {
        Duration::from_millis(self.ui.error_toast_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.devnet.confirmation_delay_ms)
    }

    /// Persist the configuration back to its original on-disk format.
    pub fn save(&self) -> IpvaultResult<()> {
        let payload = match self.format {
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        };
        fs::write(&self.path, payload)?;
        Ok(())
    }

    /// JSON schema of the on-disk layout.
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(IpvaultConfig)
    }
}

fn ensure_bootstrap_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match OpenOptions::new().create_new(true).write(true).open(path) {
        Ok(mut file) => {
            let template = match ConfigFormat::from_path(path) {
                ConfigFormat::Toml => bootstrap_template(),
                ConfigFormat::Yaml => {
                    serde_yaml::to_string(&IpvaultConfig::default()).map_err(io::Error::other)?
                }
            };
            file.write_all(template.as_bytes())?;
            file.flush()?;
            #[cfg(unix)]
            fs::set_permissions(path, PermissionsExt::from_mode(0o600))?;
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn bootstrap_template_parses_to_defaults() {
        let cfg: IpvaultConfig = toml::from_str(&bootstrap_template()).unwrap();
        assert_eq!(cfg.ui, UiCfg::default());
        assert_eq!(cfg.devnet, DevnetCfg::default());
        assert_eq!(cfg.wallet.address, DEVNET_ACCOUNT);
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }

    #[test]
    fn load_or_bootstrap_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ipvault.toml");

        let cfg = IpvaultConfig::load_or_bootstrap(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.path, path);
        assert_eq!(cfg.format, ConfigFormat::Toml);
        assert_eq!(cfg.network.contract_address, None);
        assert_eq!(cfg.ui.history_limit, 10);
    }

    #[test]
    fn yaml_round_trip_preserves_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ipvault.yaml");
        fs::write(
            &path,
            "ui:\n  success_toast_ms: 1500\n  default_category: creative\n",
        )
        .unwrap();

        let mut cfg = IpvaultConfig::load(&path).unwrap();
        assert_eq!(cfg.format, ConfigFormat::Yaml);
        assert_eq!(cfg.ui.success_toast_ms, 1500);
        assert_eq!(cfg.ui.error_toast_ms, 3000);
        assert_eq!(cfg.ui.default_category, Category::Creative);

        cfg.devnet.seed_demo_records = false;
        cfg.save().unwrap();
        let reloaded = IpvaultConfig::load(&path).unwrap();
        assert!(!reloaded.devnet.seed_demo_records);
        assert_eq!(reloaded.ui.success_toast_ms, 1500);
    }

    #[test]
    fn validate_reports_each_issue() {
        let mut cfg = IpvaultConfig::default();
        cfg.network.contract_address = Some("0x1234".into());
        cfg.wallet.address = "not-an-address".into();
        cfg.ui.error_toast_ms = 0;
        cfg.ui.history_limit = 0;

        let issues = cfg.validate();
        assert_eq!(issues.len(), 4, "{issues:?}");
        assert!(issues.iter().any(|i| i.starts_with("network.contract_address")));
        assert!(issues.iter().any(|i| i.starts_with("wallet.address")));
        assert!(matches!(
            cfg.ensure_valid(),
            Err(IpvaultError::InvalidConfig(_))
        ));
    }

    #[test]
    fn address_pattern_requires_forty_hex_digits() {
        assert!(looks_like_address(DEVNET_ACCOUNT));
        assert!(looks_like_address(&DEVNET_ACCOUNT.to_lowercase()));
        assert!(!looks_like_address("0x52908400098527886E0F7030069857D2E4169EE"));
        assert!(!looks_like_address("52908400098527886E0F7030069857D2E4169EE7aa"));
        assert!(!looks_like_address("0xZZ908400098527886E0F7030069857D2E4169EE7"));
    }

    #[test]
    fn explicit_path_wins_over_environment() {
        let explicit = Path::new("/tmp/explicit.toml");
        assert_eq!(
            IpvaultConfig::resolve_path(Some(explicit)),
            PathBuf::from("/tmp/explicit.toml")
        );
    }
}
