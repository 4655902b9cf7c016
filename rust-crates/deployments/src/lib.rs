use anyhow::{
    Context,
    Result,
    anyhow,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEPLOYMENTS_ROOT: &str = ".deployments";
const DEPLOYMENTS_FILE: &str = "deployments.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentEnv {
    Dev,
    Test,
    Local,
}

impl DeploymentEnv {
    pub fn dir_name(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "dev",
            DeploymentEnv::Test => "test",
            DeploymentEnv::Local => "local",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnv::Dev => "Devnet",
            DeploymentEnv::Test => "Testnet",
            DeploymentEnv::Local => "Local",
        };
        write!(f, "{name}")
    }
}

/// Where the wager contract lives on one network.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployed_at: String,
    pub contract_id: String,
    pub network_url: String,
}

/// Read side of `<root>/<env>/deployments.json`. Opening never creates
/// anything; a missing file means nothing was recorded.
#[derive(Debug)]
pub struct DeploymentStore {
    env: DeploymentEnv,
    path: PathBuf,
}

impl DeploymentStore {
    pub fn open(root: impl AsRef<Path>, env: DeploymentEnv) -> Self {
        let path = root.as_ref().join(env.dir_name()).join(DEPLOYMENTS_FILE);
        Self { env, path }
    }

    pub fn env(&self) -> DeploymentEnv {
        self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<DeploymentRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_record(&self.path)
            .with_context(|| format!("Failed to load {} deployment record", self.env))
    }

    /// Seeds a record for tests and local tooling; the viewer only reads.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn save(&self, record: &DeploymentRecord) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create {} directory", dir.display())
            })?;
        }
        write_record(&self.path, record)
    }
}

fn read_record(path: &Path) -> Result<Option<DeploymentRecord>> {
    let data = fs::read(path).context("Failed to read deployment records")?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    if let Ok(record) = serde_json::from_slice::<DeploymentRecord>(&data) {
        return Ok(Some(record));
    }
    if let Ok(mut records) = serde_json::from_slice::<Vec<DeploymentRecord>>(&data) {
        return Ok(records.pop());
    }
    Err(anyhow!(
        "Failed to parse deployment record JSON at {}; expected a deployment object",
        path.display()
    ))
}

#[cfg(any(test, feature = "test-helpers"))]
fn write_record(path: &Path, record: &DeploymentRecord) -> Result<()> {
    let json = serde_json::to_vec_pretty(record)
        .context("Failed to serialize deployment record")?;
    fs::write(path, json).context("Failed to write deployment record")?;
    Ok(())
}

#[cfg(any(test, feature = "test-helpers"))]
pub fn record_deployment(
    root: impl AsRef<Path>,
    env: DeploymentEnv,
    contract_id: impl AsRef<str>,
    network_url: impl AsRef<str>,
) -> Result<DeploymentRecord> {
    let store = DeploymentStore::open(root, env);
    let record = DeploymentRecord {
        deployed_at: chrono::Utc::now().to_rfc3339(),
        contract_id: contract_id.as_ref().to_string(),
        network_url: network_url.as_ref().to_string(),
    };
    store.save(&record)?;
    Ok(record)
}
