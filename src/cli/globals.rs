use crate::{
    clock::{Clock, SystemClock},
    config::{AuthConfig, ClientContext},
    store::FileStore,
    Authenticator,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

const LOCAL_STORAGE_FILE: &str = "local_storage.json";
const COOKIE_JAR_FILE: &str = "cookies.json";

#[derive(Clone)]
pub struct GlobalArgs {
    pub profile_dir: PathBuf,
    pub admin_email: String,
    pub default_password: SecretString,
    pub client_address: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(profile_dir: PathBuf, admin_email: String, default_password: SecretString) -> Self {
        Self {
            profile_dir,
            admin_email,
            default_password,
            client_address: None,
        }
    }

    #[must_use]
    pub fn local_storage_path(&self) -> PathBuf {
        self.profile_dir.join(LOCAL_STORAGE_FILE)
    }

    #[must_use]
    pub fn cookie_jar_path(&self) -> PathBuf {
        self.profile_dir.join(COOKIE_JAR_FILE)
    }

    /// Opens the profile stores and wires an authenticator over them.
    ///
    /// # Errors
    /// Returns an error if either profile file exists but cannot be read.
    pub fn authenticator(&self) -> Result<Authenticator> {
        self.authenticator_with_clock(Arc::new(SystemClock))
    }

    /// # Errors
    /// Returns an error if either profile file exists but cannot be read.
    pub fn authenticator_with_clock(&self, clock: Arc<dyn Clock>) -> Result<Authenticator> {
        let store = FileStore::open(self.local_storage_path())
            .context("failed to open local storage")?;
        let cookies =
            FileStore::open(self.cookie_jar_path()).context("failed to open cookie jar")?;

        let config = AuthConfig::new(self.admin_email.clone(), self.default_password.clone())
            .with_client(ClientContext::new(
                self.client_address.clone(),
                concat!("agriguard-cli/", env!("CARGO_PKG_VERSION")),
            ));

        Ok(Authenticator::new(
            config,
            Arc::new(store),
            Arc::new(cookies),
            clock,
        ))
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("profile_dir", &self.profile_dir)
            .field("admin_email", &self.admin_email)
            .field("default_password", &"***")
            .field("client_address", &self.client_address)
            .finish()
    }
}
