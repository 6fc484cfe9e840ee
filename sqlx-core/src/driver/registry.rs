use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::connection::Connection;
use crate::driver::{Connector, Driver};
use crate::error::Error;

static GLOBAL: Lazy<DriverRegistry> = Lazy::new(DriverRegistry::new);

/// The process-wide registry populated by
/// [`install_default_drivers`](crate::driver::install_default_drivers).
pub fn global() -> &'static DriverRegistry {
    &GLOBAL
}

/// Maps driver names to drivers.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `driver` under `name`.
    ///
    /// The first registration for a name wins: returns `false` and leaves the registry
    /// untouched if `name` is already taken.
    pub fn register(&self, name: &str, driver: impl Driver) -> bool {
        let mut drivers = self
            .drivers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if drivers.contains_key(name) {
            return false;
        }

        drivers.insert(name.to_owned(), Arc::new(driver));
        true
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Driver>, Error> {
        self.drivers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| Error::DriverNotFound(name.to_owned()))
    }

    /// Names of all registered drivers, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .drivers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();

        names.sort();
        names
    }

    /// Open a connection to `url` with the driver registered under `name`.
    pub async fn open(&self, name: &str, url: &str) -> Result<Box<dyn Connection>, Error> {
        let driver = self.get(name)?;
        driver.open(url).await
    }

    /// Create a connector for `url` with the driver registered under `name`.
    pub fn open_connector(&self, name: &str, url: &str) -> Result<Box<dyn Connector>, Error> {
        self.get(name)?.open_connector(url)
    }
}

impl Debug for DriverRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
