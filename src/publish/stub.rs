use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use super::Publish;
use crate::config::Config;

// Records every publish instead of touching a repository.
#[derive(Clone, Default)]
pub struct StubPublisher {
    calls: Arc<Mutex<Vec<Config>>>,
    fail: bool,
}

impl StubPublisher {
    pub fn failing() -> Self {
        StubPublisher {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Config> {
        self.calls.lock().unwrap().clone()
    }
}

impl Publish for StubPublisher {
    fn publish(&self, config: &Config) -> Result<()> {
        self.calls.lock().unwrap().push(config.clone());
        if self.fail {
            bail!("remote rejected the push");
        }
        Ok(())
    }
}
