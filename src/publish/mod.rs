use std::io::Write;

use anyhow::{Context, Result};

use crate::config::Config;

mod files;
mod git;
#[cfg(test)]
pub mod stub;

pub use git::GitPublisher;

pub const COMPLETE_MESSAGE: &str = "Deploy Complete!";

pub trait Publish {
    fn publish(&self, config: &Config) -> Result<()>;
}

/// Runs a single publish and reports completion on `out`.
///
/// Nothing is written to `out` when the publish fails.
pub async fn deploy<P, W>(publisher: P, config: Config, out: &mut W) -> Result<()>
where
    P: Publish + Send + 'static,
    W: Write,
{
    tokio::task::spawn_blocking(move || publisher.publish(&config))
        .await
        .context("publish task panicked")??;

    writeln!(out, "{}", COMPLETE_MESSAGE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::stub::StubPublisher;
    use super::*;

    #[tokio::test]
    async fn success_prints_single_line() {
        let stub = StubPublisher::default();
        let mut out = Vec::new();

        deploy(stub.clone(), Config::webj2j(), &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Deploy Complete!\n");
    }

    #[tokio::test]
    async fn publishes_once_with_fixed_config() {
        let stub = StubPublisher::default();
        let mut out = Vec::new();

        deploy(stub.clone(), Config::webj2j(), &mut out).await.unwrap();

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        let config = &calls[0];
        assert_eq!(config.source_directory.to_str(), Some("build"));
        assert_eq!(config.branch, "gh-pages");
        assert_eq!(config.repository_url, "https://github.com/blluv/WebJ2J");
        assert_eq!(config.user.name, "blluv");
        assert_eq!(config.user.email, "biluv@protonmail.com");
        assert!(config.dotfiles);
    }

    #[tokio::test]
    async fn failure_prints_nothing() {
        let stub = StubPublisher::failing();
        let mut out = Vec::new();

        let err = deploy(stub.clone(), Config::webj2j(), &mut out)
            .await
            .unwrap_err();

        assert!(out.is_empty());
        assert_eq!(err.to_string(), "remote rejected the push");
        assert_eq!(stub.calls().len(), 1);
    }
}
