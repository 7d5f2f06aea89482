use std::io::Write;

use config::Config;
use publish::{GitPublisher, Publish};

mod config;
mod publish;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let code = run(GitPublisher::from_env(), &mut std::io::stdout()).await;
    std::process::exit(code);
}

async fn run<P, W>(publisher: P, out: &mut W) -> i32
where
    P: Publish + Send + 'static,
    W: Write,
{
    let config = Config::webj2j();
    log::debug!(
        "Deploying {:?} to {} of {}",
        config.source_directory,
        config.branch,
        config.repository_url
    );

    match publish::deploy(publisher, config, out).await {
        Ok(()) => 0,
        Err(e) => {
            log::error!("Deploy failed: {:#}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::stub::StubPublisher;

    #[tokio::test]
    async fn run_exits_zero_after_complete() {
        let stub = StubPublisher::default();
        let mut out = Vec::new();

        let code = run(stub.clone(), &mut out).await;

        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "Deploy Complete!\n");
        assert_eq!(stub.calls(), vec![Config::webj2j()]);
    }

    #[tokio::test]
    async fn run_exits_one_on_failure() {
        let stub = StubPublisher::failing();
        let mut out = Vec::new();

        let code = run(stub.clone(), &mut out).await;

        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(stub.calls().len(), 1);
    }
}
