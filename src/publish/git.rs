use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{
    Commit, Cred, CredentialType, FetchOptions, IndexAddOption, Oid, PushOptions, RemoteCallbacks,
    Repository, ResetType, Signature,
};
use tempfile::TempDir;

use super::{files, Publish};
use crate::config::Config;

#[derive(Clone, Debug, Default)]
pub struct GitPublisher {
    ssh_key_path: Option<PathBuf>,
}

impl GitPublisher {
    pub fn from_env() -> Self {
        GitPublisher {
            ssh_key_path: std::env::var_os("SSH_KEY_PATH").map(PathBuf::from),
        }
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let ssh_key_path = self.ssh_key_path.as_deref();
        let (mut tried_key, mut tried_agent, mut tried_helper) = (false, false, false);

        let mut cb = RemoteCallbacks::new();
        cb.credentials(move |url, username, allowed| {
            let user = username.unwrap_or("git");
            if allowed.contains(CredentialType::SSH_KEY) {
                if let (Some(key), false) = (ssh_key_path, tried_key) {
                    tried_key = true;
                    return Cred::ssh_key(user, None, key, None);
                }
                if !tried_agent {
                    tried_agent = true;
                    return Cred::ssh_key_from_agent(user);
                }
            }
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !tried_helper {
                tried_helper = true;
                let config = git2::Config::open_default()?;
                return Cred::credential_helper(&config, url, username);
            }
            if allowed.contains(CredentialType::DEFAULT) {
                return Cred::default();
            }
            Err(git2::Error::from_str("No usable credentials for remote"))
        });
        cb.push_update_reference(|refname, status| match status {
            Some(reason) => Err(git2::Error::from_str(&format!(
                "Remote rejected {}: {}",
                refname, reason
            ))),
            None => Ok(()),
        });
        cb
    }

    // Returns the commit the next one builds on, if any.
    fn checkout_branch(&self, config: &Config, path: &Path) -> Result<(Repository, Option<Oid>)> {
        log::debug!("Cloning {} into {:?}", config.repository_url, path);

        let repo = Repository::init(path)?;
        let branch_ref = format!("refs/heads/{}", config.branch);
        let tracking_ref = format!("refs/remotes/{}/{}", config.remote, config.branch);

        {
            let mut remote = repo.remote(&config.remote, &config.repository_url)?;
            let mut options = FetchOptions::new();
            options.remote_callbacks(self.callbacks());
            // A branch missing on the remote leaves the tracking ref unset.
            remote
                .fetch(
                    &[format!("+{}:{}", branch_ref, tracking_ref)],
                    Some(&mut options),
                    None,
                )
                .with_context(|| format!("Fetching {} from {}", config.branch, config.repository_url))?;
        }

        repo.set_head(&branch_ref)?;

        let tip = repo
            .find_reference(&tracking_ref)
            .ok()
            .map(|r| r.peel_to_commit().map(|c| c.id()))
            .transpose()?;
        let Some(parent) = tip else {
            log::debug!("Branch {} does not exist yet, creating it", config.branch);
            return Ok((repo, None));
        };
        if !config.history {
            log::debug!("Discarding history of {}", config.branch);
            return Ok((repo, None));
        }

        {
            let commit = repo.find_commit(parent)?;
            repo.reset(commit.as_object(), ResetType::Hard, None)?;
        }

        Ok((repo, Some(parent)))
    }

    fn push(&self, repo: &Repository, config: &Config) -> Result<()> {
        let branch_ref = format!("refs/heads/{}", config.branch);
        let refspec = if config.history {
            format!("{0}:{0}", branch_ref)
        } else {
            format!("+{0}:{0}", branch_ref)
        };

        log::debug!("Pushing {} to {}", config.branch, config.repository_url);
        let mut remote = repo.find_remote(&config.remote)?;
        let mut options = PushOptions::new();
        options.remote_callbacks(self.callbacks());
        remote
            .push(&[refspec], Some(&mut options))
            .with_context(|| format!("Pushing {} to {}", config.branch, config.repository_url))?;

        Ok(())
    }
}

// Replaces (or, with `add`, extends) the files under `dest` and stages the
// whole working tree.
fn stage(repo: &Repository, config: &Config, sources: &[PathBuf]) -> Result<Oid> {
    let workdir = repo.workdir().context("Clone has no working directory")?;
    let target = workdir.join(&config.dest);

    if !config.add {
        files::clear(&target)?;
    }

    log::debug!(
        "Copying {} files from {:?}",
        sources.len(),
        config.source_directory
    );
    files::copy(&config.source_directory, &target, sources)?;
    if config.nojekyll {
        std::fs::write(target.join(".nojekyll"), "")?;
    }
    if let Some(cname) = &config.cname {
        std::fs::write(target.join("CNAME"), cname)?;
    }

    let mut index = repo.index()?;
    index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"], None)?;
    index.write()?;
    Ok(index.write_tree()?)
}

fn commit(repo: &Repository, config: &Config, tree: Oid, parent: Option<&Commit<'_>>) -> Result<Oid> {
    let signature = Signature::now(&config.user.name, &config.user.email)?;
    let tree = repo.find_tree(tree)?;
    let parents: Vec<_> = parent.into_iter().collect();
    let oid = repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        &config.message,
        &tree,
        &parents,
    )?;
    log::debug!("Committed {} on {}", oid, config.branch);

    Ok(oid)
}

impl Publish for GitPublisher {
    fn publish(&self, config: &Config) -> Result<()> {
        let sources = files::collect(&config.source_directory, config.dotfiles)?;

        let clone_dir = TempDir::with_prefix("gh-pages")?;
        let (repo, parent) = self.checkout_branch(config, clone_dir.path())?;
        let tree = stage(&repo, config, &sources)?;

        let parent = parent.map(|id| repo.find_commit(id)).transpose()?;
        if parent.as_ref().is_some_and(|p| p.tree_id() == tree) {
            log::debug!("No changes to {}, skipping commit and push", config.branch);
            return Ok(());
        }

        commit(&repo, config, tree, parent.as_ref())?;

        if !config.push {
            log::debug!("Push disabled, not updating {}", config.remote);
            return Ok(());
        }

        self.push(&repo, config)
    }
}
