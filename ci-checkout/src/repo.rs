//! Working directory preparation.

use std::fs;

use ci_checkout_core::{Git, DEFAULT_REMOTE};
use tracing::info;

use crate::error::CheckoutError;
use crate::runner::Runner;

/// Make `git.dir()` a repository whose `origin` is `repository_url`.
///
/// A missing directory is created and initialised. An existing repository is
/// reused only if one of its remotes already points at `repository_url`.
pub fn prepare(
    runner: &Runner<'_>,
    git: &Git,
    repository_url: &str,
) -> Result<(), CheckoutError> {
    let dir = git.dir();
    let workspace_error = |message: String| CheckoutError::Workspace {
        dir: dir.to_path_buf(),
        message,
    };

    if dir.exists() && !dir.is_dir() {
        return Err(workspace_error("path exists but is not a directory".to_string()));
    }
    fs::create_dir_all(dir)
        .map_err(|err| workspace_error(format!("failed to create directory: {}", err)))?;

    if dir.join(".git").exists() {
        let remotes = runner.run_for_output(&git.remote_list())?;
        if !remotes.contains(repository_url) {
            return Err(workspace_error(format!(
                "already a git repository using a different remote (expected {})",
                repository_url
            )));
        }
        info!(dir = %dir.display(), "reusing existing repository");
        return Ok(());
    }

    runner.run(&git.init())?;
    runner
        .run(&git.remote_add(DEFAULT_REMOTE, repository_url))
        .map_err(|source| CheckoutError::RemoteAdd {
            url: repository_url.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExecutor;
    use ci_checkout_core::RetryPolicy;

    const URL: &str = "https://github.com/org/repo.git";

    #[test]
    fn test_new_directory_is_initialised() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("src");
        let executor = ScriptedExecutor::new();
        let runner = Runner::new(&executor, RetryPolicy::once());

        prepare(&runner, &Git::new(&dir), URL).unwrap();

        assert!(dir.is_dir());
        assert_eq!(
            executor.calls(),
            vec!["git init".to_string(), format!("git remote add origin {}", URL)]
        );
    }

    #[test]
    fn test_existing_repository_with_matching_remote() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        let executor = ScriptedExecutor::new();
        executor.respond(
            "git remote -v",
            &format!("origin\t{} (fetch)\norigin\t{} (push)", URL, URL),
        );
        let runner = Runner::new(&executor, RetryPolicy::once());

        prepare(&runner, &Git::new(tmp.path()), URL).unwrap();

        assert_eq!(executor.calls(), vec!["git remote -v"]);
    }

    #[test]
    fn test_existing_repository_with_other_remote() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        let executor = ScriptedExecutor::new();
        executor.respond("git remote -v", "origin\thttps://example.com/other.git (fetch)");
        let runner = Runner::new(&executor, RetryPolicy::once());

        let err = prepare(&runner, &Git::new(tmp.path()), URL).unwrap_err();

        assert!(matches!(err, CheckoutError::Workspace { .. }));
        assert!(err.to_string().contains("different remote"));
    }

    #[test]
    fn test_file_in_the_way() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        fs::write(&file, "").unwrap();
        let executor = ScriptedExecutor::new();
        let runner = Runner::new(&executor, RetryPolicy::once());

        let err = prepare(&runner, &Git::new(&file), URL).unwrap_err();

        assert!(err.to_string().contains("not a directory"));
        assert!(executor.calls().is_empty());
    }
}
