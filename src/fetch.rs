use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    error::{ReplayError, ReplayResult},
    model::Replay,
};

/// How to ask the backend for a replay: `program args... function '{"matchId": ...}'`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendQuery {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub function: String,
    /// Working directory of the backend project.
    pub cwd: Option<PathBuf>,
}

impl Default for BackendQuery {
    fn default() -> Self {
        Self {
            program: PathBuf::from("npx"),
            args: vec!["convex".to_string(), "run".to_string()],
            function: "gridRoyale:getReplay".to_string(),
            cwd: None,
        }
    }
}

impl BackendQuery {
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// JSON argument object passed to the backend function.
    pub fn request_body(match_id: &str) -> String {
        serde_json::json!({ "matchId": match_id }).to_string()
    }

    fn command(&self, match_id: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&self.function)
            .arg(Self::request_body(match_id))
            .stdin(Stdio::null());
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Run the query to completion.
    ///
    /// `Ok(None)` means the backend answered `null` (no such match). Spawn failures, non-zero
    /// exits and unparsable output are [`ReplayError::Fetch`].
    #[tracing::instrument(skip(self))]
    pub fn query_replay(&self, match_id: &str) -> ReplayResult<Option<Replay>> {
        let out = self.command(match_id).output().map_err(|e| {
            ReplayError::fetch(format!(
                "failed to run '{}': {e}",
                self.program.display()
            ))
        })?;

        if !out.status.success() {
            return Err(ReplayError::fetch(format!(
                "backend query exited with status {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        serde_json::from_slice::<Option<Replay>>(&out.stdout)
            .map_err(|e| ReplayError::fetch(format!("backend returned unparsable replay JSON: {e}")))
    }

    /// Like [`BackendQuery::query_replay`], but every failure is logged and reported as no data.
    pub fn fetch_replay(&self, match_id: &str) -> Option<Replay> {
        match self.query_replay(match_id) {
            Ok(Some(replay)) => Some(replay),
            Ok(None) => {
                tracing::warn!(%match_id, "backend has no replay for this match");
                None
            }
            Err(err) => {
                tracing::warn!(%match_id, "error fetching replay: {err}");
                None
            }
        }
    }
}

/// Read a replay previously saved as JSON.
pub fn load_replay_file(path: &Path) -> ReplayResult<Replay> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read replay '{}'", path.display()))?;
    Replay::from_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn shell(script: &str) -> BackendQuery {
        BackendQuery {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
            function: "gridRoyale:getReplay".to_string(),
            cwd: None,
        }
    }

    #[test]
    fn request_body_is_json_object() {
        let body: serde_json::Value =
            serde_json::from_str(&BackendQuery::request_body("m\"1")).unwrap();
        assert_eq!(body["matchId"], "m\"1");
    }

    #[test]
    fn missing_program_is_fetch_error_and_no_data() {
        let q = BackendQuery {
            program: PathBuf::from("/definitely/not/a/backend"),
            ..BackendQuery::default()
        };
        assert!(matches!(q.query_replay("m1"), Err(ReplayError::Fetch(_))));
        assert!(q.fetch_replay("m1").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_fetch_error() {
        let q = shell("echo nope >&2; exit 3");
        let err = q.query_replay("m1").unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(q.fetch_replay("m1").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn stdout_parses_into_replay() {
        let q = shell(
            r#"printf '%s' '{"grid_size": 9, "players": [{"id": "a", "name": "A"}], "history": [{"tick": 0}], "winner": "A"}'"#,
        );
        let replay = q.query_replay("m1").unwrap().unwrap();
        assert_eq!(replay.grid_size, 9);
        assert_eq!(replay.winner(), Some("A"));
        assert_eq!(replay.history.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn function_and_body_are_passed_as_trailing_args() {
        // $1 is the function, $2 the JSON body.
        let q = shell(r#"test "$1" = gridRoyale:getReplay && printf '%s' "$2" | grep -q matchId && echo null"#);
        assert!(q.query_replay("m1").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn garbage_stdout_is_fetch_error() {
        let q = shell("echo not-json");
        assert!(matches!(q.query_replay("m1"), Err(ReplayError::Fetch(_))));
    }

    #[test]
    fn load_replay_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        std::fs::write(&path, r#"{"history": [], "players": []}"#).unwrap();
        let replay = load_replay_file(&path).unwrap();
        assert!(replay.history.is_empty());
        assert!(load_replay_file(&dir.path().join("missing.json")).is_err());
    }
}
