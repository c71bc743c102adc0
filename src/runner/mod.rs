use anyhow::{anyhow, Result};
use chrono::Utc;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::Config;
use crate::models::RunRecord;
use crate::utils::truncate_lines;

/// Interpreter a script needs, chosen by extension. None means run it directly.
pub fn interpreter_for(path: &Path, python_bin: &str) -> Option<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => Some(python_bin.to_string()),
        Some("sh") => Some("sh".to_string()),
        _ => None,
    }
}

/// Full argv of a launch: `[interpreter?, path, args...]`
pub fn command_for(path: &Path, args: &[String], python_bin: &str) -> Vec<String> {
    let mut command: Vec<String> = interpreter_for(path, python_bin).into_iter().collect();
    command.push(path.to_string_lossy().into_owned());
    command.extend(args.iter().cloned());
    command
}

/// Run a catalog script to completion from the repository root.
/// The child is killed once `cfg.run_timeout_secs` elapses.
pub async fn run_script(script_id: &str, path: &Path, args: &[String], cfg: &Config) -> Result<RunRecord> {
    // The child runs from the root, so a cwd-relative path would no longer resolve.
    let path = std::path::absolute(path).map_err(|e| anyhow!("Error running script: {}", e))?;
    let command = command_for(&path, args, &cfg.python_bin);
    let (program, rest) = command
        .split_first()
        .ok_or_else(|| anyhow!("Error running script: empty command"))?;

    tracing::info!("Running {}: {}", script_id, command.join(" "));
    let started_at = Utc::now();
    let clock = Instant::now();

    let child = Command::new(program)
        .args(rest)
        .current_dir(&cfg.root_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| anyhow!("Error running script: {}", e))?;

    let limit = Duration::from_secs(cfg.run_timeout_secs);
    let mut record = RunRecord {
        id: uuid::Uuid::new_v4().to_string(),
        script_id: script_id.to_string(),
        command,
        return_code: None,
        stdout: String::new(),
        stderr: String::new(),
        timed_out: false,
        started_at,
        duration_ms: 0,
    };

    // Dropping the wait future on timeout drops the child, which kills it.
    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            record.return_code = output.status.code();
            record.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            record.stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        }
        Ok(Err(e)) => return Err(anyhow!("Error running script: {}", e)),
        Err(_) => {
            tracing::warn!("{} timed out after {}s", script_id, cfg.run_timeout_secs);
            record.timed_out = true;
            record.stderr = format!("Script timed out ({}s)", cfg.run_timeout_secs);
        }
    }
    record.duration_ms = clock.elapsed().as_millis() as u64;

    tracing::info!(
        "{} finished: code={:?} timed_out={} in {}ms",
        script_id,
        record.return_code,
        record.timed_out,
        record.duration_ms
    );
    tracing::debug!("{} stdout:\n{}", script_id, truncate_lines(&record.stdout, 20));
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_command_for_picks_interpreter() {
        let args = vec!["--username".to_string(), "admin".to_string()];
        assert_eq!(
            command_for(Path::new("jobs/lab2.py"), &args, "python3"),
            vec!["python3", "jobs/lab2.py", "--username", "admin"]
        );
        assert_eq!(command_for(Path::new("jobs/ping.sh"), &[], "python3"), vec!["sh", "jobs/ping.sh"]);
        assert_eq!(command_for(Path::new("/usr/local/bin/ping-check"), &[], "python3"), vec!["/usr/local/bin/ping-check"]);
    }

    #[tokio::test]
    async fn test_run_script_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("echo.sh");
        fs::write(&script, "echo \"args: $*\"\necho oops >&2\nexit 3\n").unwrap();

        let cfg = Config::with_root(dir.path());
        let args = vec!["--push-config".to_string(), "C8K-R51,C8K-R52".to_string()];
        let record = run_script("echo", &script, &args, &cfg).await.unwrap();

        assert_eq!(record.return_code, Some(3));
        assert_eq!(record.stdout, "args: --push-config C8K-R51,C8K-R52\n");
        assert_eq!(record.stderr, "oops\n");
        assert!(!record.timed_out);
        assert_eq!(record.command[0], "sh");
    }

    #[tokio::test]
    async fn test_run_script_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.sh");
        fs::write(&script, "sleep 5\n").unwrap();

        let mut cfg = Config::with_root(dir.path());
        cfg.run_timeout_secs = 1;
        let record = run_script("slow", &script, &[], &cfg).await.unwrap();

        assert!(record.timed_out);
        assert_eq!(record.return_code, None);
        assert_eq!(record.stderr, "Script timed out (1s)");
    }

    #[tokio::test]
    async fn test_run_script_with_relative_root() {
        let cwd = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir_in(&cwd).unwrap();
        let root = dir.path().strip_prefix(&cwd).unwrap().to_path_buf();
        fs::create_dir_all(root.join("jobs")).unwrap();
        fs::write(root.join("jobs/echo.sh"), "echo ran\n").unwrap();

        let cfg = Config::with_root(&root);
        let script = crate::catalog::resolve_script_path(&root, &root.join("jobs"), "jobs/echo.sh").unwrap();
        assert!(script.is_relative());
        let record = run_script("echo", &script, &[], &cfg).await.unwrap();

        assert_eq!(record.return_code, Some(0), "stderr: {}", record.stderr);
        assert_eq!(record.stdout, "ran\n");
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::with_root(dir.path());
        cfg.python_bin = "/nonexistent/python".to_string();
        let err = tokio_test::block_on(run_script("lab", Path::new("lab.py"), &[], &cfg)).unwrap_err();
        assert!(err.to_string().starts_with("Error running script:"));
    }
}
