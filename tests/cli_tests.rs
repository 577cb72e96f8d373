//! End-to-end tests for the `focus-timer` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use focus_timer::persistence::{
    JsonFileStore, PersistedState, StateStore, DATA_DIR_ENV, PREFERENCES_FILE_NAME, STATE_FILE_NAME,
};
use focus_timer::types::TimerStatus;

// ============================================================================
// Test Helpers
// ============================================================================

/// Runs the binary against a private data directory.
fn focus_timer(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("focus-timer").unwrap();
    cmd.env(DATA_DIR_ENV, data_dir.path()).env_remove("RUST_LOG");
    cmd
}

fn save_paused_state(data_dir: &TempDir, remaining: u64) {
    let store = JsonFileStore::new(data_dir.path());
    store.save_state(&PersistedState::new(remaining, 600, TimerStatus::Paused, "refactor"));
}

// ============================================================================
// Help and parsing
// ============================================================================

mod parsing_tests {
    use super::*;

    #[test]
    fn test_help_lists_subcommands() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run"))
            .stdout(predicate::str::contains("status"))
            .stdout(predicate::str::contains("prefs"));
    }

    #[test]
    fn test_out_of_range_minutes_rejected() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .args(["run", "--minutes", "60"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("60"));
    }

    #[test]
    fn test_completions_bash() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("focus-timer"));
    }
}

// ============================================================================
// Saved state
// ============================================================================

mod state_tests {
    use super::*;

    #[test]
    fn test_status_without_saved_state() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No saved timer state"));
    }

    #[test]
    fn test_status_shows_saved_state() {
        let dir = TempDir::new().unwrap();
        save_paused_state(&dir, 125);

        focus_timer(&dir)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Status:    paused"))
            .stdout(predicate::str::contains("Remaining: 00:02:05"))
            .stdout(predicate::str::contains("Goal:      refactor"));
    }

    #[test]
    fn test_clear_removes_saved_state() {
        let dir = TempDir::new().unwrap();
        save_paused_state(&dir, 125);
        assert!(dir.path().join(STATE_FILE_NAME).exists());

        focus_timer(&dir)
            .arg("clear")
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared"));

        assert!(!dir.path().join(STATE_FILE_NAME).exists());
    }

    #[test]
    fn test_data_dir_flag_overrides_env() {
        let env_dir = TempDir::new().unwrap();
        let flag_dir = TempDir::new().unwrap();
        save_paused_state(&flag_dir, 30);

        focus_timer(&env_dir)
            .arg("status")
            .arg("--data-dir")
            .arg(flag_dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Remaining: 00:00:30"));
    }
}

// ============================================================================
// Preferences
// ============================================================================

mod prefs_tests {
    use super::*;

    #[test]
    fn test_prefs_defaults() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .arg("prefs")
            .assert()
            .success()
            .stdout(predicate::str::contains("Duration: 00:25:00"));

        assert!(!dir.path().join(PREFERENCES_FILE_NAME).exists());
    }

    #[test]
    fn test_prefs_update_is_saved() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .args(["prefs", "--minutes", "50", "--goal", "write", "--mute"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Duration: 00:50:00"))
            .stdout(predicate::str::contains("Sound:    muted"));

        let json = fs::read_to_string(dir.path().join(PREFERENCES_FILE_NAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["preferredDurationSeconds"], 3000);
        assert_eq!(value["sessionGoal"], "write");
        assert_eq!(value["isMuted"], true);
    }
}

// ============================================================================
// Run
// ============================================================================

mod run_tests {
    use super::*;

    #[test]
    fn test_run_one_second_completes() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .args(["run", "--seconds", "1", "--mute", "--fresh"])
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .success()
            .stdout(predicate::str::contains("Focus session started: 00:00:01"))
            .stdout(predicate::str::contains("00:00:01 remaining"))
            .stdout(predicate::str::contains("Session complete (00:00:01)"));

        assert!(!dir.path().join(STATE_FILE_NAME).exists());
    }

    #[test]
    fn test_run_resumes_saved_state() {
        let dir = TempDir::new().unwrap();
        save_paused_state(&dir, 1);

        focus_timer(&dir)
            .args(["run", "--mute"])
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .success()
            .stdout(predicate::str::contains("Resuming saved session: 00:00:01 left"))
            .stdout(predicate::str::contains("Goal: refactor"))
            .stdout(predicate::str::contains("Session complete (00:10:00)"));

        assert!(!dir.path().join(STATE_FILE_NAME).exists());
    }

    #[test]
    fn test_run_zero_seconds_completes_at_once() {
        let dir = TempDir::new().unwrap();
        focus_timer(&dir)
            .args(["run", "--seconds", "0", "--mute"])
            .timeout(std::time::Duration::from_secs(10))
            .assert()
            .success()
            .stdout(predicate::str::contains("Session complete (00:00:00)"))
            .stdout(predicate::str::contains("remaining").not());
    }
}
