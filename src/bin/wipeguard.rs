use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::error;

use wipeguard::{
    adapters::{FileStore, TerminalTransport},
    api::{self, ChangeWipeCodeRequest, FailureResponse, Response},
    error::{StorageError, WipeguardError},
    logic::SecretCollector,
    model::{prompts, FailureKind, Salt, SecretValue},
    ports::SecurityStateStore,
    use_cases::WipeCodeConfig,
};

#[derive(Parser, Debug)]
#[command(name = "wipeguard")]
#[command(about = "Manage the wipe code of a credential store", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Credential store file
    #[arg(long, global = true, env = "WIPEGUARD_STORE", default_value = "wipeguard.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new credential store protected by a PIN
    Init {
        /// Create the store without a PIN
        #[arg(long)]
        no_pin: bool,
    },

    /// Show which protections are configured
    Status,

    /// Set, change or remove the wipe code
    ChangeWipeCode {
        /// Remove the wipe code instead of setting it
        #[arg(long)]
        remove: bool,

        /// Do not verify the PIN before asking for the new wipe code
        #[arg(long)]
        skip_pin_precheck: bool,

        /// Report write failures separately from an invalid PIN
        #[arg(long)]
        report_storage_faults: bool,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { no_pin } => {
            let pin = if no_pin {
                SecretValue::empty()
            } else {
                let mut transport = TerminalTransport::stdio();
                SecretCollector::new(&mut transport)
                    .collect_new_secret_confirmed(
                        prompts::ENTER_NEW_PIN,
                        prompts::REENTER_NEW_PIN,
                        None,
                    )
                    .context("PIN entry aborted")?
            };

            FileStore::create(&cli.store, &pin, &Salt::empty())
                .with_context(|| format!("failed to create {}", cli.store.display()))?;
            println!("Device initialized");
        }

        Commands::Status => {
            let store = FileStore::open(&cli.store)
                .with_context(|| format!("failed to open {}", cli.store.display()))?;
            println!("initialized: {}", store.is_initialized());
            println!("pin: {}", store.has_pin());
            println!("wipe_code: {}", store.has_wipe_code());
        }

        Commands::ChangeWipeCode {
            remove,
            skip_pin_precheck,
            report_storage_faults,
            json,
        } => {
            let config = WipeCodeConfig {
                precheck_pin: !skip_pin_precheck,
                report_storage_faults,
            };

            let response = match FileStore::open(&cli.store) {
                Ok(store) => api::change_wipe_code(
                    store,
                    TerminalTransport::stdio(),
                    ChangeWipeCodeRequest { remove },
                    config,
                ),
                // No store file means the device was never set up.
                Err(WipeguardError::Storage(StorageError::Io(e)))
                    if e.kind() == ErrorKind::NotFound =>
                {
                    Err(FailureResponse::from(FailureKind::NotInitialized))
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to open {}", cli.store.display()));
                }
            };
            let failed = response.is_err();

            if json {
                println!("{}", serde_json::to_string(&Response::from(response))?);
            } else {
                match response {
                    Ok(success) => println!("{}", success.message),
                    Err(failure) => error!("{:?}: {}", failure.code, failure.message),
                }
            }

            if failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use std::path::Path;

    fn wipeguard(store: &Path) -> Command {
        let mut cmd = Command::cargo_bin("wipeguard").unwrap();
        cmd.arg("--store").arg(store);
        cmd
    }

    fn stdout_of(cmd: &mut Command, stdin: &str) -> (bool, String, String) {
        let output = cmd.write_stdin(stdin).output().unwrap();
        (
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        )
    }

    #[test]
    fn test_cli_version_parameter() {
        let mut cmd = Command::cargo_bin("wipeguard").unwrap();
        let assert = cmd.arg("--version").assert();
        assert.success();
    }

    #[test]
    fn test_cli_wipe_code_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("device.json");

        let (ok, stdout, _) = stdout_of(wipeguard(&store).arg("init"), "1234\n1234\n");
        assert!(ok);
        assert!(stdout.contains("Device initialized"));

        let (ok, stdout, stderr) = stdout_of(
            wipeguard(&store).arg("change-wipe-code"),
            "y\n1234\n5678\n5678\n",
        );
        assert!(ok, "stderr: {}", stderr);
        assert_eq!(stdout.trim(), "Wipe code set");
        assert!(stderr.contains("Wipe code enabled."));

        let (ok, stdout, _) = stdout_of(wipeguard(&store).arg("status"), "");
        assert!(ok);
        assert!(stdout.contains("wipe_code: true"));

        let (ok, stdout, _) = stdout_of(
            wipeguard(&store).args(["change-wipe-code", "--remove", "--json"]),
            "y\n1234\n",
        );
        assert!(ok);
        assert_eq!(stdout.trim(), r#"{"success":{"message":"Wipe code removed"}}"#);

        let (ok, _, stderr) =
            stdout_of(wipeguard(&store).args(["change-wipe-code", "--remove"]), "");
        assert!(!ok);
        assert!(stderr.contains("already disabled"), "stderr: {}", stderr);
    }

    #[test]
    fn test_cli_wrong_pin() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("device.json");
        let (ok, _, _) = stdout_of(wipeguard(&store).arg("init"), "1234\n1234\n");
        assert!(ok);

        let (ok, stdout, _) = stdout_of(
            wipeguard(&store).args(["change-wipe-code", "--json"]),
            "y\n0000\n",
        );

        assert!(!ok);
        assert!(stdout.contains("pin_invalid"));
    }

    #[test]
    fn test_cli_change_on_missing_store_is_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("absent.json");

        let (ok, stdout, _) =
            stdout_of(wipeguard(&store).args(["change-wipe-code", "--json"]), "");

        assert!(!ok);
        assert_eq!(
            stdout.trim(),
            r#"{"failure":{"code":"not_initialized","message":"Device is not initialized"}}"#
        );
        assert!(!store.exists());
    }

    #[test]
    fn test_cli_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let (ok, _, stderr) =
            stdout_of(wipeguard(&dir.path().join("absent.json")).arg("status"), "");
        assert!(!ok);
        assert!(stderr.contains("failed to open"));
    }
}
