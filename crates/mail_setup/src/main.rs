use rand::rngs::OsRng;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use mail_setup::adapters::sqlite::{open_store, LocalMailbox, SearchIndex, SqliteTagStore};
use mail_setup::config::{default_config_path, default_data_dir, TomlConfigStore};
use mail_setup::keyring::GnuPg;
use mail_setup::services::capabilities::{CommandProbe, SPAM_CLASSIFIER_PROGRAM};
use mail_setup::services::migrations::Migrations;
use mail_setup::{check_guard, run_setup, SetupEnvironment, SetupError, SetupReport, SetupServices};

fn main() -> ExitCode {
    // Debug builds log our crate at debug, everything else at info.
    // RUST_LOG overrides both.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("mail_setup=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let json = std::env::args().any(|arg| arg == "--json");

    match setup() {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => error!("Failed to serialize report: {}", e),
                }
            } else {
                println!("{}", report.message);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Setup failed: {}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup() -> Result<SetupReport, SetupError> {
    let config_path = default_config_path()
        .ok_or_else(|| SetupError::Config("Cannot determine config directory".to_string()))?;
    let data_dir = default_data_dir()
        .ok_or_else(|| SetupError::Config("Cannot determine data directory".to_string()))?;

    let config = TomlConfigStore::new(config_path);
    // Nothing may touch the data dir while locked down
    check_guard(&config)?;

    let pool = open_store(&data_dir.join("store.db"))?;
    let env = SetupEnvironment::from_system();

    let tags = SqliteTagStore::new(pool.clone());
    let mailbox = LocalMailbox::new(pool.clone(), data_dir.join("mail"));
    let index = SearchIndex::new(pool);
    let keyring = match env.gnupg_home.as_deref().filter(|home| home.is_dir()) {
        Some(home) => GnuPg::new().with_homedir(home),
        None => GnuPg::new(),
    };
    let spam_probe = CommandProbe::new(SPAM_CLASSIFIER_PROGRAM);
    let migrations = Migrations::builtin();
    let mut rng = OsRng;

    let mut services = SetupServices {
        config: &config,
        tags: &tags,
        mailbox: &mailbox,
        index: &index,
        keyring: &keyring,
        spam_probe: &spam_probe,
        migrations: &migrations,
        rng: &mut rng,
    };

    run_setup(&mut services, &env)
}
