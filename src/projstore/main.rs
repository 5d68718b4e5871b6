use clap::Parser;
use colored::*;
use projstore::api::{CmdMessage, CmdResult, ConfigAction, MessageLevel, ProjectApi};
use projstore::config::{StoreConfig, StorePaths};
use projstore::error::{Result, StoreError};
use projstore::logging::init_logging;
use projstore::store::fs_backend::FsBackend;
use projstore::store::ProjectStore;
use std::io::{self, Read};

mod args;
use args::{Cli, Commands};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Ok(false) when the command ran but reported an error-level message.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let api = init_api(&cli)?;

    let result = match cli.command {
        Some(Commands::List) | None => handle_list(&api)?,
        Some(Commands::Get { id }) => handle_get(&api, &id)?,
        Some(Commands::Create { payload }) => api.create(&read_payload(payload)?)?,
        Some(Commands::Update { payload }) => api.update(&read_payload(payload)?)?,
        Some(Commands::Delete { id }) => api.delete(&id)?,
        Some(Commands::Doctor) => api.doctor()?,
        Some(Commands::Config { key, value }) => handle_config(&api, key, value)?,
        Some(Commands::Init) => api.init()?,
    };

    print_messages(&result.messages);
    Ok(!result.has_errors())
}

fn init_api(cli: &Cli) -> Result<ProjectApi<FsBackend>> {
    let paths = StorePaths::resolve(cli.data_dir.clone())?;
    let config = StoreConfig::load(paths.config_dir())?;
    let store = ProjectStore::open_paths(&paths, config)?;
    Ok(ProjectApi::new(store, paths))
}

fn read_payload(arg: Option<String>) -> Result<String> {
    match arg {
        Some(payload) => Ok(payload),
        None => {
            let mut payload = String::new();
            io::stdin()
                .read_to_string(&mut payload)
                .map_err(StoreError::Io)?;
            Ok(payload)
        }
    }
}

fn handle_list(api: &ProjectApi<FsBackend>) -> Result<CmdResult> {
    let result = api.list()?;
    if !result.projects.is_empty() {
        print_json(&result.projects)?;
    }
    Ok(result)
}

fn handle_get(api: &ProjectApi<FsBackend>, id: &str) -> Result<CmdResult> {
    let result = api.get(id)?;
    for project in &result.projects {
        print_json(project)?;
    }
    Ok(result)
}

fn handle_config(
    api: &ProjectApi<FsBackend>,
    key: Option<String>,
    value: Option<String>,
) -> Result<CmdResult> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::Get(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            for key in StoreConfig::keys() {
                println!("{} = {}", key.bold(), config.get(key)?);
            }
        }
    }
    Ok(result)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).map_err(StoreError::Serialization)?;
    println!("{}", out);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}
