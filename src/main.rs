use clap::Parser;
use lead_splitter::config::{AgentAction, Command, RosterSource};
use lead_splitter::domain::ports::{AgentRoster, ListStore};
use lead_splitter::utils::error::{ErrorSeverity, LeadError};
use lead_splitter::utils::{logger, validation::Validate};
use lead_splitter::{
    AppConfig, CliConfig, HttpRoster, LocalStorage, MemoryStore, SqliteStore, UploadService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), LeadError> {
    let config = cli.load_app_config()?;
    config.validate()?;

    let database = SqliteStore::open(&config.database.path)?;
    tracing::debug!("Using database {}", config.database.path);

    match &cli.command {
        Command::Upload {
            file,
            uploaded_by,
            dry_run,
        } => {
            let roster = build_roster(&config, &database)?;
            let store: Box<dyn ListStore> = if *dry_run {
                tracing::info!("🔍 DRY RUN MODE - lists will not be saved");
                Box::new(MemoryStore::default())
            } else {
                Box::new(database.clone())
            };

            let service = UploadService::new(
                LocalStorage::new("."),
                roster,
                store,
                config.upload_options()?,
            );
            let summary = service.upload_file(file, uploaded_by).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Agents { action } => match action {
            AgentAction::Add {
                name,
                email,
                mobile,
            } => {
                let agent = database.add_agent(name, email, mobile).await?;
                println!("{}", serde_json::to_string_pretty(&agent)?);
            }
            AgentAction::List => {
                let agents = database.list_active_agents().await?;
                println!("{}", serde_json::to_string_pretty(&agents)?);
            }
            AgentAction::Show { id } => {
                let agent = database.get_agent(id).await?;
                println!("{}", serde_json::to_string_pretty(&agent)?);
            }
            AgentAction::Update {
                id,
                name,
                email,
                mobile,
            } => {
                let agent = database
                    .update_agent(id, name.as_deref(), email.as_deref(), mobile.as_deref())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&agent)?);
            }
            AgentAction::Remove { id } => {
                if database.remove_agent(id).await? {
                    println!("✅ Agent {} removed", id);
                } else {
                    println!("Agent {} not found", id);
                }
            }
        },
        Command::Lists { agent } => {
            let service = UploadService::new(
                LocalStorage::new("."),
                build_roster(&config, &database)?,
                database.clone(),
                config.upload_options()?,
            );
            match agent {
                Some(agent_id) => {
                    let lists = service.lists_for_agent(agent_id).await?;
                    println!("{}", serde_json::to_string_pretty(&lists)?);
                }
                None => {
                    let overview = service.list_overview().await?;
                    println!("{}", serde_json::to_string_pretty(&overview)?);
                }
            }
        }
        Command::Export { output, agent } => {
            let service = UploadService::new(
                LocalStorage::new(&config.export.output_path),
                build_roster(&config, &database)?,
                database.clone(),
                config.upload_options()?,
            );
            let manifest = service.export(output, agent.as_deref()).await?;
            println!(
                "📁 Exported {} lists to {}/{}",
                manifest.len(),
                config.export.output_path,
                output
            );
        }
    }

    Ok(())
}

fn build_roster(config: &AppConfig, database: &SqliteStore) -> Result<Box<dyn AgentRoster>, LeadError> {
    match config.roster.source {
        RosterSource::Database => Ok(Box::new(database.clone())),
        RosterSource::Http => {
            let endpoint = config.roster.endpoint.clone().unwrap_or_default();
            Ok(Box::new(HttpRoster::new(endpoint, config.roster_timeout())?))
        }
    }
}
