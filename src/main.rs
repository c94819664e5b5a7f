use clap::Parser;
use danchu::cli::{Cli, Commands};
use danchu::{
    add_trigger, daemon_status, delete_trigger, load_triggers, run_daemon_worker, start_daemon,
    stop_daemon, update_trigger, ExpandError, Result,
};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Add { trigger, content } => {
            let entry = add_trigger(trigger, content)?;
            println!("Added trigger '{}'", entry.trigger);
            Ok(())
        }
        Commands::Delete { trigger } => {
            delete_trigger(&trigger)?;
            println!("Deleted trigger '{}'", trigger);
            Ok(())
        }
        Commands::Update { trigger, content } => {
            update_trigger(&trigger, content)?;
            println!("Updated trigger '{}'", trigger);
            Ok(())
        }
        Commands::List => list_triggers(),
        Commands::Start => start_daemon(),
        Commands::Stop => stop_daemon(),
        Commands::Status => daemon_status(),
        Commands::DaemonWorker => run_daemon_worker(),
    }
}

fn list_triggers() -> Result<()> {
    let triggers = match load_triggers() {
        Ok(triggers) => triggers,
        Err(ExpandError::StoreNotFound(_)) => vec![],
        Err(e) => return Err(e),
    };
    if triggers.is_empty() {
        println!("No triggers registered. Add one with 'danchu add'.");
        return Ok(());
    }
    println!("{:<12} {:<10} CONTENT", "TRIGGER", "ADDED");
    for entry in &triggers {
        let preview: String = entry.content.chars().take(40).collect();
        let preview = if entry.content.chars().count() > 40 {
            format!("{}...", preview)
        } else {
            preview
        };
        println!(
            "{:<12} {:<10} {}",
            entry.trigger,
            entry.formatted_time(),
            preview.replace('\n', " ")
        );
    }
    Ok(())
}
