mod aggregator;
mod cli;
mod error;
mod fields;
mod fmt;
mod importer;
mod models;
mod reports;
mod resolver;
mod schemes;
mod settings;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands, SchemesCommands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            ro_code,
            ro_name,
            region,
        } => cli::init::run(data_dir, ro_code, ro_name, region),
        Commands::Report {
            date,
            region,
            data_dir,
            export,
            json,
        } => cli::report::run(date, region, data_dir, export, json),
        Commands::Schemes { command } => match command {
            SchemesCommands::List { data_dir } => cli::schemes::list(data_dir),
            SchemesCommands::Add {
                category,
                codes,
                data_dir,
            } => cli::schemes::add(&category, &codes, data_dir),
            SchemesCommands::Remove {
                category,
                codes,
                data_dir,
            } => cli::schemes::remove(&category, &codes, data_dir),
        },
        Commands::Branches { region, data_dir } => cli::branches::list(region, data_dir),
        Commands::Status { data_dir } => cli::status::run(data_dir),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "scorecard", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
