use anyhow::{Context, Result};
use clap::Parser;
use kiln_core::config::CONFIG_FILE_NAME;
use kiln_core::logger::Logger;
use kiln_core::parser::LogLevel;
use kiln_core::tui::App;
use kiln_core::{
    BuildEvent, BuildOptions, BuildReport, BuildWorker, Cli, CommandBuilder, Commands, Config,
};
use std::path::{Path, PathBuf};

fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }

    Config::default()
        .save_to_file(&config_path)
        .context("Failed to save kiln.toml")?;

    println!("Created {}", config_path.display());

    Ok(())
}

fn dry_run(config: &Config, options: BuildOptions) -> Result<()> {
    let options = options.normalized();
    options.validate()?;

    let command = CommandBuilder::new(config.tool.program.clone()).build(&options);
    let logger = Logger::new().with_timestamps(false);

    for entry in &command.log {
        logger.log_entry(entry);
    }
    println!("{}", command);

    Ok(())
}

async fn run_without_tui(
    config: &Config,
    options: BuildOptions,
    report_path: Option<&Path>,
) -> Result<bool> {
    let logger = Logger::new().with_timestamps(config.display.show_timestamps);
    let (mut worker, mut events) =
        BuildWorker::new(CommandBuilder::new(config.tool.program.clone()));

    worker.start(options)?;

    let mut entries = Vec::new();
    let mut outcome = None;
    while let Some(event) = events.recv().await {
        match event {
            BuildEvent::Log(entry) => {
                logger.log_entry(&entry);
                if report_path.is_some() {
                    entries.push(entry);
                }
            }
            BuildEvent::Finished(result) => {
                outcome = Some(result);
                break;
            }
        }
    }

    let waited = worker.wait().await;
    let outcome = outcome.or(waited);

    if let Some(path) = report_path {
        let command = worker
            .last_command()
            .map(|c| c.args.clone())
            .unwrap_or_default();
        BuildReport::new(command, outcome.clone(), entries).save(path)?;
        logger.log(
            LogLevel::Info,
            &format!("Report written to {}", path.display()),
        );
    }

    Ok(outcome.map_or(false, |o| o.success))
}

async fn run_with_tui(config: Config, options: BuildOptions, report_path: Option<&Path>) -> Result<()> {
    let mut app = App::new(config, &options);
    app.run().await?;

    if let (Some(path), Some(_)) = (report_path, app.last_outcome()) {
        app.report().save(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Init { force }) = &cli.command {
        init_config(*force)?;
        return Ok(());
    }

    let mut config = Config::load_from_cli(&cli)?;
    if let Some(theme) = cli.theme {
        config.display.theme = theme;
    }

    let options = cli.build_options(&config.build);

    if cli.dry_run {
        return dry_run(&config, options);
    }

    if cli.no_tui {
        if !run_without_tui(&config, options, cli.report.as_deref()).await? {
            std::process::exit(1);
        }
    } else {
        run_with_tui(config, options, cli.report.as_deref()).await?;
    }

    Ok(())
}
