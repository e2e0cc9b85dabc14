use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lecture_scribe::cli::{Cli, Commands};
use lecture_scribe::config::Config;
use lecture_scribe::notes::{select_template, SubjectCategory};
use lecture_scribe::output::{self, OutputLayout};
use lecture_scribe::pipeline::{NotesPipeline, RunOptions, EXIT_FATAL, EXIT_INTERRUPTED};
use lecture_scribe::{utils, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    // Library and binary events carry different targets
    let default_directives = format!("lecture_scribe={level},lecture_notes={level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{:#}", e);
                ExitCode::from(EXIT_FATAL)
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\n\nInterrupted. Exiting...\n");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            url,
            api_key,
            output_dir,
            no_pdf,
            subject,
        } => {
            let config = Config::load(cli.config.as_deref()).await?;
            let api_key = config.resolve_api_key(api_key)?;

            let compiler = (!no_pdf).then_some(config.compiler.command.as_str());
            let missing_deps = utils::check_dependencies(&config.transcript.yt_dlp_path, compiler).await;
            for dep in missing_deps {
                tracing::warn!("Dependency check: {}", dep);
            }

            let dir = output::resolve_output_dir(output_dir, &url, &std::env::current_dir()?);
            let layout = OutputLayout::new(dir);
            layout.prepare()?;

            let mut config = config;
            config.app.show_progress &= !cli.quiet;
            let pipeline = NotesPipeline::new(config, &api_key)?;

            tracing::info!("Starting YouTube Lecture Notes Generator");
            tracing::debug!("Video URL:     {}", url);
            tracing::info!("Output folder: {}", layout.dir.display());

            let options = RunOptions {
                compile: !no_pdf,
                subject,
            };
            let summary = pipeline.run(&url, &layout, &options).await?;

            output::print_summary(&summary);
        }
        Commands::Config { show } => {
            let config = Config::load(cli.config.as_deref()).await?;
            if show {
                config.display();
            } else {
                let path = match cli.config {
                    Some(path) => path,
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Edit it to change models, temperatures or the LaTeX compiler.");
            }
        }
        Commands::Subjects => {
            println!("Supported subjects:");
            for subject in SubjectCategory::ALL {
                let template = select_template(subject);
                println!("  • {:<16} {}", subject.as_str(), template.packages().join(", "));
            }
        }
    }

    Ok(())
}
