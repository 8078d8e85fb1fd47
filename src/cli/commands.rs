//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{ExtractArgs, PlanArgs, RunArgs};
use crate::cli::{browse, Cli};
use crate::domain::model::{parse_offset, RunConfiguration, TimedEvent};
use crate::engine::{ExecutorState, ExtractionEvent};
use crate::planner::ClipWindowPlanner;

/// Resolve configuration: defaults < file < environment < CLI flags
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = TomlConfigAdapter::new(cli.config.clone())
        .load()
        .context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Combine command-line inputs with configured defaults
pub fn build_run_configuration(args: &RunArgs, config: &AppConfig) -> Result<RunConfiguration> {
    let match_start_offset_seconds = match &args.offset {
        Some(text) => parse_offset(text)?,
        None => config.extraction.match_start_offset_seconds,
    };
    let events = match &args.events {
        Some(list) => TimedEvent::parse_list(list)?,
        None => config.events.clone(),
    };

    let run = RunConfiguration {
        vod_path: args.vod.clone(),
        match_start_offset_seconds,
        events,
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.extraction.output_dir.clone()),
        pre_seconds: args.pre.unwrap_or(config.extraction.pre_seconds),
        post_seconds: args.post.unwrap_or(config.extraction.post_seconds),
    };

    if run.pre_seconds == 0 && run.post_seconds == 0 {
        return Err(anyhow::anyhow!("--pre and --post cannot both be zero"));
    }
    Ok(run)
}

/// Execute the plan command
pub fn plan(args: PlanArgs, config: &AppConfig) -> Result<()> {
    let run = build_run_configuration(&args.run, config)?;
    let requests = ClipWindowPlanner::new().plan(&run);
    info!("Planned {} clip(s)", requests.len());

    if args.json {
        let json = serde_json::to_string_pretty(&requests)
            .context("Failed to serialize plan to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    if requests.is_empty() {
        println!("No events to process.");
        return Ok(());
    }
    for (request, event) in requests.iter().zip(run.events.iter()) {
        println!(
            "{:>2}. {:<8} {:>6.1}s +{:>5.1}s  {}",
            request.index,
            event.event_type,
            request.start_time_seconds,
            request.duration_seconds,
            request.output_path.display()
        );
    }
    Ok(())
}

/// Execute the extract command
pub async fn extract(args: ExtractArgs, config: AppConfig) -> Result<()> {
    let run = build_run_configuration(&args.run, &config)?;
    let container = DefaultAppContainer::new(&config);
    let interactor = container.extraction_interactor();
    let mut playlist = container.new_playlist();

    info!("Starting extract operation");
    let ctrl_c_interactor = interactor.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; stopping after the current clip");
            ctrl_c_interactor.cancel();
        }
    });

    let report = interactor
        .extract(run, &mut playlist, |event, _| match event {
            ExtractionEvent::Progress(message) => println!("{}", message),
            ExtractionEvent::ClipProduced {
                filename,
                start_time_seconds,
            } => println!("  + {} (start {}s)", filename, start_time_seconds.trunc() as u64),
            // Returned below and printed once by main
            ExtractionEvent::Error(_) => {}
            ExtractionEvent::Finished => println!("Done."),
        })
        .await;
    ctrl_c.abort();
    let report = report.context("Extraction failed")?;

    println!();
    println!("{}", browse::render_listing(&playlist));

    if args.browse && !playlist.is_empty() {
        browse::run(&mut playlist).await?;
    }

    match report.error {
        Some(message) => Err(anyhow::anyhow!(message)),
        None if report.summary.result == ExecutorState::Cancelled => {
            Err(anyhow::anyhow!("Extraction cancelled"))
        }
        None => {
            info!("Extract operation completed: {} clip(s)", report.clips_added);
            Ok(())
        }
    }
}
