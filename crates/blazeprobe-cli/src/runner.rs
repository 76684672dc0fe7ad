//! Subcommand execution

use crate::commands::{ConfigArgs, ConfigSource, ListArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use blazeprobe::mock::{MockStore, MockStoreFactory};
use blazeprobe::{FailureMode, Journey, ProbeConfig, Reporter, SessionFactory, Suite};

/// Resolve the run configuration: file or defaults, then environment, then flags
pub fn resolve_config(source: &ConfigSource) -> CliResult<ProbeConfig> {
    let config = match &source.config {
        Some(path) => ProbeConfig::load(path)?,
        None => ProbeConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(url) = &source.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(url) = &source.webdriver_url {
        config.webdriver_url.clone_from(url);
    }
    if let Some(browser) = source.browser {
        config.browser = browser.into();
    }
    if source.headed {
        config.headless = false;
    }
    config.validate()?;
    Ok(config)
}

/// `blazeprobe run`
pub fn run(cli: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut config = resolve_config(&args.source)?;
    if let Some(dir) = &args.output {
        config.report_dir.clone_from(dir);
    }
    let journeys = Journey::select(args.journeys.as_slice())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    if args.mock {
        let factory = MockStoreFactory::new(MockStore::new(), config.session_settings());
        runtime.block_on(execute(cli, args, &config, factory, journeys))
    } else {
        run_browser(cli, args, &config, journeys, &runtime)
    }
}

#[cfg(feature = "webdriver")]
fn run_browser(
    cli: &CliConfig,
    args: &RunArgs,
    config: &ProbeConfig,
    journeys: Vec<Journey>,
    runtime: &tokio::runtime::Runtime,
) -> CliResult<()> {
    let factory = blazeprobe::WebDriverFactory::new(config.clone());
    runtime.block_on(execute(cli, args, config, factory, journeys))
}

#[cfg(not(feature = "webdriver"))]
fn run_browser(
    _cli: &CliConfig,
    _args: &RunArgs,
    _config: &ProbeConfig,
    _journeys: Vec<Journey>,
    _runtime: &tokio::runtime::Runtime,
) -> CliResult<()> {
    Err(CliError::config(
        "built without browser support; pass --mock or rebuild with --features webdriver",
    ))
}

async fn execute<F: SessionFactory>(
    cli: &CliConfig,
    args: &RunArgs,
    config: &ProbeConfig,
    factory: F,
    journeys: Vec<Journey>,
) -> CliResult<()> {
    let mode = if args.fail_fast {
        FailureMode::AndonCord
    } else {
        FailureMode::CollectAll
    };
    let mut reporter = Reporter::new().with_failure_mode(mode);
    let mut progress = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    progress.info(&format!("{} journeys on {}", journeys.len(), factory.describe()));

    let mut suite = Suite::new(factory).with_journeys(journeys);
    if args.no_screenshots {
        suite = suite.without_screenshots();
    }

    progress.start_progress(suite.journeys().len() as u64, "running journeys");
    let summary = suite
        .run_with(&mut reporter, |log| progress.journey_finished(log))
        .await;
    progress.finish();

    let files = reporter.flush(&config.report_dir)?;
    progress.summary(&summary);
    progress.report_files(&files);

    if summary.is_success() {
        Ok(())
    } else {
        Err(CliError::JourneysFailed {
            failed: summary.failed,
            total: summary.total,
        })
    }
}

/// `blazeprobe list`
pub fn list(args: &ListArgs) -> CliResult<()> {
    if args.json {
        let entries: Vec<_> = Journey::ALL
            .iter()
            .map(|j| serde_json::json!({ "name": j.name(), "description": j.description() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        let width = Journey::ALL.iter().map(|j| j.name().len()).max().unwrap_or(0);
        for journey in Journey::ALL {
            println!("{:width$}  {}", journey.name(), journey.description());
        }
    }
    Ok(())
}

/// `blazeprobe config`
pub fn show_config(args: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(&args.source)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::BrowserArg;
    use blazeprobe::BrowserKind;
    use std::io::Write;

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_flags_override_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: https://staging.example.com\nheadless: true").unwrap();
            let source = ConfigSource {
                config: Some(file.path().to_path_buf()),
                webdriver_url: Some("http://localhost:4444".to_string()),
                browser: Some(BrowserArg::Firefox),
                headed: true,
                ..ConfigSource::default()
            };
            let config = resolve_config(&source).unwrap();
            assert_eq!(config.webdriver_url, "http://localhost:4444");
            assert_eq!(config.browser, BrowserKind::Firefox);
            assert!(!config.headless);
        }

        #[test]
        fn test_invalid_flag_is_rejected() {
            let source = ConfigSource {
                base_url: Some("ftp://nope".to_string()),
                ..ConfigSource::default()
            };
            assert!(matches!(resolve_config(&source), Err(CliError::Probe(_))));
        }

        #[test]
        fn test_missing_file() {
            let source = ConfigSource {
                config: Some("/nonexistent/blazeprobe.yaml".into()),
                ..ConfigSource::default()
            };
            assert!(resolve_config(&source).is_err());
        }
    }
}
