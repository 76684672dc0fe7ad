//! CLI command definitions using clap

use blazeprobe::BrowserKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Blazeprobe: end-to-end journeys for the DemoBlaze storefront
#[derive(Parser, Debug)]
#[command(name = "blazeprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run journeys and write reports
    Run(RunArgs),

    /// List available journeys
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Where the configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// YAML configuration file
    #[arg(short, long, env = "BLAZEPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storefront root URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Browser to drive
    #[arg(long)]
    pub browser: Option<BrowserArg>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Journey to run (repeatable; default: all)
    #[arg(short, long = "journey", value_name = "NAME")]
    pub journeys: Vec<String>,

    /// Run against the in-memory storefront instead of a browser
    #[arg(long)]
    pub mock: bool,

    /// Stop at the first failing journey
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip failure screenshots
    #[arg(long)]
    pub no_screenshots: bool,

    /// Output directory for reports
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration
    #[command(flatten)]
    pub source: ConfigSource,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration
    #[command(flatten)]
    pub source: ConfigSource,
}

/// Browser choice
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserArg {
    /// Chrome via chromedriver
    Chrome,
    /// Firefox via geckodriver
    Firefox,
}

impl From<BrowserArg> for BrowserKind {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chrome => Self::Chrome,
            BrowserArg::Firefox => Self::Firefox,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_with_journeys() {
            let cli = Cli::parse_from([
                "blazeprobe",
                "run",
                "--mock",
                "-j",
                "login_valid",
                "--journey",
                "cart_add_delete",
                "--fail-fast",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert!(args.mock);
            assert!(args.fail_fast);
            assert_eq!(args.journeys, vec!["login_valid", "cart_add_delete"]);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::parse_from(["blazeprobe", "list", "-vv", "--json-logs"]);
            assert_eq!(cli.verbose, 2);
            assert!(cli.json_logs);
        }

        #[test]
        fn test_browser_arg() {
            let cli = Cli::parse_from(["blazeprobe", "config", "--browser", "firefox", "--headed"]);
            let Commands::Config(args) = cli.command else {
                panic!("expected config");
            };
            assert_eq!(args.source.browser, Some(BrowserArg::Firefox));
            assert!(args.source.headed);
            assert_eq!(BrowserKind::from(BrowserArg::Firefox), BrowserKind::Firefox);
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["blazeprobe"]).is_err());
        }
    }
}
