use anyhow::Result;
use clap::Parser;

use crate::types::{DisplayMode, Repo, SyncSpec};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Default near-term window: only PRs due within this many days get their
/// countdown label touched.
const DEFAULT_WINDOW_DAYS: i64 = 10;

#[derive(Parser, Debug, Default)]
#[command(name = "dday-labeler")]
#[command(
    about = "Keeps D-<n> countdown labels on GitHub PRs in sync with due dates embedded in their titles as (~M/D)"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub repository in format 'owner/repo' (or a github.com URL)
    #[arg(
        short = 'r',
        long = "repo",
        value_name = "OWNER/REPO",
        env = "GITHUB_REPOSITORY"
    )]
    pub repo: Option<String>,

    /// Only touch labels on PRs due within this many days
    #[arg(short = 'w', long, default_value_t = DEFAULT_WINDOW_DAYS, value_name = "DAYS")]
    pub window: i64,

    /// Limit the number of open PRs to scan
    #[arg(short = 'L', long, default_value = "100", value_name = "NUM")]
    pub limit: usize,

    /// Show planned label changes without applying them
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Print affected PR numbers only
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl CliArgs {
    pub fn validate(&self) -> Result<()> {
        if self.repo.is_none() {
            anyhow::bail!(
                "Must specify --repo (or set the GITHUB_REPOSITORY environment variable)"
            );
        }

        if self.limit == 0 {
            anyhow::bail!("--limit must be at least 1");
        }

        Ok(())
    }
}

fn determine_display_mode(cli: &CliArgs) -> DisplayMode {
    if cli.quiet {
        DisplayMode::Quiet
    } else {
        DisplayMode::Normal
    }
}

fn create_sync_spec(cli: &CliArgs) -> Result<SyncSpec> {
    cli.validate()?;

    // validate() guarantees repo is present; an empty fallback still fails
    // cleanly in Repo::parse.
    let repo = Repo::parse(cli.repo.as_deref().unwrap_or_default())?;

    Ok(SyncSpec {
        repo,
        window: cli.window,
        limit: cli.limit,
        dry_run: cli.dry_run,
    })
}

/// Parses command-line arguments into a sync specification and display mode.
///
/// Accepts any iterator of arguments so tests can drive it directly.
pub fn parse_args<I, T>(args: I) -> Result<(SyncSpec, DisplayMode)>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    let display_mode = determine_display_mode(&cli);
    let spec = create_sync_spec(&cli)?;
    Ok((spec, display_mode))
}
