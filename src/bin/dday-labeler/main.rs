mod display;

use chrono::Local;
use dday_labeler::{DisplayMode, GitHub, parse_args, sync_due_labels};
use display::{display_changes_quiet, display_plan_table};

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let (spec, display_mode) = match parse_args(std::env::args()) {
        Ok(result) => result,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let forge = GitHub::connect(spec.repo.clone()).await?;
    let now = Local::now().naive_local();
    let report = sync_due_labels(&spec, &forge, now).await?;

    let mut stdout = std::io::stdout();
    match display_mode {
        DisplayMode::Quiet => display_changes_quiet(&report.changes, &mut stdout)?,
        DisplayMode::Normal if spec.dry_run => display_plan_table(&report, now, &mut stdout)?,
        DisplayMode::Normal => {}
    }

    Ok(())
}
