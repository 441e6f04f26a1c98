//! pagescroll - Entry Point

use clap::Parser;
use pagescroll::error::AppError;
use pagescroll::paging::Axis;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// pagescroll - replay paging sessions against the layout engine
#[derive(Parser, Debug)]
#[command(name = "pagescroll")]
#[command(version)]
#[command(about = "Replay a paging session script and report engine state per step")]
pub struct Args {
    /// Path to a TOML session script
    pub script: PathBuf,

    /// Scroll axis (horizontal or vertical)
    #[arg(short, long)]
    pub axis: Option<Axis>,

    /// Gap between pages, rounded to an even value
    #[arg(short, long)]
    pub gap: Option<f64>,

    /// Pages kept live beyond the visible range on each side
    #[arg(short, long)]
    pub preload: Option<usize>,

    /// Emit one JSON object per step instead of text
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pagescroll: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = pagescroll::config::load_config_with_precedence(args.config.clone())?;
        let merged = pagescroll::config::merge_config(config_file);
        let with_env = pagescroll::config::apply_env_overrides(merged);
        pagescroll::config::apply_cli_overrides(with_env, args.axis, args.gap, args.preload)
    };

    pagescroll::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        script = %args.script.display(),
        "Configuration loaded and resolved"
    );

    let script = pagescroll::replay::load_script(&args.script)?;
    let replay = pagescroll::replay::run_script(&script, &config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        for report in &replay.reports {
            writeln!(out, "{}", serde_json::to_string(report)?)?;
        }
        writeln!(out, "{}", serde_json::to_string(&replay.summary)?)?;
    } else {
        writeln!(out, "{}", replay.render_text())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["pagescroll", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["pagescroll", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_script_is_required() {
        let result = Args::try_parse_from(["pagescroll"]);
        let err = result.unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_script_only_defaults() {
        let args = Args::parse_from(["pagescroll", "session.toml"]);
        assert_eq!(args.script, PathBuf::from("session.toml"));
        assert_eq!(args.axis, None);
        assert_eq!(args.gap, None);
        assert_eq!(args.preload, None);
        assert!(!args.json);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_axis_long_flag_is_case_insensitive() {
        let args = Args::parse_from(["pagescroll", "s.toml", "--axis", "Vertical"]);
        assert_eq!(args.axis, Some(Axis::Vertical));
    }

    #[test]
    fn test_axis_rejects_unknown_value() {
        let result = Args::try_parse_from(["pagescroll", "s.toml", "-a", "diagonal"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_gap_short_flag() {
        let args = Args::parse_from(["pagescroll", "s.toml", "-g", "12.5"]);
        assert_eq!(args.gap, Some(12.5));
    }

    #[test]
    fn test_preload_rejects_negative() {
        let result = Args::try_parse_from(["pagescroll", "s.toml", "--preload", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "pagescroll",
            "rotation.toml",
            "-a",
            "horizontal",
            "-g",
            "10",
            "-p",
            "1",
            "--json",
            "--config",
            "/custom/config.toml",
        ]);
        assert_eq!(args.script, PathBuf::from("rotation.toml"));
        assert_eq!(args.axis, Some(Axis::Horizontal));
        assert_eq!(args.gap, Some(10.0));
        assert_eq!(args.preload, Some(1));
        assert!(args.json);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_cli_flags_flow_through_config_precedence_chain() {
        use pagescroll::config::{apply_cli_overrides, merge_config, ConfigFile};

        let config_file = ConfigFile {
            axis: Some(Axis::Vertical),
            gap: Some(4.0),
            preload_margin: None,
            log_file_path: None,
        };
        let merged = merge_config(Some(config_file));
        assert_eq!(merged.axis, Axis::Vertical);

        let args = Args::parse_from(["pagescroll", "s.toml", "--gap", "30"]);
        let resolved = apply_cli_overrides(merged, args.axis, args.gap, args.preload);
        assert_eq!(resolved.axis, Axis::Vertical, "unset CLI flag keeps file value");
        assert_eq!(resolved.gap, 30.0, "CLI gap overrides file value");
        assert_eq!(resolved.preload_margin, 0);
    }
}
