// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result};
use config::Config;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `strata --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let (seed, latency) = dataset_settings(&config, options.demo)?;
    if options.check_only {
        return Ok(());
    }

    let log_file = config.log_file()?;
    logging::init(&log_file, config.log_level()).with_context(|| {
        format!(
            "start logging to {} -- set [log].file to a writable path",
            log_file.display()
        )
    })?;
    info!(
        config = %options.config_path.display(),
        seed,
        latency = ?latency,
        demo = options.demo,
        "starting strata"
    );

    let demo = strata_testkit::demo_session(seed, latency)
        .context("build demo dataset")?;
    let mut session_options = config.apply_ui(demo.options);
    match (options.select, options.open) {
        (Some(row), open) => session_options = session_options.with_initial_row(row, open),
        (None, true) => session_options = session_options.with_initial_row(0, true),
        (None, false) => {}
    }

    strata_tui::browse(demo.table, session_options, demo.registry)
}

fn dataset_settings(config: &Config, demo: bool) -> Result<(u64, Duration)> {
    if demo {
        return Ok((strata_testkit::DEMO_SEED, Duration::ZERO));
    }
    Ok((config.demo_seed(), config.demo_latency()?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    select: Option<usize>,
    open: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        select: None,
        open: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--select" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--select requires a row number"))?;
                let row = value.as_ref().parse::<usize>().with_context(|| {
                    format!("--select expects a zero-based row number, got {:?}", value.as_ref())
                })?;
                options.select = Some(row);
            }
            "--open" => {
                options.open = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("strata: browse nested records as drill-down tables");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use the stock dataset (default seed, no latency)");
    println!("  --select <n>             Start with row <n> selected");
    println!("  --open                   Open the selected row on startup");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, dataset_settings, parse_cli_args};
    use crate::config::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Duration;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/strata-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                demo: false,
                select: None,
                open: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_select_and_open() -> Result<()> {
        let options = parse_cli_args(
            vec!["--demo", "--select", "3", "--open"],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert_eq!(options.select, Some(3));
        assert!(options.open);
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_bad_select_values() {
        let missing = parse_cli_args(vec!["--select"], default_options_path())
            .expect_err("missing row should fail");
        assert!(missing.to_string().contains("--select requires a row number"));

        let negative = parse_cli_args(vec!["--select", "-1"], default_options_path())
            .expect_err("negative row should fail");
        assert!(negative.to_string().contains("zero-based row number"));
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn demo_flag_ignores_dataset_overrides() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "version = 1\n[demo]\nseed = 11\nlatency = \"2s\"\n")?;
        let config = Config::load(&path)?;

        assert_eq!(
            dataset_settings(&config, false)?,
            (11, Duration::from_secs(2))
        );
        assert_eq!(
            dataset_settings(&config, true)?,
            (strata_testkit::DEMO_SEED, Duration::ZERO)
        );
        Ok(())
    }
}
