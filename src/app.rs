//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs the single-draw fit or the replicated study
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, CommonArgs, FitArgs, StudyArgs};
use crate::domain::StudyConfig;
use crate::error::AppError;
use crate::fit::{lambda_grid, normalize_lambdas};

pub mod pipeline;

const SVG_WIDTH: u32 = 1100;
const SVG_HEIGHT: u32 = 450;

/// Entry point for the `rlogit` binary.
pub fn run() -> Result<(), AppError> {
    // `RUST_LOG` may come from a local `.env`.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .ok();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Study(args) => handle_study(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    if config.json {
        println!(
            "{}",
            crate::io::fit_report_json(&run.replicate, &run.truth, &config, chrono::Local::now())?
        );
    } else {
        println!(
            "{}",
            crate::report::format_fit_report(&run.replicate, &run.truth, &config)
        );
    }

    if run.has_failures() {
        let failed = run.replicate.fits.iter().filter(|f| !f.converged()).count();
        return Err(AppError::new(
            5,
            format!(
                "{failed} of {} fits did not converge; see the status column.",
                run.replicate.fits.len()
            ),
        ));
    }

    Ok(())
}

fn handle_study(args: StudyArgs) -> Result<(), AppError> {
    let config = study_config_from_args(&args)?;
    let study = pipeline::run_study(&config)?;
    let now = chrono::Local::now();

    if config.json {
        println!("{}", crate::io::study_report_json(&study, &config, now)?);
    } else {
        println!("{}", crate::report::format_study_summary(&study, &config, now));
        if config.plot {
            let plot = crate::plot::render_bias_variance_plot(
                &study.summaries,
                config.plot_width,
                config.plot_height,
            );
            println!("{plot}");
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_summary_csv(path, &study.summaries, &config)?;
    }
    if let Some(path) = &config.export_svg {
        crate::plot::write_study_svg(path, &study, SVG_WIDTH, SVG_HEIGHT)?;
    }

    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<StudyConfig, AppError> {
    let mut config = config_from_common(&args.common)?;
    config.replicates = 1;
    config.show_coefficients = args.show_coefficients;
    config.plot = false;
    Ok(config)
}

pub fn study_config_from_args(args: &StudyArgs) -> Result<StudyConfig, AppError> {
    let mut config = config_from_common(&args.common)?;
    config.replicates = args.replicates;
    config.plot = !args.no_plot;
    config.plot_width = args.width;
    config.plot_height = args.height;
    config.export_csv = args.export.clone();
    config.export_svg = args.svg.clone();
    Ok(config)
}

fn config_from_common(args: &CommonArgs) -> Result<StudyConfig, AppError> {
    let lambdas = match &args.lambdas {
        Some(list) => normalize_lambdas(list)?,
        None => lambda_grid(args.lambda_min, args.lambda_max, args.lambda_steps, !args.no_zero)?,
    };

    Ok(StudyConfig {
        p: args.p,
        n_train: args.n_train,
        n_test: args.n_test,
        signal: args.signal,
        intercept: args.intercept,
        seed: args.seed,
        lambdas,
        standardize: !args.no_standardize,
        solver: args.solver,
        max_iter: args.max_iter,
        grad_tol: args.tol,
        json: args.json,
        ..StudyConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    #[test]
    fn study_config_uses_log_grid_with_zero() {
        let cli = Cli::parse_from([
            "rlogit", "study", "--lambda-min", "0.01", "--lambda-max", "1", "--lambda-steps", "3",
            "--no-plot",
        ]);
        let Command::Study(args) = cli.command else {
            panic!("expected study");
        };
        let config = study_config_from_args(&args).unwrap();
        assert_eq!(config.lambdas.len(), 4);
        assert_eq!(config.lambdas[0], 0.0);
        assert!((config.lambdas[3] - 1.0).abs() < 1e-12);
        assert!(!config.plot);
        assert!(config.standardize);
    }

    #[test]
    fn terminal_plot_is_on_unless_disabled() {
        let cli = Cli::parse_from(["rlogit", "study"]);
        let Command::Study(args) = cli.command else {
            panic!("expected study");
        };
        assert!(study_config_from_args(&args).unwrap().plot);
        assert!(Cli::try_parse_from(["rlogit", "study", "--plot"]).is_err());
    }

    #[test]
    fn explicit_lambdas_are_sorted_and_checked() {
        let cli = Cli::parse_from(["rlogit", "fit", "--lambdas", "1,0,0.1", "--no-standardize"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args).unwrap();
        assert_eq!(config.lambdas, vec![0.0, 0.1, 1.0]);
        assert!(!config.standardize);

        let cli = Cli::parse_from(["rlogit", "fit", "--lambdas=-1"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(fit_config_from_args(&args).unwrap_err().exit_code(), 2);
    }
}
