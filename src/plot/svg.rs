//! SVG chart of a study run, rendered with Plotters.
//!
//! Two panels share the λ-grid x axis:
//! - left: bias², variance and coefficient MSE
//! - right: mean held-out log-loss, with the true model's log-loss for reference

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::LambdaSummary;
use crate::error::AppError;
use crate::study::StudyOutput;

/// Write the study chart to `path`.
pub fn write_study_svg(
    path: &Path,
    study: &StudyOutput,
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    if study.summaries.is_empty() {
        return Err(AppError::new(2, "Nothing to plot: the study has no lambda summaries."));
    }
    draw_study(path, study, width, height)
        .map_err(|e| AppError::new(2, format!("Failed to write SVG '{}': {e}", path.display())))
}

fn draw_study(
    path: &Path,
    study: &StudyOutput,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((1, 2));
    let summaries = &study.summaries;
    let x_max = (summaries.len().max(2) - 1) as f64;
    let lambdas: Vec<f64> = summaries.iter().map(|s| s.lambda).collect();
    let fmt_x = |v: &f64| lambda_tick(&lambdas, *v);

    // Left: bias-variance decomposition of the coefficient error.
    let curves: [(&str, RGBColor, fn(&LambdaSummary) -> f64); 3] = [
        ("mse", BLACK, |s| s.coef_mse),
        ("variance", BLUE, |s| s.variance),
        ("bias^2", RED, |s| s.bias_sq),
    ];
    let all: Vec<f64> = curves
        .iter()
        .flat_map(|(_, _, f)| summaries.iter().map(f))
        .collect();
    let (y0, y1) = padded_range(&all);

    let mut chart = ChartBuilder::on(&panels[0])
        .margin(10)
        .caption("coefficient error", ("sans-serif", 18))
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 35)
        .build_cartesian_2d(0.0..x_max, y0..y1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("lambda")
        .x_labels(summaries.len().min(10))
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&|v| format!("{v:.3}"))
        .draw()?;

    for (label, color, f) in curves {
        let points = finite_points(summaries, f);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    // Right: held-out predictive performance.
    let losses = finite_points(summaries, |s| s.mean_test_log_loss);
    let mut values: Vec<f64> = losses.iter().map(|&(_, y)| y).collect();
    values.push(study.mean_oracle_log_loss);
    let (y0, y1) = padded_range(&values);

    let mut chart = ChartBuilder::on(&panels[1])
        .margin(10)
        .caption("held-out log-loss", ("sans-serif", 18))
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 35)
        .build_cartesian_2d(0.0..x_max, y0..y1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("lambda")
        .x_labels(summaries.len().min(10))
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&|v| format!("{v:.3}"))
        .draw()?;

    chart
        .draw_series(LineSeries::new(losses.iter().copied(), BLUE.stroke_width(2)))?
        .label("fitted")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart.draw_series(losses.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;

    if study.mean_oracle_log_loss.is_finite() {
        let oracle = study.mean_oracle_log_loss;
        chart
            .draw_series(LineSeries::new(vec![(0.0, oracle), (x_max, oracle)], &BLACK))?
            .label("true model")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    log::info!("wrote chart to {}", path.display());
    Ok(())
}

fn finite_points(summaries: &[LambdaSummary], f: impl Fn(&LambdaSummary) -> f64) -> Vec<(f64, f64)> {
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, f(s)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1e-6);
    (min - pad, max + pad)
}

/// Tick label for a grid position: the λ at that index, blank between points.
fn lambda_tick(lambdas: &[f64], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    match lambdas.get(i as usize) {
        Some(&l) if l == 0.0 => "0".to_string(),
        Some(&l) if (0.01..1e4).contains(&l) => format!("{l}"),
        Some(&l) => format!("{l:.0e}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficients, TrueModel};
    use nalgebra::DVector;

    fn summary(lambda: f64, bias_sq: f64, variance: f64, loss: f64) -> LambdaSummary {
        LambdaSummary {
            lambda,
            converged: 3,
            failures: 0,
            mean_norm_sq: 1.0,
            bias_sq,
            variance,
            coef_mse: bias_sq + variance,
            mean_train_objective: 1.0,
            mean_test_log_loss: loss,
            sd_test_log_loss: 0.01,
            mean_test_auc: 0.7,
            mean_test_accuracy: 0.6,
            mean_iterations: 5.0,
        }
    }

    #[test]
    fn writes_an_svg_document() {
        let study = StudyOutput {
            truth: TrueModel {
                coefficients: Coefficients::new(0.0, DVector::from_vec(vec![1.0, 0.5])),
                weight_sd: 0.7,
            },
            summaries: vec![
                summary(0.0, 0.01, 0.8, 0.66),
                summary(0.1, 0.1, 0.3, 0.61),
                summary(1.0, 0.6, 0.05, 0.64),
            ],
            best_lambda: Some(0.1),
            mean_oracle_log_loss: 0.58,
            replicates: 3,
        };

        let path = std::env::temp_dir().join(format!("ridge-logit-test-{}.svg", std::process::id()));
        write_study_svg(&path, &study, 800, 400).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(text.contains("<svg"));
        assert!(text.contains("held-out log-loss"));
    }

    #[test]
    fn ticks_show_lambda_only_on_grid_points() {
        let lambdas = [0.0, 0.1, 0.001];
        assert_eq!(lambda_tick(&lambdas, 0.0), "0");
        assert_eq!(lambda_tick(&lambdas, 1.0), "0.1");
        assert_eq!(lambda_tick(&lambdas, 2.0), "1e-3");
        assert_eq!(lambda_tick(&lambdas, 0.5), "");
        assert_eq!(lambda_tick(&lambdas, 7.0), "");
    }
}
