use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Error};
use clap::Parser;
use serde_json::Value;
use tracing::error;
use tracing_subscriber::EnvFilter;
use rs_body_measure::config::config::{AnalysisConfig, PoseProviderConfig};
use rs_body_measure::helper::report::{format_calibration, format_keypoints, format_measurement_results};
use rs_body_measure::helper::calibration::validate_reference_length;
use rs_body_measure::modules::pose_client::{PoseEstimation, PoseEstimationClient};
use rs_body_measure::utils::utils::parse_reference_length;
use rs_body_measure::{analyze_with_export, AnalysisReport, MeasurementError, MeasurementPipeline};

/// Estimate body measurements from a single frontal photo.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"Environment:
    ROBOFLOW_API_KEY, ROBOFLOW_WORKSPACE, ROBOFLOW_WORKFLOW_ID   required with --image
    ROBOFLOW_API_URL                                            optional endpoint override
    RUST_LOG                                                    log filter

Examples:
    body-measure --image person.jpg --reference-cm 6.3
    body-measure --keypoints response.json --reference-cm 40 --json"#)]
struct Cli {
    /// Image to send to the pose workflow
    #[arg(short, long, required_unless_present = "keypoints", conflicts_with = "keypoints")]
    image: Option<PathBuf>,

    /// Saved workflow response (JSON) to analyze without calling the provider
    #[arg(short, long)]
    keypoints: Option<PathBuf>,

    /// Real-world length of the calibration reference in cm (eye distance, or shoulder width when no eyes are found)
    #[arg(short, long)]
    reference_cm: Option<String>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Save the detected keypoints as an N x 3 .npy matrix
    #[arg(long)]
    save_keypoints: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_saved_outputs(path: &Path) -> Result<Value, Error> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read keypoints file {}", path.display()))?;
    let mut payload: Value = serde_json::from_str(&text)?;
    // Accept either the raw `outputs` array or the full workflow response.
    Ok(match payload.get_mut("outputs") {
        Some(outputs) => outputs.take(),
        None => payload,
    })
}

async fn run(cli: &Cli, config: &AnalysisConfig) -> Result<AnalysisReport, Error> {
    let reference_length_cm = match &cli.reference_cm {
        Some(input) => parse_reference_length(input)?,
        None => config.reference_length_cm,
    };

    let reference_length_cm = validate_reference_length(reference_length_cm)?;

    let estimation = match (&cli.image, &cli.keypoints) {
        (Some(image), _) => {
            let client = PoseEstimationClient::new(PoseProviderConfig::from_env()?)?;
            MeasurementPipeline::new(client).estimate_pose(image).await?
        }
        (None, Some(path)) => PoseEstimation::from_outputs(&read_saved_outputs(path)?),
        (None, None) => return Err(Error::msg("either --image or --keypoints is required")),
    };

    analyze_with_export(estimation, reference_length_cm, cli.save_keypoints.as_deref())
}

fn print_report(report: &AnalysisReport) {
    println!("{}\n", format_calibration(&report.calibration));
    println!("Detected Keypoints:");
    for line in format_keypoints(&report.keypoints) {
        println!("{line}");
    }
    println!();

    let rows = format_measurement_results(&report.measurements);
    if rows.is_empty() {
        println!("No measurements calculated.\nPlease ensure clear keypoints in the image.");
        return;
    }
    println!("{:<10} {:<18} {:>10}", "Category", "Measurement", "Value");
    for row in rows {
        println!("{:<10} {:<18} {:>10}", row.category, row.measurement, row.value);
    }
}

fn user_message(err: &Error) -> String {
    match err.downcast_ref::<MeasurementError>() {
        Some(MeasurementError::InsufficientKeypoints { .. }) => {
            "Insufficient keypoints detected.\nPlease ensure a clear frontal view of a person.".to_string()
        }
        Some(MeasurementError::CalibrationUnresolved) => {
            "Unable to calculate scale: no eye or shoulder keypoints detected.\nPlease ensure a clear view of face or shoulders.".to_string()
        }
        Some(MeasurementError::InvalidCalibrationInput(_)) => {
            "Please enter a valid positive number for the reference length.".to_string()
        }
        None => format!("Failed to process image: {err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AnalysisConfig {
        json_output: cli.json,
        ..AnalysisConfig::default()
    };

    match run(&cli, &config).await {
        Ok(report) => {
            if config.json_output {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        error!("cannot serialize report: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("analysis failed: {err:#}");
            eprintln!("{}", user_message(&err));
            ExitCode::FAILURE
        }
    }
}
