use std::io::IsTerminal;

use clap::ValueEnum;
use reactorlink_proto::TelemetrySample;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

impl OutputFormat {
    /// JSON lines when piped, the human layout on a terminal.
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Print one telemetry sample to stdout, one line per sample.
pub fn print_sample(sample: &TelemetrySample, format: OutputFormat) {
    println!("{}", render_sample(sample, format));
}

fn render_sample(sample: &TelemetrySample, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(sample).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Pretty => format!(
            "#{:08} temp={:.1}C accel={:.2}g state={} power={}%",
            sample.sample_id,
            sample.temperature_c,
            sample.accel_mag,
            sample.state,
            sample.power_percent
        ),
    }
}
