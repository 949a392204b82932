//! ttreco - kinematic reconstruction CLI
//!
//! The `ttreco` command runs the ttbar and hadronic W reconstructors over
//! events stored as JSON.
//!
//! ## Commands
//!
//! - `reconstruct`: Reconstruct every event in a JSON file
//! - `neutrino`: Solve the neutrino p_z for a single lepton/MET pair
//! - `config`: Print the default configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use ttreco_core::{
    reconstruct_events, BatchSummary, EventInput, EventOutcome, FourMomentum, NeutrinoQuadratic,
    NeutrinoSolution, PzSelection, ReconstructionConfig,
};

#[derive(Parser)]
#[command(name = "ttreco")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chi-square reconstruction of semileptonic ttbar and hadronic W decays", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct every event in a JSON array of events
    Reconstruct {
        /// Path to the events file (JSON array)
        #[arg(short, long)]
        events: PathBuf,

        /// Path to a configuration file (JSON); defaults apply to missing fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write outcomes here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep only events passing the quality cuts
        #[arg(long)]
        apply_cuts: bool,
    },

    /// Solve the neutrino p_z from the W-mass constraint
    Neutrino {
        #[arg(long, allow_negative_numbers = true)]
        lepton_pt: f64,

        #[arg(long, allow_negative_numbers = true)]
        lepton_eta: f64,

        #[arg(long, allow_negative_numbers = true)]
        lepton_phi: f64,

        #[arg(long, default_value_t = 0.000_510_998_91)]
        lepton_mass: f64,

        #[arg(long, allow_negative_numbers = true)]
        met_px: f64,

        #[arg(long, allow_negative_numbers = true)]
        met_py: f64,

        #[arg(long, default_value_t = 80.4)]
        w_mass: f64,

        /// default, closest_to_lepton, most_central or max_decay_cosine
        #[arg(long, default_value = "default")]
        selection: PzSelection,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ttreco_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Reconstruct {
            events,
            config,
            output,
            apply_cuts,
        } => cmd_reconstruct(&events, config.as_deref(), output.as_deref(), apply_cuts),
        Commands::Neutrino {
            lepton_pt,
            lepton_eta,
            lepton_phi,
            lepton_mass,
            met_px,
            met_py,
            w_mass,
            selection,
        } => {
            let report = cmd_neutrino(
                FourMomentum::from_pt_eta_phi_m(lepton_pt, lepton_eta, lepton_phi, lepton_mass),
                FourMomentum::transverse(met_px, met_py),
                lepton_mass,
                w_mass,
                selection,
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Config => {
            println!(
                "{}",
                serde_json::to_string_pretty(&ReconstructionConfig::default())?
            );
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ReconstructionConfig> {
    let Some(path) = path else {
        return Ok(ReconstructionConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    ReconstructionConfig::from_json(&content)
        .with_context(|| format!("Invalid configuration in {:?}", path))
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn run_reconstruction(
    events: &[EventInput],
    config: &ReconstructionConfig,
    apply_cuts: bool,
) -> Result<(Vec<EventOutcome>, BatchSummary)> {
    let outcomes =
        reconstruct_events(events, config).context("Configuration rejected by reconstructors")?;
    let summary = BatchSummary::from_outcomes(&outcomes);
    let outcomes = if apply_cuts {
        outcomes.into_iter().filter(EventOutcome::accepted_any).collect()
    } else {
        outcomes
    };
    Ok((outcomes, summary))
}

fn cmd_reconstruct(
    events_path: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    apply_cuts: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let events: Vec<EventInput> = read_json_file(events_path)?;

    let (outcomes, summary) = run_reconstruction(&events, &config, apply_cuts)?;
    info!(
        events = summary.events,
        rejected = summary.rejected,
        ttbar_ok = summary.ttbar_ok,
        hadronic_w_ok = summary.hadronic_w_ok,
        ttbar_accepted = summary.ttbar_accepted,
        hadronic_w_accepted = summary.hadronic_w_accepted,
        written = outcomes.len(),
        "reconstruction finished"
    );

    let rendered = serde_json::to_string_pretty(&outcomes)?;
    if let Some(path) = output {
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write outcomes to {:?}", path))?;
    } else {
        println!("{}", rendered);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct NeutrinoReport {
    solution: NeutrinoSolution,
    candidates: Vec<f64>,
    discriminant: f64,
}

fn cmd_neutrino(
    lepton: FourMomentum,
    met: FourMomentum,
    lepton_mass: f64,
    w_mass: f64,
    selection: PzSelection,
) -> NeutrinoReport {
    let quadratic = NeutrinoQuadratic::new(&lepton, &met, lepton_mass, w_mass);
    let solution = quadratic.solve(selection);
    NeutrinoReport {
        solution,
        candidates: solution.candidates(),
        discriminant: quadratic.discriminant(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_events() -> serde_json::Value {
        json!([
            {
                "event_id": 1,
                "lepton": {"pt": 40.0, "eta": 0.5, "phi": 0.0, "mass": 0.000511},
                "met": {"pt": 31.6, "phi": 0.32},
                "jets": [
                    {"pt": 95.0, "eta": 0.4, "phi": -0.3, "mass": 8.0, "btag": 0.92},
                    {"pt": 80.0, "eta": -1.2, "phi": 2.2, "mass": 6.0, "btag": 0.15},
                    {"pt": 66.0, "eta": 0.9, "phi": 1.0, "mass": 7.0, "btag": 0.81},
                    {"pt": 52.0, "eta": -0.2, "phi": -2.4, "mass": 5.0, "btag": 0.40},
                    {"pt": 30.0, "eta": -0.8, "phi": 0.6, "mass": 3.0, "btag": 0.02}
                ]
            },
            {
                "event_id": 2,
                "lepton": {"pt": 40.0, "eta": 0.5, "phi": 0.0},
                "met": {"pt": 31.6, "phi": 0.32},
                "jets": [
                    {"pt": 95.0, "eta": 0.4, "phi": -0.3, "mass": 8.0, "btag": 0.92}
                ]
            }
        ])
    }

    #[test]
    fn test_cli_parses_negative_met() {
        let cli = Cli::try_parse_from([
            "ttreco",
            "neutrino",
            "--lepton-pt",
            "40",
            "--lepton-eta",
            "-0.5",
            "--lepton-phi",
            "0",
            "--met-px",
            "-70",
            "--met-py",
            "0",
            "--selection",
            "central",
        ])
        .unwrap();
        match cli.command {
            Commands::Neutrino {
                lepton_eta,
                met_px,
                selection,
                w_mass,
                ..
            } => {
                assert_eq!(lepton_eta, -0.5);
                assert_eq!(met_px, -70.0);
                assert_eq!(selection, PzSelection::MostCentral);
                assert_eq!(w_mass, 80.4);
            }
            _ => panic!("expected neutrino subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_selection() {
        let result = Cli::try_parse_from([
            "ttreco",
            "neutrino",
            "--lepton-pt",
            "40",
            "--lepton-eta",
            "0",
            "--lepton-phi",
            "0",
            "--met-px",
            "1",
            "--met-py",
            "1",
            "--selection",
            "random",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_reconstruct_writes_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events.json");
        let output = dir.path().join("out.json");
        std::fs::write(&events, sample_events().to_string()).unwrap();

        cmd_reconstruct(&events, None, Some(output.as_path()), false).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let outcomes = written.as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["event_id"], 1);
        assert_eq!(outcomes[0]["ttbar"]["success"], true);
        assert_eq!(outcomes[1]["ttbar"]["success"], false);
        assert_eq!(
            outcomes[1]["ttbar"]["failure"]["kind"],
            "insufficient_jets"
        );
    }

    #[test]
    fn test_apply_cuts_drops_failed_events() {
        let events: Vec<EventInput> = serde_json::from_value(sample_events()).unwrap();
        let (outcomes, summary) =
            run_reconstruction(&events, &ReconstructionConfig::default(), true).unwrap();
        assert_eq!(summary.events, 2);
        assert!(outcomes.iter().all(|o| o.event_id != 2));
        assert!(outcomes.iter().all(EventOutcome::accepted_any));
    }

    #[test]
    fn test_config_file_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"btag_threshold": 0.5}"#).unwrap();
        let cfg = load_config(Some(good.as_path())).unwrap();
        assert_eq!(cfg.btag_threshold, 0.5);
        assert_eq!(cfg.masses.top, 172.0);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"masses": {"w": 0.0}}"#).unwrap();
        let err = load_config(Some(bad.as_path())).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Invalid configuration"), "unexpected error: {msg}");
        assert!(msg.contains("masses.w"), "unexpected error: {msg}");
    }

    #[test]
    fn test_unvalidated_config_reported() {
        let events: Vec<EventInput> = serde_json::from_value(sample_events()).unwrap();
        let mut config = ReconstructionConfig::default();
        config.resolutions.hadronic_w = 0.0;
        let err = run_reconstruction(&events, &config, false).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("resolutions.hadronic_w"), "unexpected error: {msg}");
    }

    #[test]
    fn test_missing_events_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_reconstruct(&dir.path().join("nope.json"), None, None, false).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read JSON file"));
    }

    #[test]
    fn test_neutrino_report() {
        let report = cmd_neutrino(
            FourMomentum::from_pt_eta_phi_m(40.0, 0.5, 0.0, 0.000511),
            FourMomentum::transverse(30.0, 10.0),
            0.000511,
            80.4,
            PzSelection::Default,
        );
        assert!(report.discriminant > 0.0);
        assert_eq!(report.candidates.len(), 2);
        assert!((report.candidates[0] + 62.008).abs() < 1e-3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["solution"]["kind"], "two_real");
    }
}
