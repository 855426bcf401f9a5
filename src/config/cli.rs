use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "fleet-inventory")]
#[command(about = "Daily equipment inventory for a vehicle fleet")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the store base URL (e.g. http://localhost:8000/api)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the fleet
    Vehicles,

    /// Show a vehicle's compartments and equipment
    Show { vehicle_id: i64 },

    /// Derived status of one vehicle, or of the whole fleet
    Status {
        vehicle_id: Option<i64>,

        /// Only consider reviews by this responsible
        #[arg(short, long)]
        responsible: Option<String>,
    },

    /// Record a review of one vehicle
    Review {
        vehicle_id: i64,

        /// Defaults to today's roster entry
        #[arg(short, long)]
        responsible: Option<String>,

        /// Equipment ids found present
        #[arg(long, value_delimiter = ',')]
        present: Vec<i64>,

        /// Mark every item present before applying --absent
        #[arg(long)]
        all_present: bool,

        /// Equipment ids found missing
        #[arg(long, value_delimiter = ',')]
        absent: Vec<i64>,

        /// Per-item note as ID=TEXT; repeatable
        #[arg(long, value_parser = parse_note)]
        note: Vec<(i64, String)>,

        #[arg(long)]
        general_note: Option<String>,
    },

    /// Whether the responsible has reviewed every vehicle on the given day
    FleetComplete {
        #[arg(short, long)]
        responsible: Option<String>,

        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },

    /// Roster entry for a day
    DefaultResponsible {
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
}

fn parse_note(raw: &str) -> Result<(i64, String), String> {
    let (id, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=TEXT, got '{}'", raw))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid equipment id '{}': {}", id, e))?;
    Ok((id, text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note() {
        assert_eq!(parse_note("12=cracked lens").unwrap(), (12, "cracked lens".to_string()));
        assert_eq!(parse_note("3=a=b").unwrap(), (3, "a=b".to_string()));
        assert!(parse_note("no-separator").is_err());
        assert!(parse_note("x=text").is_err());
    }

    #[test]
    fn test_review_args() {
        let cli = Cli::parse_from([
            "fleet-inventory",
            "review",
            "4",
            "--responsible",
            "Grupo 1",
            "--all-present",
            "--absent",
            "7,9",
            "--note",
            "7=missing",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Command::Review {
                vehicle_id,
                responsible,
                all_present,
                absent,
                note,
                ..
            } => {
                assert_eq!(vehicle_id, 4);
                assert_eq!(responsible.as_deref(), Some("Grupo 1"));
                assert!(all_present);
                assert_eq!(absent, vec![7, 9]);
                assert_eq!(note, vec![(7, "missing".to_string())]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fleet_complete_date() {
        let cli = Cli::parse_from(["fleet-inventory", "fleet-complete", "--date", "2026-03-02"]);
        match cli.command {
            Command::FleetComplete { date, .. } => {
                assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2026, 3, 2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
