use anyhow::Context;
use chrono::Local;
use clap::Parser;
use fleet_inventory::config::{Cli, Command};
use fleet_inventory::core::fleet::FleetSummary;
use fleet_inventory::domain::model::{FinalMark, ReviewMark, StatusKind, Vehicle, VehicleStatus};
use fleet_inventory::utils::error::ErrorSeverity;
use fleet_inventory::utils::{logger, validation::Validate};
use fleet_inventory::{HttpStore, InventorySession, Outcome, TomlConfig};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => TomlConfig::default(),
    };
    config.apply_overrides(cli.base_url.clone(), cli.timeout_seconds);

    logger::init_logger(cli.verbose, config.log_level(), config.log_format());
    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &Cli, config: &TomlConfig) -> fleet_inventory::Result<()> {
    let store = Arc::new(HttpStore::new(config)?);
    let session = InventorySession::new(store);
    let today = Local::now().date_naive();

    match &cli.command {
        Command::Vehicles => {
            let fleet = session.catalog().load_all().await?;
            if cli.json {
                return json(&fleet);
            }
            for vehicle in &fleet {
                println!("{:>4}  {:<10} {}", vehicle.id, vehicle.code, vehicle.display_name());
            }
        }
        Command::Show { vehicle_id } => {
            let vehicle = session.catalog().load(*vehicle_id).await?;
            if cli.json {
                return json(&vehicle);
            }
            print_vehicle(&vehicle);
        }
        Command::Status {
            vehicle_id,
            responsible,
        } => {
            let statuses = match vehicle_id {
                Some(id) => vec![
                    session
                        .vehicle_status(*id, responsible.as_deref(), today)
                        .await?,
                ],
                None => session.fleet_status(responsible.as_deref(), today).await?,
            };
            if cli.json {
                return json(&statuses);
            }
            for status in &statuses {
                print_status(status);
            }
        }
        Command::Review {
            vehicle_id,
            responsible,
            present,
            all_present,
            absent,
            note,
            general_note,
        } => {
            let responsible = responsible
                .clone()
                .unwrap_or_else(|| config.roster.default_responsible(today).to_string());

            if session.begin_review(*vehicle_id).await?.is_superseded() {
                return Ok(());
            }
            if *all_present {
                session.mark_all(ReviewMark::Present).await?;
            }
            for id in present {
                session.set_mark(*id, ReviewMark::Present).await?;
            }
            for id in absent {
                session.set_mark(*id, ReviewMark::Absent).await?;
            }
            for (id, text) in note {
                session.set_note(*id, text.clone()).await?;
            }
            if let Some(text) = general_note {
                session.set_general_note(text.clone()).await?;
            }

            match session.submit(&responsible, Local::now().fixed_offset()).await? {
                Outcome::Applied(record) => {
                    if cli.json {
                        return json(&record);
                    }
                    let absent = record
                        .entries
                        .iter()
                        .filter(|e| e.mark == FinalMark::Absent)
                        .count();
                    println!(
                        "✅ Review saved for vehicle {} by '{}' ({} item(s), {} absent)",
                        record.vehicle_id,
                        record.responsible,
                        record.entries.len(),
                        absent
                    );
                }
                Outcome::Superseded => {}
            }
        }
        Command::FleetComplete { responsible, date } => {
            let day = date.unwrap_or(today);
            let responsible = responsible
                .clone()
                .unwrap_or_else(|| config.roster.default_responsible(day).to_string());
            let summary = session.fleet_summary(&responsible, day).await?;
            if cli.json {
                return json(&summary);
            }
            print_summary(&summary);
        }
        Command::DefaultResponsible { date } => {
            let day = date.unwrap_or(today);
            let responsible = config.roster.default_responsible(day);
            if cli.json {
                return json(&serde_json::json!({ "date": day, "responsible": responsible }));
            }
            println!("{}", responsible);
        }
    }

    Ok(())
}

fn json<T: Serialize>(data: &T) -> fleet_inventory::Result<()> {
    println!("{}", serde_json::to_string_pretty(&JsonOut { ok: true, data })?);
    Ok(())
}

fn print_vehicle(vehicle: &Vehicle) {
    println!("{} - {}", vehicle.code, vehicle.display_name());
    for compartment in vehicle.compartments.iter().filter(|c| c.active) {
        println!("  [{}] {}", compartment.id, compartment.name);
        for item in compartment.equipment.iter().filter(|e| e.active) {
            println!("    {:>5}  {} x{}", item.id, item.name, item.expected_quantity);
        }
    }
}

fn print_status(status: &VehicleStatus) {
    let icon = match status.kind {
        StatusKind::Pending => "⏳",
        StatusKind::Complete => "✅",
        StatusKind::Critical => "⚠️",
    };
    print!(
        "{} {:<10} {:<9} present {}/{} absent {}",
        icon,
        status.code,
        status.kind.label(),
        status.counters.present,
        status.counters.expected,
        status.counters.absent
    );
    match (&status.reviewed_at, &status.responsible) {
        (Some(at), Some(who)) => println!("  last {} by {}", at.format("%Y-%m-%d %H:%M"), who),
        _ => println!(),
    }
}

fn print_summary(summary: &FleetSummary) {
    let date = summary.date;
    if summary.fleet_complete {
        println!(
            "✅ Inventory for {} completed by '{}' ({} vehicle(s), {} critical)",
            date, summary.responsible, summary.vehicles, summary.critical
        );
    } else {
        println!(
            "⏳ Inventory for {} by '{}' not complete: {}/{} vehicle(s) outstanding",
            date,
            summary.responsible,
            summary.outstanding.len(),
            summary.vehicles
        );
        for code in &summary.outstanding {
            println!("   - {}", code);
        }
    }
}
