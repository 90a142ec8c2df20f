//! Command handlers

use std::path::Path;

use chrono::Utc;
use fuelops_app::app::{Diversion, IssueRequest, JourneyRef, StationUpdate};
use fuelops_app::{init_tracing, Config, FuelService, StationService};
use fuelops_domain::service::CancellationRequest;
use fuelops_domain::JourneyMeta;
use fuelops_types::{Error, OutputFormat, Result};
use tracing::debug;

use crate::cli::{
    Cli, Commands, DriverAccountAction, JourneyAction, JourneyTarget, LpoAction, StationAction,
};
use crate::output::{
    output_allocation, output_cancellation, output_columns, output_driver_accounts, output_formula,
    output_history, output_issue, output_lpo, output_lpo_list, output_record, output_report,
    output_resolution, output_saved_stations, output_stations, output_statement,
};

/// Settings resolved from the config file and global flags
struct Context {
    format: OutputFormat,
    actor: String,
}

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }

    init_tracing(&config.log_level, cli.verbose);

    let ctx = Context {
        format: cli.format.unwrap_or(config.output_format),
        actor: cli
            .actor
            .clone()
            .unwrap_or_else(|| config.default_actor.clone()),
    };

    match cli.command {
        Commands::Journey { action } => cmd_journey(&ctx, &open_fuel(&config)?, action),
        Commands::Lpo { action } => cmd_lpo(&ctx, &open_fuel(&config)?, action),
        Commands::DriverAccount { action } => {
            cmd_driver_account(&ctx, &open_fuel(&config)?, action)
        }
        Commands::Station { action } => cmd_station(&ctx, &config.data_dir()?, action),
        Commands::Resolve { station, direction } => {
            let fuel = open_fuel(&config)?;
            let resolution = fuel.catalog().resolve_with_source(&station, direction);
            output_resolution(ctx.format, &station, direction, &resolution)
        }
        Commands::Formula { formula } => {
            output_formula(ctx.format, &StationService::check_formula(&formula))
        }
        Commands::Config {
            show,
            set,
            set_output,
            reset,
        } => cmd_config(show, &set, set_output, reset),
    }
}

/// Open the stores, building the checkpoint catalog from saved stations
fn open_fuel(config: &Config) -> Result<FuelService> {
    let data_dir = config.data_dir()?;
    debug!(data_dir = %data_dir.display(), "opening stores");
    let stations = StationService::open(&data_dir)?;
    FuelService::open(&data_dir, stations.catalog()?)
}

fn journey_ref(target: JourneyTarget) -> Result<JourneyRef> {
    match (target.id, target.order_ref, target.truck) {
        (Some(id), _, _) => Ok(JourneyRef::Id(id)),
        (_, Some(order_ref), _) => Ok(JourneyRef::OrderRef(order_ref)),
        (_, _, Some(truck)) => Ok(JourneyRef::Truck(truck)),
        _ => Err(Error::validation("one of --id, --do or --truck is required")),
    }
}

fn cmd_journey(ctx: &Context, fuel: &FuelService, action: JourneyAction) -> Result<()> {
    match action {
        JourneyAction::Open {
            truck,
            going_do,
            total_liters,
            extra_liters,
            date,
            origin,
            destination,
        } => {
            let mut meta = JourneyMeta::new(total_liters, extra_liters);
            meta.date = date;
            meta.origin = origin;
            meta.destination = destination;
            let record = fuel.open_journey(&truck, &going_do, meta)?;
            output_record(ctx.format, &record)
        }

        JourneyAction::Allocate {
            target,
            station,
            checkpoint,
            direction,
            liters,
        } => {
            let journey = journey_ref(target)?;
            let allocation = match (checkpoint, station) {
                (Some(checkpoint), _) => fuel.allocate_at(&journey, checkpoint, liters)?,
                (None, Some(station)) => fuel.allocate(&journey, &station, direction, liters)?,
                (None, None) => return Err(Error::validation("--station or --checkpoint is required")),
            };
            output_allocation(ctx.format, &allocation)
        }

        JourneyAction::Close { target, return_do } => {
            let record = fuel.close_journey(&journey_ref(target)?, &return_do)?;
            output_record(ctx.format, &record)
        }

        JourneyAction::TopUp { target, liters } => {
            let record = fuel.top_up(&journey_ref(target)?, liters)?;
            output_record(ctx.format, &record)
        }

        JourneyAction::Show { target, history } => {
            if history {
                let truck = target
                    .truck
                    .ok_or_else(|| Error::validation("--history needs --truck"))?;
                return output_history(ctx.format, &fuel.history(&truck)?);
            }
            let record = fuel.find_journey(&journey_ref(target)?)?;
            output_record(ctx.format, &record)
        }

        JourneyAction::Delete { id } => {
            let record = fuel.delete_journey(&id)?;
            output_record(ctx.format, &record)
        }

        JourneyAction::Restore { id } => {
            let record = fuel.restore_journey(&id)?;
            output_record(ctx.format, &record)
        }
    }
}

fn cmd_lpo(ctx: &Context, fuel: &FuelService, action: LpoAction) -> Result<()> {
    match action {
        LpoAction::Issue {
            lpo_no,
            station,
            direction,
            date,
            truck,
            order_ref,
            destination,
            liters,
            rate,
            cash,
            cash_lpo,
            reason,
            driver_account,
            payment_mode,
            driver_name,
            notes,
        } => {
            let diversion = if cash {
                Some(Diversion::Cash { cash_lpo, reason })
            } else if driver_account {
                Some(Diversion::DriverAccount {
                    payment_mode: payment_mode.unwrap_or_default(),
                    driver_name,
                    notes,
                })
            } else {
                None
            };
            let outcome = fuel.issue(IssueRequest {
                lpo_no,
                station,
                direction,
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                truck_no: truck,
                order_ref,
                destination,
                liters,
                rate,
                actor: ctx.actor.clone(),
                diversion,
            })?;
            let (_, rows) = fuel.lpo_rows(&outcome.lpo.lpo_no)?;
            output_issue(ctx.format, &outcome, &rows)
        }

        LpoAction::Fulfill { lpo_no, truck } => {
            let (_, allocation) = fuel.fulfill(&lpo_no, &truck)?;
            output_allocation(ctx.format, &allocation)
        }

        LpoAction::Cancel {
            lpo_no,
            truck,
            station,
            cash_lpo,
            reason,
        } => {
            let request = CancellationRequest {
                station,
                actor: ctx.actor.clone(),
                original_lpo: None,
                cash_lpo,
                reason,
            };
            let (lpo, info) = fuel.cancel(&lpo_no, &truck, request)?;
            output_cancellation(ctx.format, &lpo.lpo_no, &truck, &info)
        }

        LpoAction::Show { lpo_no: Some(lpo_no) } => {
            let (lpo, rows) = fuel.lpo_rows(&lpo_no)?;
            output_lpo(ctx.format, &lpo, &rows)
        }

        LpoAction::Show { lpo_no: None } => output_lpo_list(ctx.format, &fuel.lpos()?),

        LpoAction::Report { lpo_no } => output_report(ctx.format, &fuel.report(&lpo_no)?),

        LpoAction::Statement { lpo_nos } => {
            output_statement(ctx.format, &fuel.statement(&lpo_nos)?)
        }
    }
}

fn cmd_driver_account(ctx: &Context, fuel: &FuelService, action: DriverAccountAction) -> Result<()> {
    match action {
        DriverAccountAction::List { truck } => {
            output_driver_accounts(ctx.format, &fuel.driver_accounts(truck.as_deref())?)
        }
        DriverAccountAction::Settle { id, approver } => {
            let approver = approver.unwrap_or_else(|| ctx.actor.clone());
            let entry = fuel.settle_driver_account(&id, &approver)?;
            output_driver_accounts(ctx.format, std::slice::from_ref(&entry))
        }
        DriverAccountAction::Dispute { id, note } => {
            let entry = fuel.dispute_driver_account(&id, note.as_deref())?;
            output_driver_accounts(ctx.format, std::slice::from_ref(&entry))
        }
    }
}

fn cmd_station(ctx: &Context, data_dir: &Path, action: StationAction) -> Result<()> {
    if let StationAction::Columns { direction } = action {
        return output_columns(ctx.format, direction, &StationService::columns(direction));
    }

    let stations = StationService::open(data_dir)?;
    match action {
        StationAction::Set {
            name,
            direction,
            rate,
            liters,
            formula,
            field,
            active,
            inactive,
        } => {
            let update = StationUpdate {
                rate,
                liters,
                formula,
                custom_field: field,
                active: match (active, inactive) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let saved = stations.set(&name, direction, update)?;
            output_saved_stations(ctx.format, std::slice::from_ref(&saved))
        }
        StationAction::List => output_stations(ctx.format, &stations.list()?),
        StationAction::Import { path } => {
            let saved = stations.import_csv(&path)?;
            output_saved_stations(ctx.format, &saved)
        }
        StationAction::Columns { .. } => Ok(()),
    }
}

fn cmd_config(show: bool, set: &[String], set_output: Option<OutputFormat>, reset: bool) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    for pair in set {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::validation(format!("expected KEY=VALUE, got {pair}")))?;
        config.set(key, value)?;
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
