//! CLI definition using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fuelops_domain::{Checkpoint, LedgerField, PaymentMode};
use fuelops_types::{Direction, OutputFormat};

#[derive(Parser)]
#[command(name = "fuelops")]
#[command(version)]
#[command(about = "Fuel ledger and checkpoint allocation for long-haul trucks")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Data directory override
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Acting user recorded on changes. Uses config value if not specified.
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open, allocate, close and inspect truck journeys
    Journey {
        #[command(subcommand)]
        action: JourneyAction,
    },

    /// Issue, cancel and report on LPO documents
    Lpo {
        #[command(subcommand)]
        action: LpoAction,
    },

    /// Fuel charged to drivers instead of the route allocation
    DriverAccount {
        #[command(subcommand)]
        action: DriverAccountAction,
    },

    /// Station defaults and custom ledger columns
    Station {
        #[command(subcommand)]
        action: StationAction,
    },

    /// Show which checkpoint a station name resolves to
    Resolve {
        station: String,

        #[arg(long, short = 'd', value_enum, default_value_t = Direction::Going)]
        direction: Direction,
    },

    /// Check an allocation formula without evaluating it
    Formula { formula: String },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set a value, e.g. --set default_actor=fuel.clerk
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Selects one journey record
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct JourneyTarget {
    /// Ledger record id
    #[arg(long)]
    pub id: Option<String>,

    /// Going or return delivery order
    #[arg(long = "do", value_name = "ORDER")]
    pub order_ref: Option<String>,

    /// Truck number (its open journey)
    #[arg(long)]
    pub truck: Option<String>,
}

#[derive(Subcommand)]
pub enum JourneyAction {
    /// Open a journey on the truck's first going fuel event
    Open {
        truck: String,

        /// Going delivery order
        #[arg(long = "do", value_name = "ORDER")]
        going_do: String,

        #[arg(long)]
        total_liters: f64,

        #[arg(long, default_value_t = 0.0)]
        extra_liters: f64,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        origin: Option<String>,

        #[arg(long)]
        destination: Option<String>,
    },

    /// Record liters dispensed at a station or checkpoint
    Allocate {
        #[command(flatten)]
        target: JourneyTarget,

        /// Station name, resolved to a checkpoint
        #[arg(long, required_unless_present = "checkpoint", conflicts_with = "checkpoint")]
        station: Option<String>,

        /// Checkpoint code, e.g. ZAMBIA_RETURN
        #[arg(long, value_parser = parse_checkpoint)]
        checkpoint: Option<Checkpoint>,

        #[arg(long, short = 'd', value_enum, default_value_t = Direction::Going)]
        direction: Direction,

        #[arg(long)]
        liters: f64,
    },

    /// Attach the return order
    Close {
        #[command(flatten)]
        target: JourneyTarget,

        /// Return delivery order
        #[arg(long = "return-do", value_name = "ORDER")]
        return_do: String,
    },

    /// Grant extra liters
    TopUp {
        #[command(flatten)]
        target: JourneyTarget,

        #[arg(long)]
        liters: f64,
    },

    /// Show one journey, or a truck's history with --history
    Show {
        #[command(flatten)]
        target: JourneyTarget,

        /// List every journey of the truck
        #[arg(long, requires = "truck")]
        history: bool,
    },

    /// Soft-delete a journey record
    Delete { id: String },

    /// Restore a soft-deleted journey record
    Restore { id: String },
}

#[derive(Subcommand)]
pub enum LpoAction {
    /// Add a truck entry to an LPO, creating the LPO on first use
    Issue {
        lpo_no: String,

        #[arg(long)]
        station: String,

        #[arg(long, short = 'd', value_enum, default_value_t = Direction::Going)]
        direction: Direction,

        /// LPO date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        truck: String,

        /// Delivery order the fuel is issued against
        #[arg(long = "do", value_name = "ORDER")]
        order_ref: String,

        #[arg(long, default_value = "")]
        destination: String,

        #[arg(long)]
        liters: f64,

        #[arg(long)]
        rate: f64,

        /// Fuel was bought for cash instead
        #[arg(long, conflicts_with = "driver_account")]
        cash: bool,

        /// Replacement cash LPO number
        #[arg(long, requires = "cash")]
        cash_lpo: Option<String>,

        #[arg(long, requires = "cash")]
        reason: Option<String>,

        /// Charge the fuel to the driver's account
        #[arg(long)]
        driver_account: bool,

        #[arg(long, value_parser = parse_payment_mode, requires = "driver_account")]
        payment_mode: Option<PaymentMode>,

        #[arg(long, requires = "driver_account")]
        driver_name: Option<String>,

        #[arg(long, requires = "driver_account")]
        notes: Option<String>,
    },

    /// Post a truck's entry to its journey once the fuel is dispensed
    Fulfill {
        lpo_no: String,

        #[arg(long)]
        truck: String,
    },

    /// Cancel a truck's planned fulfillment on an LPO
    Cancel {
        lpo_no: String,

        #[arg(long)]
        truck: String,

        /// Where the fuel was actually taken
        #[arg(long, default_value = "CASH")]
        station: String,

        #[arg(long)]
        cash_lpo: Option<String>,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Show an LPO, or list all LPOs
    Show { lpo_no: Option<String> },

    /// Cancellation report for one LPO
    Report { lpo_no: String },

    /// Cancellation statement over several LPOs (all when none given)
    Statement { lpo_nos: Vec<String> },
}

#[derive(Subcommand)]
pub enum DriverAccountAction {
    List {
        #[arg(long)]
        truck: Option<String>,
    },

    Settle {
        id: String,

        /// Approver (defaults to the acting user)
        #[arg(long)]
        approver: Option<String>,
    },

    Dispute {
        id: String,

        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum StationAction {
    /// Create or update one direction of a station
    Set {
        name: String,

        #[arg(long, short = 'd', value_enum, default_value_t = Direction::Going)]
        direction: Direction,

        #[arg(long)]
        rate: Option<f64>,

        #[arg(long)]
        liters: Option<f64>,

        /// Allocation formula; pass "" to clear
        #[arg(long)]
        formula: Option<String>,

        /// Ledger column for a station outside the built-in table
        #[arg(long, value_parser = parse_field)]
        field: Option<LedgerField>,

        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        #[arg(long)]
        inactive: bool,
    },

    List,

    /// Import stations from CSV
    Import { path: PathBuf },

    /// Ledger columns available for a direction
    Columns {
        #[arg(long, short = 'd', value_enum, default_value_t = Direction::Going)]
        direction: Direction,
    },
}

fn parse_checkpoint(value: &str) -> Result<Checkpoint, String> {
    Checkpoint::parse(value).ok_or_else(|| {
        let codes: Vec<_> = Checkpoint::ALL.iter().map(|c| c.code()).collect();
        format!("unknown checkpoint {value}, expected one of {}", codes.join(", "))
    })
}

fn parse_field(value: &str) -> Result<LedgerField, String> {
    LedgerField::parse(value).ok_or_else(|| {
        let names: Vec<_> = LedgerField::ALL.iter().map(|f| f.name()).collect();
        format!("unknown ledger field {value}, expected one of {}", names.join(", "))
    })
}

fn parse_payment_mode(value: &str) -> Result<PaymentMode, String> {
    value.parse::<PaymentMode>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_allocate_by_order_ref() {
        let cli = Cli::try_parse_from([
            "fuelops", "journey", "allocate", "--do", "DO-1", "--station", "LAKE KAPIRI",
            "-d", "returning", "--liters", "120",
        ])
        .unwrap();
        match cli.command {
            Commands::Journey {
                action: JourneyAction::Allocate { target, station, direction, liters, .. },
            } => {
                assert_eq!(target.order_ref.as_deref(), Some("DO-1"));
                assert_eq!(station.as_deref(), Some("LAKE KAPIRI"));
                assert_eq!(direction, Direction::Returning);
                assert_eq!(liters, 120.0);
            }
            _ => panic!("expected journey allocate"),
        }
    }

    #[test]
    fn journey_target_is_exclusive() {
        let result = Cli::try_parse_from([
            "fuelops", "journey", "top-up", "--id", "x", "--truck", "T1", "--liters", "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cash_and_driver_account_conflict() {
        let result = Cli::try_parse_from([
            "fuelops", "lpo", "issue", "2356", "--station", "LAKE NDOLA", "--truck", "T1",
            "--do", "DO-1", "--liters", "100", "--rate", "1.4", "--cash", "--driver-account",
        ]);
        assert!(result.is_err());
    }
}
