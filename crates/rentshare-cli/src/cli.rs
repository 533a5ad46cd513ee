use clap::{Args, Parser, Subcommand};

use rentshare_core::VERSION;

use crate::ui::OutputFormat;

/// Rentshare - ownership versioning and fee allocation for shared rental properties
#[derive(Parser)]
#[command(name = "rentshare")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the rentshare database
    #[arg(long, global = true, env = "RENTSHARE_DB", value_name = "PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format
    #[arg(long, global = true, value_enum, conflicts_with = "json")]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and a default config file
    Init(InitArgs),

    /// Manage properties
    Property {
        #[command(subcommand)]
        command: PropertyCommand,
    },

    /// Manage owners
    Owner {
        #[command(subcommand)]
        command: OwnerCommand,
    },

    /// Manage monthly rent records
    Rent {
        #[command(subcommand)]
        command: RentCommand,
    },

    /// Manage versioned ownership percentages
    Share {
        #[command(subcommand)]
        command: ShareCommand,
    },

    /// Recompute fee share and net amount for every rent record
    Recalculate(RecalculateArgs),

    /// Aggregated reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Check database integrity
    Check,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the database will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum PropertyCommand {
    /// Register a property
    Add {
        /// Unique property name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List properties
    List {
        /// Include inactive properties
        #[arg(long)]
        all: bool,
    },

    /// Mark a property inactive
    Deactivate {
        /// Property name or ID
        #[arg(value_name = "PROPERTY")]
        property: String,
    },
}

#[derive(Subcommand)]
pub enum OwnerCommand {
    /// Register an owner
    Add {
        /// First name
        #[arg(value_name = "FIRST_NAME")]
        first_name: String,

        /// Last name
        #[arg(long)]
        last: Option<String>,
    },

    /// List owners
    List,
}

#[derive(Subcommand)]
pub enum RentCommand {
    /// Add a rent record for one owner, property and month
    Add(RentAddArgs),

    /// List rent records
    List(RentListArgs),

    /// Edit the raw fields of a rent record
    Edit(RentEditArgs),

    /// Delete a rent record
    Delete {
        /// Rent record ID
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Arguments for `rent add`
#[derive(Args)]
pub struct RentAddArgs {
    /// Property name or ID
    #[arg(value_name = "PROPERTY")]
    pub property: String,

    /// Owner name or ID
    #[arg(value_name = "OWNER")]
    pub owner: String,

    /// Period (YYYY-MM)
    #[arg(value_name = "PERIOD")]
    pub period: String,

    /// Gross amount
    #[arg(long, allow_hyphen_values = true)]
    pub gross: Option<String>,

    /// Total administration fee of the property for the month
    #[arg(long, allow_hyphen_values = true)]
    pub fee: Option<String>,

    /// Net amount (used when no gross amount is given)
    #[arg(long, allow_hyphen_values = true)]
    pub net: Option<String>,

    /// Free-form note
    #[arg(long)]
    pub note: Option<String>,
}

/// Arguments for `rent list`
#[derive(Args)]
pub struct RentListArgs {
    /// Filter by year
    #[arg(long)]
    pub year: Option<i32>,

    /// Filter by month (1-12)
    #[arg(long)]
    pub month: Option<u32>,

    /// Filter by property name or ID
    #[arg(long)]
    pub property: Option<String>,

    /// Filter by owner name or ID
    #[arg(long)]
    pub owner: Option<String>,

    /// Oldest periods first
    #[arg(long)]
    pub asc: bool,

    /// Skip this many records
    #[arg(long)]
    pub offset: Option<usize>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `rent edit`
#[derive(Args)]
pub struct RentEditArgs {
    /// Rent record ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New gross amount
    #[arg(long, allow_hyphen_values = true, conflicts_with = "clear_gross")]
    pub gross: Option<String>,

    /// Remove the gross amount
    #[arg(long)]
    pub clear_gross: bool,

    /// New total administration fee
    #[arg(long, allow_hyphen_values = true)]
    pub fee: Option<String>,

    /// New note
    #[arg(long, conflicts_with = "clear_note")]
    pub note: Option<String>,

    /// Remove the note
    #[arg(long)]
    pub clear_note: bool,
}

#[derive(Subcommand)]
pub enum ShareCommand {
    /// Set one owner's percentage in a new version, carrying the rest forward
    Set(ShareSetArgs),

    /// Show the latest version, or the versions created on a date
    Show {
        /// Calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// List the dates on which versions were created
    Versions,

    /// Replace the whole table from a JSON file of entries
    Replace {
        /// JSON file with [{"property", "owner", "percentage", "note"?}, ...]
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Delete one snapshot row
    Delete {
        /// Snapshot ID
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Report properties whose latest percentages do not sum to 100
    Unbalanced,
}

/// Arguments for `share set`
#[derive(Args)]
pub struct ShareSetArgs {
    /// Property name or ID
    #[arg(value_name = "PROPERTY")]
    pub property: String,

    /// Owner name or ID
    #[arg(value_name = "OWNER")]
    pub owner: String,

    /// Percentage (e.g. 25, 33.333333, 12,5%)
    #[arg(value_name = "PERCENTAGE", allow_hyphen_values = true)]
    pub percentage: String,

    /// Note stored on the snapshot
    #[arg(long)]
    pub note: Option<String>,
}

/// Arguments for the `recalculate` command
#[derive(Args)]
pub struct RecalculateArgs {
    /// Ownership version binding (latest, period-end)
    #[arg(long, value_name = "BINDING")]
    pub binding: Option<String>,
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Years with rent records
    Years,

    /// Most recent period with rent records
    Latest,

    /// Net totals of the most recent months
    Monthly {
        /// Number of months
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Net totals per property for one period
    ByProperty {
        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,
    },

    /// Owner x property matrix of net amounts
    Matrix(MatrixArgs),

    /// Net totals per owner and month
    Owners(OwnersReportArgs),

    /// Rent statistics of one property
    Property {
        /// Property name or ID
        #[arg(value_name = "PROPERTY")]
        property: String,
    },
}

/// Arguments for `report matrix`
#[derive(Args)]
pub struct MatrixArgs {
    /// Aggregation mode (single-period, full-year, all-time)
    #[arg(long)]
    pub mode: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub month: Option<u32>,

    /// Restrict to one owner (name or ID)
    #[arg(long)]
    pub owner: Option<String>,
}

/// Arguments for `report owners`
#[derive(Args)]
pub struct OwnersReportArgs {
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub month: Option<u32>,

    /// Restrict to one owner (name or ID)
    #[arg(long)]
    pub owner: Option<String>,

    /// Owner name contains (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_amounts_parse() {
        let cli = Cli::try_parse_from([
            "rentshare", "rent", "add", "Loja", "Ana", "2025-03", "--fee", "-10",
        ])
        .unwrap();
        match cli.command {
            Commands::Rent {
                command: RentCommand::Add(args),
            } => assert_eq!(args.fee.as_deref(), Some("-10")),
            _ => panic!("expected rent add"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rentshare", "report", "years", "--json", "--db", "x.db"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.db.as_deref(), Some("x.db"));
    }

    #[test]
    fn test_format_values() {
        let cli = Cli::try_parse_from(["rentshare", "check", "--format", "plain"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Plain));

        assert!(Cli::try_parse_from(["rentshare", "check", "--format", "csv"]).is_err());
        assert!(
            Cli::try_parse_from(["rentshare", "check", "--format", "table", "--json"]).is_err()
        );
    }
}
