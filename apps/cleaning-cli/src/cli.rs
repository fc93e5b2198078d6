use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::model::{Role, CLEANING_TYPES, TERMINALS};

/// Cleaning Ops client - register cleanings, follow tasks and supervise crews
#[derive(Debug, Parser)]
#[command(name = "cleaning-cli")]
#[command(about = "Cleaning Ops client - register cleanings, follow tasks and supervise crews")]
#[command(version)]
pub struct Cli {
    /// Base URL of the API server
    #[arg(long, env = "CLEANING_API_URL", default_value = "http://localhost:4000", global = true)]
    pub api_url: String,

    /// Where the logged-in identity is cached
    #[arg(long, env = "CLEANING_IDENTITY_FILE", global = true)]
    pub identity_file: Option<PathBuf>,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or fetch a user by name and cache it as the current identity
    Login {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        role: Role,
    },
    /// Forget the cached identity
    SwitchUser,
    /// Show the cached identity
    Whoami,

    /// Cleaning records: your own as a cleaner, filtered as a supervisor
    Records(RecordFilters),
    /// Show one cleaning record with its photos (supervisor)
    Record { id: Uuid },
    /// Register a cleaning (cleaner)
    Register(RegisterArgs),

    /// Tasks: pending and done as a cleaner, filtered as a supervisor
    Tasks {
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        /// Only this cleaner's tasks (supervisor)
        #[arg(long)]
        cleaner: Option<Uuid>,
    },
    /// Mark one of your tasks as done (cleaner)
    Done { task_id: Uuid },
    /// Assign a task to a cleaner (supervisor)
    Assign {
        #[arg(long)]
        cleaner: Uuid,
        #[arg(long)]
        content: String,
        #[arg(long)]
        title: Option<String>,
    },

    /// Show your break (cleaner)
    Break,
    /// List every break assignment (supervisor)
    Breaks,
    /// Set or clear a user's break (supervisor)
    SetBreak {
        #[arg(long)]
        user: Uuid,
        /// Break time such as 13:30; omit to clear it
        #[arg(long)]
        time: Option<String>,
    },

    /// Inspect a cleaning record (supervisor)
    Inspect {
        record_id: Uuid,
        #[arg(long, value_enum)]
        result: Verdict,
        #[arg(long)]
        comments: Option<String>,
    },
    /// List inspections (supervisor)
    Inspections {
        #[arg(long)]
        cleaner: Option<Uuid>,
        #[arg(long, value_enum)]
        result: Option<Verdict>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// Counts for today, this week and this month (supervisor)
    Dashboard,
    /// Per-cleaner breakdown (supervisor)
    Report {
        cleaner_id: Uuid,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// List users (supervisor)
    Users {
        #[arg(long, value_enum)]
        role: Option<Role>,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct RecordFilters {
    /// Case-insensitive plate fragment
    #[arg(long)]
    pub ppu: Option<String>,
    #[arg(long, value_parser = TERMINALS)]
    pub terminal: Option<String>,
    #[arg(long = "type", value_parser = CLEANING_TYPES)]
    pub cleaning_type: Option<String>,
    /// Only this cleaner's records (supervisor)
    #[arg(long)]
    pub user: Option<Uuid>,
    /// Start date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub from: Option<String>,
    /// End date, inclusive (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub ppu: String,
    /// Defaults to the bus number last used with this plate
    #[arg(long)]
    pub bus_number: Option<String>,
    #[arg(long, value_parser = TERMINALS)]
    pub terminal: String,
    #[arg(long = "type", value_parser = CLEANING_TYPES)]
    pub cleaning_type: String,
    #[arg(long)]
    pub stickers: bool,
    #[arg(long)]
    pub graffiti: bool,
    /// Front photo
    #[arg(long)]
    pub front: Option<PathBuf>,
    /// Back photo
    #[arg(long)]
    pub back: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self == Verdict::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn register_accepts_only_known_terminals() {
        let ok = Cli::try_parse_from([
            "cleaning-cli", "register", "--ppu", "ABCD12", "--terminal", "LA REINA", "--type",
            "BARRIDO + TRAPEADO", "--stickers",
        ])
        .unwrap();
        let Command::Register(args) = ok.command else {
            panic!("expected register");
        };
        assert_eq!(args.cleaning_type, "BARRIDO + TRAPEADO");
        assert!(args.stickers && !args.graffiti);
        assert!(args.bus_number.is_none());

        assert!(Cli::try_parse_from([
            "cleaning-cli", "register", "--ppu", "X", "--terminal", "NOWHERE", "--type", "FULL",
        ])
        .is_err());
    }

    #[test]
    fn login_role_is_lower_case_on_the_command_line() {
        let cli = Cli::try_parse_from(["cleaning-cli", "login", "--name", "Ana", "--role", "supervisor"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Login { role: Role::Supervisor, .. }
        ));
    }
}
