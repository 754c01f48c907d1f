use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ds_access_tools::commands::{self, InputOptions};
use ds_access_tools::utils::logging::init_logging;

#[derive(Parser)]
#[command(name = "ds-access")]
#[command(about = "389 Directory Server access log analysis tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Completed sessions: source IP with bind and unbind timestamps
    SrcIpTable {
        #[command(flatten)]
        input: InputOptions,
    },

    /// Connections with no disconnect yet, bound or not
    OpenConnections {
        #[command(flatten)]
        input: InputOptions,
    },

    /// Sorted list of distinct client addresses
    UniqueClients {
        #[command(flatten)]
        input: InputOptions,
    },

    /// Searches whose result reported a partially unindexed filter
    UnindexedSearches {
        #[command(flatten)]
        input: InputOptions,
    },

    /// Print parsed events as JSON lines
    Parse {
        /// Path to access log file(s) - `-` reads stdin
        #[arg(required_unless_present = "line", conflicts_with = "line")]
        log_files: Vec<String>,

        /// Parse this single line instead of reading files
        #[arg(short, long)]
        line: Option<String>,

        /// Log dropped lines with the reason they could not be parsed
        #[arg(long)]
        debug: bool,
    },

    /// Export the reconstructed connections and operations
    Export {
        #[command(flatten)]
        input: InputOptions,

        /// Output format: json or csv
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    fn debug(&self) -> bool {
        match self {
            Self::SrcIpTable { input }
            | Self::OpenConnections { input }
            | Self::UniqueClients { input }
            | Self::UnindexedSearches { input }
            | Self::Export { input, .. } => input.debug,
            Self::Parse { debug, .. } => *debug,
            Self::GenerateCompletion { .. } => false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.debug());

    match cli.command {
        Commands::SrcIpTable { input } => commands::src_ip_table::run(&input),
        Commands::OpenConnections { input } => commands::open_connections::run(&input),
        Commands::UniqueClients { input } => commands::unique_clients::run(&input),
        Commands::UnindexedSearches { input } => commands::unindexed_searches::run(&input),
        Commands::Parse {
            log_files, line, ..
        } => commands::parse::run(&log_files, line.as_deref()),
        Commands::Export {
            input,
            format,
            output,
        } => commands::export::run(&input, &format, output.as_deref()),
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ds-access", &mut std::io::stdout());
            Ok(())
        }
    }
}
