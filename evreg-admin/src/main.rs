/*!
 * Administrative CLI for an evreg-api SQLite database.
 *
 * Runs the same bulk archive, restore and purge operations as the HTTP API,
 * directly against the database named by `DATABASE_URL`. Operations are
 * attributed in the audit log to a `$USER@localhost` admin account, which is
 * created on first use.
 *
 * For detailed usage information and available commands, run with --help.
 */

use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::archive_commands::{ArchiveAction, handle_archive_command_with_conn};
use admin_cli::utils::{establish_connection, get_or_create_admin_user};

#[derive(Parser)]
#[command(name = "evreg-admin")]
#[command(about = "Administrative CLI for event registration archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Archive {
        #[command(subcommand)]
        action: ArchiveAction,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut conn = establish_connection()?;

    match cli.command {
        Commands::Archive { action } => {
            let actor = get_or_create_admin_user(&mut conn)?;
            handle_archive_command_with_conn(&mut conn, &actor, action)?;
        }
    }

    Ok(())
}
