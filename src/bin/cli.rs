//! FlatFS CLI Client
//!
//! Command-line interface for interacting with a FlatFS server.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flatfs::network::Client;
use flatfs::protocol::{decode_name_list, Command, Response, Status};

/// FlatFS CLI
#[derive(Parser, Debug)]
#[command(name = "flatfs-cli")]
#[command(about = "CLI for the FlatFS blob store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an entry's content
    Read {
        /// The entry name
        name: String,
    },

    /// Create a new entry
    Create {
        /// The entry name
        name: String,

        /// The content (empty if omitted)
        #[arg(default_value = "")]
        content: String,
    },

    /// Overwrite an entry, creating it if absent
    Put {
        /// The entry name
        name: String,

        /// The new content
        content: String,
    },

    /// Delete an entry
    Del {
        /// The entry name
        name: String,
    },

    /// Check whether an entry exists
    Exists {
        /// The entry name
        name: String,
    },

    /// Copy a local file into the store under its file name
    Import {
        /// Path of the local file
        path: PathBuf,
    },

    /// List all entries
    List,

    /// Show available space
    Space,

    /// Reclaim space held by deleted entries
    Compact,

    /// Remove every entry
    Format,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let command = match to_command(args.command) {
        Ok(cmd) => cmd,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return ExitCode::FAILURE;
        }
    };

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot connect to {}: {}", args.server, e);
            return ExitCode::FAILURE;
        }
    };

    match client.send(&command) {
        Ok(response) => print_response(&command, &response),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn to_command(command: Commands) -> Result<Command, String> {
    Ok(match command {
        Commands::Read { name } => Command::Read { name },
        Commands::Create { name, content } => Command::Create {
            name,
            content: content.into_bytes(),
        },
        Commands::Put { name, content } => Command::Overwrite {
            name,
            content: content.into_bytes(),
        },
        Commands::Del { name } => Command::Delete { name },
        Commands::Exists { name } => Command::Exists { name },
        Commands::Import { path } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| format!("{} has no usable file name", path.display()))?
                .to_string();
            let content =
                std::fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
            Command::Create { name, content }
        }
        Commands::List => Command::List,
        Commands::Space => Command::Space,
        Commands::Compact => Command::Compact,
        Commands::Format => Command::Format,
        Commands::Ping => Command::Ping,
    })
}

fn print_response(command: &Command, response: &Response) -> ExitCode {
    match response.status {
        Status::Ok => {}
        Status::NotFound => {
            eprintln!("not found");
            return ExitCode::FAILURE;
        }
        _ => {
            eprintln!("error: {}", response.message().unwrap_or_default());
            return ExitCode::FAILURE;
        }
    }

    let payload = response.payload.as_deref().unwrap_or(&[]);
    match command {
        Command::Read { .. } => {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(payload);
            let _ = stdout.flush();
        }
        Command::Exists { .. } => println!("{}", payload.first() == Some(&1)),
        Command::List => match decode_name_list(payload) {
            Ok(names) => names.iter().for_each(|n| println!("{}", n)),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Command::Space => match <[u8; 4]>::try_from(payload) {
            Ok(bytes) => println!("{} bytes available", u32::from_be_bytes(bytes)),
            Err(_) => {
                eprintln!("error: malformed SPACE payload");
                return ExitCode::FAILURE;
            }
        },
        Command::Compact => match <[u8; 8]>::try_from(payload) {
            Ok(bytes) => println!("{} bytes reclaimed", u64::from_be_bytes(bytes)),
            Err(_) => {
                eprintln!("error: malformed COMPACT payload");
                return ExitCode::FAILURE;
            }
        },
        Command::Ping => println!("{}", String::from_utf8_lossy(payload)),
        _ => println!("OK"),
    }
    ExitCode::SUCCESS
}
