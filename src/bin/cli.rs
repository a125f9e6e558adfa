//! yamlstore CLI Client
//!
//! Command-line interface for talking to a running yamlstore server.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use clap::{Parser, Subcommand};
use yamlstore::protocol::{read_response, write_request, Request, Response, Status};
use yamlstore::{Result, StoreError};

/// yamlstore CLI
#[derive(Parser, Debug)]
#[command(name = "yamlstore-cli")]
#[command(about = "CLI for the yamlstore key/field store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get one field of one document
    Get {
        /// The document key
        key: String,

        /// The field to fetch
        field: String,
    },

    /// List all stored keys
    Keys,

    /// List one document's field names
    Fields {
        /// The document key
        key: String,
    },

    /// Write one field of one document
    Put {
        /// The document key
        key: String,

        /// The field to write
        field: String,

        /// The value, parsed as YAML (quote strings as needed)
        value: String,
    },
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(response) => {
            println!("{}", response.status);
            if let Some(body) = response.body {
                print!("{body}");
            }
            if response.status != Status::Ok {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Response> {
    let request = build_request(&args.command)?;

    let stream = TcpStream::connect(&args.server)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    write_request(&mut writer, &request)?;
    read_response(&mut reader)
}

fn build_request(command: &Commands) -> Result<Request> {
    match command {
        Commands::Get { key, field } => Ok(Request::get(key, field)),
        Commands::Keys => Ok(Request::keys()),
        Commands::Fields { key } => Ok(Request::fields(key)),
        Commands::Put { key, field, value } => {
            let value =
                serde_yaml::from_str(value).map_err(|e| StoreError::BodyYaml(e.to_string()))?;
            Request::put(key, field, value)
        }
    }
}
