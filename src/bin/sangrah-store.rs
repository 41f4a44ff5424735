use std::error::Error;
use std::fs;
use std::path::PathBuf;

use dotenv::dotenv;
use log::{debug, info, initialize_logger};
use structopt::StructOpt;

use sangrah::config::{Settings, StorageMode};
use sangrah::store::{self, LocalStore};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sangrah-store",
    about = "Inspect, export or clear the submissions kept in file storage"
)]
struct Opt {
    /// The storage directory; defaults to SANGRAH_STORAGE_DIR
    #[structopt(long, parse(from_os_str))]
    dir: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Print every submission as one JSON line, newest first
    List,
    /// Write a pretty-printed snapshot of every submission
    Export {
        #[structopt(parse(from_os_str), default_value = "submissions.json")]
        output: PathBuf,
    },
    /// Discard every submission
    Clear,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let directory = match opt.dir {
        Some(dir) => dir,
        None => Settings::from_env()?.storage_dir,
    };

    debug!(logger, "Opening storage..."; "directory" => %directory.display());
    let store = LocalStore::open(logger.clone(), StorageMode::File, &directory)?;

    match opt.command {
        Command::List => {
            for submission in store.read_all() {
                println!("{}", serde_json::to_string(&submission)?);
            }
        }
        Command::Export { output } => {
            let submissions = store.read_all();
            fs::write(&output, store::export_json(&submissions)?)?;

            info!(logger, "Exported {} submissions", submissions.len(); "output" => %output.display());
        }
        Command::Clear => {
            store.clear()?;

            info!(logger, "Cleared submissions"; "directory" => %directory.display());
        }
    }

    Ok(())
}
