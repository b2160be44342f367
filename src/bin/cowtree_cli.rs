//! Command line front end for a copy-on-write B+ tree database file.
//!
//! Usage:
//!   cowtree-cli <db_path> put <key> <value>
//!   cowtree-cli <db_path> get <key>
//!   cowtree-cli <db_path> scan [--start <key>] [--end <key>]
//!   cowtree-cli <db_path> stats
//!   cowtree-cli <db_path> bulk-insert <count>
//!   cowtree-cli <db_path> debug <key>
//!   cowtree-cli <db_path> check
//!   cowtree-cli <db_path> dump
//!
//! Set `RUST_LOG=debug` to see splits and page reclamation.

use clap::{Parser, Subcommand};
use cow_btree::{Config, Db, Result, TreeConfig, PAGE_SIZE};
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Copy-on-write B+ tree CLI
#[derive(Parser, Debug)]
#[command(name = "cowtree-cli")]
#[command(about = "Inspect and modify a copy-on-write B+ tree database")]
struct Args {
    /// Database file
    db_path: PathBuf,

    /// Page size in bytes (must match an existing file)
    #[arg(long, default_value_t = PAGE_SIZE)]
    page_size: usize,

    /// Node cache capacity in pages
    #[arg(long, default_value_t = 1000)]
    cache: usize,

    /// Sync the file after every page write
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert or update a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Get the value for a key
    Get {
        /// The key to get
        key: String,
    },

    /// Scan keys in [start, end)
    Scan {
        /// First key to include
        #[arg(long)]
        start: Option<String>,

        /// First key to exclude
        #[arg(long)]
        end: Option<String>,
    },

    /// Show database statistics
    Stats,

    /// Insert `count` generated records
    BulkInsert {
        /// Number of records
        count: usize,
    },

    /// Trace the lookup path of a key
    Debug {
        /// The key to look up
        key: String,
    },

    /// Verify the tree structure
    Check,

    /// Print the whole tree as JSON
    Dump,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("ERROR: {}", e);
        exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let tree_config = TreeConfig {
        page_size: args.page_size,
        ..TreeConfig::default()
    };
    let config = Config::new(&args.db_path)
        .cache_capacity(args.cache)
        .sync_on_write(args.sync)
        .tree_config(tree_config);
    let db = Db::open(config)?;

    match args.command {
        Commands::Put { key, value } => {
            db.put(key.as_bytes(), value.as_bytes())?;
            println!("OK");
        }

        Commands::Get { key } => match db.get(key.as_bytes())? {
            Some(value) => match String::from_utf8(value) {
                Ok(s) => println!("{}", s),
                Err(_) => println!("<binary data>"),
            },
            None => println!("NOT_FOUND"),
        },

        Commands::Scan { start, end } => {
            let results = db.range(
                start.as_deref().map(str::as_bytes),
                end.as_deref().map(str::as_bytes),
            )?;
            println!("COUNT: {}", results.len());
            for (key, value) in results {
                let key_str = String::from_utf8_lossy(&key);
                let value_str = String::from_utf8_lossy(&value);
                println!("{} -> {}", key_str, value_str);
            }
        }

        Commands::Stats => {
            let stats = db.stats()?;
            println!("page_count: {}", stats.page_count);
            println!("free_pages: {}", stats.free_pages);
            println!("root_page: {}", stats.root_page);
            println!("tree_height: {}", stats.tree_height);
            println!("cache_capacity: {}", stats.cache_capacity);
        }

        Commands::BulkInsert { count } => {
            let start = Instant::now();
            for i in 0..count {
                let key = format!("key_{:08}", i);
                let value = format!("value_{}", i);
                db.put(key.as_bytes(), value.as_bytes())?;
            }
            let elapsed = start.elapsed();
            db.flush()?;

            let ops_per_sec = count as f64 / elapsed.as_secs_f64();
            println!("INSERTED: {}", count);
            println!("TIME_MS: {}", elapsed.as_millis());
            println!("OPS_PER_SEC: {:.0}", ops_per_sec);
        }

        Commands::Debug { key } => {
            for line in db.debug_get(key.as_bytes())? {
                println!("{}", line);
            }
        }

        Commands::Check => {
            let shape = db.verify()?;
            println!("OK");
            println!("pages: {}", shape.pages);
            println!("entries: {}", shape.entries);
            println!("height: {}", shape.height);
        }

        Commands::Dump => {
            let tree = db.export_tree()?;
            let json = serde_json::to_string_pretty(&tree)
                .map_err(|e| cow_btree::StorageError::invalid_operation(e.to_string()))?;
            println!("{}", json);
        }
    }

    // Ensure data is persisted
    db.flush()
}
