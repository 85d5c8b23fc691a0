use std::error::Error;

use clap::Parser;
use rusqlite::Connection;

use spendon::{create_category, get_categories, initialize_db};

/// A utility for adding spending categories, which are shared by all users.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The names of the categories to add.
    #[arg(required = true)]
    names: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    for name in &args.names {
        create_category(name.trim(), &conn)?;
    }

    for category in get_categories(&conn)? {
        println!("{}\t{}", category.id, category.name);
    }

    Ok(())
}
