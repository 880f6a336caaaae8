//! Tabula Shell
//!
//! Interactive prompt over a Tabula data directory.

use std::io::{self, BufRead, Write};

use clap::Parser;
use tabula::{Config, Database, QueryResult, ResultSet, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// Tabula Shell
#[derive(Parser, Debug)]
#[command(name = "tabula-shell")]
#[command(about = "Interactive shell for the Tabula relational engine")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./tabula_data")]
    data_dir: String,

    /// Column name to index eagerly in every table (repeatable)
    #[arg(short, long = "index")]
    index: Vec<String>,

    /// Write documents without indentation
    #[arg(long)]
    compact: bool,

    /// Do not build indexes on demand for equality lookups
    #[arg(long)]
    no_lazy_index: bool,

    /// Run these statements and exit instead of starting the prompt
    #[arg(short, long)]
    execute: Vec<String>,
}

fn main() {
    // Logs go to stderr so they never mix with query output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tabula=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .indexed_columns(args.index.iter().cloned())
        .pretty_documents(!args.compact)
        .lazy_indexing(!args.no_lazy_index)
        .build();

    let mut db = match Database::open(config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    if !args.execute.is_empty() {
        let mut failed = false;
        for sql in &args.execute {
            failed |= !run_statement(&mut db, sql);
        }
        std::process::exit(if failed { 1 } else { 0 });
    }

    println!("Tabula v{} ({})", tabula::VERSION, args.data_dir);
    println!("Type .help for commands, exit or quit to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("tabula> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
            None => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line.starts_with('.') {
            if !run_command(&mut db, line) {
                break;
            }
        } else {
            run_statement(&mut db, line);
        }
    }
}

/// Execute one statement and print its outcome. Returns false on error.
fn run_statement(db: &mut Database, sql: &str) -> bool {
    match db.execute(sql) {
        Ok(QueryResult::Rows(rows)) => {
            print_rows(&rows);
            true
        }
        Ok(QueryResult::Affected(n)) => {
            println!("OK, {} row(s) affected", n);
            true
        }
        Ok(QueryResult::Empty) => {
            println!("OK");
            true
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

/// Handle a dot command. Returns false when the shell should exit.
fn run_command(db: &mut Database, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(".quit" | ".exit"), _) => return false,
        (Some(".help"), _) => {
            println!(".tables           list tables");
            println!(".schema <table>   show a table's columns");
            println!(".quit             exit");
        }
        (Some(".tables"), _) => match db.table_names() {
            Ok(names) => names.iter().for_each(|n| println!("{}", n)),
            Err(e) => eprintln!("Error: {}", e),
        },
        (Some(".schema"), Some(name)) => match db.table(name) {
            Ok(table) => {
                for column in table.columns() {
                    let indexed = if table.has_index(&column.name) { " (indexed)" } else { "" };
                    println!("{} {} {:?}{}", column.name, column.data_type, column.constraint, indexed);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        _ => eprintln!("Unknown command: {} (try .help)", line),
    }
    true
}

fn print_rows(rows: &ResultSet) {
    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(render).collect())
        .collect();

    let widths: Vec<usize> = rows
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = rows
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<w$}", name, w = *w))
        .collect();
    println!("{}", header.join(" | "));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        println!("{}", line.join(" | "));
    }
    println!("({} row(s))", rows.len());
}

fn render(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => other.to_string(),
    }
}
