// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use warimaru_rs::{
    AMOUNT_LIMIT, EvenSplitSession, ItemizedSession, PaymentMode, PersonId, Transfer, share,
};

/// Warimaru - split shared expenses
///
/// Reads payments or dishes from a CSV file and writes the settlement to stdout.
#[derive(Parser, Debug)]
#[command(name = "warimaru")]
#[command(about = "Splits shared expenses and prints who pays whom", long_about = None)]
struct Args {
    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split the total evenly and print transfers
    ///
    /// Expected format: name,amount,description
    /// Example: warimaru even payments.csv --non-paying 2 > transfers.csv
    Even {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Participants who paid nothing and owe a full share
        #[arg(long, default_value_t = 0)]
        non_paying: usize,
    },
    /// Split each dish among its eaters and print what everyone owes
    ///
    /// Expected format: dish,price,eaters (eaters separated by ';')
    Itemized {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Print the share-link payload for an even split
    Encode {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(long, default_value_t = 0)]
        non_paying: usize,
    },
    /// Restore a share-link payload and print its result
    Decode {
        #[arg(value_name = "DATA")]
        data: String,

        /// Payload comes from the per-dish calculator
        #[arg(long)]
        itemized: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(path: &Path) -> BufReader<File> {
    match File::open(path) {
        Ok(f) => BufReader::new(f),
        Err(e) => {
            eprintln!("Error opening file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let stdout = std::io::stdout();
    let result = match args.command {
        Command::Even { input, non_paying } => read_even_split(open(&input), non_paying)
            .and_then(|session| write_transfers(&session.transfers(), stdout.lock())),
        Command::Itemized { input } => read_itemized(open(&input))
            .and_then(|session| write_owed(&session, stdout.lock())),
        Command::Encode { input, non_paying } => {
            read_even_split(open(&input), non_paying).and_then(|session| {
                let data = share::encode_even_split(&session)?;
                writeln!(stdout.lock(), "{data}")?;
                Ok(())
            })
        }
        Command::Decode { data, itemized } => {
            if itemized {
                share::decode_itemized(&data)
                    .map_err(CliError::from)
                    .and_then(|session| write_owed(&session, stdout.lock()))
            } else {
                share::decode_even_split(&data)
                    .map_err(CliError::from)
                    .and_then(|session| write_transfers(&session.transfers(), stdout.lock()))
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Failures surfaced by the command-line front end.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Share(#[from] warimaru_rs::ShareLinkError),
}

/// Raw CSV record of one payment.
///
/// Fields: `name, amount, description`
#[derive(Debug, Deserialize)]
struct PaymentRecord {
    name: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default)]
    description: Option<String>,
}

/// Raw CSV record of one dish.
///
/// Fields: `dish, price, eaters`
#[derive(Debug, Deserialize)]
struct DishRecord {
    dish: String,
    price: String,
    #[serde(default)]
    eaters: Option<String>,
}

/// Build an even-split session from a payments CSV.
///
/// Rows with the same name belong to one person; people appear in the order
/// their first row does. Rows without a usable amount, or with an amount
/// beyond [`AMOUNT_LIMIT`], are skipped.
///
/// # CSV Format
///
/// ```csv
/// name,amount,description
/// Aさん,3000,dinner
/// Bさん,1000,
/// Aさん,500,taxi
/// ```
fn read_even_split<R: Read>(reader: R, non_paying: usize) -> Result<EvenSplitSession, CliError> {
    let mut session = EvenSplitSession::empty();
    session.set_mode(PaymentMode::Itemized);
    session.set_non_paying_participants(non_paying);
    let mut ids: HashMap<String, PersonId> = HashMap::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<PaymentRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed row: {}", e);
                continue;
            }
        };
        let Some(amount) = record.amount else {
            warn!(name = %record.name, "Skipping payment without an amount");
            continue;
        };
        if amount.abs() > AMOUNT_LIMIT {
            warn!(name = %record.name, %amount, "Skipping payment above the amount limit");
            continue;
        }
        let id = ids
            .entry(record.name.clone())
            .or_insert_with(|| session.add_person_named(record.name.clone()))
            .clone();
        if let Err(e) = session.add_payment(&id, amount, record.description.unwrap_or_default()) {
            warn!("Skipping payment for {}: {}", record.name, e);
        }
    }

    Ok(session)
}

/// Build an itemized session from a dishes CSV.
///
/// Participants are created from eater names in first-seen order. A name
/// listed twice in one row counts once.
///
/// # CSV Format
///
/// ```csv
/// dish,price,eaters
/// ramen,1000,X;Y
/// beer,600,Y
/// ```
fn read_itemized<R: Read>(reader: R) -> Result<ItemizedSession, CliError> {
    let mut session = ItemizedSession::new();
    let mut ids: HashMap<String, PersonId> = HashMap::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<DishRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed row: {}", e);
                continue;
            }
        };
        let dish = session.add_dish(record.dish, record.price);
        let eaters = record.eaters.unwrap_or_default();
        let mut listed = HashSet::new();
        for name in eaters.split(';').map(str::trim).filter(|n| !n.is_empty()) {
            if !listed.insert(name) {
                warn!(dish = %dish, eater = name, "Ignoring repeated eater");
                continue;
            }
            let id = ids
                .entry(name.to_owned())
                .or_insert_with(|| session.add_participant(name))
                .clone();
            if let Err(e) = session.toggle_eater(&dish, &id) {
                warn!("Skipping eater {}: {}", name, e);
            }
        }
    }

    Ok(session)
}

/// Write transfers as `from,to,amount`.
fn write_transfers<W: Write>(transfers: &[Transfer], writer: W) -> Result<(), CliError> {
    let mut wtr = Writer::from_writer(writer);
    for transfer in transfers {
        wtr.serialize(transfer)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct OwedRow<'a> {
    name: &'a str,
    total_owed: Decimal,
    net_amount: Decimal,
}

fn whole_yen(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Write each participant's bill as `name,total_owed,net_amount`, rounded to
/// whole yen.
fn write_owed<W: Write>(session: &ItemizedSession, writer: W) -> Result<(), CliError> {
    let summary = session.summary();
    let mut wtr = Writer::from_writer(writer);
    for payment in &summary.participants {
        wtr.serialize(OwedRow {
            name: &payment.participant_name,
            total_owed: whole_yen(payment.total_owed),
            net_amount: whole_yen(payment.net_amount),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
