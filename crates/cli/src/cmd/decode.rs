//! Decode command - turn a captured `data_list` field back into JSON
//!
//! # Usage
//!
//! ```bash
//! sensors decode H4sIAAAAAAAA...
//! ```

use anyhow::{Context, Result};
use clap::Args;
use sensors_client::consumer::codec::decode_data_list;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// base64(gzip(JSON array)) payload
    data_list: String,

    /// Print compact JSON, one event per line
    #[arg(long)]
    compact: bool,
}

pub fn run(args: DecodeArgs) -> Result<()> {
    let events = decode_data_list(args.data_list.trim()).context("failed to decode data_list")?;

    if args.compact {
        for event in &events {
            println!("{}", serde_json::to_string(event)?);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&events)?);
    }

    Ok(())
}
