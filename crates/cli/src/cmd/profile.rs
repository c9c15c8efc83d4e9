//! Profile command - set, increment, append, unset or delete user profiles
//!
//! # Usage
//!
//! ```bash
//! sensors profile set user-42 --properties '{"name": "Ada"}' --url https://sa.example.com/sa
//! sensors profile unset user-42 --keys age,city --file events.log
//! sensors profile delete user-42 --config sensors.toml
//! ```

use std::path::Path;

use anyhow::{Result, bail};
use clap::{Args, ValueEnum};

use super::{ConsumerArgs, finish, parse_properties, tracker};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileOp {
    Set,
    SetOnce,
    Increment,
    Append,
    Unset,
    Delete,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Operation to apply
    #[arg(value_enum)]
    op: ProfileOp,

    /// User id
    distinct_id: String,

    /// Profile properties as a JSON object
    #[arg(short, long)]
    properties: Option<String>,

    /// Property names to remove (unset only)
    #[arg(short, long, value_delimiter = ',')]
    keys: Vec<String>,

    #[command(flatten)]
    consumer: ConsumerArgs,
}

pub fn run(args: ProfileArgs, config: Option<&Path>) -> Result<()> {
    check_flags(args.op, !args.keys.is_empty(), args.properties.is_some())?;

    let properties = parse_properties(args.properties.as_deref())?;
    let mut tracker = tracker(&args.consumer, config)?;
    let id = args.distinct_id.as_str();

    match args.op {
        ProfileOp::Set => tracker.profile_set(id, properties)?,
        ProfileOp::SetOnce => tracker.profile_set_once(id, properties)?,
        ProfileOp::Increment => tracker.profile_increment(id, properties)?,
        ProfileOp::Append => tracker.profile_append(id, properties)?,
        ProfileOp::Unset if !args.keys.is_empty() => {
            tracker.profile_unset_keys(id, args.keys.iter().map(String::as_str))?
        }
        ProfileOp::Unset => tracker.profile_unset(id, properties)?,
        ProfileOp::Delete => tracker.profile_delete(id)?,
    };

    finish(tracker, &format!("profile {:?} {}", args.op, args.distinct_id))
}

/// Reject flag combinations that would silently drop input
fn check_flags(op: ProfileOp, has_keys: bool, has_properties: bool) -> Result<()> {
    if has_keys && op != ProfileOp::Unset {
        bail!("--keys is only valid with 'unset'");
    }
    if has_keys && has_properties {
        bail!("'unset' takes either --keys or --properties, not both");
    }
    Ok(())
}
