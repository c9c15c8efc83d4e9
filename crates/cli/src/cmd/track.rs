//! Track and signup commands
//!
//! # Usage
//!
//! ```bash
//! sensors track user-42 ViewProduct --url https://sa.example.com/sa --properties '{"price": 9.99}'
//! sensors signup user-42 anon-7 --file events.log
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::{ConsumerArgs, finish, parse_properties, tracker};

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// User id
    distinct_id: String,

    /// Event name
    event: String,

    /// Event properties as a JSON object
    #[arg(short, long)]
    properties: Option<String>,

    #[command(flatten)]
    consumer: ConsumerArgs,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Registered user id
    distinct_id: String,

    /// Id used before signup
    original_id: String,

    /// Event properties as a JSON object
    #[arg(short, long)]
    properties: Option<String>,

    #[command(flatten)]
    consumer: ConsumerArgs,
}

pub fn run_track(args: TrackArgs, config: Option<&Path>) -> Result<()> {
    let properties = parse_properties(args.properties.as_deref())?;
    let mut tracker = tracker(&args.consumer, config)?;

    tracker.track(&args.distinct_id, &args.event, properties)?;
    finish(tracker, &format!("track {}", args.event))
}

pub fn run_signup(args: SignupArgs, config: Option<&Path>) -> Result<()> {
    let properties = parse_properties(args.properties.as_deref())?;
    let mut tracker = tracker(&args.consumer, config)?;

    tracker.track_signup(&args.distinct_id, &args.original_id, properties)?;
    finish(
        tracker,
        &format!("signup {} -> {}", args.original_id, args.distinct_id),
    )
}
