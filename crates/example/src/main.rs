//! Example people CLI.
//!
//! Saves a person through the lifecycle callbacks, edits and reverts it,
//! and logs what the change tracker saw at each step.
//!
//! # Usage
//!
//! ```bash
//! people [name] [email]
//! ```
//!
//! `KEEL_LOG` sets the log filter (default `info`) and `KEEL_LOG_FORMAT`
//! selects `pretty`, `compact` or `json` output. Both are also read from `.env`.

use example::{Person, PersonStore};
use keel_callbacks::RunOutcome;
use keel_core::{TracingFormat, TracingSetup};
use keel_dirty::Tracked;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let format = std::env::var("KEEL_LOG_FORMAT")
        .ok()
        .and_then(|name| TracingFormat::parse(&name))
        .unwrap_or_default();
    TracingSetup::new()
        .with_format(format)
        .with_env_var("KEEL_LOG")
        .init()?;

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "John".to_owned());
    let email = args.next().unwrap_or_else(|| "John@Example.com".to_owned());

    let mut store = PersonStore::new()?;
    let mut person = Tracked::new(Person::new(name, email));

    // First save: suffixes, commit, then the after callback's uppercase write.
    match store.save(&mut person)? {
        RunOutcome::Completed(id) => tracing::info!(id, name = %person.name, "created"),
        RunOutcome::Halted { by } | RunOutcome::Skipped { by } => {
            tracing::warn!(by = %by, "save did not complete");
            return Ok(());
        }
    }
    tracing::info!(
        previous = %serde_json::to_string(person.previous_changes())?,
        pending = %serde_json::to_string(&person.changes())?,
        "after first save"
    );

    // Edit twice: the tracker keeps the value from before the first edit.
    person.set("email", "  Jane@Example.com ".to_owned())?;
    person.set("email", "Alice@Example.com".to_owned())?;
    tracing::info!(
        was = ?person.was("email"),
        change = ?person.change("email"),
        "edited email"
    );

    person.restore("email")?;
    tracing::info!(email = %person.email, changed = person.is_changed("email"), "restored email");

    person.set("email", "Alice@Example.com".to_owned())?;
    if let RunOutcome::Completed(id) = store.save(&mut person)? {
        tracing::info!(
            id,
            email = %person.email,
            previous = %serde_json::to_string(person.previous_changes())?,
            "updated"
        );
    }

    // Blank names never reach the store.
    let mut blank = Tracked::new(Person::new("  ", "nobody@example.com"));
    if let RunOutcome::Halted { by } = store.save(&mut blank)? {
        tracing::info!(by = %by, "blank person rejected");
    }

    tracing::info!(rows = store.records().len(), "done");
    Ok(())
}
