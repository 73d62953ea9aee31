//! Ctrl+C handling for the interactive session.
//!
//! The handler runs on its own thread and keeps only a [`Weak`] reference to
//! the scanner. When the interrupt arrives it waits for the book currently
//! being processed (if any), flushes, and exits the process with status 0.

use std::sync::{Mutex, Weak};
use std::thread;

use anyhow::{Context, Result};

use crate::scanner::{Scanner, lock};

/// Spawns the interrupt listener for `scanner`.
///
/// # Errors
///
/// Returns an error if the signal runtime or the listener thread cannot be
/// created.
pub fn install_interrupt_handler(scanner: Weak<Mutex<Scanner>>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create signal runtime")?;

    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            if let Err(e) = runtime.block_on(tokio::signal::ctrl_c()) {
                tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("received Ctrl+C, saving");
            std::process::exit(flush_on_interrupt(&scanner));
        })
        .context("Failed to spawn interrupt handler")?;

    Ok(())
}

/// Flushes the scanner if it is still alive and returns the exit status.
fn flush_on_interrupt(scanner: &Weak<Mutex<Scanner>>) -> i32 {
    let Some(scanner) = scanner.upgrade() else {
        return 0;
    };

    match lock(&scanner).flush() {
        Ok(()) => {
            println!("\nCollection and genres saved!");
            0
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    }
}
