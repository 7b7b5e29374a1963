//! Receipt destinations for the console.

use std::io::Write;
use std::path::{Path, PathBuf};

use carniceria_client::ReceiptSink;
use carniceria_core::ticket::Ticket;
use tracing::info;

/// Prints receipts on the console.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReceiptSink for StdoutSink {
    fn write_receipt(&mut self, _ticket: &Ticket, text: &str) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

/// Writes each receipt to `ticket-000042.txt` in a spool directory picked up
/// by the printer daemon.
#[derive(Debug)]
pub struct SpoolSink {
    dir: PathBuf,
}

impl SpoolSink {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, ticket: &Ticket) -> PathBuf {
        self.dir.join(format!("ticket-{:06}.txt", ticket.id))
    }
}

impl ReceiptSink for SpoolSink {
    fn write_receipt(&mut self, ticket: &Ticket, text: &str) -> std::io::Result<()> {
        let path = self.path_for(ticket);
        std::fs::write(&path, text)?;
        info!(?path, ticket_id = ticket.id, "Receipt spooled");
        Ok(())
    }
}
