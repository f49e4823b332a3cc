//! Terminal stand-in for a popup browsing context.
//!
//! The user opens the printed URL in any browser and pastes the address the
//! browser lands on after consenting. An empty line or EOF closes the popup.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::auth::popup::{PopupOpener, PopupProbe, PopupSize, PopupWindow};

#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPopupOpener;

impl PopupOpener for TerminalPopupOpener {
    fn open(&self, url: &str, _size: PopupSize) -> Option<Box<dyn PopupWindow>> {
        println!("🔗 Open this URL in your browser:\n   {url}");
        println!("📋 After consenting, paste the full address you were redirected to");
        println!("   (empty line cancels):");
        Some(Box::new(TerminalPopup {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            closed: false,
        }))
    }
}

pub struct TerminalPopup {
    lines: Lines<BufReader<Stdin>>,
    closed: bool,
}

#[async_trait]
impl PopupWindow for TerminalPopup {
    async fn probe(&mut self) -> PopupProbe {
        if self.closed {
            return PopupProbe::Closed;
        }
        let line = match self.lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => return PopupProbe::Closed,
        };
        let line = line.trim();
        if line.is_empty() {
            return PopupProbe::Closed;
        }
        if !line.contains('#') {
            println!("⚠️  That address has no #fragment; paste the redirected address");
            return PopupProbe::CrossOrigin;
        }
        PopupProbe::Redirected(line.to_string())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
