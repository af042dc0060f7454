//! Line-oriented chat loop used by the `ecochat` binary.
//!
//! Every input line is one utterance. Lines starting with `/` are commands:
//!
//! * `/summary` prints the session summary as JSON
//! * `/handoff name;email;phone` submits the conversation as a lead
//! * `/quit` ends the loop
//!
//! ```no_run
//! use ecochat::{ChatEngine, HandOff, HandoffConfig, InMemoryLeadStore, LogNotifier};
//! use std::sync::Arc;
//! use tokio::io::{BufReader, stdin, stdout};
//! # async fn example() -> anyhow::Result<()> {
//! let handoff = HandOff::new(
//!     Arc::new(InMemoryLeadStore::default()),
//!     Arc::new(LogNotifier),
//!     HandoffConfig::default(),
//! );
//! ecochat::repl::run(ChatEngine::new("retail"), &handoff, BufReader::new(stdin()), stdout()).await?;
//! # Ok(()) }
//! ```
use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::engine::ChatEngine;
use crate::handoff::{HandOff, LeadForm};

const HANDOFF_USAGE: &str = "Format: /handoff nama;email;telepon";

/// Drive `engine` from `input`, writing the welcome message and every reply
/// to `output`. Returns when input ends or `/quit` is read.
pub async fn run<Rg, R, W>(
    mut engine: ChatEngine<Rg>,
    handoff: &HandOff,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    Rg: Rng,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Some(welcome) = engine.session().messages().first() {
        write_block(&mut output, &welcome.content).await?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) => {
                debug!("quit requested");
                break;
            }
            ("/summary", _) => {
                let json = serde_json::to_string_pretty(&engine.summarize())?;
                write_block(&mut output, &json).await?;
            }
            ("/handoff", args) => match parse_lead(args) {
                Some(lead) => {
                    let receipt = handoff.submit(&engine.summarize(), &lead).await;
                    info!(record = ?receipt.record_id, notified = receipt.notified, "hand-off done");
                    let mut text = receipt.confirmation;
                    if let Some(link) = receipt.whatsapp_link {
                        text.push_str("\n\n📱 WhatsApp: ");
                        text.push_str(&link);
                    }
                    write_block(&mut output, &text).await?;
                }
                None => write_block(&mut output, HANDOFF_USAGE).await?,
            },
            _ => {
                let reply = engine.generate_response(line);
                write_block(&mut output, &reply.text).await?;
            }
        }
    }

    output.flush().await?;
    Ok(())
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> anyhow::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n\n").await?;
    Ok(())
}

/// `name;email;phone` with email and phone optional. The name is required.
fn parse_lead(args: &str) -> Option<LeadForm> {
    let mut parts = args.split(';').map(str::trim);
    let name = parts.next().filter(|n| !n.is_empty())?.to_string();
    let mut optional = || parts.next().filter(|p| !p.is_empty()).map(str::to_string);
    let email = optional();
    let phone = optional();
    Some(LeadForm {
        name,
        email,
        phone,
        ..LeadForm::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_lead() {
        let lead = parse_lead("Budi ; budi@example.com;0812").unwrap();
        assert_eq!(lead.name, "Budi");
        assert_eq!(lead.email.as_deref(), Some("budi@example.com"));
        assert_eq!(lead.phone.as_deref(), Some("0812"));
    }

    #[test]
    fn name_is_required() {
        assert!(parse_lead("").is_none());
        assert!(parse_lead(" ;a@b.c").is_none());
        let lead = parse_lead("Sari;;0812").unwrap();
        assert_eq!(lead.email, None);
        assert_eq!(lead.phone.as_deref(), Some("0812"));
    }
}
