use super::ui::{self, StyleType};
use crate::chat::{Bot, ConversationId, Inbound};
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const CHAT_CONVERSATION: ConversationId = ConversationId(1);

/// Interactive conversation over stdin/stdout.
pub async fn run(bot: &Bot) -> Result<()> {
    println!(
        "{}",
        ui::style_text(
            "Type a message, /command or !button_id. 'quit' exits.",
            StyleType::Subtle
        )
    );
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_with(bot, stdin, &mut stdout).await
}

/// Feeds every line of `input` to the bot until EOF or `quit`.
pub async fn run_with<R, W>(bot: &Bot, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let start = Inbound::Command {
        name: "start".to_string(),
        args: Vec::new(),
    };
    let greeting = bot.handle(CHAT_CONVERSATION, start).await;
    writeln!(out, "{}\n", ui::render_reply(&greeting)).context("Failed to write reply")?;

    loop {
        write!(out, "{} ", ui::style_text(">", StyleType::Title))?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }
        let Some(inbound) = Inbound::from_line(trimmed) else {
            continue;
        };
        debug!(?inbound, "Console input");
        let reply = bot.handle(CHAT_CONVERSATION, inbound).await;
        writeln!(out, "{}\n", ui::render_reply(&reply)).context("Failed to write reply")?;
    }

    writeln!(out)?;
    Ok(())
}
