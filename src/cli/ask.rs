use super::ui;
use crate::chat::{Bot, ConversationId, Inbound};
use anyhow::Result;

/// One-shot conversations from the command line share this id.
pub const CONSOLE_CONVERSATION: ConversationId = ConversationId(0);

/// Answers a single message and prints the reply.
pub async fn run(bot: &Bot, text: &str) -> Result<()> {
    let Some(inbound) = Inbound::from_line(text) else {
        anyhow::bail!("Nothing to ask: the message is empty");
    };
    let reply = bot.handle(CONSOLE_CONVERSATION, inbound).await;
    println!("{}", ui::render_reply(&reply));
    Ok(())
}
