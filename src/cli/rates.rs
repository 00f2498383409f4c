use super::ask::CONSOLE_CONVERSATION;
use super::ui;
use crate::chat::{Bot, ButtonAction, Inbound};
use anyhow::Result;

/// Prints rates for `codes`, or for the main currencies when none are given.
pub async fn run(bot: &Bot, codes: &[String]) -> Result<()> {
    let inbound = if codes.is_empty() {
        Inbound::Button(ButtonAction::MainCourses.to_string())
    } else {
        Inbound::Command {
            name: "courses".to_string(),
            args: codes.to_vec(),
        }
    };
    let mut reply = bot.handle(CONSOLE_CONVERSATION, inbound).await;
    // Navigation buttons mean nothing outside a chat
    reply.keyboard.clear();
    println!("{}", ui::render_reply(&reply));
    Ok(())
}
