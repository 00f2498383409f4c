use crate::chat::Reply;
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Emphasis,
    Code,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Emphasis => style(text).green().bold(),
        StyleType::Code => style(text).cyan(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Turns the `*bold*` and `` `code` `` markers of a reply into terminal styles.
///
/// An unpaired marker is printed as is.
pub fn render_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(['*', '`']) {
        let marker = &rest[start..start + 1];
        let after = &rest[start + 1..];
        let Some(len) = after.find(marker) else {
            break;
        };
        out.push_str(&rest[..start]);
        let inner = &after[..len];
        let kind = if marker == "*" {
            StyleType::Emphasis
        } else {
            StyleType::Code
        };
        out.push_str(&style_text(inner, kind));
        rest = &after[len + 1..];
    }
    out.push_str(rest);
    out
}

/// Renders a reply for the console: the text, then one line per button
/// with the `!id` to type for pressing it.
pub fn render_reply(reply: &Reply) -> String {
    let mut out = render_markdown(&reply.text);
    for row in &reply.keyboard {
        out.push('\n');
        let buttons: Vec<String> = row
            .iter()
            .map(|b| {
                format!(
                    "[{}] {}",
                    b.label,
                    style_text(&format!("!{}", b.action), StyleType::Subtle)
                )
            })
            .collect();
        out.push_str(&buttons.join("  "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ButtonAction;
    use crate::chat::keyboard;

    #[test]
    fn test_render_markdown_strips_markers() {
        console::set_colors_enabled(false);
        assert_eq!(render_markdown("• Курс к RUB: *80.0000*"), "• Курс к RUB: 80.0000");
        assert_eq!(render_markdown("`/courses USD` - курс"), "/courses USD - курс");
        assert_eq!(render_markdown("2 * 3"), "2 * 3");
    }

    #[test]
    fn test_render_reply_lists_buttons() {
        console::set_colors_enabled(false);
        let reply = Reply::text("Что дальше?").with_keyboard(keyboard::after_amount());
        let rendered = render_reply(&reply);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Что дальше?");
        assert_eq!(
            lines[1],
            format!("[➕ Добавить ещё] !{}", ButtonAction::ConvertAddMore)
        );
        assert_eq!(lines.len(), 3);
    }
}
