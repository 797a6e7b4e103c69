use convo_engine::{ChatMessage, Role};

/// Terminal rendering of one transcript entry.
pub fn render_message(message: &ChatMessage) -> String {
    let label = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::System => "system",
    };
    format!("{label}> {}", message.content)
}

/// Messages appended since `printed`, skipping the user's own prompts.
pub fn unseen_replies(messages: &[ChatMessage], printed: usize) -> Vec<String> {
    messages
        .iter()
        .skip(printed)
        .filter(|message| message.role != Role::User)
        .map(render_message)
        .collect()
}

#[cfg(test)]
mod tests {
    use convo_engine::ChatMessage;
    use time::macros::datetime;

    use super::{render_message, unseen_replies};

    #[test]
    fn replies_after_cursor_are_rendered_with_role_label() {
        let messages = vec![
            ChatMessage::user("Hello"),
            ChatMessage::assistant("m2", "Hi!\nHow can I help?", datetime!(2026-02-14 00:00 UTC)),
            ChatMessage::user("Thanks"),
            ChatMessage::assistant("m4", "Anytime.", datetime!(2026-02-14 00:01 UTC)),
        ];

        assert_eq!(
            unseen_replies(&messages, 0),
            vec!["assistant> Hi!\nHow can I help?", "assistant> Anytime."]
        );
        assert_eq!(unseen_replies(&messages, 2), vec!["assistant> Anytime."]);
        assert_eq!(render_message(&messages[0]), "you> Hello");
    }
}
