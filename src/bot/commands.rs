// src/bot/commands.rs
// Text and button-callback parsing

/// Callback data attached to the "another joke" button
pub const ANOTHER_JOKE: &str = "another_joke";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    /// Next meme from the shared pool
    NextMeme,
    /// Fresh joke the user has not seen
    Joke,
    ListFriends,
    AddFriend(String),
    RemoveFriend(String),
    /// Friend command without a target
    MissingArgument(&'static str),
    Unknown,
}

impl BotCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let mut parts = trimmed.split_whitespace();
        let Some(head) = parts.next() else {
            return BotCommand::Unknown;
        };
        // Telegram appends the bot name in groups: /start@SomeBot
        let head = head.split('@').next().unwrap_or(head).to_lowercase();
        let arg = parts.next().map(str::to_string);

        match head.as_str() {
            "/start" => BotCommand::Start,
            "/help" | "help" => BotCommand::Help,
            "next" | "/next" | "/meme" => BotCommand::NextMeme,
            "joke" | "/joke" | ANOTHER_JOKE => BotCommand::Joke,
            "/friends" => BotCommand::ListFriends,
            "/addfriend" => match arg {
                Some(id) => BotCommand::AddFriend(id),
                None => BotCommand::MissingArgument("/addfriend"),
            },
            "/removefriend" => match arg {
                Some(id) => BotCommand::RemoveFriend(id),
                None => BotCommand::MissingArgument("/removefriend"),
            },
            _ => BotCommand::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(BotCommand::parse("/start"), BotCommand::Start);
        assert_eq!(BotCommand::parse("/start@CrazMemeBot"), BotCommand::Start);
        assert_eq!(BotCommand::parse("NEXT"), BotCommand::NextMeme);
        assert_eq!(BotCommand::parse("  next  "), BotCommand::NextMeme);
        assert_eq!(BotCommand::parse("another_joke"), BotCommand::Joke);
        assert_eq!(BotCommand::parse("/joke"), BotCommand::Joke);
    }

    #[test]
    fn test_parse_friend_commands() {
        assert_eq!(
            BotCommand::parse("/addfriend 1234"),
            BotCommand::AddFriend("1234".into())
        );
        assert_eq!(
            BotCommand::parse("/removefriend"),
            BotCommand::MissingArgument("/removefriend")
        );
        assert_eq!(BotCommand::parse("/friends"), BotCommand::ListFriends);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(BotCommand::parse(""), BotCommand::Unknown);
        assert_eq!(BotCommand::parse("hello there"), BotCommand::Unknown);
        assert_eq!(BotCommand::parse("nextmeme"), BotCommand::Unknown);
    }
}
