// src/bot/mod.rs

//! Command layer: maps user commands onto the engine and renders replies.
//! Every failure reaching the user is a plain message; raw errors only go to
//! the log.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::dedup::DedupFetcher;
use crate::error::EngineError;
use crate::generator::ContentGenerator;
use crate::repository::{FriendRepository, RepositoryError, UserRepository};
use crate::rotation::PoolRotator;

pub mod commands;
pub mod console;

pub use commands::{ANOTHER_JOKE, BotCommand};

pub const EMPTY_POOL_MESSAGE: &str = "😢 No memes found. Admin will upload soon!";
pub const FAILURE_MESSAGE: &str = "⚠️ Something went wrong on our side. Please try again later.";
const HELP_MESSAGE: &str = "Send *next* to scroll memes uploaded by the admin 👇\n\
    Send /joke for a joke you have not seen yet.\n\
    /friends, /addfriend <id>, /removefriend <id> manage your friends.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    /// Sent back as the message text when pressed
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            photo_url: None,
            buttons: Vec::new(),
        }
    }

    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            photo_url: Some(url.into()),
            buttons: Vec::new(),
        }
    }

    fn with_joke_button(mut self) -> Self {
        self.buttons.push(Button {
            label: "😂 Another Joke".to_string(),
            callback_data: ANOTHER_JOKE.to_string(),
        });
        self
    }
}

pub struct CommandHandler {
    rotator: Arc<PoolRotator>,
    fetcher: Arc<DedupFetcher>,
    generator: Arc<dyn ContentGenerator>,
    users: Arc<UserRepository>,
    friends: Arc<FriendRepository>,
}

impl CommandHandler {
    pub fn new(
        rotator: Arc<PoolRotator>,
        fetcher: Arc<DedupFetcher>,
        generator: Arc<dyn ContentGenerator>,
        users: Arc<UserRepository>,
        friends: Arc<FriendRepository>,
    ) -> Self {
        Self {
            rotator,
            fetcher,
            generator,
            users,
            friends,
        }
    }

    /// Handle one inbound message; `None` means the message is ignored
    pub async fn handle(&self, user_id: &str, text: &str) -> Option<Reply> {
        let command = BotCommand::parse(text);
        debug!(user_id, ?command, "Dispatching command");

        let reply = match command {
            BotCommand::Start => self.start(user_id).await,
            BotCommand::Help => Reply::text(HELP_MESSAGE),
            BotCommand::NextMeme => self.next_meme(user_id).await,
            BotCommand::Joke => self.joke(user_id).await,
            BotCommand::ListFriends => self.list_friends(user_id).await,
            BotCommand::AddFriend(friend) => match self.friends.add(user_id, &friend).await {
                Ok(()) => Reply::text(format!("🤝 {} is now your friend.", friend)),
                Err(e) => friend_error(e),
            },
            BotCommand::RemoveFriend(friend) => match self.friends.remove(user_id, &friend).await {
                Ok(()) => Reply::text(format!("👋 {} was removed from your friends.", friend)),
                Err(e) => friend_error(e),
            },
            BotCommand::MissingArgument(command) => {
                Reply::text(format!("Usage: {} <user id>", command))
            }
            BotCommand::Unknown => return None,
        };

        Some(reply)
    }

    async fn start(&self, user_id: &str) -> Reply {
        if let Err(e) = self.users.register(user_id).await {
            error!("Failed to register user {}: {}", user_id, e);
            return Reply::text(FAILURE_MESSAGE);
        }

        match self.fetcher.fetch_unique(user_id, self.generator.as_ref()).await {
            Ok(outcome) => Reply::text(format!(
                "🔥 Welcome! Here's your fresh joke:\n\n{}\n\nSend *next* to scroll memes 👇",
                outcome.content
            ))
            .with_joke_button(),
            Err(e) => engine_error(user_id, e),
        }
    }

    async fn next_meme(&self, user_id: &str) -> Reply {
        match self.rotator.next(user_id).await {
            Ok(item) => Reply::photo(item.payload),
            Err(e) => engine_error(user_id, e),
        }
    }

    async fn joke(&self, user_id: &str) -> Reply {
        match self.fetcher.fetch_unique(user_id, self.generator.as_ref()).await {
            Ok(outcome) => Reply::text(outcome.content).with_joke_button(),
            Err(e) => engine_error(user_id, e),
        }
    }

    async fn list_friends(&self, user_id: &str) -> Reply {
        match self.friends.list(user_id).await {
            Ok(friends) if friends.is_empty() => {
                Reply::text("You have no friends yet. Add one with /addfriend <id>")
            }
            Ok(friends) => Reply::text(format!("👥 Your friends:\n{}", friends.join("\n"))),
            Err(e) => friend_error(e),
        }
    }
}

fn engine_error(user_id: &str, error: EngineError) -> Reply {
    match error {
        EngineError::EmptyPool => Reply::text(EMPTY_POOL_MESSAGE),
        EngineError::Persistence(e) => {
            error!("Persistence failure for user {}: {}", user_id, e);
            Reply::text(FAILURE_MESSAGE)
        }
    }
}

fn friend_error(error: RepositoryError) -> Reply {
    match error {
        RepositoryError::Store(e) => {
            error!("Friend repository failure: {}", e);
            Reply::text(FAILURE_MESSAGE)
        }
        other => Reply::text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FnGenerator;
    use crate::store::{DurableStore, MemoryStore};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn handler() -> (CommandHandler, Arc<PoolRotator>) {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let rotator = Arc::new(PoolRotator::new(Duration::from_secs(3600)));
        let counter = AtomicU32::new(0);
        let generator = FnGenerator::new("counter", move || {
            Ok(format!("joke #{}", counter.fetch_add(1, Ordering::SeqCst)))
        });
        let handler = CommandHandler::new(
            rotator.clone(),
            Arc::new(DedupFetcher::new(20, "fallback")),
            Arc::new(generator),
            Arc::new(UserRepository::new(store.clone())),
            Arc::new(FriendRepository::new(store)),
        );
        (handler, rotator)
    }

    #[tokio::test]
    async fn test_next_on_empty_pool_is_informational() {
        let (handler, _) = handler();
        let reply = handler.handle("1", "next").await.unwrap();
        assert_eq!(reply.text, EMPTY_POOL_MESSAGE);
        assert!(reply.photo_url.is_none());
    }

    #[tokio::test]
    async fn test_next_sends_photos_in_rotation() {
        let (handler, rotator) = handler();
        rotator.insert("https://img/a.png").await.unwrap();
        rotator.insert("https://img/b.png").await.unwrap();

        let first = handler.handle("1", "next").await.unwrap();
        let second = handler.handle("1", "Next").await.unwrap();
        let third = handler.handle("1", "next").await.unwrap();

        assert_eq!(first.photo_url.as_deref(), Some("https://img/a.png"));
        assert_eq!(second.photo_url.as_deref(), Some("https://img/b.png"));
        assert_eq!(third.photo_url.as_deref(), Some("https://img/a.png"));
    }

    #[tokio::test]
    async fn test_start_registers_and_sends_joke() {
        let (handler, _) = handler();
        let reply = handler.handle("1", "/start").await.unwrap();

        assert!(reply.text.starts_with("🔥 Welcome!"));
        assert!(reply.text.contains("joke #0"));
        assert_eq!(reply.buttons[0].callback_data, ANOTHER_JOKE);
        assert!(handler.users.contains("1").await.unwrap());

        let again = handler.handle("1", ANOTHER_JOKE).await.unwrap();
        assert_eq!(again.text, "joke #1");
    }

    #[tokio::test]
    async fn test_friend_commands() {
        let (handler, _) = handler();

        let added = handler.handle("1", "/addfriend 2").await.unwrap();
        assert!(added.text.contains("is now your friend"));

        let dup = handler.handle("2", "/addfriend 1").await.unwrap();
        assert_eq!(dup.text, "2 and 1 are already friends");

        let list = handler.handle("2", "/friends").await.unwrap();
        assert!(list.text.contains('1'));

        let me = handler.handle("1", "/addfriend 1").await.unwrap();
        assert_eq!(me.text, "User 1 cannot befriend themselves");
    }

    #[tokio::test]
    async fn test_unknown_text_is_ignored() {
        let (handler, _) = handler();
        assert!(handler.handle("1", "lol").await.is_none());
    }
}
