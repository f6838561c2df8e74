//! Message handling: command routing first, then the active conversation
//! flow. Each handler call loads the chat's session, transitions the flow
//! explicitly and persists the result.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::api_client::{ApiClient, ApiError, NoteDraft};
use crate::flow::ChatFlow;
use crate::sessions::{ChatSession, SessionStore};

const LOGIN_FIRST: &str = "Log in first with /start.";
const COMMANDS_HELP: &str = "Commands:\n/create_note — create a note\n/search_notes — search notes by tag";

pub async fn handle_message(
    bot: Bot,
    msg: Message,
    store: Arc<SessionStore>,
    api: Arc<ApiClient>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    let text = match msg.text() {
        Some(t) => t.trim().to_string(),
        None => {
            bot.send_message(chat_id, "I only understand text messages.")
                .await?;
            return Ok(());
        }
    };

    let mut session = match store.get(chat_id.0) {
        Ok(Some(s)) => s,
        Ok(None) => ChatSession::fresh(chat_id.0),
        Err(e) => {
            log::error!("Session load failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, "Something went wrong, please try again.")
                .await?;
            return Ok(());
        }
    };

    match text.as_str() {
        "/start" => {
            session.access_token = None;
            session.flow = ChatFlow::AwaitingUsername;
            bot.send_message(chat_id, "Enter your username to log in:")
                .await?;
        }
        "/create_note" => {
            if session.access_token.is_none() {
                bot.send_message(chat_id, LOGIN_FIRST).await?;
            } else {
                session.flow = ChatFlow::AwaitingTitle;
                bot.send_message(chat_id, "Enter the note title:").await?;
            }
        }
        "/search_notes" => {
            if session.access_token.is_none() {
                bot.send_message(chat_id, LOGIN_FIRST).await?;
            } else {
                session.flow = ChatFlow::AwaitingSearchTag;
                bot.send_message(chat_id, "Enter a tag to search for:")
                    .await?;
            }
        }
        "/cancel" => {
            session.flow = ChatFlow::Idle;
            bot.send_message(chat_id, "Cancelled.").await?;
        }
        "/logout" => {
            if let Err(e) = store.clear(chat_id.0) {
                log::error!("Failed to clear session for chat {}: {}", chat_id, e);
            }
            bot.send_message(chat_id, "Logged out. /start to log in again.")
                .await?;
            return Ok(());
        }
        _ => return flow_input(&bot, chat_id, &text, session, &store, &api).await,
    }

    persist(&store, &session);
    Ok(())
}

/// Advance the active flow with free-form input.
async fn flow_input(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    mut session: ChatSession,
    store: &SessionStore,
    api: &ApiClient,
) -> ResponseResult<()> {
    match session.flow.clone() {
        ChatFlow::Idle => {
            bot.send_message(chat_id, format!("Use /start to log in.\n{}", COMMANDS_HELP))
                .await?;
        }

        ChatFlow::AwaitingUsername => {
            session.flow = ChatFlow::AwaitingPassword {
                username: text.to_string(),
            };
            bot.send_message(chat_id, "Enter your password:").await?;
        }

        ChatFlow::AwaitingPassword { username } => {
            match api.login(&username, text).await {
                Ok(token) => {
                    session.access_token = Some(token);
                    session.flow = ChatFlow::Idle;
                    bot.send_message(chat_id, format!("Logged in!\n{}", COMMANDS_HELP))
                        .await?;
                }
                Err(ApiError::Unauthorized) => {
                    session.flow = ChatFlow::Idle;
                    bot.send_message(chat_id, "Incorrect username or password. /start to try again.")
                        .await?;
                }
                Err(e) => {
                    log::error!("Login failed for chat {}: {}", chat_id, e);
                    session.flow = ChatFlow::Idle;
                    bot.send_message(chat_id, "Login failed, please try again later.")
                        .await?;
                }
            }
        }

        ChatFlow::AwaitingTitle => {
            session.flow = ChatFlow::AwaitingContent {
                title: text.to_string(),
            };
            bot.send_message(chat_id, "Enter the note content:").await?;
        }

        ChatFlow::AwaitingContent { title } => {
            session.flow = ChatFlow::AwaitingTags {
                title,
                content: text.to_string(),
            };
            bot.send_message(chat_id, "Enter tags (comma-separated), or \"-\" for none:")
                .await?;
        }

        ChatFlow::AwaitingTags { title, content } => {
            session.flow = ChatFlow::Idle;

            let Some(token) = session.access_token.clone() else {
                bot.send_message(chat_id, LOGIN_FIRST).await?;
                persist(store, &session);
                return Ok(());
            };

            let draft = NoteDraft {
                title,
                content,
                tags: split_tags(text),
            };

            match api.create_note(&token, &draft).await {
                Ok(note) => {
                    bot.send_message(chat_id, format!("Note \"{}\" created.", note.title))
                        .await?;
                }
                Err(ApiError::Unauthorized) => {
                    session.access_token = None;
                    bot.send_message(chat_id, "Your session expired. Log in again with /start.")
                        .await?;
                }
                Err(e) => {
                    log::error!("Create note failed for chat {}: {}", chat_id, e);
                    bot.send_message(chat_id, "Failed to create the note.").await?;
                }
            }
        }

        ChatFlow::AwaitingSearchTag => {
            session.flow = ChatFlow::Idle;

            let Some(token) = session.access_token.clone() else {
                bot.send_message(chat_id, LOGIN_FIRST).await?;
                persist(store, &session);
                return Ok(());
            };

            match api.search_notes(&token, text).await {
                Ok(notes) if notes.is_empty() => {
                    bot.send_message(chat_id, "No notes with that tag.").await?;
                }
                Ok(notes) => {
                    let listing = notes
                        .iter()
                        .map(|n| format!("Note {}: {} — {}", n.id, n.title, n.content))
                        .collect::<Vec<_>>()
                        .join("\n");
                    bot.send_message(chat_id, listing).await?;
                }
                Err(ApiError::NotFound) => {
                    bot.send_message(chat_id, "No such tag.").await?;
                }
                Err(ApiError::Unauthorized) => {
                    session.access_token = None;
                    bot.send_message(chat_id, "Your session expired. Log in again with /start.")
                        .await?;
                }
                Err(e) => {
                    log::error!("Search failed for chat {}: {}", chat_id, e);
                    bot.send_message(chat_id, "Search failed, please try again later.")
                        .await?;
                }
            }
        }
    }

    persist(store, &session);
    Ok(())
}

fn persist(store: &SessionStore, session: &ChatSession) {
    if let Err(e) = store.put(session) {
        log::error!("Failed to persist session for chat {}: {}", session.chat_id, e);
    }
}

/// Comma-separated tag entry; blanks drop out, "-" means no tags.
pub fn split_tags(input: &str) -> Vec<String> {
    if input.trim() == "-" {
        return Vec::new();
    }
    input
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
