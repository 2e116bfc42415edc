//! Message types for chat conversations
//!
//! Callers hand the adapter a list of [`Message`]s tagged with any role. LM Studio
//! only accepts `user` and `assistant` turns, so [`normalize_messages`] folds the
//! rest into that shape before a request is built.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message role in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Any other role label (`tool`, `function`, ...), stored lowercase
    Other(String),
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "system" => Self::System,
            _ => Self::Other(lower),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
            Self::Other(label) => write!(f, "{label}"),
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Create a new message with an arbitrary role
    #[must_use]
    pub fn new(role: impl Into<Role>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a new user message
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a new assistant message
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Create a new system message
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

/// Roles LM Studio accepts on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Assistant,
}

/// A message as sent to `/chat/completions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

impl WireMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::User,
            content: content.into(),
        }
    }
}

/// Fold an arbitrary conversation into `user`/`assistant` turns.
///
/// - `system` text is gathered (one line per message) and prepended, trimmed and
///   followed by a blank line, to the first `user` turn. With no `user` turn it
///   becomes a new leading `user` message.
/// - Unknown roles become `user` turns labelled `[ROLE]: content`.
/// - An empty result is replaced by a single `greeting` user message.
///
/// Any system message counts, even a blank one: `[system(""), user("Hi")]`
/// yields `"\n\nHi"`.
#[must_use]
pub fn normalize_messages(messages: &[Message], greeting: &str) -> Vec<WireMessage> {
    let mut system = String::new();
    let mut out = Vec::with_capacity(messages.len() + 1);

    for message in messages {
        match &message.role {
            Role::System => {
                system.push_str(&message.content);
                system.push('\n');
            }
            Role::User => out.push(WireMessage::user(message.content.clone())),
            Role::Assistant => out.push(WireMessage {
                role: WireRole::Assistant,
                content: message.content.clone(),
            }),
            Role::Other(label) => out.push(WireMessage::user(format!(
                "[{}]: {}",
                label.to_uppercase(),
                message.content
            ))),
        }
    }

    if !system.is_empty() {
        let system = system.trim();
        match out.iter_mut().find(|m| m.role == WireRole::User) {
            Some(first_user) => {
                first_user.content = format!("{system}\n\n{}", first_user.content);
            }
            None => out.insert(0, WireMessage::user(system)),
        }
    }

    if out.is_empty() {
        out.push(WireMessage::user(greeting));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from("SYSTEM"), Role::System);
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("Tool"), Role::Other("tool".into()));
    }

    #[test]
    fn test_role_serde() {
        let msg: Message = serde_json::from_str(r#"{"role":"Function","content":"x"}"#).unwrap();
        assert_eq!(msg.role, Role::Other("function".into()));
        let json = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_system_merged_into_user() {
        let input = vec![Message::system("Be terse."), Message::user("Hi")];
        let out = normalize_messages(&input, "Hello");
        assert_eq!(
            out,
            vec![WireMessage {
                role: WireRole::User,
                content: "Be terse.\n\nHi".into(),
            }]
        );
    }

    #[test]
    fn test_system_merged_into_first_user_only() {
        let input = vec![
            Message::assistant("Earlier answer"),
            Message::user("First"),
            Message::system("Rule one"),
            Message::system("Rule two"),
            Message::user("Second"),
        ];
        let out = normalize_messages(&input, "Hello");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].role, WireRole::Assistant);
        assert_eq!(out[1].content, "Rule one\nRule two\n\nFirst");
        assert_eq!(out[2].content, "Second");
    }

    #[test]
    fn test_only_system_messages() {
        let input = vec![Message::system("  one "), Message::system("two  ")];
        let out = normalize_messages(&input, "Hello");
        assert_eq!(out, vec![WireMessage::user("one \ntwo")]);
    }

    #[test]
    fn test_system_without_user_goes_first() {
        let input = vec![Message::assistant("prior"), Message::system("sys")];
        let out = normalize_messages(&input, "Hello");
        assert_eq!(out[0], WireMessage::user("sys"));
        assert_eq!(out[1].role, WireRole::Assistant);
    }

    #[test]
    fn test_empty_input_gets_greeting() {
        let out = normalize_messages(&[], "Hello");
        assert_eq!(out, vec![WireMessage::user("Hello")]);
    }

    #[test]
    fn test_blank_system_still_merged() {
        let input = vec![Message::system("  "), Message::user("Hi")];
        let out = normalize_messages(&input, "Hello");
        assert_eq!(out, vec![WireMessage::user("\n\nHi")]);
    }

    #[test]
    fn test_blank_system_alone_replaces_greeting() {
        let out = normalize_messages(&[Message::system("   ")], "Hello");
        assert_eq!(out, vec![WireMessage::user("")]);
    }

    #[test]
    fn test_other_role_is_labelled() {
        let input = vec![Message::new("tool", "42")];
        let out = normalize_messages(&input, "Hello");
        assert_eq!(out, vec![WireMessage::user("[TOOL]: 42")]);
    }

    #[test]
    fn test_input_untouched() {
        let input = vec![Message::system("sys"), Message::user("u")];
        let before = input.clone();
        let _ = normalize_messages(&input, "Hello");
        assert_eq!(input, before);
    }
}
