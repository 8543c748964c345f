//! Parsing of the line-oriented command language.

use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{ParseIdError, QuestionDraft, UserId};
use services::View;
use services::state::UnknownView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Signup {
        username: String,
        password: String,
        admin_code: Option<String>,
    },
    Logout,
    WhoAmI,
    View(View),
    /// Type and submit in one step.
    Answer(String),
    Type(String),
    Submit,
    Next,
    Refresh,
    AdminQuestion(QuestionFields),
    AdminNote(NoteFields),
    SetAdmin {
        user_id: UserId,
        is_admin: bool,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFields {
    pub topic: String,
    pub difficulty: String,
    pub text: String,
    pub correct: String,
}

impl From<QuestionFields> for QuestionDraft {
    fn from(fields: QuestionFields) -> Self {
        Self {
            topic: fields.topic,
            difficulty: fields.difficulty,
            text: fields.text,
            correct: fields.correct,
        }
    }
}

/// Note fields as typed; the attachment is still a path to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    pub title: String,
    pub topic: Option<String>,
    pub content: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    Usage(&'static str),
    BadView(UnknownView),
    BadUserId(ParseIdError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "type a command, or 'help'"),
            CommandError::Unknown(word) => write!(f, "unknown command: {word} (try 'help')"),
            CommandError::Usage(usage) => write!(f, "usage: {usage}"),
            CommandError::BadView(err) => write!(f, "{err} (quiz, history, admin)"),
            CommandError::BadUserId(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  login <user> <password>
  signup <user> <password> [admin-code]
  logout | whoami
  view quiz|history|admin
  answer <text>        type and submit an answer
  type <text>          replace the typed answer
  submit | next | refresh
  admin question <topic>|<difficulty>|<text>|<answer>
  admin note <title>|[topic]|[content]|[file path]
  admin grant <user-id> | admin revoke <user-id>
  help | quit";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = split_word(line);
    match word.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "login" => {
            let mut words = rest.split_whitespace();
            match (words.next(), words.next(), words.next()) {
                (Some(username), Some(password), None) => Ok(Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                _ => Err(CommandError::Usage("login <user> <password>")),
            }
        }
        "signup" => {
            let mut words = rest.split_whitespace();
            match (words.next(), words.next(), words.next(), words.next()) {
                (Some(username), Some(password), admin_code, None) => Ok(Command::Signup {
                    username: username.to_string(),
                    password: password.to_string(),
                    admin_code: admin_code.map(str::to_string),
                }),
                _ => Err(CommandError::Usage("signup <user> <password> [admin-code]")),
            }
        }
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::WhoAmI),
        "view" | "go" => rest
            .parse::<View>()
            .map(Command::View)
            .map_err(CommandError::BadView),
        "answer" if !rest.is_empty() => Ok(Command::Answer(rest.to_string())),
        "answer" => Err(CommandError::Usage("answer <text>")),
        "type" => Ok(Command::Type(rest.to_string())),
        "submit" => Ok(Command::Submit),
        "next" => Ok(Command::Next),
        "refresh" => Ok(Command::Refresh),
        "admin" => parse_admin(rest),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_admin(input: &str) -> Result<Command, CommandError> {
    let (word, rest) = split_word(input);
    match word.to_ascii_lowercase().as_str() {
        "question" => {
            let fields: Vec<&str> = rest.split('|').map(str::trim).collect();
            let [topic, difficulty, text, correct] = fields.as_slice() else {
                return Err(CommandError::Usage(
                    "admin question <topic>|<difficulty>|<text>|<answer>",
                ));
            };
            Ok(Command::AdminQuestion(QuestionFields {
                topic: (*topic).to_string(),
                difficulty: (*difficulty).to_string(),
                text: (*text).to_string(),
                correct: (*correct).to_string(),
            }))
        }
        "note" => {
            let mut fields = rest.split('|').map(str::trim);
            let title = fields.next().unwrap_or_default().to_string();
            let topic = optional(fields.next());
            let content = optional(fields.next());
            let file = optional(fields.next()).map(PathBuf::from);
            if fields.next().is_some() {
                return Err(CommandError::Usage(
                    "admin note <title>|[topic]|[content]|[file path]",
                ));
            }
            Ok(Command::AdminNote(NoteFields {
                title,
                topic,
                content,
                file,
            }))
        }
        "grant" | "revoke" => {
            let user_id = rest.parse::<UserId>().map_err(CommandError::BadUserId)?;
            Ok(Command::SetAdmin {
                user_id,
                is_admin: word.eq_ignore_ascii_case("grant"),
            })
        }
        _ => Err(CommandError::Usage("admin question|note|grant|revoke ...")),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn optional(field: Option<&str>) -> Option<String> {
    field
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_and_signup() {
        assert_eq!(
            parse("login ana secret").unwrap(),
            Command::Login {
                username: "ana".into(),
                password: "secret".into()
            }
        );
        assert_eq!(
            parse("signup root pw code123").unwrap(),
            Command::Signup {
                username: "root".into(),
                password: "pw".into(),
                admin_code: Some("code123".into())
            }
        );
        assert!(matches!(parse("login ana"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn answer_keeps_inner_spacing() {
        assert_eq!(
            parse("answer  a  linked list ").unwrap(),
            Command::Answer("a  linked list".into())
        );
        assert!(parse("answer").is_err());
    }

    #[test]
    fn parses_views() {
        assert_eq!(parse("view History").unwrap(), Command::View(View::History));
        assert!(matches!(parse("view settings"), Err(CommandError::BadView(_))));
    }

    #[test]
    fn parses_admin_question() {
        let Command::AdminQuestion(fields) =
            parse("admin question arrays | easy | First index? | 0").unwrap()
        else {
            panic!("expected admin question");
        };
        assert_eq!(fields.topic, "arrays");
        assert_eq!(fields.difficulty, "easy");
        assert_eq!(fields.correct, "0");
        assert!(parse("admin question arrays|easy").is_err());
    }

    #[test]
    fn parses_admin_note_with_optional_fields() {
        let Command::AdminNote(fields) = parse("admin note Big-O||intro text|notes/bigo.pdf").unwrap()
        else {
            panic!("expected admin note");
        };
        assert_eq!(fields.title, "Big-O");
        assert_eq!(fields.topic, None);
        assert_eq!(fields.content.as_deref(), Some("intro text"));
        assert_eq!(fields.file, Some(PathBuf::from("notes/bigo.pdf")));
    }

    #[test]
    fn parses_grant_and_revoke() {
        assert_eq!(
            parse("admin revoke 7").unwrap(),
            Command::SetAdmin {
                user_id: UserId::new(7),
                is_admin: false
            }
        );
        assert!(matches!(
            parse("admin grant seven"),
            Err(CommandError::BadUserId(_))
        ));
    }

    #[test]
    fn rejects_unknown_words() {
        assert_eq!(parse("   "), Err(CommandError::Empty));
        assert!(matches!(parse("dance"), Err(CommandError::Unknown(_))));
    }
}
