//! Executes parsed commands against the client and drives the read loop.

use std::io::Write as _;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};

use quiz_core::model::{Attachment, NoteDraft};
use services::{ClientError, QuizClient, SubmitOutcome};

use crate::command::{self, Command, CommandError, HELP, NoteFields};
use crate::render::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(client: &QuizClient) -> std::io::Result<()> {
    client.settle().await;
    show(client);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match command::parse(&line) {
            Ok(command) => {
                if execute(client, command).await == Flow::Quit {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(err) => println!("! {err}"),
        }
        client.settle().await;
        show(client);
    }
    Ok(())
}

fn show(client: &QuizClient) {
    print!("{}\n> ", render(&client.snapshot()));
    let _ = std::io::stdout().flush();
}

pub async fn execute(client: &QuizClient, command: Command) -> Flow {
    match dispatch(client, command).await {
        Ok(flow) => flow,
        Err(err) => {
            println!("! {err}");
            Flow::Continue
        }
    }
}

async fn dispatch(client: &QuizClient, command: Command) -> Result<Flow, ClientError> {
    match command {
        Command::Login { username, password } => {
            let user = client.session().login(&username, &password).await?;
            println!("Welcome back, {}.", user.username());
        }
        Command::Signup {
            username,
            password,
            admin_code,
        } => {
            let user = client
                .session()
                .signup(&username, &password, admin_code.as_deref())
                .await?;
            println!("Account created for {}.", user.username());
        }
        Command::Logout => {
            client.session().logout().await?;
            println!("Logged out.");
        }
        Command::WhoAmI => {
            let user = client.session().refresh_profile().await?;
            let role = if user.is_admin() { "admin" } else { "user" };
            println!("{} (#{}, {role})", user.username(), user.id());
        }
        Command::View(view) => {
            client.navigator().navigate(view)?;
        }
        Command::Answer(text) => {
            client.practice().set_answer(text);
            submit(client).await?;
        }
        Command::Type(text) => {
            if !client.practice().set_answer(text) {
                println!("! No question to answer right now.");
            }
        }
        Command::Submit => submit(client).await?,
        Command::Next => {
            client.practice().next_question().await?;
        }
        Command::Refresh => {
            let no_question = client.snapshot().practice().question().is_none();
            client.navigator().refresh_active()?;
            if no_question && client.snapshot().active_view() == services::View::Quiz {
                client.practice().load_question().await?;
            }
        }
        Command::AdminQuestion(fields) => {
            let record = client.admin().create_question(fields.into()).await?;
            println!("Created question #{}.", record.id);
        }
        Command::AdminNote(fields) => {
            let draft = note_draft(fields).await?;
            let record = client.admin().create_note(draft).await?;
            println!("Created note #{}.", record.id);
        }
        Command::SetAdmin { user_id, is_admin } => {
            let record = client.admin().set_user_admin(user_id, is_admin).await?;
            let state = if record.is_admin { "now" } else { "no longer" };
            println!("{} is {state} an admin.", record.username);
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn submit(client: &QuizClient) -> Result<(), ClientError> {
    match client.practice().submit().await? {
        SubmitOutcome::Scored(_) => {}
        SubmitOutcome::Ignored => println!("! Nothing to submit right now."),
        SubmitOutcome::Stale => println!("! Your session ended before the answer was scored."),
    }
    Ok(())
}

async fn note_draft(fields: NoteFields) -> Result<NoteDraft, ClientError> {
    let attachment = match fields.file {
        Some(path) => Some(read_attachment(&path).await?),
        None => None,
    };
    Ok(NoteDraft {
        title: fields.title,
        topic: fields.topic,
        content: fields.content,
        attachment,
    })
}

async fn read_attachment(path: &Path) -> Result<Attachment, ClientError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ClientError::Validation(format!("cannot read {}: {err}", path.display())))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Attachment {
        content_type: content_type_for(path).map(str::to_string),
        file_name,
        bytes,
    })
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        _ => None,
    }
}
