//! Interactive session over stdin

use crate::render;
use anyhow::Result;
use churn_core::{PredictionService, PredictionSession, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  show                 print the current form
  set FIELD=VALUE      set a field by name or index (e.g. set Contract=One year)
  example              load the example customer
  reset                clear the form and the current prediction
  encode               print the encoded feature vector
  submit               send the form to the prediction service
  history [--json]     list past predictions, newest first
  schema               list the fields and their options
  help                 show this message
  quit                 leave the session
";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Show,
    Set { field: String, value: String },
    Example,
    Reset,
    Encode,
    Submit,
    History { json: bool },
    Schema,
    Help,
    Quit,
}

/// Split `FIELD=VALUE` at the first `=`; the field part is trimmed, the value
/// is kept verbatim so blank values can unset a field.
pub fn split_assignment(raw: &str) -> Option<(&str, &str)> {
    let (field, value) = raw.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some((field, value))
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "show" | "form" => Ok(Command::Show),
        "set" => split_assignment(rest)
            .map(|(field, value)| Command::Set {
                field: field.to_string(),
                value: value.trim().to_string(),
            })
            .ok_or_else(|| "usage: set FIELD=VALUE".to_string()),
        "example" | "prefill" => Ok(Command::Example),
        "reset" | "clear" => Ok(Command::Reset),
        "encode" => Ok(Command::Encode),
        "submit" | "predict" => Ok(Command::Submit),
        "history" => Ok(Command::History {
            json: rest == "--json",
        }),
        "schema" => Ok(Command::Schema),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Set a field addressed by index or by name
pub fn assign(
    session: &mut PredictionSession,
    field: &str,
    value: &str,
) -> Result<(), SessionError> {
    match field.parse::<usize>() {
        Ok(index) if index < session.schema().len() => session.set_field(index, value),
        _ => session.set_field_by_name(field, value),
    }
}

pub async fn run<S>(session: &mut PredictionSession, service: &S) -> Result<()>
where
    S: PredictionService + ?Sized,
{
    println!("Customer Churn Predictor. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::Show => {
                print!("{}", render::form_listing(session.schema(), session.form()));
                if let Some(prediction) = session.prediction() {
                    println!("{}", render::prediction_banner(prediction));
                }
            }
            Command::Set { field, value } => {
                if let Err(err) = assign(session, &field, &value) {
                    eprintln!("{err}");
                }
            }
            Command::Example => session.prefill_sample()?,
            Command::Reset => session.reset(),
            Command::Encode => {
                let encoded = session.encoded();
                print!(
                    "{}",
                    render::encoding_listing(session.schema(), session.form(), &encoded)
                );
            }
            Command::Submit => match session.submit(service).await {
                // The observer reports both outcomes.
                Ok(_) | Err(SessionError::PredictionFailed(_)) => {}
                Err(err) => eprintln!("{err}"),
            },
            Command::History { json: true } => {
                println!("{}", serde_json::to_string_pretty(session.history())?);
            }
            Command::History { json: false } => {
                print!("{}", render::history_listing(session.history()))
            }
            Command::Schema => print!("{}", render::schema_listing(session.schema())),
            Command::Help => print!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}
