use crate::errors::{ClientError, Result};
use crate::models::{Identifier, ResourceItem};
use crate::resource::IdScheme;
use serde_json::Value;

pub const HELP: &str = "commands: next | prev | page N | filter TEXT | sort KEY | refresh
          add field=value ... | edit ID field=value ... | delete ID | clear
          login EMAIL PASSWORD | logout | register NAME EMAIL PASSWORD
          verify EMAIL CODE | profile | passwd OLD NEW | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Page(i64),
    Filter(String),
    Sort(String),
    Refresh,
    Add(ResourceItem),
    Edit(String, ResourceItem),
    Delete(String),
    DeleteAll,
    Login { email: String, password: String },
    Logout,
    Register { name: String, email: String, password: String },
    Verify { email: String, code: String },
    Profile,
    ChangePassword { old: String, new: String },
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "page" => {
                let page = rest
                    .parse::<i64>()
                    .map_err(|_| ClientError::validation(format!("page needs a number, got '{rest}'")))?;
                Self::Page(page)
            }
            "filter" => Self::Filter(rest.to_string()),
            "sort" => Self::Sort(rest.to_string()),
            "refresh" | "r" => Self::Refresh,
            "add" => Self::Add(parse_fields(rest)?),
            "edit" => {
                let (id, fields) = split_identifier(rest)?;
                Self::Edit(id, parse_fields(fields)?)
            }
            "delete" | "rm" => {
                let (id, extra) = split_identifier(rest)?;
                if !extra.is_empty() {
                    return Err(ClientError::validation("delete takes only an identifier"));
                }
                Self::Delete(id)
            }
            "clear" => Self::DeleteAll,
            "login" => {
                let [email, password] = arguments(rest, "login EMAIL PASSWORD")?;
                Self::Login { email, password }
            }
            "logout" => Self::Logout,
            "register" => {
                let [name, email, password] = arguments(rest, "register NAME EMAIL PASSWORD")?;
                Self::Register { name, email, password }
            }
            "verify" => {
                let [email, code] = arguments(rest, "verify EMAIL CODE")?;
                Self::Verify { email, code }
            }
            "profile" => Self::Profile,
            "passwd" => {
                let [old, new] = arguments(rest, "passwd OLD NEW")?;
                Self::ChangePassword { old, new }
            }
            "help" | "?" | "" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ClientError::validation(format!("unknown command '{other}'"))),
        };
        Ok(command)
    }
}

/// Exactly `N` tokens, quotes allowed.
fn arguments<const N: usize>(rest: &str, usage: &str) -> Result<[String; N]> {
    tokenize(rest)?
        .try_into()
        .map_err(|_| ClientError::validation(format!("usage: {usage}")))
}

/// Under the natural-key scheme every identifier is a key, even if it looks numeric.
pub fn identifier_for(raw: &str, scheme: IdScheme) -> Identifier {
    match scheme {
        IdScheme::ServerId => Identifier::parse(raw),
        IdScheme::NaturalKey => Identifier::Key(raw.to_string()),
    }
}

fn split_identifier(rest: &str) -> Result<(String, &str)> {
    let tokens = tokenize(rest)?;
    let first = tokens
        .first()
        .ok_or_else(|| ClientError::validation("missing identifier"))?
        .clone();
    // Skip past the identifier token, quoted or not.
    let remainder = if rest.starts_with('"') {
        rest[1..].split_once('"').map(|(_, tail)| tail).unwrap_or("")
    } else {
        rest.split_once(char::is_whitespace).map(|(_, tail)| tail).unwrap_or("")
    };
    Ok((first, remainder.trim()))
}

/// Parses `field=value` pairs. Values may be double-quoted; `true`/`false` become booleans.
pub fn parse_fields(input: &str) -> Result<ResourceItem> {
    let mut item = ResourceItem::new();
    for token in tokenize(input)? {
        let (field, value) = token
            .split_once('=')
            .ok_or_else(|| ClientError::validation(format!("expected field=value, got '{token}'")))?;
        if field.is_empty() {
            return Err(ClientError::validation(format!("missing field name in '{token}'")));
        }
        let value = match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        item.insert(field, value);
    }
    Ok(item)
}

fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if quoted {
        return Err(ClientError::validation("unterminated quote"));
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_commands() {
        assert_eq!(Command::parse("next").unwrap(), Command::Next);
        assert_eq!(Command::parse(" prev ").unwrap(), Command::Prev);
        assert_eq!(Command::parse("page 3").unwrap(), Command::Page(3));
        assert_eq!(Command::parse("page -1").unwrap(), Command::Page(-1));
        assert!(Command::parse("page two").is_err());
        assert_eq!(Command::parse("filter read more").unwrap(), Command::Filter("read more".into()));
        assert_eq!(Command::parse("sort").unwrap(), Command::Sort(String::new()));
    }

    #[test]
    fn parses_writes_with_quoted_values() {
        let cmd = Command::parse(r#"add name=Read description="read 20 pages""#).unwrap();
        let expected = ResourceItem::new()
            .with("name", "Read")
            .with("description", "read 20 pages");
        assert_eq!(cmd, Command::Add(expected));

        let cmd = Command::parse(r#"edit "Morning run" is_sent=true"#).unwrap();
        assert_eq!(
            cmd,
            Command::Edit("Morning run".into(), ResourceItem::new().with("is_sent", true))
        );

        assert_eq!(Command::parse("delete 12").unwrap(), Command::Delete("12".into()));
        assert!(Command::parse("delete").is_err());
        assert!(Command::parse("delete 1 2").is_err());
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(parse_fields("name").is_err());
        assert!(parse_fields("=x").is_err());
        assert!(parse_fields(r#"name="open"#).is_err());
        assert!(parse_fields("").unwrap().fields().next().is_none());
    }

    #[test]
    fn natural_scheme_keeps_numeric_looking_keys() {
        assert_eq!(identifier_for("42", IdScheme::ServerId), Identifier::Id(42));
        assert_eq!(
            identifier_for("42", IdScheme::NaturalKey),
            Identifier::Key("42".into())
        );
    }

    #[test]
    fn login_needs_exactly_two_arguments() {
        assert_eq!(
            Command::parse("login a@b.c pw").unwrap(),
            Command::Login {
                email: "a@b.c".into(),
                password: "pw".into()
            }
        );
        assert!(Command::parse("login a@b.c").is_err());
        assert!(Command::parse("launch").is_err());
    }

    #[test]
    fn parses_account_commands() {
        assert_eq!(
            Command::parse(r#"register "Ann B" ann@example.com pw"#).unwrap(),
            Command::Register {
                name: "Ann B".into(),
                email: "ann@example.com".into(),
                password: "pw".into()
            }
        );
        assert_eq!(
            Command::parse("verify ann@example.com 4321").unwrap(),
            Command::Verify {
                email: "ann@example.com".into(),
                code: "4321".into()
            }
        );
        assert_eq!(Command::parse("profile").unwrap(), Command::Profile);
        assert!(Command::parse("passwd only-one").is_err());
        assert_eq!(Command::parse("clear").unwrap(), Command::DeleteAll);
    }
}
