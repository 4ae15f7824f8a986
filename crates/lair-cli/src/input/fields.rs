//! Validated field readers built on [`InputSource`].

use std::fs::{File, metadata};
use std::io::Write;
use std::path::PathBuf;

use lair_protocol::RecordDraft;

use super::{InputError, InputMode, InputSource};

const MAX_LOGIN_LENGTH: usize = 64;

/// Reads a value until `parse` accepts it.
///
/// Interactive sources print the complaint and ask again; scripts give up with
/// [`InputError::Format`].
fn prompt_value<T>(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, InputError> {
    loop {
        let line = input.read_line(out, prompt)?;
        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(message) => match input.mode() {
                InputMode::Interactive => {
                    writeln!(out, "{message}").map_err(InputError::Io)?;
                }
                InputMode::Script => return Err(InputError::Format(message)),
            },
        }
    }
}

pub(crate) fn need_registration(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<bool, InputError> {
    prompt_value(input, out, "Do you need to register? (yes/no): ", |answer| {
        match answer.to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(true),
            "no" | "n" => Ok(false),
            _ => Err(String::from("Answer must be yes or no")),
        }
    })
}

pub(crate) fn input_login(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<String, InputError> {
    prompt_value(input, out, "Login: ", |login| {
        if login.is_empty() {
            Err(String::from("Login must not be empty"))
        } else if login.chars().any(char::is_whitespace) {
            Err(String::from("Login must not contain whitespace"))
        } else if login.chars().count() > MAX_LOGIN_LENGTH {
            Err(format!("Login must be at most {MAX_LOGIN_LENGTH} characters"))
        } else {
            Ok(login.to_owned())
        }
    })
}

pub(crate) fn input_password(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<String, InputError> {
    prompt_value(input, out, "Password: ", |password| {
        if password.is_empty() {
            Err(String::from("Password must not be empty"))
        } else {
            Ok(password.to_owned())
        }
    })
}

/// Reads the path of an existing, readable, and writable regular file and
/// returns its canonical form.
pub(crate) fn input_file_path(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<PathBuf, InputError> {
    prompt_value(input, out, "Script path: ", |raw| {
        if raw.is_empty() {
            return Err(String::from("Path must not be empty"));
        }
        let details = metadata(raw).map_err(|_| format!("File '{raw}' does not exist"))?;
        if !details.is_file() {
            return Err(format!("'{raw}' is not a regular file"));
        }
        if details.permissions().readonly() {
            return Err(format!("File '{raw}' is not writable"));
        }
        File::open(raw).map_err(|_| format!("File '{raw}' is not readable"))?;
        std::fs::canonicalize(raw).map_err(|error| format!("Cannot resolve '{raw}': {error}"))
    })
}

/// Reads a positive record identifier.
pub(crate) fn input_id(input: &mut dyn InputSource, out: &mut dyn Write) -> Result<i64, InputError> {
    prompt_value(input, out, "Record id: ", |raw| match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(String::from("Id must be a positive whole number")),
    })
}

/// Reads the operator-supplied fields of a record.
pub(crate) fn input_record(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<RecordDraft, InputError> {
    let name = prompt_value(input, out, "Dragon name: ", |name| {
        if name.is_empty() {
            Err(String::from("Name must not be empty"))
        } else {
            Ok(name.to_owned())
        }
    })?;
    let age = prompt_value(input, out, "Age: ", |raw| match raw.parse::<u32>() {
        Ok(age) if age > 0 => Ok(age),
        _ => Err(String::from("Age must be a positive whole number")),
    })?;
    let description = prompt_value(input, out, "Description (leave blank for none): ", optional)?;
    let killer = prompt_value(input, out, "Killer (leave blank for none): ", optional)?;
    Ok(RecordDraft {
        name,
        age,
        description,
        killer,
    })
}

/// Reads the name of a dragon slayer.
pub(crate) fn input_killer(
    input: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<String, InputError> {
    prompt_value(input, out, "Killer: ", |killer| {
        if killer.is_empty() {
            Err(String::from("Killer must not be empty"))
        } else {
            Ok(killer.to_owned())
        }
    })
}

fn optional(text: &str) -> Result<Option<String>, String> {
    Ok((!text.is_empty()).then(|| text.to_owned()))
}
