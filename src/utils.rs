// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use controller::{Field, Type, Value};
use rustyline::{error::ReadlineError, Editor};
use simplelog::LevelFilter;
use std::collections::HashMap;

/// Level for the terminal logger, `--verbose` always wins over the config file
pub(crate) fn log_level(configured: &str, verbose: bool) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }

    match configured.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

// Ok(None) when the user pressed CTRL-D
fn read_field(
    rl: &mut Editor<()>,
    name: &str,
    optional: bool,
    ty: Type,
) -> Result<Option<String>, ReadlineError> {
    let kind = if optional { "optional" } else { "required" };
    let msg = format!("{}{} ({}, {}): ", crate::PROMPT, name, kind, ty);

    match rl.readline(&msg) {
        Ok(line) => Ok(Some(line.trim().to_owned())),
        Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Ask for every field in turn until each one holds a value of its type,
/// optional fields may be skipped
pub(crate) fn build_prototype<'a>(
    rl: &mut Editor<()>,
    fields: Vec<Field<'a>>,
) -> Result<HashMap<&'a str, Value>, Error> {
    println!("Press CTRL-D to leave a field empty");
    let mut prototype = HashMap::new();

    for field in fields {
        let optional = field.is_optional();
        let (name, ty) = field.into_tuple();

        loop {
            match read_field(rl, name, optional, ty)? {
                Some(input) if !input.is_empty() => match Value::from_str(&input, ty) {
                    Ok(value) => {
                        prototype.insert(name, value);
                        break;
                    }

                    Err(e) => log::error!("Invalid value for '{}': {}", name, e),
                },

                _ if optional => break,

                _ => log::error!("Field '{}' is required, cannot be empty!", name),
            }
        }
    }

    Ok(prototype)
}
