use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, write_config, Config};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    Ok(parse_yes_no(&input, default_yes))
}

fn parse_yes_no(input: &str, default_yes: bool) -> bool {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        default_yes
    } else {
        input == "y" || input == "yes"
    }
}

/// Write a starter competition file.
///
/// Uses `path` when given, otherwise the default competition path. Asks
/// before overwriting. Returns the path written, or None if the user declined.
pub fn run_init(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Competition file already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(None);
        }
    }

    write_config(&config_path, &Config::starter())?;

    println!("Competition file written to {}", config_path.display());
    println!("Edit candidates, pairs, judges and segments, then run `tabulator check`.");

    Ok(Some(config_path))
}
