use crate::cli::Context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};
use std::path::Path;
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", ctx.cfg.to_yaml()?);
        }

        if *check {
            if !path.exists() {
                warning(format!(
                    "No configuration file at {}; defaults are in use. Run `rattendance init`.",
                    path.display()
                ));
            } else {
                let missing = Config::check_file(&path, !ctx.test)?;
                if missing.is_empty() {
                    success("Configuration file is complete.");
                } else {
                    for key in &missing {
                        info(format!("Added missing field '{key}' with its default value"));
                    }
                }
            }
        }

        if *edit_config {
            edit(&path, editor.clone());
        }
    }

    Ok(())
}

fn edit(path: &Path, requested: Option<String>) {
    let default_editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    let editor = requested.unwrap_or_else(|| default_editor.clone());

    match Command::new(&editor).arg(path).status() {
        Ok(s) if s.success() => {
            success(format!("Configuration file edited successfully using '{editor}'"));
        }
        _ => {
            warning(format!(
                "Editor '{editor}' not available, falling back to '{default_editor}'"
            ));
            match Command::new(&default_editor).arg(path).status() {
                Ok(s) if s.success() => success(format!(
                    "Configuration file edited successfully using fallback '{default_editor}'"
                )),
                _ => error(format!(
                    "Failed to edit configuration file using fallback '{default_editor}'"
                )),
            }
        }
    }
}
