use crate::errors::{AppError, AppResult};
use crate::ui::calendar::use_color;
use ansi_term::Colour;
use regex::Regex;
use rusqlite::Connection;

const OP_WIDTH_MAX: usize = 60;

fn color_for_operation(op: &str) -> Colour {
    match op {
        "punch_in" => Colour::Green,
        "punch_out" => Colour::Cyan,
        "regularize" => Colour::Yellow,
        "approve" => Colour::Blue,
        "reject" => Colour::Red,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

struct Entry {
    id: i64,
    date: String,
    operation: String,
    target: String,
    message: String,
}

pub struct LogLogic;

impl LogLogic {
    /// Audit trail lines, oldest first, ready for the terminal.
    pub fn render(conn: &Connection, color: bool) -> AppResult<Vec<String>> {
        let ansi = Regex::new(r"\x1B\[[0-9;]*[mK]").map_err(|e| AppError::Other(e.to_string()))?;
        let visible_len = |s: &str| ansi.replace_all(s, "").chars().count();

        let mut stmt = conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let entries = stmt
            .query_map([], |row| {
                let raw_date: String = row.get(1)?;
                let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                    .map(|dt| dt.format("%F %T").to_string())
                    .unwrap_or(raw_date);

                Ok(Entry {
                    id: row.get(0)?,
                    date,
                    operation: row.get(2)?,
                    target: row.get(3)?,
                    message: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let id_w = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);
        let op_w = entries
            .iter()
            .map(|e| e.operation.len() + e.target.len() + 3)
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);

        let mut lines = Vec::with_capacity(entries.len());

        for e in entries {
            let colour = color_for_operation(&e.operation);

            let mut plain = if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, e.target)
            };
            if plain.chars().count() > OP_WIDTH_MAX {
                plain = plain.chars().take(OP_WIDTH_MAX - 3).collect::<String>() + "...";
            }

            // only the operation word is coloured
            let colored = match plain.split_once(' ') {
                _ if !color => plain.clone(),
                Some((op, rest)) => format!("{} {}", colour.paint(op), rest),
                None => colour.paint(plain.as_str()).to_string(),
            };
            let padding = " ".repeat(op_w.saturating_sub(visible_len(&colored)));

            lines.push(format!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id, e.date, colored, padding, e.message
            ));
        }

        Ok(lines)
    }

    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let lines = Self::render(conn, use_color())?;
        if lines.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        println!("📜 Internal log:\n");
        for line in lines {
            println!("{line}");
        }
        Ok(())
    }
}
