//! The read/reply loop.

use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use convoke::{ModelClient, Session};

/// Runs the REPL until the user types `exit` or closes the input.
///
/// Any session error is fatal: it is printed and the loop ends, the
/// transcript is not resumed.
///
/// # Errors
///
/// Returns an error if the line editor cannot be initialized.
pub async fn run<C: ModelClient>(mut session: Session<C>, model: &str) -> Result<()> {
    println!("{} ({model})", "convoke".bright_magenta().bold());
    println!("{}", "Type 'exit' or Ctrl-D to quit".dimmed());
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(&format!("{} ", ">".bright_green()));

        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }
                if line == "exit" {
                    println!("Exiting");
                    break;
                }

                let _ = rl.add_history_entry(line);

                match session.send(line).await {
                    Ok(reply) => {
                        println!("{} {reply}", "assistant:".bright_cyan().bold());
                    }
                    Err(e) => {
                        eprintln!("{} {e:#}", "Error:".bright_red());
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("Exiting");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    session.close();
    Ok(())
}
