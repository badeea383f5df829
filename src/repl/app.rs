use crate::calc::{Calculator, CalculatorError, OperationKind};
use crate::repl::handlers::{CommandHandler, ReplAction, parse_operand};
use crate::repl::ui::{self, Painter};
use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;

/// Reads commands line by line and drives a `Calculator`. Calculator
/// errors are printed and the loop carries on; only I/O on the terminal
/// itself ends the session with an error.
pub struct Repl<R, W> {
    calculator: Calculator,
    input: R,
    output: W,
    painter: Painter,
    pub should_quit: bool,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(calculator: Calculator, input: R, output: W, painter: Painter) -> Self {
        Self {
            calculator,
            input,
            output,
            painter,
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "{}",
            self.painter
                .heading("Calculator started. Type 'help' for commands.")
        )?;

        while !self.should_quit {
            let Some(line) = self.prompt("\nEnter command: ")? else {
                writeln!(self.output, "\nInput terminated. Exiting...")?;
                self.save_on_exit()?;
                break;
            };
            self.handle_line(&line)?;
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        let action = CommandHandler::parse(line);
        debug!(?action, "repl command");

        match action {
            ReplAction::None => {}
            ReplAction::Help => {
                for line in ui::help_lines(&self.painter) {
                    writeln!(self.output, "{}", line)?;
                }
            }
            ReplAction::Exit => {
                self.save_on_exit()?;
                writeln!(self.output, "Goodbye!")?;
                self.should_quit = true;
            }
            ReplAction::History => self.show_history()?,
            ReplAction::Clear => {
                if self.calculator.history().is_empty() {
                    self.warn("No history to clear")?;
                } else {
                    self.calculator.clear_history();
                    self.succeed("History cleared")?;
                }
            }
            ReplAction::Undo => match self.calculator.undo() {
                Ok(()) => self.succeed("Operation undone")?,
                Err(e) => self.warn(&e.to_string())?,
            },
            ReplAction::Redo => match self.calculator.redo() {
                Ok(()) => self.succeed("Operation redone")?,
                Err(e) => self.warn(&e.to_string())?,
            },
            ReplAction::Save => match self.calculator.save_history() {
                Ok(()) => self.succeed("History saved successfully")?,
                Err(e) => self.fail(&e)?,
            },
            ReplAction::Load => match self.calculator.load_history() {
                Ok(count) => {
                    self.succeed(&format!("Loaded {} calculations from history", count))?
                }
                Err(e) => self.fail(&e)?,
            },
            ReplAction::Calculate(kind) => self.perform_calculation(kind)?,
            ReplAction::Unknown(command) => {
                let message = format!(
                    "Unknown command: '{}'. Type 'help' for available commands.",
                    command
                );
                self.warn(&message)?;
            }
        }
        Ok(())
    }

    fn perform_calculation(&mut self, kind: OperationKind) -> Result<()> {
        writeln!(self.output, "\nEnter numbers (or 'cancel' to abort):")?;

        let Some(first) = self.read_operand("First number: ")? else {
            return Ok(());
        };
        let Some(second) = self.read_operand("Second number: ")? else {
            return Ok(());
        };

        let outcome = parse_operand(&first).and_then(|a| {
            let b = parse_operand(&second)?;
            self.calculator.execute(kind.id(), a, b)
        });

        match outcome {
            Ok(calculation) => {
                let precision = self.calculator.config().precision;
                writeln!(
                    self.output,
                    "\n{}",
                    self.painter.success(&ui::render_result(&calculation, precision))
                )?;
            }
            Err(e) => {
                self.fail(&e)?;
                if matches!(e, CalculatorError::InvalidInput(_)) {
                    writeln!(self.output, "Please enter valid numbers (e.g., 10, 3.14, -5)")?;
                } else if kind.is_division_family() && e == CalculatorError::DivisionByZero {
                    writeln!(self.output, "Tip: {} needs a non-zero second number", kind)?;
                } else {
                    writeln!(
                        self.output,
                        "Tip: Type 'cancel' during input to abort, or 'help' for commands"
                    )?;
                }
            }
        }

        for failure in self.calculator.take_observer_failures() {
            let message = format!("Warning: {} failed: {}", failure.observer, failure.message);
            writeln!(self.output, "{}", self.painter.warning(&message))?;
        }
        Ok(())
    }

    fn show_history(&mut self) -> Result<()> {
        let history = self.calculator.history();
        if history.is_empty() {
            writeln!(self.output, "No calculations in history")?;
            return Ok(());
        }

        let lines = ui::render_history(history, self.calculator.config().precision);
        writeln!(self.output, "\n{}", self.painter.heading("Calculation History:"))?;
        for line in lines {
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    fn save_on_exit(&mut self) -> Result<()> {
        match self.calculator.save_history() {
            Ok(()) => self.succeed("History saved successfully."),
            Err(e) => self.warn(&format!("Warning: Could not save history: {}", e)),
        }
    }

    /// `None` on end of input or when the user cancels.
    fn read_operand(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.prompt(prompt)? {
            Some(value) if CommandHandler::is_cancel(&value) => {
                writeln!(self.output, "Operation cancelled")?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn succeed(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", self.painter.success(message))?;
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", self.painter.warning(message))?;
        Ok(())
    }

    fn fail(&mut self, error: &CalculatorError) -> Result<()> {
        writeln!(self.output, "{}", self.painter.error(&format!("Error: {}", error)))?;
        Ok(())
    }
}

#[cfg(test)]
impl<R, W> Repl<R, W> {
    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn output(&self) -> &W {
        &self.output
    }
}
