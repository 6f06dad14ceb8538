use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io::print_info;

/// Any non-empty value switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "DUO_LEDGER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = match std::env::var_os(SCRIPT_ENV) {
        Some(value) if !value.is_empty() => CliMode::Script,
        _ => CliMode::Interactive,
    };

    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_usages())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    print_info(format!(
        "Duo Ledger shell, viewing {} ({}). Type `help` for commands.",
        context.period, context.policy
    ));

    while context.running {
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                print_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        editor.add_history_entry(trimmed).ok();
        if execute(context, trimmed)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if execute(context, trimmed)? == LoopControl::Exit || !context.running {
            break;
        }
    }
    Ok(())
}

/// Runs one line; command failures are reported and the loop carries on.
fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match handle_line(context, line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            context.print_warning(&err.message);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.last_command = Some(line.to_string());

    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Completes command words and hints at their usage once one is typed.
struct CommandHelper {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandHelper {
    fn new(mut commands: Vec<(&'static str, &'static str)>) -> Self {
        commands.sort_by_key(|(name, _)| *name);
        commands.dedup_by_key(|(name, _)| *name);
        Self { commands }
    }

    fn usage(&self, name: &str) -> Option<&'static str> {
        self.commands
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, usage)| *usage)
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        let start = typed.len() - typed.trim_start().len();
        let word = &typed[start..];
        if word.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let needle = word.to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|(name, _)| name.starts_with(&needle))
            .map(|(name, usage)| Pair {
                display: format!("{name:<16} {usage}"),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        // Only right after `<command> `, before any argument is typed.
        let name = line.trim_start().strip_suffix(' ')?;
        if name.contains(char::is_whitespace) {
            return None;
        }
        let usage = self.usage(name)?;
        let arguments = usage.split_once(' ').map(|(_, rest)| rest)?;
        Some(arguments.to_string())
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for CommandHelper {
    /// An open quote keeps the line going instead of submitting it.
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        match parse_command_line(ctx.input()) {
            Ok(_) => Ok(ValidationResult::Valid(None)),
            Err(_) => Ok(ValidationResult::Incomplete),
        }
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    shell_words::split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines_respect_quotes() {
        let tokens = parse_command_line("add 2025-02-07 \"Store X\" '1.000,00' alex").unwrap();
        assert_eq!(tokens, vec!["add", "2025-02-07", "Store X", "1.000,00", "alex"]);
        assert!(parse_command_line("add \"unterminated").is_err());
    }

    #[test]
    fn helper_dedups_and_finds_usage() {
        let helper = CommandHelper::new(vec![
            ("summary", "summary [--json]"),
            ("add", "add <date>"),
            ("summary", "summary [--json]"),
        ]);
        assert_eq!(helper.commands.len(), 2);
        assert_eq!(helper.commands[0].0, "add");
        assert_eq!(helper.usage("SUMMARY"), Some("summary [--json]"));
        assert_eq!(helper.usage("missing"), None);
    }
}
