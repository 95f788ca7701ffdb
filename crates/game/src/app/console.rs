use std::collections::HashMap;
use std::fmt;

use hop_engine::{TuningEvent, TuningKey, TuningParam};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HoldDirection {
    Left,
    Right,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SimCommand {
    Hold(HoldDirection),
    Jump,
    Step { frames: u32 },
    Wait { seconds: f32 },
    Tune(TuningEvent),
    Key(TuningKey),
    SlowMotion { factor: f32 },
    Dump,
    ResetTuning,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LocalAction {
    Help,
    Echo { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedCommand {
    Local(LocalAction),
    Queueable(SimCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CommandParseError {
    reason: String,
    usage: String,
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.usage.is_empty() {
            f.write_str(&self.reason)
        } else {
            write!(f, "{}. usage: {}", self.reason, self.usage)
        }
    }
}

impl std::error::Error for CommandParseError {}

type ParseFn = fn(&[String]) -> Result<ParsedCommand, CommandParseError>;

pub(crate) struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: ParseFn,
}

pub(crate) struct ConsoleCommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl ConsoleCommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub(crate) fn with_builtins() -> Self {
        let builtins: [(&str, &str, &str, ParseFn); 12] = [
            ("help", "List commands", "", parse_help_command),
            ("echo", "Print text", "<text...>", parse_echo_command),
            (
                "hold",
                "Hold a direction until changed",
                "<dir:left|right|none>",
                parse_hold_command,
            ),
            ("jump", "Request a jump on the next tick", "", parse_jump_command),
            ("step", "Run simulation ticks", "<frames:u32>", parse_step_command),
            (
                "wait",
                "Feed wall-clock time through the frame clock",
                "<seconds:f32>",
                parse_wait_command,
            ),
            (
                "tune",
                "Adjust a physics constant",
                "<param:gravity|run_speed|jump_speed|stop_impulse> <delta:f32>",
                parse_tune_command,
            ),
            ("key", "Press a tuning debug key", "<key:U|J|I|K|O|L|P|;|G|F>", parse_key_command),
            ("slowmo", "Set slow-motion divisor", "<factor:f32>", parse_slowmo_command),
            ("dump", "Log body, animation and constants", "", parse_dump_command),
            ("reset", "Restore tuning baseline", "", parse_reset_command),
            ("quit", "Stop the run", "", parse_quit_command),
        ];

        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in builtins {
            if let Err(reason) = registry.register(name, help, arg_schema, parse) {
                unreachable!("built-in command registration failed: {reason}");
            }
        }
        registry
    }

    pub(crate) fn register(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: ParseFn,
    ) -> Result<(), String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse,
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    pub(crate) fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    pub(crate) fn iter_specs_in_order(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.specs.iter().map(|spec| {
            (
                spec.name.as_str(),
                spec.help.as_str(),
                spec.arg_schema.as_str(),
            )
        })
    }
}

/// Parses script/console lines. Local actions answer immediately into the
/// output buffer; simulation commands wait until the runner drains them
/// between frames.
pub(crate) struct ConsoleCommandProcessor {
    registry: ConsoleCommandRegistry,
    pending_sim_commands: Vec<SimCommand>,
    output_lines: Vec<String>,
}

impl Default for ConsoleCommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleCommandProcessor {
    pub(crate) fn new() -> Self {
        Self {
            registry: ConsoleCommandRegistry::with_builtins(),
            pending_sim_commands: Vec::new(),
            output_lines: Vec::new(),
        }
    }

    /// Blank lines and `#` comments are ignored.
    pub(crate) fn process_line(&mut self, raw_line: &str) -> Result<(), CommandParseError> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let tokens = tokenize_line(trimmed).map_err(|reason| CommandParseError {
            reason,
            usage: "help".to_string(),
        })?;
        let Some((command_name, args)) = tokens.split_first() else {
            return Ok(());
        };

        let Some(spec) = self.registry.lookup(command_name) else {
            return Err(CommandParseError {
                reason: format!("unknown command '{command_name}'"),
                usage: "help".to_string(),
            });
        };

        match (spec.parse)(args)? {
            ParsedCommand::Local(action) => self.apply_local_action(action),
            ParsedCommand::Queueable(command) => self.pending_sim_commands.push(command),
        }
        Ok(())
    }

    pub(crate) fn drain_pending_commands_into(&mut self, out: &mut Vec<SimCommand>) {
        out.extend(self.pending_sim_commands.drain(..));
    }

    pub(crate) fn take_output_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output_lines)
    }

    fn apply_local_action(&mut self, action: LocalAction) {
        match action {
            LocalAction::Help => {
                for (name, help, arg_schema) in self.registry.iter_specs_in_order() {
                    let line = if arg_schema.is_empty() {
                        format!("{name} - {help}")
                    } else {
                        format!("{name} {arg_schema} - {help}")
                    };
                    self.output_lines.push(line);
                }
            }
            LocalAction::Echo { text } => self.output_lines.push(text),
        }
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending_token {
                    tokens.push(std::mem::take(&mut current));
                    pending_token = false;
                }
            }
            _ => {
                current.push(ch);
                pending_token = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if pending_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_help_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Local(LocalAction::Help))
}

fn parse_echo_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    if args.is_empty() {
        return Err(CommandParseError {
            reason: "missing required argument <text...>".to_string(),
            usage: "echo <text...>".to_string(),
        });
    }
    Ok(ParsedCommand::Local(LocalAction::Echo {
        text: args.join(" "),
    }))
}

fn parse_hold_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "hold <left|right|none>";
    let [dir] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <dir>".to_string(),
            usage: usage.to_string(),
        });
    };
    let direction = match dir.to_ascii_lowercase().as_str() {
        "left" => HoldDirection::Left,
        "right" => HoldDirection::Right,
        "none" => HoldDirection::None,
        _ => {
            return Err(CommandParseError {
                reason: format!("unknown direction '{dir}' (expected left|right|none)"),
                usage: usage.to_string(),
            });
        }
    };
    Ok(ParsedCommand::Queueable(SimCommand::Hold(direction)))
}

fn parse_jump_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "jump")?;
    Ok(ParsedCommand::Queueable(SimCommand::Jump))
}

fn parse_step_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "step <frames>";
    let [raw] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <frames>".to_string(),
            usage: usage.to_string(),
        });
    };
    let frames = raw.parse::<u32>().map_err(|_| CommandParseError {
        reason: format!("invalid frame count '{raw}' (expected u32)"),
        usage: usage.to_string(),
    })?;
    Ok(ParsedCommand::Queueable(SimCommand::Step { frames }))
}

fn parse_wait_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "wait <seconds>";
    let [raw] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <seconds>".to_string(),
            usage: usage.to_string(),
        });
    };
    let seconds = parse_non_negative_f32(raw, "seconds", usage)?;
    Ok(ParsedCommand::Queueable(SimCommand::Wait { seconds }))
}

fn parse_tune_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "tune <param> <delta>";
    let [name, raw_delta] = args else {
        return Err(CommandParseError {
            reason: "expected <param> <delta>".to_string(),
            usage: usage.to_string(),
        });
    };
    let Some(param) = TuningParam::from_name(name) else {
        return Err(CommandParseError {
            reason: format!(
                "unknown tuning parameter '{name}' (expected gravity|run_speed|jump_speed|stop_impulse)"
            ),
            usage: usage.to_string(),
        });
    };
    let delta = raw_delta
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandParseError {
            reason: format!("invalid delta '{raw_delta}' (expected f32)"),
            usage: usage.to_string(),
        })?;
    Ok(ParsedCommand::Queueable(SimCommand::Tune(TuningEvent::new(
        param.as_name(),
        delta,
    ))))
}

fn parse_key_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "key <U|J|I|K|O|L|P|;|G|F>";
    let [name] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <key>".to_string(),
            usage: usage.to_string(),
        });
    };
    let key = TuningKey::from_key_name(name).ok_or_else(|| CommandParseError {
        reason: format!("unbound debug key '{name}'"),
        usage: usage.to_string(),
    })?;
    Ok(ParsedCommand::Queueable(SimCommand::Key(key)))
}

fn parse_slowmo_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "slowmo <factor>";
    let [raw] = args else {
        return Err(CommandParseError {
            reason: "expected exactly one argument <factor>".to_string(),
            usage: usage.to_string(),
        });
    };
    let factor = parse_non_negative_f32(raw, "factor", usage)?;
    if factor == 0.0 {
        return Err(CommandParseError {
            reason: "slow-motion factor must be > 0".to_string(),
            usage: usage.to_string(),
        });
    }
    Ok(ParsedCommand::Queueable(SimCommand::SlowMotion { factor }))
}

fn parse_dump_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "dump")?;
    Ok(ParsedCommand::Queueable(SimCommand::Dump))
}

fn parse_reset_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "reset")?;
    Ok(ParsedCommand::Queueable(SimCommand::ResetTuning))
}

fn parse_quit_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(ParsedCommand::Queueable(SimCommand::Quit))
}

fn parse_non_negative_f32(raw: &str, what: &str, usage: &str) -> Result<f32, CommandParseError> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| CommandParseError {
            reason: format!("invalid {what} '{raw}' (expected non-negative f32)"),
            usage: usage.to_string(),
        })
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError {
            reason: "unexpected extra arguments".to_string(),
            usage: usage.to_string(),
        })
    }
}
