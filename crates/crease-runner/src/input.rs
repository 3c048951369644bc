use crease_sim::TickInput;

/// A line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Attack,
    Defend,
    Quit,
}

/// Map a stdin line to a command. A line of only spaces is an attacking swing.
pub fn parse_command(line: &str) -> Option<Command> {
    if !line.is_empty() && line.chars().all(|c| c == ' ') {
        return Some(Command::Attack);
    }
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "w" => Some(Command::Attack),
        "d" | "s" => Some(Command::Defend),
        "q" => Some(Command::Quit),
        _ => None,
    }
}

/// Fold a command into the triggers for the next tick.
pub fn merge(input: &mut TickInput, command: Command) {
    match command {
        Command::Attack => input.attack = true,
        Command::Defend => input.defend = true,
        Command::Quit => {},
    }
}
