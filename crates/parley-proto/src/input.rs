//! Input classification: command lines vs chat payloads.
//!
//! A line whose first non-whitespace character is [`MARKER`] is a command;
//! the remainder is tokenized on whitespace into a lowercased name and its
//! arguments. Everything else is a chat payload, relayed as-is.

/// The leading character that distinguishes a command line from chat.
pub const MARKER: char = '#';

/// A parsed control command.
///
/// Produced by [`Input::parse`], never mutated. Argument lists may be empty;
/// arity checks belong to the handler, not the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lowercased command name, without the marker.
    pub name: String,
    /// Whitespace-separated arguments, in order.
    pub args: Vec<String>,
}

/// A classified line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A control command (`#name arg ...`).
    Command(Command),
    /// A chat payload, relayed verbatim.
    Chat(String),
}

impl Input {
    /// Classify a line (newline already stripped by the codec).
    ///
    /// Classification looks at the first non-whitespace character; chat
    /// payloads keep the line as given.
    pub fn parse(line: &str) -> Input {
        let trimmed = line.trim_start();
        match trimmed.strip_prefix(MARKER) {
            Some(rest) => {
                let mut tokens = rest.split_whitespace();
                let name = tokens.next().unwrap_or_default().to_ascii_lowercase();
                let args = tokens.map(str::to_string).collect();
                Input::Command(Command { name, args })
            }
            None => Input::Chat(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match Input::parse(line) {
            Input::Command(cmd) => cmd,
            Input::Chat(text) => panic!("expected command, got chat {text:?}"),
        }
    }

    #[test]
    fn test_chat_line() {
        assert_eq!(
            Input::parse("hello world"),
            Input::Chat("hello world".to_string())
        );
    }

    #[test]
    fn test_bare_command() {
        let cmd = command("#quit");
        assert_eq!(cmd.name, "quit");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_command_name_is_lowercased() {
        assert_eq!(command("#SetPort 5555").name, "setport");
    }

    #[test]
    fn test_command_args_preserve_order() {
        let cmd = command("#sethost chat.example.net fallback.example.net");
        assert_eq!(cmd.args, vec!["chat.example.net", "fallback.example.net"]);
    }

    #[test]
    fn test_leading_whitespace_still_classifies_as_command() {
        assert_eq!(command("   #stop").name, "stop");
    }

    #[test]
    fn test_extra_whitespace_between_tokens() {
        let cmd = command("#setport    6667");
        assert_eq!(cmd.args, vec!["6667"]);
    }

    #[test]
    fn test_marker_alone_yields_empty_name() {
        let cmd = command("#");
        assert!(cmd.name.is_empty());
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_marker_mid_line_is_chat() {
        assert_eq!(
            Input::parse("price is #42"),
            Input::Chat("price is #42".to_string())
        );
    }
}
