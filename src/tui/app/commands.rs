#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommandInfo {
    pub name: &'static str,
    pub argument: Option<&'static str>,
    pub description: &'static str,
    pub takes_argument: bool,
}

impl SlashCommandInfo {
    const fn bare(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            argument: None,
            description,
            takes_argument: false,
        }
    }

    const fn with_arg(name: &'static str, argument: &'static str, description: &'static str) -> Self {
        Self {
            name,
            argument: Some(argument),
            description,
            takes_argument: true,
        }
    }

    #[must_use]
    pub fn usage(&self) -> String {
        match self.argument {
            Some(arg) => format!("{} {arg}", self.name),
            None => self.name.to_string(),
        }
    }
}

pub const SLASH_COMMANDS: &[SlashCommandInfo] = &[
    SlashCommandInfo::bare("/help", "Show this help message"),
    SlashCommandInfo::bare("/new", "Start a new conversation"),
    SlashCommandInfo::bare("/list", "List saved conversations"),
    SlashCommandInfo::with_arg("/open", "N", "Open conversation N"),
    SlashCommandInfo::with_arg("/delete", "N", "Delete conversation N"),
    SlashCommandInfo::with_arg("/rename", "T", "Rename the current conversation"),
    SlashCommandInfo::bare("/model", "Pick an installed model"),
    SlashCommandInfo::with_arg("/pull", "NAME", "Download a model"),
    SlashCommandInfo::with_arg("/run", "N", "Run code block N after confirmation"),
    SlashCommandInfo::with_arg("/exec", "CMD", "Run a shell command on the host"),
    SlashCommandInfo::with_arg("/rm", "N", "Delete message #N"),
    SlashCommandInfo::bare("/clear", "Clear the screen"),
    SlashCommandInfo::bare("/exit", "Exit the application"),
];

#[must_use]
pub fn help_text() -> String {
    let mut text = String::from("Available commands:");
    for command in SLASH_COMMANDS {
        text.push_str(&format!("\n{:<13} - {}", command.usage(), command.description));
    }
    text.push_str("\nEsc cancels a reply in progress.");
    text
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    New,
    List,
    Open(u64),
    Delete(u64),
    Rename(String),
    Model,
    Pull(String),
    Run(usize),
    Exec(String),
    Remove(u64),
    Clear,
    Exit,
    /// Known command with a missing or malformed argument.
    Usage(&'static SlashCommandInfo),
    Unknown(String),
}

impl SlashCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (cmd, rest) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(c, r)| (c, r.trim()));

        let usage = || {
            SLASH_COMMANDS
                .iter()
                .find(|c| c.name == cmd)
                .map_or_else(|| Self::Unknown(cmd.to_string()), Self::Usage)
        };
        let number = |build: fn(u64) -> Self| rest.parse().map_or_else(|_| usage(), build);
        let text = |build: fn(String) -> Self| {
            if rest.is_empty() {
                usage()
            } else {
                build(rest.to_string())
            }
        };

        match cmd {
            "/help" => Self::Help,
            "/new" => Self::New,
            "/list" => Self::List,
            "/open" => number(Self::Open),
            "/delete" => number(Self::Delete),
            "/rename" => text(Self::Rename),
            "/model" => Self::Model,
            "/pull" => text(Self::Pull),
            "/run" => rest.parse().map_or_else(|_| usage(), Self::Run),
            "/exec" => text(Self::Exec),
            "/rm" => number(Self::Remove),
            "/clear" => Self::Clear,
            "/exit" | "/quit" => Self::Exit,
            _ => Self::Unknown(cmd.to_string()),
        }
    }
}
