use std::collections::HashMap;

use serenity::all::Command;

/* Command-name to application-command-ID table, so messages can render
 * clickable slash-command mentions. Loaded once from the registration
 * response at startup; read-only from then on. */
pub struct CommandMentions {
    ids: HashMap<String, u64>,
}

impl CommandMentions {
    pub fn new(commands: &[Command]) -> Self {
        CommandMentions {
            ids: commands
                .iter()
                .map(|command| (command.name.clone(), command.id.get()))
                .collect(),
        }
    }

    pub fn mention(&self, name: &str) -> String {
        match self.ids.get(name) {
            Some(id) => format!("</{}:{}>", name, id),
            None => format!("`/{}`", name),
        }
    }
}
