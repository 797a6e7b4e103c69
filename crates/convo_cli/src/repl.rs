use convo_engine::{ConversationController, TurnOutcome};
use log::debug;

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::render::unseen_replies;

/// Lines to print after handling one input line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub quit: bool,
}

/// Line-oriented front end over one [`ConversationController`].
#[derive(Debug)]
pub struct Repl {
    controller: ConversationController,
    printed: usize,
}

impl Repl {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            controller,
            printed: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub async fn handle_line(&mut self, line: &str) -> ReplOutput {
        let mut output = ReplOutput::default();

        match parse_slash_command(line) {
            Some(SlashCommand::Help) => output.stdout.push(HELP_TEXT.to_string()),
            Some(SlashCommand::Reset) => {
                self.controller.reset();
                self.printed = 0;
                output.stdout.push("started a new conversation".to_string());
            }
            Some(SlashCommand::Session) => output.stdout.push(
                self.controller
                    .session_id()
                    .unwrap_or("(no conversation yet)")
                    .to_string(),
            ),
            Some(SlashCommand::Quit) => output.quit = true,
            Some(SlashCommand::Unknown(command)) => output
                .stderr
                .push(format!("unknown command {command}; try /help")),
            None => self.submit(line, &mut output).await,
        }

        output
    }

    async fn submit(&mut self, line: &str, output: &mut ReplOutput) {
        let outcome = self.controller.submit(line).await;
        if matches!(outcome, TurnOutcome::Ignored) {
            return;
        }

        output
            .stdout
            .extend(unseen_replies(self.controller.messages(), self.printed));
        self.printed = self.controller.messages().len();

        if let TurnOutcome::Failed(error) = &outcome {
            debug!("turn failed: {error:?}");
            output.stderr.push(format!("error: {error}"));
        }
    }
}
