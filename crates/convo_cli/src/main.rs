use std::io::{self, Write};
use std::sync::Arc;

use convo_cli::config::CliConfig;
use convo_cli::prompt::{read_stdin_line, TerminalTokenPrompt};
use convo_cli::repl::Repl;
use convo_engine::ConversationController;
use token_source::SilentThenInteractive;
use token_source_static::EnvTokenProvider;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = CliConfig::load().map_err(io::Error::other)?;
    let tokens = SilentThenInteractive::new(EnvTokenProvider::default(), TerminalTokenPrompt::stdin());
    let mut controller = ConversationController::from_config(config.api_config(), Arc::new(tokens))
        .map_err(io::Error::other)?;
    if let Some(time_zone) = &config.time_zone {
        controller = controller.with_time_zone(time_zone.clone());
    }

    let mut repl = Repl::new(controller);
    println!("connected to {} (type /help for commands)", config.endpoint);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = tokio::task::spawn_blocking(read_stdin_line)
            .await
            .map_err(io::Error::other)??;
        let Some(line) = line else {
            break;
        };

        let output = repl.handle_line(&line).await;
        for text in &output.stdout {
            println!("{text}");
        }
        for text in &output.stderr {
            eprintln!("{text}");
        }
        if output.quit {
            break;
        }
    }

    Ok(())
}
