use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::debug;
use token_source::{TokenError, TokenProvider};

type LineReader = dyn Fn() -> io::Result<Option<String>> + Send + Sync;

/// Interactive token phase: asks on the terminal for a bearer token.
///
/// The first token entered is kept for the rest of the process, so later turns
/// do not prompt again.
pub struct TerminalTokenPrompt {
    read_line: Arc<LineReader>,
    remembered: Mutex<Option<String>>,
}

impl TerminalTokenPrompt {
    /// Prompt on stderr and read the answer from stdin.
    #[must_use]
    pub fn stdin() -> Self {
        Self::with_reader(|| {
            eprint!("access token (empty to cancel): ");
            io::stderr().flush()?;
            read_stdin_line()
        })
    }

    pub fn with_reader(
        read_line: impl Fn() -> io::Result<Option<String>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            read_line: Arc::new(read_line),
            remembered: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenProvider for TerminalTokenPrompt {
    async fn acquire_token(&self) -> Result<Option<String>, TokenError> {
        if let Some(token) = lock_unpoisoned(&self.remembered).clone() {
            return Ok(Some(token));
        }

        let read_line = Arc::clone(&self.read_line);
        let line = tokio::task::spawn_blocking(move || read_line())
            .await
            .map_err(|error| TokenError::failed(format!("token prompt aborted: {error}")))?
            .map_err(|error| TokenError::failed(format!("failed to read token: {error}")))?;

        let Some(token) = line.map(|line| line.trim().to_string()) else {
            return Err(TokenError::Cancelled);
        };
        if token.is_empty() {
            return Err(TokenError::Cancelled);
        }

        debug!("access token entered interactively");
        *lock_unpoisoned(&self.remembered) = Some(token.clone());
        Ok(Some(token))
    }
}

/// One line from stdin without its terminator; `None` at end of input.
pub fn read_stdin_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
