use std::borrow::Cow::{self, Borrowed, Owned};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use pinechat_application::{ChatSession, InsightsService};
use pinechat_core::insights::PanelView;
use pinechat_core::merchant::MerchantContext;

use crate::render;

/// Slash commands with their argument hint.
const COMMANDS: &[(&str, &str)] = &[
    ("/search", " <text>"),
    ("/toggle", ""),
    ("/clear", ""),
    ("/insights", ""),
    ("/refresh", ""),
    ("/help", ""),
];

const SEARCH_PREFIX: &str = "/search ";
const MIN_WORD_LEN: usize = 3;

/// rustyline helper: completes slash commands and, after `/search`, words
/// already seen in the conversation.
#[derive(Clone, Default)]
struct ChatHelper {
    vocabulary: Arc<Mutex<BTreeSet<String>>>,
}

impl ChatHelper {
    /// Adds the words of `text` to the `/search` completions.
    fn remember(&self, text: &str) {
        let Ok(mut vocabulary) = self.vocabulary.lock() else {
            return;
        };
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        {
            vocabulary.insert(word.to_lowercase());
        }
    }

    fn words_starting_with(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        match self.vocabulary.lock() {
            Ok(vocabulary) => vocabulary
                .range(prefix.clone()..)
                .take_while(|w| w.starts_with(&prefix))
                .filter(|w| w.len() > prefix.len())
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Start offset and candidates for the text before the cursor.
    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if let Some(query) = line.strip_prefix(SEARCH_PREFIX) {
            let start = query.rfind(' ').map_or(0, |i| i + 1);
            let word = &query[start..];
            if word.is_empty() {
                return (line.len(), Vec::new());
            }
            return (SEARCH_PREFIX.len() + start, self.words_starting_with(word));
        }
        if line.starts_with('/') && !line.contains(' ') {
            let commands = COMMANDS
                .iter()
                .map(|(cmd, _)| *cmd)
                .filter(|cmd| cmd.starts_with(line))
                .map(str::to_string)
                .collect();
            return (0, commands);
        }
        (line.len(), Vec::new())
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let (command, rest) = line.split_once(' ').map_or((line, ""), |(c, r)| (c, r));
        let command = if COMMANDS.iter().any(|(cmd, _)| *cmd == command) {
            command.bright_cyan()
        } else {
            command.yellow()
        };
        if line.contains(' ') {
            Owned(format!("{} {}", command, rest))
        } else {
            Owned(command.to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        if let Some((_, usage)) = COMMANDS.iter().find(|(cmd, _)| *cmd == line) {
            return (!usage.is_empty()).then(|| usage.to_string());
        }
        let (start, candidates) = self.candidates(line);
        let typed = line.len() - start;
        candidates
            .first()
            .filter(|c| c.len() > typed)
            .map(|c| c[typed..].to_string())
    }
}

impl Validator for ChatHelper {}

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Quit,
    Help,
    Search(&'a str),
    ToggleSearch,
    ClearSearch,
    Insights,
    Refresh,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return Input::Quit;
    }
    if !trimmed.starts_with('/') {
        return Input::Question(trimmed);
    }

    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    match command {
        "/search" => Input::Search(rest),
        "/toggle" => Input::ToggleSearch,
        "/clear" => Input::ClearSearch,
        "/insights" => Input::Insights,
        "/refresh" => Input::Refresh,
        "/help" => Input::Help,
        other => Input::Unknown(other),
    }
}

fn print_help() {
    println!("{}", "Type a question to ask the assistant.".bright_black());
    println!("{}", "  /search <text>  filter this conversation (empty text exits search)".bright_black());
    println!("{}", "  /toggle         open or close the search bar".bright_black());
    println!("{}", "  /clear          clear search results".bright_black());
    println!("{}", "  /insights       show the merchant insights panel".bright_black());
    println!("{}", "  /refresh        reload the insights panel".bright_black());
    println!("{}", "  quit            leave".bright_black());
}

async fn print_search_view(session: &ChatSession) {
    let snapshot = session.snapshot().await;
    match &snapshot.search_results {
        Some(results) => {
            println!(
                "{}",
                format!("{} matching message(s)", results.len()).bright_yellow()
            );
            for message in snapshot.visible_messages() {
                println!("{}", render::message(message));
            }
        }
        None => println!("{}", "Search cleared.".bright_black()),
    }
}

/// Prints the cached panel while nothing is loaded yet, then the fresh one.
async fn show_panel(insights: &InsightsService, merchant: &MerchantContext) {
    let cached = insights.cached_panel(merchant).await;
    if cached.view == PanelView::Loading {
        println!("{}", render::panel(&cached));
    }
    let panel = insights.load_panel(merchant).await;
    println!("{}", render::panel(&panel));
}

/// Runs the interactive chat loop until the user quits.
pub async fn run(session: Arc<ChatSession>, insights: InsightsService) -> Result<()> {
    let helper = ChatHelper::default();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper.clone()));

    println!("{}", "=== Pinechat Assistant ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Merchant: {}  Session: {}", session.merchant(), session.session_id()).bright_black()
    );
    println!("{}", "Type '/help' for commands or 'quit' to exit.".bright_black());
    println!();

    loop {
        let prompt = if session.snapshot().await.search_visible {
            "search> "
        } else {
            ">> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_input(&line) {
                    Input::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Input::Help => print_help(),
                    Input::Search(query) => {
                        session.search_messages(query).await;
                        print_search_view(&session).await;
                    }
                    Input::ToggleSearch => {
                        session.toggle_search().await;
                        let visible = session.snapshot().await.search_visible;
                        let state = if visible { "opened" } else { "closed" };
                        println!("{}", format!("Search {}.", state).bright_black());
                    }
                    Input::ClearSearch => {
                        session.clear_search().await;
                        println!("{}", "Search cleared.".bright_black());
                    }
                    Input::Insights => show_panel(&insights, session.merchant()).await,
                    Input::Refresh => {
                        insights.invalidate_merchant(session.merchant()).await;
                        show_panel(&insights, session.merchant()).await;
                    }
                    Input::Unknown(command) => {
                        println!("{}", format!("Unknown command: {}", command).yellow());
                    }
                    Input::Question(question) => {
                        println!("{}", "Assistant is typing...".bright_black());
                        let before = session.messages().await.len();
                        if session.send_message(question).await.is_ok() {
                            for message in session.messages().await.iter().skip(before) {
                                helper.remember(&message.content);
                                println!("{}", render::message(message));
                            }
                        } else if let Some(error) = session.error().await {
                            eprintln!("{}", format!("Error: {}", error).red());
                        }
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("quit"), Input::Quit);
        assert_eq!(parse_input(" exit "), Input::Quit);
        assert_eq!(parse_input("/search refund"), Input::Search("refund"));
        assert_eq!(parse_input("/search"), Input::Search(""));
        assert_eq!(parse_input("/toggle"), Input::ToggleSearch);
        assert_eq!(parse_input("/clear"), Input::ClearSearch);
        assert_eq!(parse_input("/insights"), Input::Insights);
        assert_eq!(parse_input("/refresh"), Input::Refresh);
        assert_eq!(parse_input("/frobnicate"), Input::Unknown("/frobnicate"));
    }

    #[test]
    fn test_plain_text_is_a_question() {
        assert_eq!(
            parse_input("What is my success rate?"),
            Input::Question("What is my success rate?")
        );
    }

    #[test]
    fn test_commands_complete_from_prefix() {
        let helper = ChatHelper::default();
        assert_eq!(helper.candidates("/se"), (0, vec!["/search".to_string()]));
        assert_eq!(helper.candidates("/zz"), (0, Vec::new()));
    }

    #[test]
    fn test_search_completes_conversation_words() {
        let helper = ChatHelper::default();
        helper.remember("Refunds process in 5 days.");
        helper.remember("What is my refund rate?");

        let (start, words) = helper.candidates("/search ref");
        assert_eq!(start, "/search ".len());
        assert_eq!(words, vec!["refund".to_string(), "refunds".to_string()]);

        let (start, words) = helper.candidates("/search refund pro");
        assert_eq!(start, "/search refund ".len());
        assert_eq!(words, vec!["process".to_string()]);

        // Short words are not remembered.
        assert!(helper.candidates("/search in").1.is_empty());
    }
}
