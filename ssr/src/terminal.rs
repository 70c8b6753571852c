use std::str::FromStr;
use std::sync::Arc;

use component::leaderboard::{
    filter::ParseTimeWindowError, local_filter::filter_by_user_id, FetchOutcome, FilterState,
    LeaderboardController, LeaderboardView, RankedEntry, RankingProvider, TimeWindow,
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  search <user id>   filter by user id, empty clears the search
  window <w>         time window: all, day, month, year
  more               load the next page
  recalc             fetch fresh rankings for the current filter
  find <user id>     look up a user among the loaded rows
  show               print the current table
  help               show this message
  quit               exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Window(TimeWindow),
    More,
    Recalculate,
    Find(String),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command, type `help` for a list")]
    Empty,
    #[error("unknown command {0:?}, type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Window(#[from] ParseTimeWindowError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, arg) = line
            .split_once(char::is_whitespace)
            .map(|(name, arg)| (name, arg.trim_start()))
            .unwrap_or((line, ""));

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "search" | "s" => Ok(Command::Search(arg.to_string())),
            "window" | "w" => Ok(Command::Window(arg.parse()?)),
            "more" | "m" => Ok(Command::More),
            "recalc" | "recalculate" => Ok(Command::Recalculate),
            "find" | "f" if arg.is_empty() => Err(CommandError::MissingArgument("find")),
            "find" | "f" => Ok(Command::Find(arg.to_string())),
            "show" | "ls" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn describe_filter(filter: &FilterState) -> String {
    if filter.search_term.is_empty() {
        filter.time_window.to_string()
    } else {
        format!("{}, user id {:?}", filter.time_window, filter.search_term)
    }
}

/// Table of entries, `*` marks the highlighted user.
pub fn render_rows<'a>(
    entries: impl IntoIterator<Item = &'a RankedEntry>,
    highlight_user: Option<i64>,
) -> String {
    let mut lines = vec![format!(
        "  {:>10}  {:<24}  {:>10}  {:>5}",
        "ID", "Name", "Points", "Rank"
    )];
    for entry in entries {
        let marker = if highlight_user == Some(entry.user_id) {
            '*'
        } else {
            ' '
        };
        lines.push(format!(
            "{marker} {:>10}  {:<24}  {:>10}  {:>5}",
            entry.user_id, entry.display_name, entry.total_points, entry.rank
        ));
    }
    lines.join("\n")
}

pub fn render_view(view: &LeaderboardView) -> String {
    let mut lines = vec![format!(
        "Leaderboard: {} (epoch {})",
        describe_filter(&view.committed_filter),
        view.epoch
    )];
    if view.commit_pending {
        lines.push(format!("Applying: {}", describe_filter(&view.filter)));
    }
    lines.push(render_rows(&view.entries, view.highlight_user));

    if let Some(err) = &view.last_error {
        lines.push(format!("Error: {err}"));
    } else if view.is_loading() {
        lines.push("Loading...".to_string());
    } else if view.entries.is_empty() {
        lines.push("No results".to_string());
    }

    if view.can_load_more() {
        lines.push("Type `more` to load more".to_string());
    } else if !view.page.has_more && !view.entries.is_empty() {
        lines.push("End of leaderboard".to_string());
    }
    lines.join("\n")
}

fn handle<P: RankingProvider>(controller: &Arc<LeaderboardController<P>>, command: Command) {
    match command {
        Command::Search(term) => {
            controller.set_search_term(term);
            println!("Searching: {}", describe_filter(&controller.snapshot().filter));
        }
        Command::Window(window) => {
            controller.set_time_window(window);
            println!("Time window: {window}");
        }
        Command::Recalculate => {
            controller.recalculate();
            println!("Recalculating...");
        }
        // Runs in the background so input stays live while the page loads;
        // results and errors are printed when the view updates
        Command::More => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                match controller.next_page().await {
                    Ok(FetchOutcome::Skipped) => println!("Nothing more to load"),
                    outcome => debug!("Next page: {outcome:?}"),
                }
            });
        }
        Command::Find(term) => {
            let view = controller.snapshot();
            let found = filter_by_user_id(&view.entries, &term);
            if found.is_empty() {
                println!("No loaded entry for user id {term:?}");
            } else {
                println!("{}", render_rows(found, view.highlight_user));
            }
        }
        Command::Show => println!("{}", render_view(&controller.snapshot())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

/// Read commands from stdin and reprint the table whenever a response lands.
pub async fn run<P: RankingProvider>(controller: LeaderboardController<P>) -> std::io::Result<()> {
    let controller = Arc::new(controller);
    let mut views = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut shown = {
        let view = views.borrow_and_update();
        println!("{}", render_view(&view));
        view.responses_applied
    };
    println!("Type `help` for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(&controller, command),
                    Err(CommandError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if view.responses_applied != shown {
                    shown = view.responses_applied;
                    println!("{}", render_view(&view));
                }
            }
        }
    }

    info!("Leaving leaderboard");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use component::leaderboard::{
        Epoch, FetchStatus, LeaderboardConfig, LeaderboardError, PageState, RankedPage,
        RankingQuery,
    };

    use super::*;

    /// Serves the first page of every epoch, never answers later pages.
    struct StallsAfterFirstPage;

    impl RankingProvider for StallsAfterFirstPage {
        async fn fetch_page(&self, query: &RankingQuery) -> Result<RankedPage, LeaderboardError> {
            if query.page.offset > 0 {
                std::future::pending::<()>().await;
            }
            Ok(vec![entry(1, 1), entry(2, 2)].into())
        }
    }

    fn entry(user_id: i64, rank: u32) -> RankedEntry {
        RankedEntry {
            user_id,
            display_name: format!("user-{user_id}"),
            total_points: 100.0 - rank as f64,
            rank,
        }
    }

    fn view(entries: Vec<RankedEntry>, has_more: bool) -> LeaderboardView {
        LeaderboardView {
            filter: FilterState::default(),
            committed_filter: FilterState::default(),
            commit_pending: false,
            epoch: Epoch(1),
            entries,
            page: PageState {
                offset: 5,
                limit: 5,
                has_more,
            },
            status: FetchStatus::Loaded,
            last_error: None,
            responses_applied: 1,
            highlight_user: Some(7),
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!("search 12".parse::<Command>(), Ok(Command::Search("12".into())));
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(String::new())));
        assert_eq!(" W month ".parse::<Command>(), Ok(Command::Window(TimeWindow::Month)));
        assert_eq!("window all".parse::<Command>(), Ok(Command::Window(TimeWindow::None)));
        assert_eq!("more".parse::<Command>(), Ok(Command::More));
        assert_eq!("recalc".parse::<Command>(), Ok(Command::Recalculate));
        assert_eq!("find 7".parse::<Command>(), Ok(Command::Find("7".into())));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "jump".parse::<Command>(),
            Err(CommandError::Unknown("jump".into()))
        );
        assert_eq!(
            "find".parse::<Command>(),
            Err(CommandError::MissingArgument("find"))
        );
        assert!(matches!(
            "window week".parse::<Command>(),
            Err(CommandError::Window(_))
        ));
    }

    #[test]
    fn rows_mark_highlighted_user() {
        let entries = vec![entry(3, 1), entry(7, 2)];
        let table = render_rows(&entries, Some(7));
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("Points"));
        assert!(rows[1].starts_with(' '));
        assert!(rows[2].starts_with('*'));
        assert!(rows[2].contains("user-7"));
    }

    #[test]
    fn footer_reflects_page_state() {
        let more = render_view(&view(vec![entry(1, 1)], true));
        assert!(more.contains("Type `more` to load more"));

        let end = render_view(&view(vec![entry(1, 1)], false));
        assert!(end.ends_with("End of leaderboard"));

        let empty = render_view(&view(Vec::new(), false));
        assert!(empty.contains("No results"));
        assert!(!empty.contains("End of leaderboard"));
    }

    #[test]
    fn error_and_pending_filter_are_shown() {
        let mut failed = view(vec![entry(1, 1)], true);
        failed.status = FetchStatus::Failed;
        failed.last_error = Some(LeaderboardError::Timeout);
        failed.commit_pending = true;
        failed.filter = FilterState::new("42", TimeWindow::Day);

        let text = render_view(&failed);
        assert!(text.contains("Error: Request timed out"));
        assert!(text.contains("Applying: Day, user id \"42\""));
        assert!(text.starts_with("Leaderboard: All time (epoch 1)"));
    }

    #[tokio::test]
    async fn filter_change_is_accepted_while_a_page_loads() {
        let config = LeaderboardConfig {
            limit: 2,
            debounce: Duration::from_millis(10),
            ..LeaderboardConfig::default()
        };
        let controller = Arc::new(LeaderboardController::new(StallsAfterFirstPage, config));
        controller.reset().await.unwrap();
        let mut views = controller.subscribe();

        handle(&controller, Command::More);
        tokio::time::timeout(Duration::from_secs(1), views.wait_for(|v| v.is_loading()))
            .await
            .unwrap()
            .unwrap();

        handle(&controller, Command::Window(TimeWindow::Day));
        let view = tokio::time::timeout(
            Duration::from_secs(1),
            views.wait_for(|v| v.epoch == Epoch(2) && !v.is_loading()),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        assert_eq!(view.committed_filter.time_window, TimeWindow::Day);
        assert_eq!(view.entries.len(), 2);
        assert!(view.page.has_more);
    }
}
