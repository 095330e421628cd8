//! Interactive table view driven by a `ListController`.

use anyhow::Result;
use client_core::{ListController, PageSource};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::{print_list_state, Row};

const HELP: &str = "n next | p prev | g <page> | /<term> search (/ clears) | r refresh | q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    Goto(u32),
    Search(String),
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

fn parse_action(line: &str) -> Action {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Action::Search(term.to_string());
    }
    match line.split_once(char::is_whitespace) {
        Some(("g", page)) => match page.trim().parse() {
            Ok(page) => Action::Goto(page),
            Err(_) => Action::Unknown(line.to_string()),
        },
        _ => match line {
            "n" => Action::Next,
            "p" => Action::Prev,
            "r" | "" => Action::Refresh,
            "?" | "h" => Action::Help,
            "q" => Action::Quit,
            other => Action::Unknown(other.to_string()),
        },
    }
}

pub async fn run<S>(controller: ListController<S>) -> Result<()>
where
    S: PageSource,
    S::Item: Row,
{
    let mut updates = controller.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if !state.loading {
                print_list_state(&state);
                println!("{HELP}");
            }
        }
    });

    controller.refresh().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_action(&line) {
            Action::Next => {
                if !controller.next_page().await {
                    println!("already on the last page");
                }
            }
            Action::Prev => {
                if !controller.prev_page().await {
                    println!("already on the first page");
                }
            }
            Action::Goto(page) => {
                if !controller.set_page(page).await {
                    let total = controller.snapshot().total_pages;
                    println!("page must be between 1 and {total}");
                }
            }
            Action::Search(term) => {
                if let Err(err) = controller.set_search(term).await {
                    println!("{}", err.user_message());
                }
            }
            Action::Refresh => controller.refresh().await,
            Action::Help => println!("{HELP}"),
            Action::Quit => break,
            Action::Unknown(input) => println!("unknown command '{input}'; {HELP}"),
        }
    }

    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_search() {
        assert_eq!(parse_action("n"), Action::Next);
        assert_eq!(parse_action(" p "), Action::Prev);
        assert_eq!(parse_action("g 4"), Action::Goto(4));
        assert_eq!(parse_action("/ana lopez"), Action::Search("ana lopez".into()));
        assert_eq!(parse_action("/"), Action::Search(String::new()));
        assert_eq!(parse_action(""), Action::Refresh);
        assert_eq!(parse_action("q"), Action::Quit);
        assert_eq!(parse_action("g x"), Action::Unknown("g x".into()));
        assert_eq!(parse_action("zz"), Action::Unknown("zz".into()));
    }
}
