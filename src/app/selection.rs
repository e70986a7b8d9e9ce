//! Interactive marking of ledger rows
//!
//! For each search term the operator sees a numbered table of that term's
//! rows and picks one of six marking options. Input comes through the
//! [`Prompt`] trait so the flow runs the same against a terminal or a script.

use std::collections::VecDeque;

use tracing::{info, warn};

use crate::app::ledger::{Ledger, Selection};
use crate::errors::{PromptError, PromptResult, Result};

/// Source of answers to interactive questions
pub trait Prompt {
    /// Ask a question and return the answer with surrounding whitespace removed
    fn ask(&mut self, question: &str) -> PromptResult<String>;
}

/// Prompt that replays a fixed list of answers
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    /// Create a prompt that answers in the given order
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> PromptResult<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| PromptError::InputClosed {
                question: question.to_string(),
            })
    }
}

/// Marking menu shown for every search term
pub const MENU: &str = "\
Select files to download:
  1. All
  2. None
  3. IDs (inclusive)
  4. IDs (exclusive)
  5. Keyword (inclusive)
  6. Keyword (exclusive)";

const CHOICE_QUESTION: &str = "Enter your choice (1-6): ";
const IDS_QUESTION: &str = "Enter IDs separated by commas: ";
const KEYWORD_QUESTION: &str = "Enter keyword: ";
const TERMS_QUESTION: &str = "Enter search terms separated by commas: ";

/// Parse a comma-separated list of show item IDs
///
/// Blank entries are ignored. Returns `None` if any entry is not a number or
/// the list is empty.
pub fn parse_id_list(input: &str) -> Option<Vec<u32>> {
    let ids = input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Split a comma-separated answer into trimmed, non-empty search terms
pub fn parse_search_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask for search terms
pub fn prompt_search_terms<P: Prompt + ?Sized>(prompt: &mut P) -> PromptResult<Vec<String>> {
    let answer = prompt.ask(TERMS_QUESTION)?;
    Ok(parse_search_terms(&answer))
}

/// Table of one partition's rows: show item ID, name and size in MB
pub fn render_partition_table(ledger: &Ledger, term: &str) -> String {
    let rows: Vec<(String, &str, String)> = ledger
        .partition(term)
        .map(|row| {
            let size = row
                .metadata
                .size_mb()
                .map(|mb| format!("{:.2}", mb))
                .unwrap_or_else(|| "-".to_string());
            (row.result.show_item_id.to_string(), row.result.name.as_str(), size)
        })
        .collect();

    let id_width = rows.iter().map(|row| row.0.len()).max().unwrap_or(0).max(2);
    let name_width = rows
        .iter()
        .map(|row| row.1.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut table = format!(
        "{:>id_width$}  {:<name_width$}  {:>9}\n",
        "ID",
        "Name",
        "Size (MB)",
        id_width = id_width,
        name_width = name_width
    );
    for (id, name, size) in rows {
        table.push_str(&format!(
            "{:>id_width$}  {:<name_width$}  {:>9}\n",
            id,
            name,
            size,
            id_width = id_width,
            name_width = name_width
        ));
    }
    table
}

/// Read one selection from the prompt
///
/// Returns `Ok(None)` for an invalid menu choice or ID list.
pub fn read_selection<P: Prompt + ?Sized>(prompt: &mut P) -> PromptResult<Option<Selection>> {
    let choice = prompt.ask(CHOICE_QUESTION)?;

    let selection = match choice.as_str() {
        "1" => Some(Selection::All),
        "2" => Some(Selection::None),
        "3" | "4" => {
            let answer = prompt.ask(IDS_QUESTION)?;
            match parse_id_list(&answer) {
                Some(ids) if choice == "3" => Some(Selection::IncludeIds(ids)),
                Some(ids) => Some(Selection::ExcludeIds(ids)),
                None => {
                    warn!("Invalid ID list '{}'", answer);
                    None
                }
            }
        }
        "5" => Some(Selection::IncludeKeyword(prompt.ask(KEYWORD_QUESTION)?)),
        "6" => Some(Selection::ExcludeKeyword(prompt.ask(KEYWORD_QUESTION)?)),
        other => {
            warn!("Invalid choice '{}'", other);
            None
        }
    };

    Ok(selection)
}

/// Walk every search term and let the operator mark rows for download
///
/// An invalid answer leaves that term's rows as they were.
pub fn review_and_mark<P: Prompt + ?Sized>(ledger: &mut Ledger, prompt: &mut P) -> Result<()> {
    for term in ledger.terms() {
        println!();
        println!("📋 Results for '{}':", term);
        print!("{}", render_partition_table(ledger, &term));
        println!();
        println!("{}", MENU);

        match read_selection(prompt)? {
            Some(selection) => {
                let marked = ledger.mark(&term, &selection);
                info!("Marked {} files for '{}'", marked, term);
            }
            None => {
                println!("❌ Invalid selection. No changes made for '{}'.", term);
            }
        }
    }

    Ok(())
}
