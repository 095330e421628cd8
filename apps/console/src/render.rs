//! Plain-text tables for the terminal, or JSON with `--json`.

use anyhow::Result;
use client_core::ListState;
use serde::Serialize;
use shared::{
    domain::{Client, ClientNote, Payment, Policy},
    protocol::Page,
};

/// One line of a table view.
pub trait Row {
    const HEADER: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl Row for Client {
    const HEADER: &'static [&'static str] = &["ID", "NAME", "PHONE", "EMAIL", "AGE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name(),
            self.details.phone.clone(),
            self.details.email.clone(),
            self.age.map(|age| age.to_string()).unwrap_or_default(),
        ]
    }
}

impl Row for Policy {
    const HEADER: &'static [&'static str] =
        &["ID", "TYPE", "INSURED", "PREMIUM", "FROM", "TO", "FREQUENCY"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.terms.insurance_type.clone(),
            self.terms.insured.clone(),
            self.terms.net_premium.to_string(),
            self.terms.valid_from.to_string(),
            self.terms.valid_to.to_string(),
            self.terms.payment_frequency.to_string(),
        ]
    }
}

impl Row for Payment {
    const HEADER: &'static [&'static str] = &["ID", "POLICY", "CLIENT", "DATE", "AMOUNT", "STATUS"];

    fn cells(&self) -> Vec<String> {
        let client = match (&self.client_name, &self.client_last_name) {
            (Some(name), Some(last)) => format!("{name} {last}"),
            (Some(name), None) => name.clone(),
            _ => String::new(),
        };
        vec![
            self.id.to_string(),
            self.policy_id.to_string(),
            client,
            self.details.payment_date.to_string(),
            self.details.amount.to_string(),
            self.details.status.to_string(),
        ]
    }
}

impl Row for ClientNote {
    const HEADER: &'static [&'static str] = &["ID", "CREATED", "NOTE"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            self.content.clone(),
        ]
    }
}

pub fn table<T: Row>(rows: &[T]) -> String {
    let body: Vec<Vec<String>> = rows.iter().map(Row::cells).collect();
    let mut widths: Vec<usize> = T::HEADER.iter().map(|h| h.len()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = T::HEADER.iter().map(|h| h.to_string()).collect();
    let mut out = vec![line(header.as_slice())];
    out.extend(body.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}

pub fn footer(page: u32, total_pages: u32, total_items: Option<u64>) -> String {
    match total_items {
        Some(total) => format!("page {page}/{total_pages} ({total} records)"),
        None => format!("page {page}/{total_pages}"),
    }
}

pub fn print_page<T: Row + Serialize>(page: &Page<T>, json: bool) -> Result<()> {
    if json {
        return print_json(page);
    }
    if page.items.is_empty() {
        println!("no records");
    } else {
        println!("{}", table(&page.items));
    }
    println!(
        "{}",
        footer(page.current_page, page.total_pages, page.total_items)
    );
    Ok(())
}

pub fn print_rows<T: Row + Serialize>(rows: &[T], json: bool) -> Result<()> {
    if json {
        return print_json(rows);
    }
    if rows.is_empty() {
        println!("no records");
    } else {
        println!("{}", table(rows));
    }
    Ok(())
}

pub fn print_list_state<T: Row>(state: &ListState<T>) {
    if let Some(error) = &state.error {
        println!("error: {error}");
        return;
    }
    if !state.search.trim().is_empty() {
        println!("search: {}", state.search.trim());
    }
    if state.items.is_empty() {
        println!("no records");
    } else {
        println!("{}", table(&state.items));
    }
    println!(
        "{}",
        footer(state.page, state.total_pages, state.total_items)
    );
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
