//! Admin desk subcommands.

use anyhow::Context;
use log::info;
use lostfound_core::{
    AdminDesk, FoundItemForm, FoundRecord, LostRecord, MatchedItem, short_id,
};

fn lost_row(item: &LostRecord) -> String {
    format!(
        "#{}  {}  | {} | {} | {} | {}",
        short_id(&item.id),
        item.name,
        item.location,
        item.date,
        item.contact_info,
        item.status.label()
    )
}

fn found_row(item: &FoundRecord) -> String {
    format!(
        "#{}  {}  | {} | {} | {}",
        short_id(&item.id),
        item.name,
        item.location,
        item.date,
        item.status.label()
    )
}

fn match_row(matched: &MatchedItem) -> String {
    let assessment = &matched.assessment;
    format!(
        "{}  (score={}, name={}, location={})",
        found_row(&matched.item),
        assessment.score,
        assessment.type_match,
        assessment.location_match
    )
}

pub fn list_lost(desk: &AdminDesk, search: Option<&str>) {
    let items = desk.lost_items(search);
    info!("listing lost items (count={})", items.len());
    for item in &items {
        println!("{}", lost_row(item));
    }
    println!("{} lost report(s)", items.len());
}

pub fn list_found(desk: &AdminDesk, search: Option<&str>) {
    let items = desk.found_items(search);
    info!("listing found items (count={})", items.len());
    for item in &items {
        println!("{}", found_row(item));
    }
    println!("{} found item(s)", items.len());
}

pub fn add_found(desk: &AdminDesk, form: FoundItemForm) -> anyhow::Result<()> {
    let record = desk
        .add_found_item(form)
        .context("failed to add found item")?;
    println!("{}", found_row(&record));
    Ok(())
}

pub fn show_matches(desk: &AdminDesk, lost_ref: &str) -> anyhow::Result<()> {
    let lost = desk.resolve_lost(lost_ref)?;
    let matches = desk
        .find_matches(&lost.id)
        .context("failed to search for matches")?;
    println!("{}", lost_row(&lost));
    for matched in &matches {
        println!("  {}", match_row(matched));
    }
    println!("{} possible match(es)", matches.len());
    Ok(())
}

pub fn mark_found(
    desk: &AdminDesk,
    lost_ref: &str,
    found_ref: Option<&str>,
) -> anyhow::Result<()> {
    let lost = desk.resolve_lost(lost_ref)?;
    let found = found_ref.map(|found_ref| desk.resolve_found(found_ref)).transpose()?;
    desk.mark_found(&lost.id, found.as_ref().map(|item| &item.id))
        .context("failed to mark item found")?;
    match found {
        Some(found) => println!(
            "#{} marked found, #{} claimed",
            short_id(&lost.id),
            short_id(&found.id)
        ),
        None => println!("#{} marked found", short_id(&lost.id)),
    }
    Ok(())
}

pub fn close(desk: &AdminDesk, lost_ref: &str) -> anyhow::Result<()> {
    let lost = desk.resolve_lost(lost_ref)?;
    desk.close_report(&lost.id)
        .context("failed to close report")?;
    println!("#{} closed", short_id(&lost.id));
    Ok(())
}
