//! List command handler

use crate::commands::ListArgs;
use crate::error::CliResult;
use serde::Serialize;
use storefront_probe::suite::{catalogue, Journey};

#[derive(Debug, Serialize)]
struct JourneyRow<'a> {
    id: &'a str,
    title: &'a str,
    severity: String,
    feature: &'a str,
    tags: &'a [&'a str],
}

impl<'a> From<&'a Journey> for JourneyRow<'a> {
    fn from(journey: &'a Journey) -> Self {
        Self {
            id: journey.id,
            title: journey.title,
            severity: journey.severity.to_string(),
            feature: journey.feature,
            tags: journey.tags,
        }
    }
}

/// Print the journeys the filter selects
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let journeys = catalogue();
    let filter = args.select.filter();
    let selected: Vec<&Journey> = journeys.iter().filter(|j| filter.matches(j)).collect();
    println!("{}", render_list(&selected, args.json)?);
    Ok(())
}

pub fn render_list(journeys: &[&Journey], json: bool) -> CliResult<String> {
    if json {
        let rows: Vec<JourneyRow<'_>> = journeys.iter().map(|j| JourneyRow::from(*j)).collect();
        return Ok(serde_json::to_string_pretty(&rows)?);
    }
    let mut out = String::new();
    for journey in journeys {
        out.push_str(&format!(
            "{:<5} {:<48} {:<9} {}\n",
            journey.id,
            journey.title,
            journey.severity,
            journey.tags.join(" ")
        ));
    }
    out.push_str(&format!("{} journey(s)", journeys.len()));
    Ok(out)
}
