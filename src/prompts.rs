//! Interactive design wizard on `dialoguer` prompts

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

use atelier::format::format_number;
use atelier::types::{BudgetRange, DesignResult, DesignStyle, PropertyType, RoomEntry, RoomType};
use atelier::wizard::{
    report_file_name, DesignMode, DesignWizard, ReportError, RoomField, SubmissionState,
    WizardPhase,
};

use crate::{print_compliance, print_result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum EditAction {
    PropertyType(PropertyType),
    Style(DesignStyle),
    AddRoom,
    EditRoom,
    RemoveRoom,
    Budget,
    Details,
    Generate,
    Next,
    Back,
    TextMode,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum BriefAction {
    Preferences,
    Details,
    ToggleProImage,
    ToggleCompliance,
    CheckCompliance,
    Generate,
    PresetMode,
    Quit,
}

#[derive(Debug, Clone, Copy)]
enum ResultAction {
    Report,
    StartOver,
    Quit,
}

/// Show `entries` as a menu and return the chosen action
fn choose<T: Copy>(prompt: &str, entries: &[(String, T)], default: usize) -> Result<T> {
    let labels: Vec<&str> = entries.iter().map(|(label, _)| label.as_str()).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default.min(labels.len().saturating_sub(1)))
        .interact()?;
    entries
        .get(index)
        .map(|(_, action)| *action)
        .context("menu selection out of range")
}

/// Drive `wizard` until the user quits
pub async fn run_wizard(mut wizard: DesignWizard) -> Result<()> {
    if let Some(title) = wizard.project_title() {
        println!("Designing for project: {title}");
    }

    loop {
        let flow = match wizard.phase() {
            WizardPhase::Result(result) => result_screen(&mut wizard, &result).await?,
            WizardPhase::Editing { .. } => {
                if let SubmissionState::Failed(message) = wizard.submission_state() {
                    println!();
                    println!("! {message}");
                }
                match wizard.mode() {
                    DesignMode::Presets => preset_screen(&mut wizard).await?,
                    DesignMode::Text => brief_screen(&mut wizard).await?,
                }
            }
        };
        if flow == Flow::Quit {
            return Ok(());
        }
    }
}

async fn result_screen(wizard: &mut DesignWizard, result: &DesignResult) -> Result<Flow> {
    print_result(result);
    if let Some(saved_at) = wizard.restored().and_then(|r| r.saved_at) {
        println!();
        println!("(last generated {})", saved_at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!();

    let entries = [
        ("Download report".to_string(), ResultAction::Report),
        ("Start a new design".to_string(), ResultAction::StartOver),
        ("Quit".to_string(), ResultAction::Quit),
    ];
    match choose("What next?", &entries, 0)? {
        ResultAction::Report => {
            let path = PathBuf::from(report_file_name(chrono::Local::now().date_naive()));
            let confirmed = Confirm::new()
                .with_prompt(format!("Save the report to {}?", path.display()))
                .default(true)
                .interact()?;
            if confirmed {
                println!("{}", report_line(wizard.save_report(&path).await));
            }
        }
        ResultAction::StartOver => {
            if !wizard.start_over() {
                println!("! A design is still being generated");
            }
        }
        ResultAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// What to tell the user after a report download attempt
fn report_line(outcome: Result<Option<PathBuf>, ReportError>) -> String {
    match outcome {
        Ok(Some(path)) => format!("Saved report to {}", path.display()),
        Ok(None) => "No design generated yet".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Report download failed");
            format!("! {}", e.user_message())
        }
    }
}

fn room_label(room: &RoomEntry) -> String {
    let flag = if room.is_valid() { "" } else { "  (needs quantity and area)" };
    format!(
        "{} x{} · {} sqm{flag}",
        room.room_type.label(),
        room.quantity,
        format_number(room.area)
    )
}

async fn preset_screen(wizard: &mut DesignWizard) -> Result<Flow> {
    let draft = wizard.draft();
    let Some(step) = wizard.current_step() else {
        return Ok(Flow::Quit);
    };

    println!();
    println!("Step {}/{}: {}", step.index, wizard.total_steps(), step.title);
    println!("{}", "─".repeat(60));

    let mut entries: Vec<(String, EditAction)> = Vec::new();
    let mut default = 0;
    match step.index {
        1 => {
            for t in PropertyType::all() {
                if draft.property_type == Some(*t) {
                    default = entries.len();
                }
                entries.push((
                    format!("{:<12} {}", t.label(), t.description()),
                    EditAction::PropertyType(*t),
                ));
            }
        }
        2 => {
            for s in DesignStyle::all() {
                if draft.style == Some(*s) {
                    default = entries.len();
                }
                entries.push((
                    format!("{:<14} {}", s.label(), s.description()),
                    EditAction::Style(*s),
                ));
            }
        }
        3 => {
            if draft.rooms.is_empty() {
                println!("  (no rooms yet)");
            }
            for (i, room) in draft.rooms.iter().enumerate() {
                println!("  {}. {}", i + 1, room_label(room));
            }
            entries.push(("Add a room".to_string(), EditAction::AddRoom));
            if !draft.rooms.is_empty() {
                entries.push(("Edit a room".to_string(), EditAction::EditRoom));
                entries.push(("Remove a room".to_string(), EditAction::RemoveRoom));
            }
        }
        _ => {
            let budget = draft.budget.map_or("not set", |b| b.label());
            let details = if draft.details.is_empty() { "none" } else { draft.details.as_str() };
            entries.push((format!("Budget: {budget}"), EditAction::Budget));
            entries.push((format!("Details: {details}"), EditAction::Details));
            entries.push(("Generate design".to_string(), EditAction::Generate));
            if draft.budget.is_some() {
                default = 2;
            }
        }
    }

    if !wizard.is_last_step() {
        if step.index == 3 && draft.has_valid_rooms() {
            default = entries.len();
        }
        entries.push(("Next".to_string(), EditAction::Next));
    }
    if step.index > 1 {
        entries.push(("Back".to_string(), EditAction::Back));
    }
    entries.push(("Switch to free-text brief".to_string(), EditAction::TextMode));
    entries.push(("Quit".to_string(), EditAction::Quit));

    match choose(step.title, &entries, default)? {
        EditAction::PropertyType(t) => {
            wizard.select_property_type(t);
        }
        EditAction::Style(s) => {
            wizard.select_style(s);
        }
        EditAction::AddRoom => add_room(wizard)?,
        EditAction::EditRoom => edit_room(wizard)?,
        EditAction::RemoveRoom => {
            if let Some(index) = pick_room(wizard, "Remove which room?")? {
                wizard.remove_room(index);
            }
        }
        EditAction::Budget => {
            let budgets: Vec<(String, BudgetRange)> = BudgetRange::all()
                .iter()
                .map(|b| (format!("{:<10} {}", b.label(), b.description()), *b))
                .collect();
            let current = draft
                .budget
                .and_then(|b| BudgetRange::all().iter().position(|x| *x == b))
                .unwrap_or(0);
            let budget = choose("Budget range", &budgets, current)?;
            wizard.set_budget(budget);
        }
        EditAction::Details => {
            let details: String = Input::new()
                .with_prompt("Additional preferences")
                .with_initial_text(draft.details.clone())
                .allow_empty(true)
                .interact_text()?;
            wizard.set_details(details.trim());
        }
        EditAction::Generate => generate_presets(wizard).await?,
        EditAction::Next => {
            if let Err(e) = wizard.next() {
                println!("! {e}");
            }
        }
        EditAction::Back => {
            wizard.back();
        }
        EditAction::TextMode => wizard.set_mode(DesignMode::Text),
        EditAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

async fn generate_presets(wizard: &mut DesignWizard) -> Result<()> {
    if !wizard.can_generate() {
        println!("! Complete every step before generating");
        return Ok(());
    }
    let draft = wizard.draft();
    let summary = match (draft.style, draft.property_type) {
        (Some(style), Some(property_type)) => {
            format!("{} {}", style.label(), property_type.label())
        }
        _ => "this".to_string(),
    };
    let confirmed = Confirm::new()
        .with_prompt(format!("Generate a {summary} design?"))
        .default(true)
        .interact()?;
    if confirmed {
        println!("Generating design...");
        // Failures are kept in the submission state and shown above the form
        let _ = wizard.generate().await;
    }
    Ok(())
}

fn room_type_entries() -> Vec<(String, RoomType)> {
    RoomType::all()
        .iter()
        .map(|t| {
            (
                format!("{:<12} default {} sqm", t.label(), format_number(t.default_area())),
                *t,
            )
        })
        .collect()
}

fn prompt_quantity(default: u32) -> Result<u32> {
    let quantity = Input::<u32>::new()
        .with_prompt("Quantity")
        .default(default)
        .validate_with(|v: &u32| -> Result<(), &'static str> {
            if *v > 0 {
                Ok(())
            } else {
                Err("quantity must be at least 1")
            }
        })
        .interact_text()?;
    Ok(quantity)
}

fn prompt_area(default: f64) -> Result<f64> {
    let area = Input::<f64>::new()
        .with_prompt("Area per room (sqm)")
        .default(default)
        .validate_with(|v: &f64| -> Result<(), &'static str> {
            if v.is_finite() && *v > 0.0 {
                Ok(())
            } else {
                Err("area must be greater than 0")
            }
        })
        .interact_text()?;
    Ok(area)
}

fn add_room(wizard: &mut DesignWizard) -> Result<()> {
    let room_type = choose("Room type", &room_type_entries(), 0)?;
    let quantity = prompt_quantity(1)?;
    let area = prompt_area(room_type.default_area())?;
    wizard.add_room(RoomEntry::new(room_type, quantity, area));
    Ok(())
}

fn edit_room(wizard: &mut DesignWizard) -> Result<()> {
    let Some(index) = pick_room(wizard, "Edit which room?")? else {
        return Ok(());
    };
    let draft = wizard.draft();
    let Some(room) = draft.rooms.get(index) else {
        return Ok(());
    };

    let current = RoomType::all()
        .iter()
        .position(|t| *t == room.room_type)
        .unwrap_or(0);
    let room_type = choose("Room type", &room_type_entries(), current)?;
    let quantity = prompt_quantity(room.quantity.max(1))?;
    let area = prompt_area(if room.area > 0.0 { room.area } else { room_type.default_area() })?;

    wizard.update_room(index, RoomField::Type(room_type));
    wizard.update_room(index, RoomField::Quantity(quantity));
    wizard.update_room(index, RoomField::Area(area));
    Ok(())
}

/// Index of a room chosen from the draft, `None` to cancel
fn pick_room(wizard: &DesignWizard, prompt: &str) -> Result<Option<usize>> {
    let mut entries: Vec<(String, Option<usize>)> = wizard
        .draft()
        .rooms
        .iter()
        .enumerate()
        .map(|(i, room)| (room_label(room), Some(i)))
        .collect();
    entries.push(("Cancel".to_string(), None));
    choose(prompt, &entries, 0)
}

async fn brief_screen(wizard: &mut DesignWizard) -> Result<Flow> {
    let brief = wizard.brief().clone();
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    println!();
    println!("Free-text brief");
    println!("{}", "─".repeat(60));

    let entries = [
        (
            format!("Preferences: {}", brief.client_preferences),
            BriefAction::Preferences,
        ),
        (
            format!("Project details: {}", brief.project_details),
            BriefAction::Details,
        ),
        (
            format!("Pro image model: {}", on_off(brief.use_pro_for_image)),
            BriefAction::ToggleProImage,
        ),
        (
            format!("Compliance check: {}", on_off(brief.check_compliance)),
            BriefAction::ToggleCompliance,
        ),
        ("Check compliance now".to_string(), BriefAction::CheckCompliance),
        ("Generate design".to_string(), BriefAction::Generate),
        ("Switch to presets".to_string(), BriefAction::PresetMode),
        ("Quit".to_string(), BriefAction::Quit),
    ];

    match choose("Brief", &entries, 0)? {
        BriefAction::Preferences => {
            let text: String = Input::new()
                .with_prompt("Client preferences")
                .with_initial_text(brief.client_preferences)
                .allow_empty(true)
                .interact_text()?;
            wizard.brief_mut().client_preferences = text.trim().to_string();
        }
        BriefAction::Details => {
            let text: String = Input::new()
                .with_prompt("Project details")
                .with_initial_text(brief.project_details)
                .allow_empty(true)
                .interact_text()?;
            wizard.brief_mut().project_details = text.trim().to_string();
        }
        BriefAction::ToggleProImage => {
            let brief = wizard.brief_mut();
            brief.use_pro_for_image = !brief.use_pro_for_image;
        }
        BriefAction::ToggleCompliance => {
            let brief = wizard.brief_mut();
            brief.check_compliance = !brief.check_compliance;
        }
        BriefAction::CheckCompliance => match wizard.validate_compliance().await {
            Ok(report) => print_compliance(&report),
            Err(e) => println!("! {}", e.user_message("Compliance check failed")),
        },
        BriefAction::Generate => {
            let confirmed = Confirm::new()
                .with_prompt("Generate a design from this brief?")
                .default(true)
                .interact()?;
            if confirmed {
                println!("Generating design...");
                let _ = wizard.generate_from_text().await;
            }
        }
        BriefAction::PresetMode => wizard.set_mode(DesignMode::Presets),
        BriefAction::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier::api::ApiError;

    #[test]
    fn test_report_line_on_download_failure() {
        let err = ReportError::Download(ApiError::ServerError {
            status: 500,
            detail: None,
        });
        assert_eq!(report_line(Err(err)), "! Failed to download report");
    }

    #[test]
    fn test_report_line_on_write_failure() {
        let err = ReportError::Write {
            path: PathBuf::from("/nonexistent/report.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        assert_eq!(report_line(Err(err)), "! Failed to download report");
    }

    #[test]
    fn test_report_line_on_success() {
        assert_eq!(
            report_line(Ok(Some(PathBuf::from("Design_Report_2026-03-07.pdf")))),
            "Saved report to Design_Report_2026-03-07.pdf"
        );
        assert_eq!(report_line(Ok(None)), "No design generated yet");
    }

    #[test]
    fn test_room_label_flags_invalid_rooms() {
        assert_eq!(
            room_label(&RoomEntry::new(RoomType::Bedroom, 2, 25.0)),
            "Master Bedroom x2 · 25 sqm"
        );
        assert!(room_label(&RoomEntry::new(RoomType::Bedroom, 0, 25.0)).ends_with("(needs quantity and area)"));
    }
}
