//! Weekly schedule generation — orchestrates roster, calendar, model and event log.
//!
//! Flow: load employees + rules → load the week's events → fetch calendar entries →
//!       one model call per employee → parse every reply → merge into the log.
//!
//! Nothing is written until every reply has parsed. A bad reply for any employee
//! fails the whole run and the log stays as it was.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calendar::{fetch_external_events, to_schedule_events};
use crate::errors::AppError;
use crate::events::reconcile::is_week_start;
use crate::events::{timefmt, Event};
use crate::llm_client::{parse_json_array, LlmError};
use crate::roster::{Employee, SchedulingRules};
use crate::schedule::prompts::{SCHEDULE_PROMPT_TEMPLATE, SCHEDULE_SYSTEM};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub week_start_date: NaiveDate,
    /// Restrict the run to these employees; all employees when absent.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub week_start_date: NaiveDate,
    pub employees_scheduled: usize,
    pub added: Vec<Event>,
    pub duplicates_skipped: usize,
}

/// An event as the model writes it. Models sometimes drop `taskId` or `date`, and
/// `employeeId` is always overwritten with the employee the prompt was about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftEvent {
    title: String,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(with = "timefmt::datetime")]
    start: NaiveDateTime,
    #[serde(with = "timefmt::datetime")]
    end: NaiveDateTime,
}

impl DraftEvent {
    fn into_event(self, employee_id: &str) -> Event {
        let task_id = self
            .task_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Event {
            employee_id: employee_id.to_string(),
            title: self.title,
            task_id,
            date: self.date.unwrap_or_else(|| self.start.date()),
            start: self.start,
            end: self.end,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Generates the week starting `request.week_start_date` and merges it into the log.
///
/// Steps:
/// 1. Select employees (all, or the requested subset)
/// 2. Load rules and the week's existing events
/// 3. Fetch PTO/meeting calendars and convert entries to events
/// 4. Prompt the model once per employee, feeding earlier results forward
/// 5. Merge generated + calendar events (duplicates by (employeeId, taskId) skipped)
pub async fn generate_week(
    state: &AppState,
    request: GenerateRequest,
) -> Result<GenerateResponse, AppError> {
    let week = request.week_start_date;
    if !is_week_start(week) {
        return Err(AppError::Validation(format!(
            "weekStartDate {week} is not a Monday"
        )));
    }

    // Step 1: Employees
    let roster = state.roster.employees().await?;
    let employees = select_employees(roster, request.employee_ids.as_deref())?;
    if employees.is_empty() {
        return Err(AppError::Validation(
            "No employees on the roster. Add employees before generating a schedule.".to_string(),
        ));
    }

    // Step 2: Rules and what is already on the books
    let rules = state.roster.rules().await?;
    let mut known_events = state.events.list_week(week).await?;

    // Step 3: External calendars
    let (time_min, time_max) = local_week_bounds(week);
    let entries = fetch_external_events(
        state.calendar.as_ref(),
        &state.config.calendars,
        time_min,
        time_max,
    )
    .await;
    let external = to_schedule_events(&entries, &employees);
    known_events.extend(external.iter().cloned());
    info!(
        "Generating week {} for {} employees ({} calendar events)",
        week,
        employees.len(),
        external.len()
    );

    // Step 4: One model call per employee
    let mut generated = Vec::new();
    for employee in &employees {
        let prompt = build_schedule_prompt(employee, week, &rules, &known_events)?;
        let reply = state
            .llm
            .complete(&prompt, SCHEDULE_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Schedule call for {} failed: {e}", employee.id)))?;
        let events = parse_schedule_reply(&reply, &employee.id).map_err(|e| {
            AppError::Llm(format!(
                "Unusable schedule reply for {}: {e}",
                employee.id
            ))
        })?;

        info!("Model proposed {} events for {}", events.len(), employee.name);
        known_events.extend(events.iter().cloned());
        generated.extend(events);
    }

    // Step 5: Merge
    let outcome = state.events.merge_generated(generated, external).await?;

    Ok(GenerateResponse {
        week_start_date: week,
        employees_scheduled: employees.len(),
        added: outcome.added,
        duplicates_skipped: outcome.duplicates_skipped,
    })
}

/// `[week, week + 7 days)` measured in server-local time, as UTC instants.
fn local_week_bounds(week: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = |day: NaiveDate| {
        let midnight = day.and_time(NaiveTime::MIN);
        midnight
            .and_local_timezone(Local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc())
    };
    (local_midnight(week), local_midnight(week + Duration::days(7)))
}

fn select_employees(
    roster: Vec<Employee>,
    ids: Option<&[String]>,
) -> Result<Vec<Employee>, AppError> {
    let Some(ids) = ids else {
        return Ok(roster);
    };
    if let Some(missing) = ids.iter().find(|id| !roster.iter().any(|e| &e.id == *id)) {
        return Err(AppError::NotFound(format!("Employee {missing} not found")));
    }
    Ok(roster
        .into_iter()
        .filter(|e| ids.contains(&e.id))
        .collect())
}

/// Cleans a model reply and turns it into events owned by `employee_id`.
fn parse_schedule_reply(reply: &str, employee_id: &str) -> Result<Vec<Event>, LlmError> {
    let drafts: Vec<DraftEvent> = parse_json_array(reply)?;
    Ok(drafts
        .into_iter()
        .map(|d| d.into_event(employee_id))
        .collect())
}

/// Builds the single-employee prompt by filling the template.
fn build_schedule_prompt(
    employee: &Employee,
    week: NaiveDate,
    rules: &SchedulingRules,
    known_events: &[Event],
) -> Result<String, AppError> {
    let rules_json = if rules.0.is_empty() {
        "No additional rules.".to_string()
    } else {
        serde_json::to_string_pretty(rules)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize rules: {e}")))?
    };

    let existing_json = if known_events.is_empty() {
        "No existing events".to_string()
    } else {
        serde_json::to_string_pretty(known_events)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize events: {e}")))?
    };

    let pto = if employee.pto.is_empty() {
        "None".to_string()
    } else {
        serde_json::to_string(&employee.pto)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize PTO: {e}")))?
    };

    let or_none = |s: &str| {
        if s.trim().is_empty() {
            "None".to_string()
        } else {
            s.to_string()
        }
    };

    Ok(SCHEDULE_PROMPT_TEMPLATE
        .replace("{week_start}", &week.to_string())
        .replace("{name}", &employee.name)
        .replace("{employee_id}", &employee.id)
        .replace("{shift_start}", &employee.shift.start.format("%H:%M").to_string())
        .replace("{shift_end}", &employee.shift.end.format("%H:%M").to_string())
        .replace("{hours}", &employee.hours.to_string())
        .replace("{lunch_start}", &employee.lunch.start.format("%H:%M").to_string())
        .replace("{lunch_end}", &employee.lunch.end.format("%H:%M").to_string())
        .replace("{abilities}", &employee.abilities.join(", "))
        .replace("{specialist_task}", &or_none(&employee.specialist_task))
        .replace("{specialist_target}", &employee.specialist_target.to_string())
        .replace("{pto}", &pto)
        .replace("{notes}", &or_none(&employee.scheduling_notes))
        .replace("{rules_json}", &rules_json)
        .replace("{existing_json}", &existing_json))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
