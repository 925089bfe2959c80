// Prompt constants for weekly schedule generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ARRAY_ONLY_SYSTEM;

pub const SCHEDULE_SYSTEM: &str = JSON_ARRAY_ONLY_SYSTEM;

/// Single-employee scheduling prompt. Every `{placeholder}` is replaced before sending.
pub const SCHEDULE_PROMPT_TEMPLATE: &str = r#"You are a scheduling assistant for a small office. Generate work schedule events for ONE employee for the week starting {week_start} (Monday).

### EMPLOYEE TO SCHEDULE
- Name: {name}
- ID: {employee_id}
- Shift hours: {shift_start} to {shift_end}
- Weekly hours target: {hours}
- Lunch window: {lunch_start} to {lunch_end}
- Abilities: [{abilities}]
- Specialist task: {specialist_task}
- Specialist target hours: {specialist_target}
- PTO / unavailable: {pto}
- Notes: {notes}

### OFFICE RULES
{rules_json}

### EXISTING EVENTS (NEVER MODIFY, NEVER OVERLAP THIS EMPLOYEE'S ENTRIES)
{existing_json}

### TASK RULES
1. Only assign tasks from the employee's abilities. If the specialist task is set, give it the specialist target hours first.
2. At most ONE "Reservations" and at most ONE "Dispatch" task for this employee in the week. When either is already present in the existing events for this employee, do not add another; use other abilities instead (Journey Desk, Network, Security, Marketing, Scheduling, Badges/Projects, Sales).
3. Every event must lie inside the shift hours and must not overlap another event of this employee.
4. Do not schedule anything during PTO or existing all-day entries for this employee.
5. Reach the weekly hours target as closely as possible.

### LUNCH
Lunch is a REQUIRED event on every working day: title "Lunch", placed inside the lunch window, inside the shift, overlapping nothing.

### OUTPUT FORMAT
Return ONLY a JSON array:
[
  {
    "employeeId": "{employee_id}",
    "title": "task-name",
    "taskId": "unique-id",
    "date": "YYYY-MM-DD",
    "start": "YYYY-MM-DDTHH:mm:ss",
    "end": "YYYY-MM-DDTHH:mm:ss"
  }
]
Every taskId must be unique within your reply and must not reuse a taskId from the existing events."#;
