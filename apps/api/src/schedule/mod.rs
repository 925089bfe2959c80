// Weekly schedule generation
//
// Pipeline: roster + rules + known events + calendars → per-employee prompt → model
//           → reply cleaning → merge into the event log

pub mod generator;
pub mod handlers;
pub mod prompts;
