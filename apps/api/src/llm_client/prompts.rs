// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces a bare JSON array as output.
pub const JSON_ARRAY_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with a valid JSON array only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for the free-form office assistant chat.
pub const CHAT_SYSTEM: &str = "You are a helpful assistant for an office manager \
    who maintains an employee roster and a weekly work schedule. \
    Answer concisely and plainly.";
