//! Prompt builders for each AI-backed feature. All context arrives
//! pre-rendered as text so this crate stays independent of the storage layer.

use crate::ChatMessage;

/// Transcript of spoken input → structured task list.
pub fn voice_extraction(transcript: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You extract actionable tasks from spoken transcripts. \
             Respond with only a JSON array of objects, each with fields: \
             \"title\" (string), \"duration\" (minutes, integer), \
             \"importance\" (\"low\", \"medium\" or \"high\") and optionally \
             \"scheduled_time\" (\"HH:MM\"). \
             If the transcript contains no tasks, respond with [].",
        ),
        ChatMessage::user(format!("Transcript:\n{transcript}")),
    ]
}

/// Suggest new tasks that complement what the user already has today.
pub fn task_generation(preferences: &str, existing_tasks: &str, instructions: &str) -> Vec<ChatMessage> {
    let mut user = format!(
        "My preferences:\n{preferences}\n\nMy tasks for today:\n{existing_tasks}\n"
    );
    if !instructions.trim().is_empty() {
        user.push_str(&format!("\nAdditional instructions: {instructions}\n"));
    }
    user.push_str("\nSuggest tasks I should add.");
    vec![
        ChatMessage::system(
            "You are a productivity assistant. Suggest a small number of \
             concrete, non-duplicate tasks as a JSON array of objects with \
             fields \"title\", \"duration\" (minutes, 5-480), \"importance\" \
             (\"low\", \"medium\" or \"high\") and optional \"scheduled_time\" \
             (\"HH:MM\"). Respond with only the JSON array.",
        ),
        ChatMessage::user(user),
    ]
}

/// Full-day schedule from preferences, tasks and weather.
pub fn plan_generation(
    preferences: &str,
    tasks: &str,
    weather: &str,
    custom_instructions: &str,
) -> Vec<ChatMessage> {
    let mut user = format!(
        "Preferences:\n{preferences}\n\nTasks for today:\n{tasks}\n\nWeather:\n{weather}\n"
    );
    if !custom_instructions.trim().is_empty() {
        user.push_str(&format!("\nCustom instructions: {custom_instructions}\n"));
    }
    user.push_str("\nBuild my schedule for today.");
    vec![
        ChatMessage::system(
            "You are a daily planner. Build a realistic schedule between the \
             user's wake and sleep times, placing demanding tasks in their \
             peak-focus period and inserting breaks and meals. Account for the \
             weather when suggesting anything outdoors. Respond with only a \
             JSON object of the form {\"schedule\": [{\"time\": \"HH:MM\", \
             \"activity\": string, \"duration_minutes\": integer, \"kind\": \
             \"task\" | \"break\" | \"meal\"}]}.",
        ),
        ChatMessage::user(user),
    ]
}

/// Spoken-style summary of the user's kanban board.
pub fn dictation(board: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You read a task board aloud. Summarize it in a few short, natural \
             spoken sentences: what is in progress, what is up next, what is \
             done. No markdown, no lists, plain speech only.",
        ),
        ChatMessage::user(format!("Board:\n{board}")),
    ]
}

/// Free-form question answered against the user's current context.
pub fn ask(question: &str, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You are a helpful personal assistant. Answer using the provided \
             context about the user's day; say so plainly when the context \
             does not contain the answer. Keep answers brief.",
        ),
        ChatMessage::user(format!("Context:\n{context}\n\nQuestion: {question}")),
    ]
}

/// Short performance-insights summary over recent activity.
pub fn insights(history: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You analyze personal productivity data. Point out completion \
             patterns, overloaded days and one or two concrete suggestions. \
             Three to five sentences, plain text.",
        ),
        ChatMessage::user(format!("Recent activity:\n{history}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;

    #[test]
    fn builders_produce_system_then_user() {
        let msgs = voice_extraction("buy milk tomorrow morning");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, MessageRole::System);
        assert_eq!(msgs[1].role, MessageRole::User);
        assert!(msgs[1].content.contains("buy milk"));
    }

    #[test]
    fn optional_instructions_are_omitted_when_blank() {
        let without = plan_generation("prefs", "tasks", "sunny", "  ");
        assert!(!without[1].content.contains("Custom instructions"));
        let with = plan_generation("prefs", "tasks", "sunny", "no meetings before 10");
        assert!(with[1].content.contains("no meetings before 10"));
    }
}
