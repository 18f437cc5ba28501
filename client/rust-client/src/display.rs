//! Plain-text rendering for the terminal front-end.

use crate::models::{LearningLevel, ProgressRecord, SubmitOutcome, Task, TaskPage, User};
use crate::play::PlayController;

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

/// One row per user; the role column shows the server's role text.
pub fn users_table(users: &[User]) -> String {
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.clone(),
                u.email.clone(),
                u.user_name.clone().unwrap_or_default(),
                u.role_text().to_string(),
                u.current_level.to_string(),
                u.points.to_string(),
                yes_no(u.active),
            ]
        })
        .collect();
    render_table(
        &["ID", "EMAIL", "NAME", "ROLE", "LEVEL", "POINTS", "ACTIVE"],
        &rows,
    )
}

pub fn levels_table(levels: &[LearningLevel]) -> String {
    let rows: Vec<Vec<String>> = levels
        .iter()
        .map(|l| vec![l.level.to_string(), l.title.clone(), l.description.clone()])
        .collect();
    render_table(&["LEVEL", "TITLE", "DESCRIPTION"], &rows)
}

pub fn tasks_table(page: &TaskPage) -> String {
    let rows: Vec<Vec<String>> = page
        .items
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.level.to_string(),
                t.prompt.clone(),
                t.options.join(" | "),
                yes_no(t.active),
            ]
        })
        .collect();
    let mut out = render_table(&["ID", "LEVEL", "PROMPT", "OPTIONS", "ACTIVE"], &rows);
    out.push_str(&format!(
        "\npage {} (size {}), {} task(s) total",
        page.page + 1,
        page.size,
        page.total
    ));
    out
}

/// Full task view; shows the answer key when the server sent one.
pub fn task_details(task: &Task) -> String {
    let mut lines = vec![
        format!("Task {} (level {})", task.id, task.level),
        task.prompt.clone(),
    ];
    for (i, option) in task.options.iter().enumerate() {
        let marker = if task.correct_option_index == Some(i) {
            " (correct)"
        } else {
            ""
        };
        lines.push(format!("  {}. {}{}", i + 1, option, marker));
    }
    if let Some(explanation) = task.explanation.as_deref() {
        lines.push(format!("Explanation: {}", explanation));
    }
    if let Some(author) = task.created_by_id.as_deref() {
        lines.push(format!("Created by: {}", author));
    }
    lines.push(format!("Active: {}", yes_no(task.active)));
    lines.join("\n")
}

pub fn progress_table(records: &[ProgressRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                r.task_id.clone().unwrap_or_default(),
                r.attempt_number.to_string(),
                yes_no(r.correct),
                r.points_awarded.to_string(),
                r.time_taken_ms
                    .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    render_table(
        &["WHEN", "TASK", "ATTEMPT", "CORRECT", "POINTS", "TIME"],
        &rows,
    )
}

pub fn profile_summary(user: &User) -> String {
    let mut lines = vec![
        format!("{} <{}>", user.display_name(), user.email),
        format!("role:   {}", user.role_text()),
        format!("level:  {}", user.current_level),
        format!("points: {}", user.points),
        format!("stars:  {}", user.stars),
    ];
    if !user.active {
        lines.push("account is deactivated".to_string());
    }
    lines.join("\n")
}

pub fn outcome_line(outcome: &SubmitOutcome) -> String {
    let mut line = if outcome.correct {
        format!("Correct! +{} point(s)", outcome.points_awarded)
    } else {
        "Wrong answer.".to_string()
    };
    if let Some(total) = outcome.user_points {
        line.push_str(&format!(" Total: {}", total));
    }
    if outcome.stars_awarded > 0 {
        line.push_str(&format!(" +{} star(s)", outcome.stars_awarded));
    }
    line
}

/// Current task, options and, once submitted, the feedback.
pub fn play_screen(controller: &PlayController) -> String {
    let mut lines = Vec::new();

    if let Some(error) = controller.error() {
        lines.push(format!("! {}", error));
    }

    let Some(task) = controller.current_task() else {
        if controller.is_loading() {
            lines.push("Loading task...".to_string());
        } else {
            lines.push("No task loaded.".to_string());
        }
        return lines.join("\n");
    };

    lines.push(format!("[level {}] {}", task.level, task.prompt));
    let feedback = controller.feedback_visible();
    for (i, option) in task.options.iter().enumerate() {
        let selected = if controller.selected_option() == Some(i) {
            '>'
        } else {
            ' '
        };
        let marker = if feedback && controller.display_correct_index() == Some(i) {
            " (correct)"
        } else {
            ""
        };
        lines.push(format!("{} {}. {}{}", selected, i + 1, option, marker));
    }

    if feedback {
        if let Some(outcome) = controller.last_result() {
            lines.push(outcome_line(outcome));
        }
        if let Some(explanation) = controller.revealed_explanation() {
            lines.push(format!("Explanation: {}", explanation));
        }
        if controller.level_up_notice() {
            lines.push("Level up!".to_string());
        }
        lines.push("Press n for the next task, q to quit.".to_string());
    } else {
        lines.push("Enter an option number, q to quit.".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_table_one_row_per_user() {
        let users: Vec<User> = serde_json::from_str(
            r#"[{"id":1,"email":"user@example.com","role":"user"},
                {"id":2,"email":"admin@example.com","role":"admin"}]"#,
        )
        .unwrap();
        let table = users_table(&users);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("user@example.com"));
        assert!(lines[1].contains("user"));
        assert!(lines[2].contains("admin@example.com"));
        assert!(lines[2].contains("admin"));
    }

    #[test]
    fn test_task_details_marks_answer_key() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","level":2,"prompt":"Ile to 2 + 3?","options":["4","5"],
                "correctOptionIndex":1,"explanation":"2 + 3 = 5","isActive":false}"#,
        )
        .unwrap();
        let text = task_details(&task);
        assert!(text.starts_with("Task t1 (level 2)"));
        assert!(text.contains("  2. 5 (correct)"));
        assert!(!text.contains("  1. 4 (correct)"));
        assert!(text.contains("Explanation: 2 + 3 = 5"));
        assert!(text.ends_with("Active: no"));
    }

    #[test]
    fn test_outcome_line() {
        let outcome = SubmitOutcome {
            progress_id: None,
            correct: true,
            points_awarded: 1,
            user_points: Some(12),
            stars_awarded: 0,
            leveled_up: false,
            new_level: None,
            explanation: None,
        };
        assert_eq!(outcome_line(&outcome), "Correct! +1 point(s) Total: 12");

        let wrong = SubmitOutcome {
            correct: false,
            user_points: None,
            ..outcome
        };
        assert_eq!(outcome_line(&wrong), "Wrong answer.");
    }

    #[test]
    fn test_levels_table_columns_align() {
        let levels: Vec<LearningLevel> = serde_json::from_str(
            r#"[{"level":1,"title":"Dodawanie","description":"Liczby do 10"},
                {"level":2,"title":"Odejmowanie","description":"Liczby do 20"}]"#,
        )
        .unwrap();
        let table = levels_table(&levels);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        let col = lines[0].find("DESCRIPTION").unwrap();
        assert_eq!(lines[1].find("Liczby"), Some(col));
        assert_eq!(lines[2].find("Liczby"), Some(col));
    }
}
