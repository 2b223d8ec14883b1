#[cfg(test)]
mod tests {
    use super::super::error::ValidationError;
    use super::super::task::{validate_text, Category, NewTask, Task, TaskId, MAX_TEXT_CHARS};
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn text_is_trimmed_and_bounded_in_characters() {
        assert_eq!(validate_text("  Buy milk \n"), Ok("Buy milk"));
        assert_eq!(validate_text("   "), Err(ValidationError::Empty));
        assert_eq!(validate_text(""), Err(ValidationError::Empty));
        let exact = "é".repeat(MAX_TEXT_CHARS);
        assert!(validate_text(&exact).is_ok());
        let over = "x".repeat(MAX_TEXT_CHARS + 1);
        assert_eq!(validate_text(&over), Err(ValidationError::TooLong { len: 201, max: 200 }));
        // surrounding whitespace does not count towards the limit
        assert!(validate_text(&format!("  {}  ", "x".repeat(MAX_TEXT_CHARS))).is_ok());
    }

    #[test]
    fn generated_ids_are_distinct_and_prefixed_by_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = TaskId::generate(now);
        let b = TaskId::generate(now);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("lqu5m2o0"), "{a}");
        assert_eq!(a.as_str().len(), 18);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn category_round_trips_unknown_values() {
        assert_eq!(Category::parse("study"), Category::Study);
        let legacy = Category::parse("errand");
        assert_eq!(legacy, Category::Unknown("errand".into()));
        assert_eq!(legacy.as_str(), "errand");
        assert_eq!(legacy.label(), "Uncategorized");
        assert_eq!(serde_json::to_value(&legacy).unwrap(), json!("errand"));
        assert_eq!(serde_json::from_value::<Category>(json!("work")).unwrap(), Category::Work);
    }

    #[test]
    fn task_uses_stored_field_names() {
        let task = Task {
            id: TaskId::from("abc"),
            text: "Study for exam".into(),
            completed: true,
            category: Category::Study,
            due_date: NaiveDate::from_ymd_opt(2099, 1, 1),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            completed_at: Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap()),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], json!("abc"));
        assert_eq!(value["dueDate"], json!("2099-01-01"));
        assert_eq!(value["createdAt"], json!("2024-05-01T10:00:00Z"));
        assert_eq!(value["completedAt"], json!("2024-05-02T08:00:00Z"));
        assert_eq!(value["category"], json!("study"));
    }

    #[test]
    fn lenient_fields_on_read() {
        let raw = json!({
            "id": "x1",
            "text": "",
            "category": "chores",
            "dueDate": "",
            "createdAt": "2024-05-01T10:00:00.000Z"
        });
        let task: Task = serde_json::from_value(raw).unwrap();
        assert_eq!(task.text, "");
        assert!(!task.completed);
        assert_eq!(task.category, Category::Unknown("chores".into()));
        assert_eq!(task.due_date, None);
        assert_eq!(task.completed_at, None);

        let with_timestamp_due = json!({
            "id": "x2", "text": "t", "completed": false, "category": "work",
            "dueDate": "2024-05-03T00:00:00Z", "createdAt": "2024-05-01T10:00:00Z", "completedAt": null
        });
        let task: Task = serde_json::from_value(with_timestamp_due).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 5, 3));
    }

    #[test]
    fn toggle_keeps_completion_fields_in_step() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut task = Task {
            id: TaskId::from("t"),
            text: "t".into(),
            completed: false,
            category: Category::Other,
            due_date: None,
            created_at: created,
            completed_at: None,
        };
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        task.toggle(later);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(later));
        task.toggle(later);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.created_at, created);
    }

    #[test]
    fn form_input_parses_due_date() {
        let input = NewTask::from_form("Study for exam", "study", "2099-01-01").unwrap();
        assert_eq!(input.category, Category::Study);
        assert_eq!(input.due_date, NaiveDate::from_ymd_opt(2099, 1, 1));
        assert_eq!(NewTask::from_form("x", "work", "  ").unwrap().due_date, None);
        assert_eq!(
            NewTask::from_form("x", "work", "tomorrow"),
            Err(ValidationError::InvalidDueDate("tomorrow".into()))
        );
    }
}
