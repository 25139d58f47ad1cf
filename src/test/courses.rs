#[cfg(test)]
mod tests {
    use crate::{
        database::{
            add_session, course_summary, create_course, delete_course, get_course, list_courses,
            list_sessions_for_course, rename_course, set_course_icon,
        },
        error::AppError,
        models::DEFAULT_ICON,
        test::utils::{FileDb, TestDbBuilder},
    };
    use std::collections::HashSet;

    #[rocket::async_test]
    async fn test_create_course_uses_default_icon() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let course = create_course(&test_db.pool, "Organic Chemistry")
            .await
            .expect("Failed to create course");

        assert!(course.id > 0, "Course ID should be positive");
        assert_eq!(course.icon, DEFAULT_ICON);

        let courses = list_courses(&test_db.pool)
            .await
            .expect("Failed to list courses");

        assert!(
            courses
                .iter()
                .any(|c| c.name == "Organic Chemistry" && c.icon == DEFAULT_ICON)
        );
    }

    #[rocket::async_test]
    async fn test_list_courses_newest_first() {
        let test_db = TestDbBuilder::new()
            .course("First")
            .course("Second")
            .course("Third")
            .build()
            .await
            .expect("Failed to build test database");

        let names: Vec<String> = list_courses(&test_db.pool)
            .await
            .expect("Failed to list courses")
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[rocket::async_test]
    async fn test_duplicate_course_names_allowed() {
        let test_db = TestDbBuilder::new()
            .course("History")
            .build()
            .await
            .expect("Failed to build test database");

        let duplicate = create_course(&test_db.pool, "History")
            .await
            .expect("Duplicate course names should be accepted");

        assert_ne!(duplicate.id, test_db.course_id("History"));
        assert_eq!(list_courses(&test_db.pool).await.unwrap().len(), 2);
    }

    #[rocket::async_test]
    async fn test_create_course_rejects_blank_name() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let result = create_course(&test_db.pool, "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list_courses(&test_db.pool).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn test_rename_course() {
        let test_db = TestDbBuilder::new()
            .course("Phyiscs")
            .build()
            .await
            .expect("Failed to build test database");
        let course_id = test_db.course_id("Phyiscs");

        rename_course(&test_db.pool, course_id, "Physics")
            .await
            .expect("Failed to rename course");

        let course = get_course(&test_db.pool, course_id)
            .await
            .expect("Failed to get course");
        assert_eq!(course.name, "Physics");
    }

    #[rocket::async_test]
    async fn test_rename_missing_course_is_not_found() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let result = rename_course(&test_db.pool, 42, "Anything").await;

        match result {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("42")),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    #[rocket::async_test]
    async fn test_delete_course_cascades_to_sessions() {
        let test_db = TestDbBuilder::new()
            .course("Biology")
            .course("Chemistry")
            .session("Biology", "Reading", 30)
            .session("Biology", "Flashcards", 15)
            .session("Chemistry", "Lab", 60)
            .build()
            .await
            .expect("Failed to build test database");
        let biology = test_db.course_id("Biology");
        let chemistry = test_db.course_id("Chemistry");

        let removed = delete_course(&test_db.pool, biology)
            .await
            .expect("Failed to delete course");
        assert_eq!(removed.name, "Biology");

        let sessions = list_sessions_for_course(&test_db.pool, biology)
            .await
            .expect("Failed to list sessions");
        assert!(sessions.is_empty());

        let summary = course_summary(&test_db.pool, biology)
            .await
            .expect("Failed to compute summary");
        assert_eq!(summary.session_count, 0);
        assert_eq!(summary.total_minutes, 0);

        assert!(matches!(
            get_course(&test_db.pool, biology).await,
            Err(AppError::NotFound(_))
        ));

        let remaining = list_sessions_for_course(&test_db.pool, chemistry)
            .await
            .expect("Failed to list sessions");
        assert_eq!(remaining.len(), 1, "Other courses keep their sessions");
        assert_eq!(test_db.session_count().await, 1);
    }

    #[rocket::async_test]
    async fn test_delete_missing_course_is_not_found() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let result = delete_course(&test_db.pool, 7).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[rocket::async_test]
    async fn test_set_course_icon_returns_previous() {
        let test_db = TestDbBuilder::new()
            .course("Art")
            .build()
            .await
            .expect("Failed to build test database");
        let course_id = test_db.course_id("Art");

        let previous = set_course_icon(&test_db.pool, course_id, "first.png")
            .await
            .expect("Failed to set icon");
        assert_eq!(previous, DEFAULT_ICON);

        let previous = set_course_icon(&test_db.pool, course_id, "second.png")
            .await
            .expect("Failed to set icon");
        assert_eq!(previous, "first.png");

        let course = get_course(&test_db.pool, course_id).await.unwrap();
        assert_eq!(course.icon, "second.png");
    }

    #[rocket::async_test]
    async fn test_set_course_icon_errors() {
        let test_db = TestDbBuilder::new()
            .course("Art")
            .build()
            .await
            .expect("Failed to build test database");

        assert!(matches!(
            set_course_icon(&test_db.pool, 999, "icon.png").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            set_course_icon(&test_db.pool, test_db.course_id("Art"), "").await,
            Err(AppError::Validation(_))
        ));

        let course = get_course(&test_db.pool, test_db.course_id("Art"))
            .await
            .unwrap();
        assert_eq!(course.icon, DEFAULT_ICON, "Icon must never become empty");
    }

    #[tokio::test]
    async fn test_icon_updates_alongside_session_writes() {
        let db = FileDb::open().await;
        let course_id = create_course(&db.pool, "Shared")
            .await
            .expect("Failed to create course")
            .id;

        let mut icon_handles = Vec::new();
        let mut session_handles = Vec::new();
        for i in 0..6 {
            let pool = db.pool.clone();
            icon_handles.push(tokio::spawn(async move {
                set_course_icon(&pool, course_id, &format!("icon-{}.png", i)).await
            }));

            let pool = db.pool.clone();
            session_handles.push(tokio::spawn(async move {
                add_session(&pool, course_id, "Reading", 10).await
            }));
        }

        let mut previous = HashSet::new();
        for handle in icon_handles {
            let replaced = handle
                .await
                .expect("Task panicked")
                .expect("Icon update failed under concurrent writes");
            assert!(previous.insert(replaced), "Each icon is replaced once");
        }
        for handle in session_handles {
            handle
                .await
                .expect("Task panicked")
                .expect("Session write failed under concurrent writes");
        }

        let current = get_course(&db.pool, course_id).await.unwrap().icon;
        previous.insert(current);

        let mut expected: HashSet<String> = (0..6).map(|i| format!("icon-{}.png", i)).collect();
        expected.insert(DEFAULT_ICON.to_string());
        assert_eq!(previous, expected);

        let summary = course_summary(&db.pool, course_id).await.unwrap();
        assert_eq!(summary.session_count, 6);

        db.close().await;
    }
}
