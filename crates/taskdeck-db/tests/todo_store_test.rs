//! Integration tests for the PostgreSQL todo store.
//!
//! Requires a running database; run with `cargo test -p taskdeck-db -- --ignored`.

use taskdeck_db::test_fixtures::TestDatabase;
use taskdeck_db::{
    CategoryCounter, CategoryRepository, CreateCategoryRequest, CreateTagRequest, Error, NewTodo,
    OwnershipValidator, PositionUpdate, Priority, Status, TagRepository, TodoRepository,
};

fn new_todo(owner: i64, title: &str) -> NewTodo {
    NewTodo {
        user_id: owner,
        category_id: None,
        title: title.to_string(),
        description: None,
        completed: false,
        position: None,
        priority: Priority::Medium,
        status: Status::Pending,
        due_date: None,
        tag_ids: Vec::new(),
    }
}

#[tokio::test]
#[ignore]
async fn test_insert_assigns_next_position() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let todos = &test_db.db.todos;

    let first = todos.insert(new_todo(owner, "first")).await.unwrap();
    let second = todos.insert(new_todo(owner, "second")).await.unwrap();
    let explicit = todos
        .insert(NewTodo {
            position: Some(40),
            ..new_todo(owner, "explicit")
        })
        .await
        .unwrap();
    let after = todos.insert(new_todo(owner, "after")).await.unwrap();

    assert_eq!(first.position, Some(1));
    assert_eq!(second.position, Some(2));
    assert_eq!(explicit.position, Some(40));
    assert_eq!(after.position, Some(41));

    test_db.delete_user(owner).await;
}

#[tokio::test]
#[ignore]
async fn test_find_all_orders_by_position_then_newest() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let todos = &test_db.db.todos;

    let a = todos
        .insert(NewTodo {
            position: Some(2),
            ..new_todo(owner, "a")
        })
        .await
        .unwrap();
    let b = todos
        .insert(NewTodo {
            position: Some(1),
            ..new_todo(owner, "b")
        })
        .await
        .unwrap();

    let listed: Vec<i64> = todos
        .find_all(owner)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(listed, vec![b.id, a.id]);

    test_db.delete_user(owner).await;
}

#[tokio::test]
#[ignore]
async fn test_foreign_todo_is_not_found() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let stranger = test_db.create_user().await;
    let todos = &test_db.db.todos;

    let todo = todos.insert(new_todo(owner, "mine")).await.unwrap();

    let err = todos.find_one(todo.id, stranger).await.unwrap_err();
    assert!(matches!(err, Error::TodoNotFound(id) if id == todo.id));
    let err = todos.delete(todo.id, stranger).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(todos.count(owner).await.unwrap(), 1);

    test_db.delete_user(owner).await;
    test_db.delete_user(stranger).await;
}

#[tokio::test]
#[ignore]
async fn test_bulk_reposition_skips_foreign_ids() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let stranger = test_db.create_user().await;
    let todos = &test_db.db.todos;

    let mine = todos.insert(new_todo(owner, "mine")).await.unwrap();
    let theirs = todos.insert(new_todo(stranger, "theirs")).await.unwrap();

    let changed = todos
        .bulk_reposition(
            owner,
            &[
                PositionUpdate {
                    id: mine.id,
                    position: 9,
                },
                PositionUpdate {
                    id: theirs.id,
                    position: 9,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(changed, 1);
    assert_eq!(todos.find_one(mine.id, owner).await.unwrap().position, Some(9));
    assert_eq!(
        todos.find_one(theirs.id, stranger).await.unwrap().position,
        theirs.position
    );

    test_db.delete_user(owner).await;
    test_db.delete_user(stranger).await;
}

#[tokio::test]
#[ignore]
async fn test_tags_written_with_row_and_replaced() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let db = &test_db.db;

    let category = db
        .categories
        .create(
            owner,
            &CreateCategoryRequest {
                name: "Work".into(),
                color: "#FF0000".into(),
            },
        )
        .await
        .unwrap();
    let urgent = db
        .tags
        .create(
            owner,
            &CreateTagRequest {
                name: "urgent".into(),
                color: None,
            },
        )
        .await
        .unwrap();
    let home = db
        .tags
        .create(
            owner,
            &CreateTagRequest {
                name: "home".into(),
                color: Some("#00FF00".into()),
            },
        )
        .await
        .unwrap();

    let todo = db
        .todos
        .insert(NewTodo {
            category_id: Some(category.id),
            tag_ids: vec![urgent.id, home.id],
            ..new_todo(owner, "tagged")
        })
        .await
        .unwrap();
    let loaded = db.todos.find_with_relations(todo.id, owner).await.unwrap();
    let names: Vec<&str> = loaded.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["home", "urgent"]);
    assert_eq!(loaded.category.unwrap().name, "Work");

    // Without a tag set the associations stay as they are
    db.todos.replace(&todo, None).await.unwrap();
    let loaded = db.todos.find_with_relations(todo.id, owner).await.unwrap();
    assert_eq!(loaded.tags.len(), 2);

    db.todos.replace(&todo, Some(&[urgent.id])).await.unwrap();
    let loaded = db.todos.find_with_relations(todo.id, owner).await.unwrap();
    assert_eq!(loaded.tags.len(), 1);

    db.todos.replace(&todo, Some(&[])).await.unwrap();
    let loaded = db.todos.find_with_relations(todo.id, owner).await.unwrap();
    assert!(loaded.tags.is_empty());

    test_db.delete_user(owner).await;
}

#[tokio::test]
#[ignore]
async fn test_failed_tag_write_rolls_back_row() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let todos = &test_db.db.todos;

    // Unknown tag id violates the todo_tags foreign key
    let result = todos
        .insert(NewTodo {
            tag_ids: vec![i64::MAX],
            ..new_todo(owner, "orphan")
        })
        .await;
    assert!(result.is_err());
    assert_eq!(todos.count(owner).await.unwrap(), 0);

    let todo = todos.insert(new_todo(owner, "kept")).await.unwrap();
    let renamed = taskdeck_db::Todo {
        title: "renamed".into(),
        ..todo.clone()
    };
    assert!(todos.replace(&renamed, Some(&[i64::MAX])).await.is_err());
    assert_eq!(todos.find_one(todo.id, owner).await.unwrap().title, "kept");

    test_db.delete_user(owner).await;
}

#[tokio::test]
#[ignore]
async fn test_counter_never_goes_negative_and_recalculates() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let db = &test_db.db;

    let category = db
        .categories
        .create(
            owner,
            &CreateCategoryRequest {
                name: "Errands".into(),
                color: "#6B7280".into(),
            },
        )
        .await
        .unwrap();

    db.categories.decrement(category.id).await.unwrap();
    assert_eq!(db.categories.get(category.id, owner).await.unwrap().todos_count, 0);

    db.categories.increment(category.id).await.unwrap();
    db.categories.increment(category.id).await.unwrap();
    assert_eq!(db.categories.get(category.id, owner).await.unwrap().todos_count, 2);

    db.todos
        .insert(NewTodo {
            category_id: Some(category.id),
            ..new_todo(owner, "only one")
        })
        .await
        .unwrap();
    assert_eq!(db.categories.recalculate(category.id).await.unwrap(), 1);

    test_db.delete_user(owner).await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_category_name_is_validation_error() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let other = test_db.create_user().await;
    let categories = &test_db.db.categories;
    let req = CreateCategoryRequest {
        name: "Work".into(),
        color: "#6B7280".into(),
    };

    categories.create(owner, &req).await.unwrap();
    let err = categories.create(owner, &req).await.unwrap_err();
    assert!(err.validation_errors().unwrap().has_field("name"));

    // Names are unique per owner only
    categories.create(other, &req).await.unwrap();

    test_db.delete_user(owner).await;
    test_db.delete_user(other).await;
}

#[tokio::test]
#[ignore]
async fn test_deleting_category_uncategorizes_todos() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let db = &test_db.db;

    let category = db
        .categories
        .create(
            owner,
            &CreateCategoryRequest {
                name: "Temp".into(),
                color: "#6B7280".into(),
            },
        )
        .await
        .unwrap();
    let todo = db
        .todos
        .insert(NewTodo {
            category_id: Some(category.id),
            ..new_todo(owner, "orphan")
        })
        .await
        .unwrap();

    db.categories.delete(category.id, owner).await.unwrap();
    assert_eq!(db.todos.find_one(todo.id, owner).await.unwrap().category_id, None);

    test_db.delete_user(owner).await;
}

#[tokio::test]
#[ignore]
async fn test_ownership_checks() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user().await;
    let stranger = test_db.create_user().await;
    let db = &test_db.db;

    let category = db
        .categories
        .create(
            owner,
            &CreateCategoryRequest {
                name: "Mine".into(),
                color: "#6B7280".into(),
            },
        )
        .await
        .unwrap();
    let tag = db
        .tags
        .create(
            owner,
            &CreateTagRequest {
                name: "mine".into(),
                color: None,
            },
        )
        .await
        .unwrap();

    let ownership = &db.ownership;
    assert!(ownership.category_owned_by(category.id, owner).await.unwrap());
    assert!(!ownership.category_owned_by(category.id, stranger).await.unwrap());
    assert!(ownership.tags_owned_by(&[tag.id, tag.id], owner).await.unwrap());
    assert!(!ownership.tags_owned_by(&[tag.id], stranger).await.unwrap());
    assert!(ownership.tags_owned_by(&[], stranger).await.unwrap());

    test_db.delete_user(owner).await;
    test_db.delete_user(stranger).await;
}
