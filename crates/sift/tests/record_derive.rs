//! Tests for `#[derive(Record)]`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sift::{Number, Predicate, Query, Record, SiftError, Timestamp, Value};

#[derive(Debug, Clone, Record)]
struct User {
    #[record(String, rename = "Name")]
    name: String,

    #[record(String, rename = "Group")]
    group: &'static str,

    #[record(Number, rename = "Age")]
    age: u8,

    #[record(Bool)]
    active: bool,

    #[record(Timestamp)]
    created_at: SystemTime,

    #[record(Timestamp, optional, rename = "UpdatedAt")]
    updated_at: Option<i64>,

    #[record(String, optional)]
    nickname: Option<String>,

    #[record(skip)]
    password_hash: String,

    notes: String,
}

fn user(name: &str, age: u8) -> User {
    User {
        name: name.to_string(),
        group: "staff",
        age,
        active: age % 2 == 1,
        created_at: UNIX_EPOCH + Duration::from_secs(u64::from(age)),
        updated_at: (age > 22).then_some(i64::from(age) * 1000),
        nickname: None,
        password_hash: "x".to_string(),
        notes: String::new(),
    }
}

fn users() -> Vec<User> {
    (21..=25)
        .map(|age| user(&format!("user{age}"), age))
        .collect()
}

#[test]
fn generated_constants() {
    assert_eq!(User::NAME, "Name");
    assert_eq!(User::GROUP, "Group");
    assert_eq!(User::AGE, "Age");
    assert_eq!(User::ACTIVE, "active");
    assert_eq!(User::CREATED_AT, "created_at");
    assert_eq!(User::UPDATED_AT, "UpdatedAt");
    assert_eq!(User::NICKNAME, "nickname");
}

#[test]
fn fields_lists_exposed_names_in_order() {
    assert_eq!(
        User::FIELDS,
        [
            "Name",
            "Group",
            "Age",
            "active",
            "created_at",
            "UpdatedAt",
            "nickname"
        ]
    );
}

#[test]
fn field_values() {
    let u = user("John", 21);

    assert_eq!(u.field("Name"), Some(Value::String("John")));
    assert_eq!(u.field("Group"), Some(Value::String("staff")));
    assert_eq!(u.field("Age"), Some(Value::Number(Number::U64(21))));
    assert_eq!(u.field("active"), Some(Value::Bool(true)));
    assert_eq!(
        u.field("created_at"),
        Some(Value::Timestamp(Timestamp::from_secs(21)))
    );
    assert_eq!(u.field("UpdatedAt"), Some(Value::Null));
    assert_eq!(u.field("nickname"), Some(Value::Null));
}

#[test]
fn skipped_and_unannotated_fields_are_missing() {
    let u = user("John", 21);

    assert_eq!(u.field("password_hash"), None);
    assert_eq!(u.field("notes"), None);
    // Renamed fields are not reachable under their Rust name.
    assert_eq!(u.field("name"), None);
}

#[test]
fn staff_older_than_22() {
    let users = users();
    let query = Query::select(Predicate::and([
        Predicate::eq(User::GROUP, "staff"),
        Predicate::gt(User::AGE, 22),
    ]));

    let ages: Vec<u8> = query.filter(&users).unwrap().iter().map(|u| u.age).collect();
    assert_eq!(ages, [23, 24, 25]);
}

#[test]
fn optional_fields_read_as_null() {
    let users = users();

    // Null equals null and orders before every set value.
    let unset = Query::select(Predicate::eq(User::UPDATED_AT, None::<i64>));
    assert_eq!(unset.count(&users[..]).unwrap(), 2);

    let set = Query::select(Predicate::gt(User::UPDATED_AT, Timestamp(0)));
    assert_eq!(set.count(&users[..]).unwrap(), 3);

    let ordered = Query::new().order_asc(User::UPDATED_AT).filter(&users).unwrap();
    assert_eq!(ordered[0].age, 21);
    assert_eq!(ordered[4].age, 25);
}

#[test]
fn timestamp_fields_compare_with_system_time() {
    let users = users();
    let cutoff = UNIX_EPOCH + Duration::from_secs(23);

    let query = Query::select(Predicate::lt(User::CREATED_AT, cutoff));
    assert_eq!(query.count(&users[..]).unwrap(), 2);
}

#[test]
fn bool_fields() {
    let users = users();
    let query = Query::select(Predicate::eq(User::ACTIVE, true));
    assert_eq!(query.count(&users[..]).unwrap(), 3);

    let err = Query::select(Predicate::eq(User::ACTIVE, 1))
        .filter(&users)
        .unwrap_err();
    assert!(matches!(
        err,
        SiftError::TypeMismatch {
            left: "bool",
            right: "number"
        }
    ));
}

#[derive(Record)]
struct Tagged<T>
where
    T: Copy,
    Number: From<T>,
{
    #[record(Number)]
    weight: T,
}

#[test]
fn generic_structs() {
    let items = [Tagged { weight: 3u16 }, Tagged { weight: 9u16 }];
    let heavy = Query::select(Predicate::gte(Tagged::<u16>::WEIGHT, 5))
        .filter(&items)
        .unwrap();

    assert_eq!(heavy.len(), 1);
    assert_eq!(heavy[0].weight, 9);
}
