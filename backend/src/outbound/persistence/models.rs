//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain.

use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{persons, users};

/// Row struct for reading from the persons table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PersonRow {
    pub id: Uuid,
    pub surname: String,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub revision: i64,
}

/// Insertable struct for new person records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = persons)]
pub(crate) struct NewPersonRow<'a> {
    pub id: Uuid,
    pub surname: &'a str,
    pub name: &'a str,
    pub birthdate: Option<NaiveDate>,
    pub revision: i64,
}

/// Full overwrite of a person; a `None` birthdate clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = persons)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PersonUpdate<'a> {
    pub surname: &'a str,
    pub name: &'a str,
    pub birthdate: Option<NaiveDate>,
    pub revision: i64,
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub revision: i64,
}

/// Insertable struct for new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub revision: i64,
}

/// Full overwrite of a user account.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub revision: i64,
}
