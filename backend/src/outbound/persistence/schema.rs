//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Person entries.
    persons (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Family name.
        surname -> Text,
        /// Given name.
        name -> Text,
        /// Optional date of birth.
        birthdate -> Nullable<Date>,
        /// Optimistic concurrency token, starting at 1.
        revision -> Int8,
    }
}

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login name; not unique.
        username -> Text,
        /// Bcrypt hash in modular crypt format.
        password_hash -> Text,
        /// Optimistic concurrency token, starting at 1.
        revision -> Int8,
    }
}

diesel::allow_tables_to_appear_in_same_query!(persons, users);
