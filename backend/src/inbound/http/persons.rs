//! Person API handlers.
//!
//! ```text
//! GET    /api/person/list
//! POST   /api/person/create      {"surname":"Rossi","name":"Mario","birthdate":"1980-05-17"}
//! POST   /api/person/update/{id} {"surname":"Rossi","name":"Maria","birthdate":null}
//! DELETE /api/person/delete/{id}
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::validation::{
    FieldError, FieldRequirement, FieldSource, require_fields, validation_error,
};
use crate::domain::{Error, Person, Stored, format_birthdate, parse_birthdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::record_path::RecordPath;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;

const PERSON_FIELDS: [FieldRequirement; 2] = [
    FieldRequirement::new("surname", "Surname is required"),
    FieldRequirement::new("name", "Name is required"),
];

/// Body for person create and update.
///
/// Fields are optional at the type level so a missing field reaches the
/// required-field check instead of failing deserialisation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PersonRequest {
    #[schema(example = "Rossi")]
    pub surname: Option<String>,
    #[schema(example = "Mario")]
    pub name: Option<String>,
    /// `yyyy-mm-dd` or an RFC 3339 timestamp; empty or `null` clears it.
    #[schema(example = "1980-05-17")]
    pub birthdate: Option<String>,
}

impl FieldSource for PersonRequest {
    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "surname" => self.surname.as_deref(),
            "name" => self.name.as_deref(),
            "birthdate" => self.birthdate.as_deref(),
            _ => None,
        }
    }
}

impl TryFrom<PersonRequest> for Person {
    type Error = Error;

    fn try_from(value: PersonRequest) -> Result<Self, Self::Error> {
        let mut errors = require_fields(&value, &PERSON_FIELDS).err().unwrap_or_default();
        let birthdate = parse_birthdate(value.birthdate.as_deref().unwrap_or_default())
            .unwrap_or_else(|err| {
                errors.push(FieldError::new("birthdate", err.to_string()));
                None
            });
        if !errors.is_empty() {
            return Err(validation_error(errors));
        }
        Person::try_new(
            value.surname.unwrap_or_default(),
            value.name.unwrap_or_default(),
            birthdate,
        )
        .map_err(|err| validation_error(vec![FieldError::new("person", err.to_string())]))
    }
}

/// Person as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PersonResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Rossi")]
    pub surname: String,
    #[schema(example = "Mario")]
    pub name: String,
    /// `yyyy-mm-dd`, or `null` when unknown.
    #[schema(example = "1980-05-17")]
    pub birthdate: Option<String>,
}

impl From<Stored<Person>> for PersonResponse {
    fn from(value: Stored<Person>) -> Self {
        Self {
            id: value.id.to_string(),
            surname: value.record.surname().to_owned(),
            name: value.record.name().to_owned(),
            birthdate: value.record.birthdate().map(format_birthdate),
        }
    }
}

/// List persons ordered by surname, then name.
#[utoipa::path(
    get,
    path = "/api/person/list",
    responses(
        (status = 200, description = "Persons", body = [PersonResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Record store failure", body = Error)
    ),
    tags = ["persons"],
    operation_id = "listPersons"
)]
#[get("/person/list")]
pub async fn list_persons(
    _caller: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<PersonResponse>>> {
    let persons = state.persons.list_persons().await?;
    Ok(web::Json(
        persons.into_iter().map(PersonResponse::from).collect(),
    ))
}

/// Create a person.
#[utoipa::path(
    post,
    path = "/api/person/create",
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Person created", body = MessageResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Record store failure", body = Error)
    ),
    tags = ["persons"],
    operation_id = "createPerson"
)]
#[post("/person/create")]
pub async fn create_person(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<PersonRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let person = Person::try_from(payload.into_inner())?;
    state.persons_command.create_person(person).await?;
    Ok(web::Json(MessageResponse::new("Person created!")))
}

/// Overwrite surname, name, and birthdate of a person.
#[utoipa::path(
    post,
    path = "/api/person/update/{id}",
    params(("id" = String, Path, description = "Person identifier")),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Person updated", body = MessageResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Unknown person or record store failure", body = Error)
    ),
    tags = ["persons"],
    operation_id = "updatePerson"
)]
#[post("/person/update/{id:.*}")]
pub async fn update_person(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: RecordPath,
    payload: web::Json<PersonRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let person = Person::try_from(payload.into_inner())?;
    let id = path.into_inner();
    state.persons_command.update_person(&id, person).await?;
    Ok(web::Json(MessageResponse::new("Person updated!")))
}

/// Delete a person.
#[utoipa::path(
    delete,
    path = "/api/person/delete/{id}",
    params(("id" = String, Path, description = "Person identifier")),
    responses(
        (status = 200, description = "Person deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Unknown person or record store failure", body = Error)
    ),
    tags = ["persons"],
    operation_id = "deletePerson"
)]
#[delete("/person/delete/{id:.*}")]
pub async fn delete_person(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: RecordPath,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = path.into_inner();
    state.persons_command.delete_person(&id).await?;
    Ok(web::Json(MessageResponse::new("Person deleted!")))
}

#[cfg(test)]
#[path = "persons_tests.rs"]
mod tests;
