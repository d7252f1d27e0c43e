use crate::{
    db::{DbPool, Transaction},
    entities::{contact_person, contractor},
    errors::ServiceError,
    services::{non_empty, required_text},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPersonInput {
    #[serde(default, alias = "full_name", alias = "name")]
    #[validate(length(max = 200))]
    pub full_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ContactPersonInput {
    fn is_blank(&self) -> bool {
        [&self.full_name, &self.position, &self.phone, &self.email]
            .iter()
            .all(|f| f.as_deref().map(str::trim).unwrap_or("").is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractorCommand {
    /// Required on update
    #[serde(default, alias = "contractor_id", alias = "contractorId")]
    pub id: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[serde(default, alias = "legal_name")]
    pub legal_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 12))]
    pub inn: Option<String>,
    #[serde(default)]
    pub kpp: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "contact_person", alias = "contact")]
    #[validate]
    pub contact_person: Option<ContactPersonInput>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractorView {
    pub id: i32,
    pub name: String,
    pub legal_name: Option<String>,
    pub inn: String,
    pub kpp: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<contractor::Model> for ContractorView {
    fn from(c: contractor::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            legal_name: c.legal_name,
            inn: c.inn,
            kpp: c.kpp,
            address: c.address,
            phone: c.phone,
            email: c.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPersonView {
    pub id: i32,
    pub full_name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractorDetails {
    #[serde(flatten)]
    pub contractor: ContractorView,
    pub contact_persons: Vec<ContactPersonView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveContractorResult {
    pub contractor_id: i32,
    pub contact_person_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ContractorSearchQuery {
    #[serde(default, alias = "q", alias = "query", alias = "search")]
    pub term: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ContractorIdQuery {
    #[serde(default, alias = "contractorId", alias = "contractor_id")]
    pub id: Option<i32>,
}

/// Unicode case-insensitive substring match over name, legal name and INN.
///
/// `needle` must already be lowercased.
fn matches_term(row: &contractor::Model, needle: &str) -> bool {
    [Some(row.name.as_str()), row.legal_name.as_deref(), Some(row.inn.as_str())]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

#[derive(Debug, Clone)]
struct ContractorFields {
    name: String,
    legal_name: Option<String>,
    inn: String,
    kpp: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    contact: Option<ContactPersonInput>,
}

impl ContractorCommand {
    fn fields(self) -> Result<ContractorFields, ServiceError> {
        self.validate()?;
        Ok(ContractorFields {
            name: required_text(self.name.as_deref(), "name")?,
            inn: required_text(self.inn.as_deref(), "inn")?,
            legal_name: non_empty(self.legal_name),
            kpp: non_empty(self.kpp),
            address: non_empty(self.address),
            phone: non_empty(self.phone),
            email: non_empty(self.email),
            contact: self.contact_person.filter(|c| !c.is_blank()),
        })
    }
}

/// Suppliers and their contact persons
#[derive(Clone)]
pub struct ContractorService {
    db_pool: Arc<DbPool>,
    search_limit: u64,
}

impl ContractorService {
    pub fn new(db_pool: Arc<DbPool>, search_limit: u64) -> Self {
        Self {
            db_pool,
            search_limit,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_contractors(&self) -> Result<Vec<ContractorView>, ServiceError> {
        let rows = contractor::Entity::find()
            .order_by_asc(contractor::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(rows.into_iter().map(ContractorView::from).collect())
    }

    /// Case-insensitive substring match over name, legal name and INN.
    #[instrument(skip(self))]
    pub async fn search_contractors(
        &self,
        query: &ContractorSearchQuery,
    ) -> Result<Vec<ContractorView>, ServiceError> {
        let term = query
            .term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("search term is required".into()))?;
        let needle = term.to_lowercase();

        // SQL lower() folds ASCII only on SQLite, so matching happens here
        let rows = contractor::Entity::find()
            .order_by_asc(contractor::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(rows
            .into_iter()
            .filter(|row| matches_term(row, &needle))
            .take(usize::try_from(self.search_limit).unwrap_or(usize::MAX))
            .map(ContractorView::from)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn contractor_details(&self, id: i32) -> Result<ContractorDetails, ServiceError> {
        let db = &*self.db_pool;
        let found = contractor::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("contractor {} does not exist", id)))?;
        let contacts = contact_person::Entity::find()
            .filter(contact_person::Column::ContractorId.eq(id))
            .order_by_asc(contact_person::Column::Id)
            .all(db)
            .await?;

        Ok(ContractorDetails {
            contractor: found.into(),
            contact_persons: contacts
                .into_iter()
                .map(|c| ContactPersonView {
                    id: c.id,
                    full_name: c.full_name,
                    position: c.position,
                    phone: c.phone,
                    email: c.email,
                })
                .collect(),
        })
    }

    #[instrument(skip(self, command))]
    pub async fn add_contractor(
        &self,
        command: ContractorCommand,
    ) -> Result<SaveContractorResult, ServiceError> {
        let fields = command.fields()?;

        let tx = Transaction::begin(&self.db_pool, "add_contractor").await?;
        let result = Self::add_contractor_in(tx.conn(), fields).await;
        let saved = tx.finish(result).await?;

        info!(contractor_id = saved.contractor_id, "Contractor added");
        Ok(saved)
    }

    async fn add_contractor_in<C: ConnectionTrait>(
        conn: &C,
        fields: ContractorFields,
    ) -> Result<SaveContractorResult, ServiceError> {
        let saved = contractor::ActiveModel {
            name: Set(fields.name),
            legal_name: Set(fields.legal_name),
            inn: Set(fields.inn),
            kpp: Set(fields.kpp),
            address: Set(fields.address),
            phone: Set(fields.phone),
            email: Set(fields.email),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        let contact_person_id = match fields.contact {
            Some(contact) => Some(Self::upsert_contact(conn, saved.id, contact).await?),
            None => None,
        };
        Ok(SaveContractorResult {
            contractor_id: saved.id,
            contact_person_id,
        })
    }

    #[instrument(skip(self, command), fields(contractor_id = ?command.id))]
    pub async fn update_contractor(
        &self,
        command: ContractorCommand,
    ) -> Result<SaveContractorResult, ServiceError> {
        let id = command
            .id
            .ok_or_else(|| ServiceError::ValidationError("id is required".into()))?;
        let fields = command.fields()?;

        let tx = Transaction::begin(&self.db_pool, "update_contractor").await?;
        let result = Self::update_contractor_in(tx.conn(), id, fields).await;
        let saved = tx.finish(result).await?;

        info!(contractor_id = id, "Contractor updated");
        Ok(saved)
    }

    async fn update_contractor_in<C: ConnectionTrait>(
        conn: &C,
        id: i32,
        fields: ContractorFields,
    ) -> Result<SaveContractorResult, ServiceError> {
        let existing = contractor::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("contractor {} does not exist", id)))?;

        let mut model: contractor::ActiveModel = existing.into();
        model.name = Set(fields.name);
        model.legal_name = Set(fields.legal_name);
        model.inn = Set(fields.inn);
        model.kpp = Set(fields.kpp);
        model.address = Set(fields.address);
        model.phone = Set(fields.phone);
        model.email = Set(fields.email);
        model.update(conn).await?;

        let contact_person_id = match fields.contact {
            Some(contact) => Some(Self::upsert_contact(conn, id, contact).await?),
            None => None,
        };
        Ok(SaveContractorResult {
            contractor_id: id,
            contact_person_id,
        })
    }

    /// Updates the first contact of the contractor, or inserts one.
    async fn upsert_contact<C: ConnectionTrait>(
        conn: &C,
        contractor_id: i32,
        input: ContactPersonInput,
    ) -> Result<i32, ServiceError> {
        let full_name = required_text(input.full_name.as_deref(), "contactPerson.fullName")?;
        let existing = contact_person::Entity::find()
            .filter(contact_person::Column::ContractorId.eq(contractor_id))
            .order_by_asc(contact_person::Column::Id)
            .one(conn)
            .await?;

        let saved = match existing {
            Some(found) => {
                let mut model: contact_person::ActiveModel = found.into();
                model.full_name = Set(full_name);
                model.position = Set(non_empty(input.position));
                model.phone = Set(non_empty(input.phone));
                model.email = Set(non_empty(input.email));
                model.update(conn).await?
            }
            None => {
                contact_person::ActiveModel {
                    contractor_id: Set(contractor_id),
                    full_name: Set(full_name),
                    position: Set(non_empty(input.position)),
                    phone: Set(non_empty(input.phone)),
                    email: Set(non_empty(input.email)),
                    ..Default::default()
                }
                .insert(conn)
                .await?
            }
        };
        Ok(saved.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn row(name: &str, legal_name: Option<&str>, inn: &str) -> contractor::Model {
        contractor::Model {
            id: 1,
            name: name.into(),
            legal_name: legal_name.map(Into::into),
            inn: inn.into(),
            kpp: None,
            address: None,
            phone: None,
            email: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn term_matching_folds_unicode_case() {
        let dental = row("Дентал Сервис", Some("ООО «Дентал»"), "7701234567");
        assert!(matches_term(&dental, &"ДЕНТАЛ".to_lowercase()));
        assert!(matches_term(&dental, "сервис"));
        assert!(matches_term(&dental, "«дентал»"));
        assert!(matches_term(&dental, "770123"));
        assert!(!matches_term(&dental, "medline"));

        let wildcard = row("50%_off", None, "1");
        assert!(matches_term(&wildcard, "%_"));
        assert!(!matches_term(&dental, "%"));
    }

    #[test]
    fn name_and_inn_are_required() {
        let missing_inn = ContractorCommand {
            name: Some("Dentsply".into()),
            ..Default::default()
        };
        assert_matches!(missing_inn.fields(), Err(ServiceError::ValidationError(_)));

        let blank_name = ContractorCommand {
            name: Some("  ".into()),
            inn: Some("7701234567".into()),
            ..Default::default()
        };
        assert_matches!(blank_name.fields(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn blank_contact_is_ignored() {
        let command = ContractorCommand {
            name: Some("Dentsply".into()),
            inn: Some("7701234567".into()),
            contact_person: Some(ContactPersonInput {
                phone: Some(" ".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let fields = command.fields().unwrap();
        assert!(fields.contact.is_none());
    }
}
