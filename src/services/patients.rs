use crate::{
    db::{DbPool, Transaction},
    entities::{patient, patient_contract, patient_document, visit},
    errors::ServiceError,
    services::{format_date, non_empty, parse_optional_date, required_text},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Name triple used by the front desk to address a patient.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PatientNameQuery {
    #[serde(default, alias = "last_name", alias = "lastName")]
    pub lastname: Option<String>,
    #[serde(default, alias = "first_name", alias = "firstName")]
    pub firstname: Option<String>,
    #[serde(default)]
    pub patronymic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientName {
    pub last_name: String,
    pub first_name: String,
    pub patronymic: Option<String>,
}

impl PatientNameQuery {
    /// Last and first name are mandatory; patronymic narrows the match when given.
    pub fn resolve(&self) -> Result<PatientName, ServiceError> {
        Ok(PatientName {
            last_name: required_text(self.lastname.as_deref(), "lastname")?,
            first_name: required_text(self.firstname.as_deref(), "firstname")?,
            patronymic: non_empty(self.patronymic.clone()),
        })
    }
}

/// Looks a patient up by name triple, oldest record first.
pub(crate) async fn find_patient_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &PatientName,
) -> Result<Option<patient::Model>, DbErr> {
    let mut query = patient::Entity::find()
        .filter(patient::Column::LastName.eq(name.last_name.as_str()))
        .filter(patient::Column::FirstName.eq(name.first_name.as_str()));
    if let Some(patronymic) = &name.patronymic {
        query = query.filter(patient::Column::Patronymic.eq(patronymic.as_str()));
    }
    query.order_by_asc(patient::Column::Id).one(conn).await
}

/// Mutable patient fields shared by create and update.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientFields {
    #[serde(default, alias = "lastname", alias = "last_name")]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[serde(default, alias = "firstname", alias = "first_name")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub patronymic: Option<String>,
    /// `YYYY-MM-DD` or `dd.mm.yyyy`
    #[serde(default, alias = "birthdate", alias = "birth_date")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "passport_series")]
    pub passport_series: Option<String>,
    #[serde(default, alias = "passport_number")]
    pub passport_number: Option<String>,
    #[serde(default)]
    pub snils: Option<String>,
    #[serde(default, alias = "medical_notes")]
    pub medical_notes: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Identity document supplied at registration
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocumentInput {
    #[serde(default, alias = "type", alias = "doc_type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default, alias = "issued_by")]
    pub issued_by: Option<String>,
    #[serde(default, alias = "issued_on")]
    pub issued_on: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientCommand {
    #[serde(flatten)]
    #[validate]
    pub fields: PatientFields,
    #[serde(default)]
    pub document: Option<PatientDocumentInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientCommand {
    #[serde(default, alias = "patient_id")]
    pub patient_id: Option<i32>,
    #[serde(flatten)]
    #[validate]
    pub fields: PatientFields,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientResult {
    pub patient_id: i32,
    pub contract_number: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: Option<String>,
    pub full_name: String,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
    pub visits_count: u64,
    pub last_visit: Option<String>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub passport_series: Option<String>,
    pub passport_number: Option<String>,
    pub snils: Option<String>,
    pub medical_notes: Option<String>,
    pub category: Option<String>,
    pub contract: Option<ContractView>,
    pub documents: Vec<DocumentView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractView {
    pub contract_number: String,
    pub signed_on: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub doc_type: String,
    pub series: Option<String>,
    pub number: String,
    pub issued_by: Option<String>,
    pub issued_on: Option<String>,
}

struct NormalizedPatient {
    last_name: String,
    first_name: String,
    patronymic: Option<String>,
    birth_date: Option<NaiveDate>,
    gender: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    passport_series: Option<String>,
    passport_number: Option<String>,
    snils: Option<String>,
    medical_notes: Option<String>,
    category: Option<String>,
}

impl PatientFields {
    fn normalize(self) -> Result<NormalizedPatient, ServiceError> {
        Ok(NormalizedPatient {
            last_name: required_text(self.last_name.as_deref(), "lastname")?,
            first_name: required_text(self.first_name.as_deref(), "firstname")?,
            birth_date: parse_optional_date(self.birth_date.as_deref(), "birthDate")?,
            patronymic: non_empty(self.patronymic),
            gender: non_empty(self.gender),
            phone: non_empty(self.phone),
            email: non_empty(self.email),
            address: non_empty(self.address),
            passport_series: non_empty(self.passport_series),
            passport_number: non_empty(self.passport_number),
            snils: non_empty(self.snils),
            medical_notes: non_empty(self.medical_notes),
            category: non_empty(self.category),
        })
    }
}

impl NormalizedPatient {
    fn apply(self, model: &mut patient::ActiveModel) {
        model.last_name = Set(self.last_name);
        model.first_name = Set(self.first_name);
        model.patronymic = Set(self.patronymic);
        model.birth_date = Set(self.birth_date);
        model.gender = Set(self.gender);
        model.phone = Set(self.phone);
        model.email = Set(self.email);
        model.address = Set(self.address);
        model.passport_series = Set(self.passport_series);
        model.passport_number = Set(self.passport_number);
        model.snils = Set(self.snils);
        model.medical_notes = Set(self.medical_notes);
        model.category = Set(self.category);
    }
}

/// Contract number printed on the registration paperwork
pub fn contract_number(patient_id: i32) -> String {
    format!("C-{:06}", patient_id)
}

/// Patient records: registration, full-record updates and lookups
#[derive(Clone)]
pub struct PatientService {
    db_pool: Arc<DbPool>,
}

impl PatientService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Every patient with visit aggregates, ordered by name
    #[instrument(skip(self))]
    pub async fn list_patients(&self) -> Result<Vec<PatientSummary>, ServiceError> {
        let db = &*self.db_pool;
        let patients = patient::Entity::find()
            .order_by_asc(patient::Column::LastName)
            .order_by_asc(patient::Column::FirstName)
            .order_by_asc(patient::Column::Id)
            .all(db)
            .await?;
        let visits = visit::Entity::find().all(db).await?;

        let mut aggregates: HashMap<i32, (u64, Option<NaiveDate>, Decimal)> = HashMap::new();
        for v in visits {
            let entry = aggregates
                .entry(v.patient_id)
                .or_insert((0, None, Decimal::ZERO));
            entry.0 += 1;
            entry.1 = entry.1.max(Some(v.visit_date));
            entry.2 += v.final_amount;
        }

        Ok(patients
            .into_iter()
            .map(|p| {
                let (visits_count, last_visit, total_amount) = aggregates
                    .remove(&p.id)
                    .unwrap_or((0, None, Decimal::ZERO));
                PatientSummary {
                    full_name: p.full_name(),
                    id: p.id,
                    last_name: p.last_name,
                    first_name: p.first_name,
                    patronymic: p.patronymic,
                    birth_date: p.birth_date.map(format_date),
                    phone: p.phone,
                    email: p.email,
                    category: p.category,
                    visits_count,
                    last_visit: last_visit.map(format_date),
                    total_amount: total_amount.round_dp(2),
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn find_patient_id(&self, query: &PatientNameQuery) -> Result<i32, ServiceError> {
        let name = query.resolve()?;
        find_patient_by_name(&*self.db_pool, &name)
            .await?
            .map(|p| p.id)
            .ok_or_else(|| not_found(&name))
    }

    /// Full record including contract and documents
    #[instrument(skip(self))]
    pub async fn get_patient_full(
        &self,
        query: &PatientNameQuery,
    ) -> Result<PatientRecord, ServiceError> {
        let db = &*self.db_pool;
        let name = query.resolve()?;
        let p = find_patient_by_name(db, &name)
            .await?
            .ok_or_else(|| not_found(&name))?;

        let contract = patient_contract::Entity::find()
            .filter(patient_contract::Column::PatientId.eq(p.id))
            .order_by_desc(patient_contract::Column::Id)
            .one(db)
            .await?
            .map(|c| ContractView {
                contract_number: c.contract_number,
                signed_on: format_date(c.signed_on),
            });
        let documents = patient_document::Entity::find()
            .filter(patient_document::Column::PatientId.eq(p.id))
            .order_by_asc(patient_document::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|d| DocumentView {
                doc_type: d.doc_type,
                series: d.series,
                number: d.number,
                issued_by: d.issued_by,
                issued_on: d.issued_on.map(format_date),
            })
            .collect();

        Ok(PatientRecord {
            id: p.id,
            last_name: p.last_name,
            first_name: p.first_name,
            patronymic: p.patronymic,
            birth_date: p.birth_date.map(format_date),
            gender: p.gender,
            phone: p.phone,
            email: p.email,
            address: p.address,
            passport_series: p.passport_series,
            passport_number: p.passport_number,
            snils: p.snils,
            medical_notes: p.medical_notes,
            category: p.category,
            contract,
            documents,
        })
    }

    /// Registers a patient together with the contract and optional document.
    #[instrument(skip(self, command))]
    pub async fn create_patient(
        &self,
        command: CreatePatientCommand,
    ) -> Result<CreatePatientResult, ServiceError> {
        let fields = command.fields.normalize()?;
        let document = command.document.map(normalize_document).transpose()?.flatten();

        let tx = Transaction::begin(&self.db_pool, "create_patient").await?;
        let result = Self::create_patient_in(tx.conn(), fields, document).await;
        let created = tx.finish(result).await?;

        info!(patient_id = created.patient_id, "Patient registered");
        Ok(created)
    }

    async fn create_patient_in<C: ConnectionTrait>(
        conn: &C,
        fields: NormalizedPatient,
        document: Option<patient_document::ActiveModel>,
    ) -> Result<CreatePatientResult, ServiceError> {
        let now = Utc::now().naive_utc();
        let mut model = patient::ActiveModel {
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        fields.apply(&mut model);
        let saved = model.insert(conn).await?;

        let number = contract_number(saved.id);
        patient_contract::ActiveModel {
            patient_id: Set(saved.id),
            contract_number: Set(number.clone()),
            signed_on: Set(now.date()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        if let Some(mut doc) = document {
            doc.patient_id = Set(saved.id);
            doc.insert(conn).await?;
        }

        Ok(CreatePatientResult {
            patient_id: saved.id,
            contract_number: number,
        })
    }

    /// Replaces every mutable field of the patient record.
    #[instrument(skip(self, command))]
    pub async fn update_patient(&self, command: UpdatePatientCommand) -> Result<i32, ServiceError> {
        let patient_id = command
            .patient_id
            .ok_or_else(|| ServiceError::ValidationError("patient_id is required".into()))?;
        let fields = command.fields.normalize()?;
        let db = &*self.db_pool;

        let existing = patient::Entity::find_by_id(patient_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("patient {} does not exist", patient_id)))?;

        let mut model: patient::ActiveModel = existing.into();
        fields.apply(&mut model);
        model.updated_at = Set(Utc::now().naive_utc());
        model.update(db).await?;

        info!(patient_id, "Patient record replaced");
        Ok(patient_id)
    }
}

fn normalize_document(
    input: PatientDocumentInput,
) -> Result<Option<patient_document::ActiveModel>, ServiceError> {
    let Some(number) = non_empty(input.number) else {
        return Ok(None);
    };
    Ok(Some(patient_document::ActiveModel {
        doc_type: Set(non_empty(input.doc_type).unwrap_or_else(|| "passport".to_string())),
        series: Set(non_empty(input.series)),
        number: Set(number),
        issued_by: Set(non_empty(input.issued_by)),
        issued_on: Set(parse_optional_date(input.issued_on.as_deref(), "document.issuedOn")?),
        ..Default::default()
    }))
}

fn not_found(name: &PatientName) -> ServiceError {
    ServiceError::NotFound(format!(
        "patient {} not found",
        crate::entities::full_name(&name.last_name, &name.first_name, name.patronymic.as_deref())
    ))
}
