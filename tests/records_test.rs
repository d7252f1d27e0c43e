mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{dec, dec_field, response_json, TestApp};
use dental_clinic_api::entities::{completed_work_act, patient, work_schedule};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::json;

#[tokio::test]
async fn patient_registration_and_lookup() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/",
            json!({
                "lastname": "Ivanov",
                "firstname": "Petr",
                "patronymic": "Sergeevich",
                "birthDate": "1985-04-12",
                "phone": "+7 900 000-00-00",
                "email": "",
                "document": {"type": "passport", "series": "4510", "number": "123456"}
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let patient_id = created["patientId"].as_i64().unwrap();
    assert_eq!(created["contractNumber"], format!("C-{:06}", patient_id));

    let id = response_json(app.get("/get-patient-id?lastname=Ivanov&firstname=Petr").await).await;
    assert_eq!(id["patientId"].as_i64().unwrap(), patient_id);

    let full = response_json(
        app.get("/get-patient-full?lastname=Ivanov&firstname=Petr&patronymic=Sergeevich")
            .await,
    )
    .await;
    assert_eq!(full["birthDate"], "12.04.1985");
    assert_eq!(full["email"], serde_json::Value::Null);
    assert_eq!(full["contract"]["contractNumber"], created["contractNumber"]);
    assert_eq!(full["documents"][0]["number"], "123456");

    let missing = app.get("/get-patient-full?lastname=Nobody&firstname=Petr").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let no_name = app.get("/get-patient-id?lastname=Ivanov").await;
    assert_eq!(no_name.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patient_update_replaces_fields() {
    let app = TestApp::new().await;
    let seeded = app.seed_patient("Ivanov", "Petr").await;

    let response = app
        .put(
            "/update-patient",
            json!({
                "patientId": seeded.id,
                "lastname": "Ivanova",
                "firstname": "Anna",
                "phone": "555-01"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = patient::Entity::find_by_id(seeded.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.last_name, "Ivanova");
    assert_eq!(stored.phone.as_deref(), Some("555-01"));

    let missing = app
        .put(
            "/update-patient",
            json!({"patientId": 999, "lastname": "X", "firstname": "Y"}),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let blank = app
        .put(
            "/update-patient",
            json!({"patientId": seeded.id, "lastname": " ", "firstname": "Anna"}),
        )
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn employees_doctors_and_schedule() {
    let app = TestApp::new().await;
    app.seed_employee("Petrova", "Администратор").await;

    let response = app
        .post(
            "/add-employee",
            json!({
                "lastname": "Sidorov",
                "firstname": "Ivan",
                "position": "Врач-стоматолог",
                "generateSchedule": true,
                "scheduleMonth": "2024-02"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    // February 2024 has 21 weekdays
    assert_eq!(created["scheduleDays"], 21);
    assert_eq!(work_schedule::Entity::find().count(app.db()).await.unwrap(), 21);

    let employees = response_json(app.get("/get-employees").await).await;
    assert_eq!(employees.as_array().unwrap().len(), 2);

    let doctors = response_json(app.get("/get-doctors").await).await;
    let doctors = doctors.as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["lastName"], "Sidorov");
}

#[tokio::test]
async fn warehouse_listing_and_overwrite() {
    let app = TestApp::new().await;
    app.seed_service("Filling", "1000.00").await;
    app.seed_unit(1, "Composite", 4).await;
    app.seed_unit(2, "Anesthetic", 0).await;

    let services = response_json(app.get("/get-dental-services").await).await;
    assert_eq!(dec_field(&services[0]["price"]), dec("1000"));

    let products = response_json(app.get("/get-warehouse-products").await).await;
    assert_eq!(products.as_array().unwrap().len(), 1);
    let items = response_json(app.get("/get-warehouse-items").await).await;
    assert_eq!(items.as_array().unwrap().len(), 2);

    let updated = response_json(
        app.put(
            "/update-warehouse-quantity",
            json!({"item_id": 2, "new_quantity": 12}),
        )
        .await,
    )
    .await;
    assert_eq!(updated["amount"], 12);
    assert_eq!(updated["status"], "in_stock");
    assert_eq!(app.unit_amount(2).await, Some(12));

    let negative = app
        .put("/update-warehouse-quantity", json!({"item_id": 2, "new_quantity": -1}))
        .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
    let missing = app
        .put("/update-warehouse-quantity", json!({"item_id": 99, "new_quantity": 1}))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contractor_lifecycle_and_search() {
    let app = TestApp::new().await;
    app.seed_contractor("Medline", "5009998877").await;

    let response = app
        .post(
            "/add-contractor",
            json!({
                "name": "DentSupply",
                "legalName": "DentSupply LLC",
                "inn": "7701234567",
                "contactPerson": {"fullName": "Anna Smirnova", "phone": "555-10"}
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let contractor_id = created["contractorId"].as_i64().unwrap();
    assert!(created["contactPersonId"].is_number());

    let all = response_json(app.get("/get-contractors").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let found = response_json(app.get("/search-contractors?q=dentsup").await).await;
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "DentSupply");

    let by_inn = response_json(app.get("/search-contractors?term=500999").await).await;
    assert_eq!(by_inn[0]["name"], "Medline");

    // wildcard characters match literally
    let wildcard = response_json(app.get("/search-contractors?q=%25").await).await;
    assert!(wildcard.as_array().unwrap().is_empty());

    let blank = app.get("/search-contractors?q=%20").await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let updated = app
        .put(
            "/update-contractor",
            json!({
                "id": contractor_id,
                "name": "DentSupply Pro",
                "inn": "7701234567",
                "contactPerson": {"fullName": "Anna Smirnova", "phone": "555-99"}
            }),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let details = response_json(
        app.get(&format!("/get-contractor-details?id={}", contractor_id))
            .await,
    )
    .await;
    assert_eq!(details["name"], "DentSupply Pro");
    assert_eq!(details["contactPersons"].as_array().unwrap().len(), 1);
    assert_eq!(details["contactPersons"][0]["phone"], "555-99");

    let missing = app.get("/get-contractor-details?id=999").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let no_id = app.get("/get-contractor-details").await;
    assert_eq!(no_id.status(), StatusCode::BAD_REQUEST);

    let no_inn = app.post("/add-contractor", json!({"name": "NoInn"})).await;
    assert_eq!(no_inn.status(), StatusCode::BAD_REQUEST);
}

fn search_uri(term: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
    format!("/search-contractors?q={}", encoded)
}

#[tokio::test]
async fn contractor_search_ignores_case_of_cyrillic_names() {
    let app = TestApp::new().await;
    app.seed_contractor("Дентал Сервис", "7705556677").await;
    app.seed_contractor("Medline", "5009998877").await;

    for term in ["дентал", "ДЕНТАЛ", "Дентал", "сЕРВИС"] {
        let response = app.get(&search_uri(term)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let found = response_json(response).await;
        let found = found.as_array().unwrap();
        assert_eq!(found.len(), 1, "term {}", term);
        assert_eq!(found[0]["name"], "Дентал Сервис");
    }

    let none = response_json(app.get(&search_uri("стоматолог")).await).await;
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reports_over_recorded_activity() {
    let app = TestApp::new().await;

    let empty = response_json(app.get("/get-revenue-last-3-months").await).await;
    let empty = empty.as_array().unwrap();
    assert_eq!(empty.len(), 3);
    assert!(empty.iter().all(|m| dec_field(&m["revenue"]).is_zero()));

    let patient = app.seed_patient("Ivanov", "Petr").await;
    let doctor = app.seed_employee("Sidorova", "Врач-стоматолог").await;
    app.seed_employee("Orlov", "Ортодонт").await;
    let filling = app.seed_service("Filling", "1000.00").await;

    let saved = response_json(
        app.post(
            "/save-visit",
            json!({
                "patientId": patient.id,
                "doctorId": doctor.id,
                "date": Utc::now().date_naive().format("%Y-%m-%d").to_string(),
                "services": [{"serviceId": filling.id}]
            }),
        )
        .await,
    )
    .await;
    let visit_id = saved["visitId"].as_i64().unwrap() as i32;
    let paid = app
        .post(
            "/process-payment",
            json!({"visitId": visit_id, "paymentMethod": "cash", "amount": "1000.00"}),
        )
        .await;
    assert_eq!(paid.status(), StatusCode::CREATED);

    let revenue = response_json(app.get("/get-revenue-last-3-months").await).await;
    let current = &revenue[2];
    assert_eq!(current["month"], Utc::now().format("%Y-%m").to_string());
    assert_eq!(dec_field(&current["revenue"]), dec("1000"));
    assert_eq!(current["paymentsCount"], 1);

    let by_employee = response_json(app.get("/get-visits-by-employees").await).await;
    assert_eq!(by_employee.as_array().unwrap().len(), 2);
    assert_eq!(by_employee[0]["employeeId"].as_i64().unwrap() as i32, doctor.id);
    assert_eq!(by_employee[0]["visitsCount"], 1);
    assert_eq!(by_employee[1]["visitsCount"], 0);

    let act = completed_work_act::ActiveModel {
        visit_id: Set(Some(visit_id)),
        created_on: Set(chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap();

    let one = response_json(app.get(&format!("/get-data?id={}", act.id)).await).await;
    assert_eq!(one.as_array().unwrap().len(), 1);
    assert_eq!(one[0]["dateCreation"], "15.03.2024");
    assert_eq!(one[0]["visitId"].as_i64().unwrap() as i32, visit_id);

    let none = response_json(app.get("/get-data?id=999").await).await;
    assert!(none.as_array().unwrap().is_empty());

    let recent = response_json(app.get("/get-data").await).await;
    assert_eq!(recent.as_array().unwrap().len(), 1);
}
