mod common;

use common::{dec, dec_field, response_json, TestApp};
use dental_clinic_api::entities::{payment_receipt, visit, visit_product, visit_service};
use dental_clinic_api::models::VisitStatus;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

struct Fixture {
    patient_id: i32,
    doctor_id: i32,
    filling_id: i32,
    cleaning_id: i32,
}

async fn fixture(app: &TestApp) -> Fixture {
    let patient = app.seed_patient("Ivanov", "Petr").await;
    let doctor = app.seed_employee("Sidorova", "Врач-стоматолог").await;
    let filling = app.seed_service("Filling", "1000.00").await;
    let cleaning = app.seed_service("Cleaning", "500.00").await;
    app.seed_unit(1, "Composite", 10).await;
    app.seed_unit(2, "Anesthetic", 3).await;

    Fixture {
        patient_id: patient.id,
        doctor_id: doctor.id,
        filling_id: filling.id,
        cleaning_id: cleaning.id,
    }
}

async fn service_rows(app: &TestApp, visit_id: i32) -> u64 {
    visit_service::Entity::find()
        .filter(visit_service::Column::VisitId.eq(visit_id))
        .count(app.db())
        .await
        .unwrap()
}

async fn product_rows(app: &TestApp, visit_id: i32) -> u64 {
    visit_product::Entity::find()
        .filter(visit_product::Column::VisitId.eq(visit_id))
        .count(app.db())
        .await
        .unwrap()
}

#[tokio::test]
async fn creating_a_visit_computes_totals_and_consumes_stock() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let response = app
        .post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "startTime": "10:00",
                "endTime": "10:45",
                "discount": 10,
                "services": [
                    {"serviceId": f.filling_id, "quantity": 2, "discount": 0},
                    {"serviceId": f.cleaning_id, "quantity": 1, "discount": 20}
                ],
                "products": [{"productId": 1, "quantity": 3}]
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;

    let visit_id = body["visitId"].as_i64().expect("visit id") as i32;
    assert_eq!(body["created"], true);
    assert_eq!(body["servicesCount"], 2);
    assert_eq!(body["productsCount"], 1);
    // (2000 + 400) * 0.9
    assert_eq!(dec_field(&body["finalAmount"]), dec("2160"));

    assert_eq!(service_rows(&app, visit_id).await, 2);
    assert_eq!(product_rows(&app, visit_id).await, 1);
    assert_eq!(app.unit_amount(1).await, Some(7));

    let stored = visit::Entity::find_by_id(visit_id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, VisitStatus::Completed);
}

#[tokio::test]
async fn client_totals_and_final_amount_are_kept() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let body = response_json(
        app.post(
            "/save-visit",
            json!({
                "patient_id": f.patient_id,
                "employeeId": f.doctor_id,
                "visitDate": "15.03.2024",
                "services": [{"serviceId": f.filling_id, "quantity": 1, "total": 900}],
                "finalAmount": 850
            }),
        )
        .await,
    )
    .await;

    assert_eq!(dec_field(&body["finalAmount"]), dec("850"));
}

#[tokio::test]
async fn editing_replaces_line_items_and_keeps_the_id() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let created = response_json(
        app.post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [
                    {"serviceId": f.filling_id, "quantity": 1},
                    {"serviceId": f.cleaning_id, "quantity": 1}
                ],
                "products": [{"productId": 1, "quantity": 2}]
            }),
        )
        .await,
    )
    .await;
    let visit_id = created["visitId"].as_i64().unwrap() as i32;
    assert_eq!(app.unit_amount(1).await, Some(8));

    let edit = json!({
        "visitId": visit_id,
        "patientId": f.patient_id,
        "doctorId": f.doctor_id,
        "date": "2024-03-16",
        "services": [{"serviceId": f.cleaning_id, "quantity": 1}],
        "products": [{"productId": 1, "quantity": 1}]
    });

    let first = response_json(app.post("/save-visit", edit.clone()).await).await;
    assert_eq!(first["visitId"].as_i64().unwrap() as i32, visit_id);
    assert_eq!(first["created"], false);
    assert_eq!(service_rows(&app, visit_id).await, 1);
    assert_eq!(product_rows(&app, visit_id).await, 1);
    // 2 consumed earlier are returned, 1 consumed by the edit
    assert_eq!(app.unit_amount(1).await, Some(9));

    // Saving the same payload again leaves the same state behind.
    let second = response_json(app.post("/save-visit", edit).await).await;
    assert_eq!(second["visitId"], first["visitId"]);
    assert_eq!(dec_field(&second["finalAmount"]), dec_field(&first["finalAmount"]));
    assert_eq!(service_rows(&app, visit_id).await, 1);
    assert_eq!(product_rows(&app, visit_id).await, 1);
    assert_eq!(app.unit_amount(1).await, Some(9));
    assert_eq!(visit::Entity::find().count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_the_whole_save() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let response = app
        .post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": f.filling_id, "quantity": 1}],
                "products": [
                    {"productId": 1, "quantity": 1},
                    {"productId": 2, "quantity": 5}
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), 500);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Server error");
    assert!(body["details"].as_str().unwrap().contains("Insufficient stock"));

    assert_eq!(visit::Entity::find().count(app.db()).await.unwrap(), 0);
    assert_eq!(visit_service::Entity::find().count(app.db()).await.unwrap(), 0);
    assert_eq!(app.unit_amount(1).await, Some(10));
    assert_eq!(app.unit_amount(2).await, Some(3));
}

#[tokio::test]
async fn failed_edit_leaves_the_stored_visit_untouched() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let created = response_json(
        app.post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": f.filling_id, "quantity": 1}],
                "products": [{"productId": 1, "quantity": 2}]
            }),
        )
        .await,
    )
    .await;
    let visit_id = created["visitId"].as_i64().unwrap() as i32;
    assert_eq!(app.unit_amount(1).await, Some(8));

    let response = app
        .post(
            "/save-visit",
            json!({
                "visitId": visit_id,
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-20",
                "services": [
                    {"serviceId": f.cleaning_id, "quantity": 1},
                    {"serviceId": f.filling_id, "quantity": 3}
                ],
                "products": [{"productId": 2, "quantity": 99}]
            }),
        )
        .await;
    assert_eq!(response.status(), 500);
    let body = response_json(response).await;
    assert!(body["details"].as_str().unwrap().contains("Insufficient stock"));

    let stored = visit::Entity::find_by_id(visit_id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.visit_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert_eq!(stored.final_amount, dec("1000"));
    assert_eq!(service_rows(&app, visit_id).await, 1);
    assert_eq!(product_rows(&app, visit_id).await, 1);
    let line = visit_service::Entity::find()
        .filter(visit_service::Column::VisitId.eq(visit_id))
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(line.service_id, f.filling_id);
    // stock returned by the edit is taken back on rollback
    assert_eq!(app.unit_amount(1).await, Some(8));
    assert_eq!(app.unit_amount(2).await, Some(3));
}

#[tokio::test]
async fn oversized_amounts_are_rejected() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let huge_total = app
        .post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": f.filling_id, "total": "1000000000000000000000000000"}]
            }),
        )
        .await;
    assert_eq!(huge_total.status(), 400);

    let huge_final = app
        .post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": f.filling_id}],
                "finalAmount": "1000000000001"
            }),
        )
        .await;
    assert_eq!(huge_final.status(), 400);

    assert_eq!(visit::Entity::find().count(app.db()).await.unwrap(), 0);
    assert_eq!(app.unit_amount(1).await, Some(10));
}

#[tokio::test]
async fn visit_validation_and_missing_references() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let no_services = app
        .post(
            "/save-visit",
            json!({"patientId": f.patient_id, "doctorId": f.doctor_id, "date": "2024-03-15", "services": []}),
        )
        .await;
    assert_eq!(no_services.status(), 400);

    let bad_discount = app
        .post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "discount": 150,
                "services": [{"serviceId": f.filling_id}]
            }),
        )
        .await;
    assert_eq!(bad_discount.status(), 400);

    let unknown_patient = app
        .post(
            "/save-visit",
            json!({
                "patientId": 999,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": f.filling_id}]
            }),
        )
        .await;
    assert_eq!(unknown_patient.status(), 404);

    let unknown_service = app
        .post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": 999}]
            }),
        )
        .await;
    assert_eq!(unknown_service.status(), 500);
    assert_eq!(visit::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn payment_marks_visit_paid() {
    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let created = response_json(
        app.post(
            "/save-visit",
            json!({
                "patientId": f.patient_id,
                "doctorId": f.doctor_id,
                "date": "2024-03-15",
                "services": [{"serviceId": f.filling_id}]
            }),
        )
        .await,
    )
    .await;
    let visit_id = created["visitId"].as_i64().unwrap() as i32;

    let response = app
        .post(
            "/process-payment",
            json!({"visitId": visit_id, "paymentMethod": "card", "amount": 1000}),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    let receipt_id = body["receiptId"].as_i64().unwrap() as i32;
    assert!(body["receiptNumber"]
        .as_str()
        .unwrap()
        .starts_with(&format!("R-{}-", visit_id)));

    let stored = visit::Entity::find_by_id(visit_id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, VisitStatus::Paid);
    assert_eq!(stored.receipt_id, Some(receipt_id));

    let history = response_json(app.get("/get-visit-info?lastname=Ivanov&firstname=Petr").await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["status"], "paid");
    assert_eq!(history[0]["payment"]["receiptId"].as_i64().unwrap() as i32, receipt_id);
    assert_eq!(history[0]["services"][0]["name"], "Filling");
}

#[tokio::test]
async fn payment_for_unknown_visit_writes_nothing() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/process-payment",
            json!({"visitId": 42, "paymentMethod": "cash", "amount": 100}),
        )
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(payment_receipt::Entity::find().count(app.db()).await.unwrap(), 0);

    let invalid = app
        .post(
            "/process-payment",
            json!({"visitId": 42, "paymentMethod": "cash", "amount": 0}),
        )
        .await;
    assert_eq!(invalid.status(), 400);
}

#[tokio::test]
async fn cleanup_removes_duplicate_lines() {
    use chrono::Utc;
    use dental_clinic_api::models::VisitType;
    use sea_orm::{ActiveModelTrait, Set};

    let app = TestApp::new().await;
    let f = fixture(&app).await;

    let now = Utc::now().naive_utc();
    let stored = visit::ActiveModel {
        patient_id: Set(f.patient_id),
        employee_id: Set(f.doctor_id),
        visit_date: Set(now.date()),
        discount: Set(dec("0")),
        final_amount: Set(dec("2000")),
        status: Set(VisitStatus::Completed),
        visit_type: Set(VisitType::Primary),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap();

    for _ in 0..3 {
        visit_service::ActiveModel {
            visit_id: Set(stored.id),
            service_id: Set(f.filling_id),
            quantity: Set(1),
            discount: Set(dec("0")),
            total: Set(dec("1000")),
            ..Default::default()
        }
        .insert(app.db())
        .await
        .unwrap();
    }
    for _ in 0..2 {
        visit_product::ActiveModel {
            visit_id: Set(stored.id),
            product_id: Set(1),
            quantity: Set(1),
            ..Default::default()
        }
        .insert(app.db())
        .await
        .unwrap();
    }

    let body = response_json(app.post("/cleanup-duplicates", json!({"visitId": stored.id})).await).await;
    assert_eq!(body["removedServices"], 2);
    assert_eq!(body["removedProducts"], 1);
    assert_eq!(service_rows(&app, stored.id).await, 1);
    assert_eq!(product_rows(&app, stored.id).await, 1);

    let missing = app.post("/cleanup-duplicates", json!({"visitId": 999})).await;
    assert_eq!(missing.status(), 404);
}
