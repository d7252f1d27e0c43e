use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_patient_tables::Migration),
            Box::new(m20240301_000002_create_staff_tables::Migration),
            Box::new(m20240301_000003_create_catalog_tables::Migration),
            Box::new(m20240301_000004_create_visit_tables::Migration),
            Box::new(m20240301_000005_create_payment_tables::Migration),
            Box::new(m20240301_000006_create_supplier_tables::Migration),
            Box::new(m20240301_000007_create_completed_work_acts_table::Migration),
        ]
    }
}

mod m20240301_000001_create_patient_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_patient_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Patients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Patients::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Patients::LastName).string().not_null())
                        .col(ColumnDef::new(Patients::FirstName).string().not_null())
                        .col(ColumnDef::new(Patients::Patronymic).string().null())
                        .col(ColumnDef::new(Patients::BirthDate).date().null())
                        .col(ColumnDef::new(Patients::Gender).string().null())
                        .col(ColumnDef::new(Patients::Phone).string().null())
                        .col(ColumnDef::new(Patients::Email).string().null())
                        .col(ColumnDef::new(Patients::Address).string().null())
                        .col(ColumnDef::new(Patients::PassportSeries).string().null())
                        .col(ColumnDef::new(Patients::PassportNumber).string().null())
                        .col(ColumnDef::new(Patients::Snils).string().null())
                        .col(ColumnDef::new(Patients::MedicalNotes).text().null())
                        .col(ColumnDef::new(Patients::Category).string().null())
                        .col(ColumnDef::new(Patients::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Patients::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_patients_name")
                        .table(Patients::Table)
                        .col(Patients::LastName)
                        .col(Patients::FirstName)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PatientContracts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PatientContracts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PatientContracts::PatientId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PatientContracts::ContractNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PatientContracts::SignedOn).date().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_patient_contracts_patient_id")
                                .from(PatientContracts::Table, PatientContracts::PatientId)
                                .to(Patients::Table, Patients::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PatientDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PatientDocuments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PatientDocuments::PatientId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PatientDocuments::DocType).string().not_null())
                        .col(ColumnDef::new(PatientDocuments::Series).string().null())
                        .col(ColumnDef::new(PatientDocuments::Number).string().not_null())
                        .col(ColumnDef::new(PatientDocuments::IssuedBy).string().null())
                        .col(ColumnDef::new(PatientDocuments::IssuedOn).date().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_patient_documents_patient_id")
                                .from(PatientDocuments::Table, PatientDocuments::PatientId)
                                .to(Patients::Table, Patients::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PatientDocuments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PatientContracts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Patients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Patients {
        Table,
        Id,
        LastName,
        FirstName,
        Patronymic,
        BirthDate,
        Gender,
        Phone,
        Email,
        Address,
        PassportSeries,
        PassportNumber,
        Snils,
        MedicalNotes,
        Category,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PatientContracts {
        Table,
        Id,
        PatientId,
        ContractNumber,
        SignedOn,
    }

    #[derive(DeriveIden)]
    enum PatientDocuments {
        Table,
        Id,
        PatientId,
        DocType,
        Series,
        Number,
        IssuedBy,
        IssuedOn,
    }
}

mod m20240301_000002_create_staff_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_staff_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::LastName).string().not_null())
                        .col(ColumnDef::new(Employees::FirstName).string().not_null())
                        .col(ColumnDef::new(Employees::Patronymic).string().null())
                        .col(ColumnDef::new(Employees::Position).string().not_null())
                        .col(ColumnDef::new(Employees::Phone).string().null())
                        .col(ColumnDef::new(Employees::Email).string().null())
                        .col(
                            ColumnDef::new(Employees::AccessLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Employees::HiredOn).date().null())
                        .col(ColumnDef::new(Employees::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkSchedules::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkSchedules::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(WorkSchedules::EmployeeId).integer().not_null())
                        .col(ColumnDef::new(WorkSchedules::WorkDate).date().not_null())
                        .col(ColumnDef::new(WorkSchedules::StartTime).time().not_null())
                        .col(ColumnDef::new(WorkSchedules::EndTime).time().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_work_schedules_employee_id")
                                .from(WorkSchedules::Table, WorkSchedules::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_schedules_employee_date")
                        .table(WorkSchedules::Table)
                        .col(WorkSchedules::EmployeeId)
                        .col(WorkSchedules::WorkDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkSchedules::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        LastName,
        FirstName,
        Patronymic,
        Position,
        Phone,
        Email,
        AccessLevel,
        HiredOn,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum WorkSchedules {
        Table,
        Id,
        EmployeeId,
        WorkDate,
        StartTime,
        EndTime,
    }
}

mod m20240301_000003_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DentalServices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DentalServices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(DentalServices::Name).string().not_null())
                        .col(ColumnDef::new(DentalServices::Category).string().null())
                        .col(
                            ColumnDef::new(DentalServices::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            // Warehouse units keep caller-chosen ids: a delivery for an unknown
            // product creates the unit under the product id.
            manager
                .create_table(
                    Table::create()
                        .table(WarehouseUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseUnits::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(WarehouseUnits::Name).string().not_null())
                        .col(ColumnDef::new(WarehouseUnits::Specs).string().null())
                        .col(
                            ColumnDef::new(WarehouseUnits::Amount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(WarehouseUnits::Unit).string().null())
                        .col(ColumnDef::new(WarehouseUnits::Status).string().not_null())
                        .col(ColumnDef::new(WarehouseUnits::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WarehouseUnits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DentalServices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DentalServices {
        Table,
        Id,
        Name,
        Category,
        Price,
    }

    #[derive(DeriveIden)]
    enum WarehouseUnits {
        Table,
        Id,
        Name,
        Specs,
        Amount,
        Unit,
        Status,
        UpdatedAt,
    }
}

mod m20240301_000004_create_visit_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_visit_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Visits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Visits::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Visits::PatientId).integer().not_null())
                        .col(ColumnDef::new(Visits::EmployeeId).integer().not_null())
                        .col(ColumnDef::new(Visits::VisitDate).date().not_null())
                        .col(ColumnDef::new(Visits::StartTime).time().null())
                        .col(ColumnDef::new(Visits::EndTime).time().null())
                        .col(
                            ColumnDef::new(Visits::Discount)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Visits::FinalAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Visits::Status).string().not_null())
                        .col(ColumnDef::new(Visits::VisitType).string().not_null())
                        .col(ColumnDef::new(Visits::ReceiptId).integer().null())
                        .col(ColumnDef::new(Visits::PaymentAmount).decimal_len(12, 2).null())
                        .col(ColumnDef::new(Visits::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Visits::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visits_patient_id")
                                .from(Visits::Table, Visits::PatientId)
                                .to(Patients::Table, Patients::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visits_employee_id")
                                .from(Visits::Table, Visits::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_visits_patient_id")
                        .table(Visits::Table)
                        .col(Visits::PatientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VisitServices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VisitServices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(VisitServices::VisitId).integer().not_null())
                        .col(ColumnDef::new(VisitServices::ServiceId).integer().not_null())
                        .col(ColumnDef::new(VisitServices::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(VisitServices::Discount)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(VisitServices::Total)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_services_visit_id")
                                .from(VisitServices::Table, VisitServices::VisitId)
                                .to(Visits::Table, Visits::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_services_service_id")
                                .from(VisitServices::Table, VisitServices::ServiceId)
                                .to(DentalServices::Table, DentalServices::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(VisitProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VisitProducts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(VisitProducts::VisitId).integer().not_null())
                        .col(ColumnDef::new(VisitProducts::ProductId).integer().not_null())
                        .col(ColumnDef::new(VisitProducts::Quantity).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_products_visit_id")
                                .from(VisitProducts::Table, VisitProducts::VisitId)
                                .to(Visits::Table, Visits::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_visit_products_product_id")
                                .from(VisitProducts::Table, VisitProducts::ProductId)
                                .to(WarehouseUnits::Table, WarehouseUnits::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VisitProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(VisitServices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Visits::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Visits {
        Table,
        Id,
        PatientId,
        EmployeeId,
        VisitDate,
        StartTime,
        EndTime,
        Discount,
        FinalAmount,
        Status,
        VisitType,
        ReceiptId,
        PaymentAmount,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum VisitServices {
        Table,
        Id,
        VisitId,
        ServiceId,
        Quantity,
        Discount,
        Total,
    }

    #[derive(DeriveIden)]
    enum VisitProducts {
        Table,
        Id,
        VisitId,
        ProductId,
        Quantity,
    }

    #[derive(DeriveIden)]
    enum Patients {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum DentalServices {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum WarehouseUnits {
        Table,
        Id,
    }
}

mod m20240301_000005_create_payment_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_payment_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentReceipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentReceipts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PaymentReceipts::VisitId).integer().not_null())
                        .col(
                            ColumnDef::new(PaymentReceipts::ReceiptNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentReceipts::IssuedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_receipts_visit_id")
                                .from(PaymentReceipts::Table, PaymentReceipts::VisitId)
                                .to(Visits::Table, Visits::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PaymentVisits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentVisits::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PaymentVisits::ReceiptId).integer().not_null())
                        .col(ColumnDef::new(PaymentVisits::VisitId).integer().not_null())
                        .col(
                            ColumnDef::new(PaymentVisits::Amount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentVisits::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(PaymentVisits::PaidAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_visits_receipt_id")
                                .from(PaymentVisits::Table, PaymentVisits::ReceiptId)
                                .to(PaymentReceipts::Table, PaymentReceipts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_visits_visit_id")
                                .from(PaymentVisits::Table, PaymentVisits::VisitId)
                                .to(Visits::Table, Visits::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payment_visits_paid_at")
                        .table(PaymentVisits::Table)
                        .col(PaymentVisits::PaidAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PaymentVisits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentReceipts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PaymentReceipts {
        Table,
        Id,
        VisitId,
        ReceiptNumber,
        IssuedAt,
    }

    #[derive(DeriveIden)]
    enum PaymentVisits {
        Table,
        Id,
        ReceiptId,
        VisitId,
        Amount,
        PaymentMethod,
        PaidAt,
    }

    #[derive(DeriveIden)]
    enum Visits {
        Table,
        Id,
    }
}

mod m20240301_000006_create_supplier_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_supplier_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Contractors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Contractors::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Contractors::Name).string().not_null())
                        .col(ColumnDef::new(Contractors::LegalName).string().null())
                        .col(ColumnDef::new(Contractors::Inn).string().not_null())
                        .col(ColumnDef::new(Contractors::Kpp).string().null())
                        .col(ColumnDef::new(Contractors::Address).string().null())
                        .col(ColumnDef::new(Contractors::Phone).string().null())
                        .col(ColumnDef::new(Contractors::Email).string().null())
                        .col(ColumnDef::new(Contractors::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ContactPersons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContactPersons::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ContactPersons::ContractorId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContactPersons::FullName).string().not_null())
                        .col(ColumnDef::new(ContactPersons::Position).string().null())
                        .col(ColumnDef::new(ContactPersons::Phone).string().null())
                        .col(ColumnDef::new(ContactPersons::Email).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_contact_persons_contractor_id")
                                .from(ContactPersons::Table, ContactPersons::ContractorId)
                                .to(Contractors::Table, Contractors::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplierOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SupplierOrders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SupplierOrders::ContractorId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SupplierOrders::Status).string().not_null())
                        .col(ColumnDef::new(SupplierOrders::OrderDate).date().not_null())
                        .col(ColumnDef::new(SupplierOrders::ExpectedDate).date().null())
                        .col(ColumnDef::new(SupplierOrders::DeliveredDate).date().null())
                        .col(
                            ColumnDef::new(SupplierOrders::StockApplied)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(SupplierOrders::Notes).text().null())
                        .col(ColumnDef::new(SupplierOrders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(SupplierOrders::UpdatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supplier_orders_contractor_id")
                                .from(SupplierOrders::Table, SupplierOrders::ContractorId)
                                .to(Contractors::Table, Contractors::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_supplier_orders_status")
                        .table(SupplierOrders::Table)
                        .col(SupplierOrders::Status)
                        .to_owned(),
                )
                .await?;

            // No foreign key on product_id: deliveries may name products the
            // warehouse has not seen yet.
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductName).string().null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(SupplierOrders::Table, SupplierOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SupplierOrders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ContactPersons::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Contractors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Contractors {
        Table,
        Id,
        Name,
        LegalName,
        Inn,
        Kpp,
        Address,
        Phone,
        Email,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ContactPersons {
        Table,
        Id,
        ContractorId,
        FullName,
        Position,
        Phone,
        Email,
    }

    #[derive(DeriveIden)]
    enum SupplierOrders {
        Table,
        Id,
        ContractorId,
        Status,
        OrderDate,
        ExpectedDate,
        DeliveredDate,
        StockApplied,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        ProductName,
        Quantity,
        Price,
    }
}

mod m20240301_000007_create_completed_work_acts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_completed_work_acts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CompletedWorkActs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CompletedWorkActs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CompletedWorkActs::VisitId).integer().null())
                        .col(ColumnDef::new(CompletedWorkActs::CreatedOn).date().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_completed_work_acts_created_on")
                        .table(CompletedWorkActs::Table)
                        .col(CompletedWorkActs::CreatedOn)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CompletedWorkActs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CompletedWorkActs {
        Table,
        Id,
        VisitId,
        CreatedOn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    #[tokio::test]
    async fn migrations_apply_and_roll_back_on_sqlite() {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        let manager = SchemaManager::new(&db);
        for table in [
            "patients",
            "visits",
            "visit_services",
            "visit_products",
            "payment_receipts",
            "supplier_orders",
            "order_items",
            "warehouse_units",
            "completed_work_acts",
        ] {
            assert!(manager.has_table(table).await.unwrap(), "{table} missing");
        }

        Migrator::down(&db, None).await.unwrap();
        assert!(!manager.has_table("visits").await.unwrap());
    }
}
