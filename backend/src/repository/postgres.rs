//! PostgreSQL implementation of [`LoanRepository`]

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ActiveLoanTotals, LoanRepository, RepositoryError};
use crate::loan::model::{
    CheckTerms, Loan, LoanDraft, LoanKind, LoanRecord, LoanRef, LoanStatus, LoanTerms,
    StandingOrderTerms,
};
use crate::models::{Borrower, BorrowerParty, LinkedUser, Trustee, TrusteeParty};
use crate::payment::model::{Payment, PaymentStatus};

/// Loan joined with both variant tables and every party it displays
const LOAN_RECORD_SELECT: &str = r#"
    SELECT
        l.loan_id, l.kind, l.borrower_id, l.trustee_id, l.amount, l.start_date,
        l.status, l.form_file, l.created_at,
        c.num_payments, c.check_details, c.predefined_schedule,
        s.monthly_amount, s.charge_day, s.stop_date,
        b.user_id AS borrower_user_id, b.trustee_id AS borrower_trustee_id, b.id_number,
        b.first_name AS borrower_first_name, b.last_name AS borrower_last_name,
        b.phone AS borrower_phone, b.email AS borrower_email, b.address AS borrower_address,
        b.created_at AS borrower_created_at,
        bu.first_name AS user_first_name, bu.last_name AS user_last_name,
        bu.email AS user_email, bp.phone AS user_phone,
        t.user_id AS trustee_user_id, t.community AS trustee_community,
        t.notes AS trustee_notes, tu.first_name AS trustee_first_name
    FROM loans l
    LEFT JOIN loan_checks c ON c.loan_id = l.loan_id
    LEFT JOIN loan_standing_orders s ON s.loan_id = l.loan_id
    JOIN borrowers b ON b.borrower_id = l.borrower_id
    LEFT JOIN users bu ON bu.id = b.user_id
    LEFT JOIN user_profiles bp ON bp.user_id = b.user_id
    LEFT JOIN trustees t ON t.trustee_id = l.trustee_id
    LEFT JOIN users tu ON tu.id = t.user_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct LoanRecordRow {
    loan_id: Uuid,
    kind: LoanKind,
    borrower_id: Uuid,
    trustee_id: Option<Uuid>,
    amount: Decimal,
    start_date: NaiveDate,
    status: LoanStatus,
    form_file: Option<String>,
    created_at: DateTime<Utc>,
    num_payments: Option<i32>,
    check_details: Option<String>,
    predefined_schedule: Option<bool>,
    monthly_amount: Option<Decimal>,
    charge_day: Option<i32>,
    stop_date: Option<NaiveDate>,
    borrower_user_id: Option<Uuid>,
    borrower_trustee_id: Option<Uuid>,
    id_number: String,
    borrower_first_name: String,
    borrower_last_name: String,
    borrower_phone: String,
    borrower_email: String,
    borrower_address: String,
    borrower_created_at: DateTime<Utc>,
    user_first_name: Option<String>,
    user_last_name: Option<String>,
    user_email: Option<String>,
    user_phone: Option<String>,
    trustee_user_id: Option<Uuid>,
    trustee_community: Option<String>,
    trustee_notes: Option<String>,
    trustee_first_name: Option<String>,
}

impl LoanRecordRow {
    fn try_into_record(self) -> Result<LoanRecord, RepositoryError> {
        let terms = match self.kind {
            LoanKind::Checks => LoanTerms::Checks(CheckTerms {
                num_payments: self.num_payments.ok_or_else(|| missing_variant(self.loan_id))?,
                check_details: self.check_details,
                predefined_schedule: self.predefined_schedule.unwrap_or(true),
            }),
            LoanKind::StandingOrder => LoanTerms::StandingOrder(StandingOrderTerms {
                monthly_amount: self
                    .monthly_amount
                    .ok_or_else(|| missing_variant(self.loan_id))?,
                charge_day: self.charge_day.ok_or_else(|| missing_variant(self.loan_id))?,
                stop_date: self.stop_date,
            }),
        };

        let user = match (self.borrower_user_id, self.user_first_name) {
            (Some(_), Some(first_name)) => Some(LinkedUser {
                first_name,
                last_name: self.user_last_name.unwrap_or_default(),
                email: self.user_email.unwrap_or_default(),
                phone: self.user_phone,
            }),
            _ => None,
        };

        let trustee = match (self.trustee_id, self.trustee_user_id, self.trustee_community) {
            (Some(trustee_id), Some(user_id), Some(community)) => Some(TrusteeParty {
                trustee: Trustee {
                    trustee_id,
                    user_id,
                    community,
                    notes: self.trustee_notes,
                },
                first_name: self.trustee_first_name.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(LoanRecord {
            loan: Loan {
                loan_id: self.loan_id,
                borrower_id: self.borrower_id,
                trustee_id: self.trustee_id,
                amount: self.amount,
                start_date: self.start_date,
                status: self.status,
                form_file: self.form_file,
                created_at: self.created_at,
                terms,
            },
            borrower: BorrowerParty {
                borrower: Borrower {
                    borrower_id: self.borrower_id,
                    user_id: self.borrower_user_id,
                    trustee_id: self.borrower_trustee_id,
                    id_number: self.id_number,
                    first_name: self.borrower_first_name,
                    last_name: self.borrower_last_name,
                    phone: self.borrower_phone,
                    email: self.borrower_email,
                    address: self.borrower_address,
                    created_at: self.borrower_created_at,
                },
                user,
            },
            trustee,
        })
    }
}

fn missing_variant(loan_id: Uuid) -> RepositoryError {
    RepositoryError::Corrupt(format!("loan {} has no row for its variant", loan_id))
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentDbRow {
    payment_id: Uuid,
    loan_kind: LoanKind,
    loan_id: Uuid,
    due_date: NaiveDate,
    amount: Decimal,
    amount_paid: Decimal,
    status: PaymentStatus,
    paid_at: Option<DateTime<Utc>>,
    check_number: Option<String>,
}

impl From<PaymentDbRow> for Payment {
    fn from(row: PaymentDbRow) -> Self {
        Payment {
            payment_id: row.payment_id,
            loan: LoanRef {
                kind: row.loan_kind,
                loan_id: row.loan_id,
            },
            due_date: row.due_date,
            amount: row.amount,
            amount_paid: row.amount_paid,
            status: row.status,
            paid_at: row.paid_at,
            check_number: row.check_number,
        }
    }
}

/// Loan repository backed by the shared Postgres pool
#[derive(Clone)]
pub struct PgLoanRepository {
    db_pool: PgPool,
}

impl PgLoanRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LoanRepository for PgLoanRepository {
    async fn list_active(&self, kind: LoanKind) -> Result<Vec<LoanRecord>, RepositoryError> {
        let query = format!(
            "{} WHERE l.kind = $1 AND l.status = $2 ORDER BY l.start_date, l.created_at, l.loan_id",
            LOAN_RECORD_SELECT
        );

        let rows = sqlx::query_as::<_, LoanRecordRow>(&query)
            .bind(kind)
            .bind(LoanStatus::Active)
            .fetch_all(&self.db_pool)
            .await?;

        rows.into_iter().map(LoanRecordRow::try_into_record).collect()
    }

    async fn find_loan(&self, loan_id: Uuid) -> Result<Option<LoanRecord>, RepositoryError> {
        let query = format!("{} WHERE l.loan_id = $1", LOAN_RECORD_SELECT);

        sqlx::query_as::<_, LoanRecordRow>(&query)
            .bind(loan_id)
            .fetch_optional(&self.db_pool)
            .await?
            .map(LoanRecordRow::try_into_record)
            .transpose()
    }

    async fn find_trustee(&self, trustee_id: Uuid) -> Result<Option<Trustee>, RepositoryError> {
        let trustee = sqlx::query_as::<_, Trustee>(
            "SELECT trustee_id, user_id, community, notes FROM trustees WHERE trustee_id = $1",
        )
        .bind(trustee_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(trustee)
    }

    async fn create_loan(&self, draft: LoanDraft) -> Result<Loan, RepositoryError> {
        let mut tx = self.db_pool.begin().await?;

        // 1. Upsert borrower by id number (last write wins)
        let (borrower_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO borrowers (
                borrower_id, trustee_id, id_number, first_name, last_name,
                phone, email, address, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (id_number) DO UPDATE SET
                trustee_id = EXCLUDED.trustee_id,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                address = EXCLUDED.address
            RETURNING borrower_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.borrower.trustee_id)
        .bind(&draft.borrower.id_number)
        .bind(&draft.borrower.first_name)
        .bind(&draft.borrower.last_name)
        .bind(&draft.borrower.phone)
        .bind(&draft.borrower.email)
        .bind(&draft.borrower.address)
        .fetch_one(&mut *tx)
        .await?;

        // 2. Base loan row
        let kind = match draft.terms {
            LoanTerms::Checks(_) => LoanKind::Checks,
            LoanTerms::StandingOrder(_) => LoanKind::StandingOrder,
        };

        let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
            r#"
            INSERT INTO loans (
                loan_id, kind, borrower_id, trustee_id, amount, start_date,
                status, form_file, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING created_at
            "#,
        )
        .bind(draft.loan_id)
        .bind(kind)
        .bind(borrower_id)
        .bind(draft.trustee_id)
        .bind(draft.amount)
        .bind(draft.start_date)
        .bind(draft.status)
        .bind(&draft.form_file)
        .fetch_one(&mut *tx)
        .await?;

        // 3. Variant row
        insert_terms(&mut tx, draft.loan_id, &draft.terms).await?;

        // 4. Schedule
        for installment in &draft.schedule {
            sqlx::query(
                r#"
                INSERT INTO payments (payment_id, loan_kind, loan_id, due_date, amount, amount_paid, status)
                VALUES ($1, $2, $3, $4, $5, 0, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(kind)
            .bind(draft.loan_id)
            .bind(installment.due_date)
            .bind(installment.amount)
            .bind(PaymentStatus::Pending)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            loan_id = %draft.loan_id,
            borrower_id = %borrower_id,
            installments = draft.schedule.len(),
            "Loan persisted"
        );

        Ok(Loan {
            loan_id: draft.loan_id,
            borrower_id,
            trustee_id: draft.trustee_id,
            amount: draft.amount,
            start_date: draft.start_date,
            status: draft.status,
            form_file: draft.form_file,
            created_at,
            terms: draft.terms,
        })
    }

    async fn save_loan(&self, loan: &Loan) -> Result<(), RepositoryError> {
        let mut tx = self.db_pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE loans
            SET trustee_id = $1, amount = $2, start_date = $3, status = $4, form_file = $5
            WHERE loan_id = $6
            "#,
        )
        .bind(loan.trustee_id)
        .bind(loan.amount)
        .bind(loan.start_date)
        .bind(loan.status)
        .bind(&loan.form_file)
        .bind(loan.loan_id)
        .execute(&mut *tx)
        .await?;

        update_terms(&mut tx, loan.loan_id, &loan.terms).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn settle_due_payments(
        &self,
        loan: LoanRef,
        as_of: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $1, amount_paid = amount, paid_at = NOW()
            WHERE loan_kind = $2 AND loan_id = $3 AND status = $4 AND due_date <= $5
            "#,
        )
        .bind(PaymentStatus::Paid)
        .bind(loan.kind)
        .bind(loan.loan_id)
        .bind(PaymentStatus::Pending)
        .bind(as_of)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn payments_for(&self, loan: LoanRef) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentDbRow>(
            r#"
            SELECT payment_id, loan_kind, loan_id, due_date, amount, amount_paid,
                   status, paid_at, check_number
            FROM payments
            WHERE loan_kind = $1 AND loan_id = $2
            ORDER BY due_date, payment_id
            "#,
        )
        .bind(loan.kind)
        .bind(loan.loan_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn active_loan_totals(&self) -> Result<ActiveLoanTotals, RepositoryError> {
        let (count, amount): (i64, Decimal) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(amount), 0) FROM loans WHERE status = $1",
        )
        .bind(LoanStatus::Active)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(ActiveLoanTotals { count, amount })
    }
}

/// Insert the variant row for a freshly created base loan
pub(crate) async fn insert_terms(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    loan_id: Uuid,
    terms: &LoanTerms,
) -> Result<(), sqlx::Error> {
    match terms {
        LoanTerms::Checks(checks) => {
            sqlx::query(
                r#"
                INSERT INTO loan_checks (loan_id, num_payments, check_details, predefined_schedule)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(loan_id)
            .bind(checks.num_payments)
            .bind(&checks.check_details)
            .bind(checks.predefined_schedule)
            .execute(&mut **tx)
            .await?;
        }
        LoanTerms::StandingOrder(order) => {
            sqlx::query(
                r#"
                INSERT INTO loan_standing_orders (loan_id, monthly_amount, charge_day, stop_date)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(loan_id)
            .bind(order.monthly_amount)
            .bind(order.charge_day)
            .bind(order.stop_date)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

/// Overwrite the variant row of an existing loan
pub(crate) async fn update_terms(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    loan_id: Uuid,
    terms: &LoanTerms,
) -> Result<(), sqlx::Error> {
    match terms {
        LoanTerms::Checks(checks) => {
            sqlx::query(
                r#"
                UPDATE loan_checks
                SET num_payments = $1, check_details = $2, predefined_schedule = $3
                WHERE loan_id = $4
                "#,
            )
            .bind(checks.num_payments)
            .bind(&checks.check_details)
            .bind(checks.predefined_schedule)
            .bind(loan_id)
            .execute(&mut **tx)
            .await?;
        }
        LoanTerms::StandingOrder(order) => {
            sqlx::query(
                r#"
                UPDATE loan_standing_orders
                SET monthly_amount = $1, charge_day = $2, stop_date = $3
                WHERE loan_id = $4
                "#,
            )
            .bind(order.monthly_amount)
            .bind(order.charge_day)
            .bind(order.stop_date)
            .bind(loan_id)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}
