//! Direct CRUD over roles, user profiles, trustees, borrowers and the two loan variants

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::directory::model::{
    BorrowerRequest, CheckLoanRequest, LoanBaseRequest, StandingOrderLoanRequest, TrusteeRequest,
};
use crate::error::{constraint_violation, ApiError, ApiResult, ConstraintViolation};
use crate::loan::model::{
    CheckTerms, Loan, LoanKind, LoanStatus, LoanTerms, StandingOrderTerms,
};
use crate::models::{Borrower, Role, RoleRequest, Trustee, UserProfile, UserProfileRequest};
use crate::repository::postgres::{insert_terms, update_terms};

/// Translate integrity violations on `table` into field errors
fn write_error(table: &str, entity: &str, err: sqlx::Error) -> ApiError {
    let Some(violation) = constraint_violation(&err) else {
        return ApiError::from(err);
    };
    let field = violation
        .column(table)
        .unwrap_or_else(|| "non_field_errors".to_string());

    let message = match violation {
        ConstraintViolation::Unique(_) => format!(
            "{} with this {} already exists.",
            entity,
            field.replace('_', " ")
        ),
        ConstraintViolation::ForeignKey(_) => "Object does not exist.".to_string(),
        ConstraintViolation::Check(_) => "Invalid value".to_string(),
    };
    ApiError::field(field, message)
}

fn not_found(entity: &str) -> ApiError {
    ApiError::NotFound(format!("{} not found", entity))
}

fn require_row(rows_affected: u64, entity: &str) -> ApiResult<()> {
    if rows_affected == 0 {
        return Err(not_found(entity));
    }
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct CheckLoanRow {
    loan_id: Uuid,
    borrower_id: Uuid,
    trustee_id: Option<Uuid>,
    amount: Decimal,
    start_date: NaiveDate,
    status: LoanStatus,
    form_file: Option<String>,
    created_at: DateTime<Utc>,
    num_payments: i32,
    check_details: Option<String>,
    predefined_schedule: bool,
}

impl From<CheckLoanRow> for Loan {
    fn from(row: CheckLoanRow) -> Self {
        Loan {
            loan_id: row.loan_id,
            borrower_id: row.borrower_id,
            trustee_id: row.trustee_id,
            amount: row.amount,
            start_date: row.start_date,
            status: row.status,
            form_file: row.form_file,
            created_at: row.created_at,
            terms: LoanTerms::Checks(CheckTerms {
                num_payments: row.num_payments,
                check_details: row.check_details,
                predefined_schedule: row.predefined_schedule,
            }),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StandingOrderLoanRow {
    loan_id: Uuid,
    borrower_id: Uuid,
    trustee_id: Option<Uuid>,
    amount: Decimal,
    start_date: NaiveDate,
    status: LoanStatus,
    form_file: Option<String>,
    created_at: DateTime<Utc>,
    monthly_amount: Decimal,
    charge_day: i32,
    stop_date: Option<NaiveDate>,
}

impl From<StandingOrderLoanRow> for Loan {
    fn from(row: StandingOrderLoanRow) -> Self {
        Loan {
            loan_id: row.loan_id,
            borrower_id: row.borrower_id,
            trustee_id: row.trustee_id,
            amount: row.amount,
            start_date: row.start_date,
            status: row.status,
            form_file: row.form_file,
            created_at: row.created_at,
            terms: LoanTerms::StandingOrder(StandingOrderTerms {
                monthly_amount: row.monthly_amount,
                charge_day: row.charge_day,
                stop_date: row.stop_date,
            }),
        }
    }
}

const CHECK_LOAN_SELECT: &str = r#"
    SELECT l.loan_id, l.borrower_id, l.trustee_id, l.amount, l.start_date, l.status,
           l.form_file, l.created_at, c.num_payments, c.check_details, c.predefined_schedule
    FROM loans l
    JOIN loan_checks c ON c.loan_id = l.loan_id
"#;

const STANDING_ORDER_LOAN_SELECT: &str = r#"
    SELECT l.loan_id, l.borrower_id, l.trustee_id, l.amount, l.start_date, l.status,
           l.form_file, l.created_at, s.monthly_amount, s.charge_day, s.stop_date
    FROM loans l
    JOIN loan_standing_orders s ON s.loan_id = l.loan_id
"#;

const BORROWER_COLUMNS: &str = "borrower_id, user_id, trustee_id, id_number, first_name, \
     last_name, phone, email, address, created_at";

#[derive(Clone)]
pub struct DirectoryService {
    db_pool: PgPool,
}

impl DirectoryService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    // ===== Roles =====

    pub async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles ORDER BY name")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(roles)
    }

    pub async fn get_role(&self, id: Uuid) -> ApiResult<Role> {
        sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| not_found("Role"))
    }

    pub async fn create_role(&self, request: RoleRequest) -> ApiResult<Role> {
        request.validate()?;

        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, name, description) VALUES ($1, $2, $3) RETURNING id, name, description",
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(&request.description)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| write_error("roles", "role", e))?;

        tracing::info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    pub async fn update_role(&self, id: Uuid, request: RoleRequest) -> ApiResult<Role> {
        request.validate()?;

        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $1, description = $2 WHERE id = $3 RETURNING id, name, description",
        )
        .bind(request.name.trim())
        .bind(&request.description)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| write_error("roles", "role", e))?
        .ok_or_else(|| not_found("Role"))
    }

    pub async fn delete_role(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        require_row(result.rows_affected(), "Role")
    }

    // ===== User profiles =====

    pub async fn list_user_profiles(&self) -> ApiResult<Vec<UserProfile>> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            "SELECT id, user_id, role_id, phone FROM user_profiles ORDER BY user_id",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(profiles)
    }

    pub async fn get_user_profile(&self, id: Uuid) -> ApiResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, user_id, role_id, phone FROM user_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| not_found("User profile"))
    }

    pub async fn create_user_profile(&self, request: UserProfileRequest) -> ApiResult<UserProfile> {
        request.validate()?;

        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (id, user_id, role_id, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, role_id, phone
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.role_id)
        .bind(&request.phone)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| write_error("user_profiles", "user profile", e))
    }

    pub async fn update_user_profile(
        &self,
        id: Uuid,
        request: UserProfileRequest,
    ) -> ApiResult<UserProfile> {
        request.validate()?;

        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET user_id = $1, role_id = $2, phone = $3
            WHERE id = $4
            RETURNING id, user_id, role_id, phone
            "#,
        )
        .bind(request.user_id)
        .bind(request.role_id)
        .bind(&request.phone)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| write_error("user_profiles", "user profile", e))?
        .ok_or_else(|| not_found("User profile"))
    }

    pub async fn delete_user_profile(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        require_row(result.rows_affected(), "User profile")
    }

    // ===== Trustees =====

    pub async fn list_trustees(&self) -> ApiResult<Vec<Trustee>> {
        let trustees = sqlx::query_as::<_, Trustee>(
            "SELECT trustee_id, user_id, community, notes FROM trustees ORDER BY community, trustee_id",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(trustees)
    }

    pub async fn get_trustee(&self, id: Uuid) -> ApiResult<Trustee> {
        sqlx::query_as::<_, Trustee>(
            "SELECT trustee_id, user_id, community, notes FROM trustees WHERE trustee_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| not_found("Trustee"))
    }

    pub async fn create_trustee(&self, request: TrusteeRequest) -> ApiResult<Trustee> {
        request.validate()?;

        let trustee = sqlx::query_as::<_, Trustee>(
            r#"
            INSERT INTO trustees (trustee_id, user_id, community, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING trustee_id, user_id, community, notes
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.community.trim())
        .bind(&request.notes)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| write_error("trustees", "trustee", e))?;

        tracing::info!(trustee_id = %trustee.trustee_id, community = %trustee.community, "Trustee created");
        Ok(trustee)
    }

    pub async fn update_trustee(&self, id: Uuid, request: TrusteeRequest) -> ApiResult<Trustee> {
        request.validate()?;

        sqlx::query_as::<_, Trustee>(
            r#"
            UPDATE trustees SET user_id = $1, community = $2, notes = $3
            WHERE trustee_id = $4
            RETURNING trustee_id, user_id, community, notes
            "#,
        )
        .bind(request.user_id)
        .bind(request.community.trim())
        .bind(&request.notes)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| write_error("trustees", "trustee", e))?
        .ok_or_else(|| not_found("Trustee"))
    }

    pub async fn delete_trustee(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM trustees WHERE trustee_id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        require_row(result.rows_affected(), "Trustee")
    }

    // ===== Borrowers =====

    pub async fn list_borrowers(&self) -> ApiResult<Vec<Borrower>> {
        let query = format!(
            "SELECT {} FROM borrowers ORDER BY created_at, borrower_id",
            BORROWER_COLUMNS
        );
        let borrowers = sqlx::query_as::<_, Borrower>(&query)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(borrowers)
    }

    pub async fn get_borrower(&self, id: Uuid) -> ApiResult<Borrower> {
        let query = format!("SELECT {} FROM borrowers WHERE borrower_id = $1", BORROWER_COLUMNS);
        sqlx::query_as::<_, Borrower>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| not_found("Borrower"))
    }

    pub async fn create_borrower(&self, request: BorrowerRequest) -> ApiResult<Borrower> {
        request.validate()?;

        let query = format!(
            r#"
            INSERT INTO borrowers (
                borrower_id, user_id, trustee_id, id_number, first_name,
                last_name, phone, email, address, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {}
            "#,
            BORROWER_COLUMNS
        );

        let borrower = sqlx::query_as::<_, Borrower>(&query)
            .bind(Uuid::new_v4())
            .bind(request.user_id)
            .bind(request.trustee_id)
            .bind(request.id_number.trim())
            .bind(&request.first_name)
            .bind(&request.last_name)
            .bind(&request.phone)
            .bind(&request.email)
            .bind(&request.address)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| write_error("borrowers", "borrower", e))?;

        tracing::info!(borrower_id = %borrower.borrower_id, "Borrower created");
        Ok(borrower)
    }

    pub async fn update_borrower(&self, id: Uuid, request: BorrowerRequest) -> ApiResult<Borrower> {
        request.validate()?;

        let query = format!(
            r#"
            UPDATE borrowers SET
                user_id = $1, trustee_id = $2, id_number = $3, first_name = $4,
                last_name = $5, phone = $6, email = $7, address = $8
            WHERE borrower_id = $9
            RETURNING {}
            "#,
            BORROWER_COLUMNS
        );

        sqlx::query_as::<_, Borrower>(&query)
            .bind(request.user_id)
            .bind(request.trustee_id)
            .bind(request.id_number.trim())
            .bind(&request.first_name)
            .bind(&request.last_name)
            .bind(&request.phone)
            .bind(&request.email)
            .bind(&request.address)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| write_error("borrowers", "borrower", e))?
            .ok_or_else(|| not_found("Borrower"))
    }

    pub async fn delete_borrower(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM borrowers WHERE borrower_id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        require_row(result.rows_affected(), "Borrower")
    }

    // ===== Loan variants =====

    pub async fn list_check_loans(&self) -> ApiResult<Vec<Loan>> {
        let query = format!(
            "{} ORDER BY l.start_date, l.created_at, l.loan_id",
            CHECK_LOAN_SELECT
        );
        let rows = sqlx::query_as::<_, CheckLoanRow>(&query)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    pub async fn get_check_loan(&self, id: Uuid) -> ApiResult<Loan> {
        let query = format!("{} WHERE l.loan_id = $1", CHECK_LOAN_SELECT);
        sqlx::query_as::<_, CheckLoanRow>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .map(Loan::from)
            .ok_or_else(|| not_found("Loan"))
    }

    pub async fn create_check_loan(&self, request: CheckLoanRequest) -> ApiResult<Loan> {
        request.validate()?;
        let loan_id = self
            .insert_variant(LoanKind::Checks, &request.base, request.terms())
            .await?;
        self.get_check_loan(loan_id).await
    }

    pub async fn update_check_loan(&self, id: Uuid, request: CheckLoanRequest) -> ApiResult<Loan> {
        request.validate()?;
        self.update_variant(id, LoanKind::Checks, &request.base, request.terms())
            .await?;
        self.get_check_loan(id).await
    }

    pub async fn list_standing_order_loans(&self) -> ApiResult<Vec<Loan>> {
        let query = format!(
            "{} ORDER BY l.start_date, l.created_at, l.loan_id",
            STANDING_ORDER_LOAN_SELECT
        );
        let rows = sqlx::query_as::<_, StandingOrderLoanRow>(&query)
            .fetch_all(&self.db_pool)
            .await?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    pub async fn get_standing_order_loan(&self, id: Uuid) -> ApiResult<Loan> {
        let query = format!("{} WHERE l.loan_id = $1", STANDING_ORDER_LOAN_SELECT);
        sqlx::query_as::<_, StandingOrderLoanRow>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .map(Loan::from)
            .ok_or_else(|| not_found("Loan"))
    }

    pub async fn create_standing_order_loan(
        &self,
        request: StandingOrderLoanRequest,
    ) -> ApiResult<Loan> {
        request.validate()?;
        let loan_id = self
            .insert_variant(LoanKind::StandingOrder, &request.base, request.terms())
            .await?;
        self.get_standing_order_loan(loan_id).await
    }

    pub async fn update_standing_order_loan(
        &self,
        id: Uuid,
        request: StandingOrderLoanRequest,
    ) -> ApiResult<Loan> {
        request.validate()?;
        self.update_variant(id, LoanKind::StandingOrder, &request.base, request.terms())
            .await?;
        self.get_standing_order_loan(id).await
    }

    /// Delete a loan of the given variant; its variant row and payments cascade
    pub async fn delete_loan(&self, id: Uuid, kind: LoanKind) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM loans WHERE loan_id = $1 AND kind = $2")
            .bind(id)
            .bind(kind)
            .execute(&self.db_pool)
            .await?;
        require_row(result.rows_affected(), "Loan")?;
        tracing::info!(loan_id = %id, loan_type = kind.as_str(), "Loan deleted");
        Ok(())
    }

    async fn insert_variant(
        &self,
        kind: LoanKind,
        base: &LoanBaseRequest,
        terms: LoanTerms,
    ) -> ApiResult<Uuid> {
        let loan_id = Uuid::new_v4();
        let mut tx = self.db_pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id, kind, borrower_id, trustee_id, amount, start_date,
                status, form_file, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            "#,
        )
        .bind(loan_id)
        .bind(kind)
        .bind(base.borrower_id)
        .bind(base.trustee_id)
        .bind(base.amount)
        .bind(base.start_date)
        .bind(base.status)
        .bind(&base.form_file)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("loans", "loan", e))?;

        insert_terms(&mut tx, loan_id, &terms)
            .await
            .map_err(|e| write_error(variant_table(kind), "loan", e))?;

        tx.commit().await?;

        tracing::info!(loan_id = %loan_id, loan_type = kind.as_str(), "Loan created");
        Ok(loan_id)
    }

    async fn update_variant(
        &self,
        id: Uuid,
        kind: LoanKind,
        base: &LoanBaseRequest,
        terms: LoanTerms,
    ) -> ApiResult<()> {
        let mut tx = self.db_pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE loans
            SET borrower_id = $1, trustee_id = $2, amount = $3, start_date = $4,
                status = $5, form_file = $6
            WHERE loan_id = $7 AND kind = $8
            "#,
        )
        .bind(base.borrower_id)
        .bind(base.trustee_id)
        .bind(base.amount)
        .bind(base.start_date)
        .bind(base.status)
        .bind(&base.form_file)
        .bind(id)
        .bind(kind)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("loans", "loan", e))?;
        require_row(result.rows_affected(), "Loan")?;

        update_terms(&mut tx, id, &terms)
            .await
            .map_err(|e| write_error(variant_table(kind), "loan", e))?;

        tx.commit().await?;
        Ok(())
    }
}

fn variant_table(kind: LoanKind) -> &'static str {
    match kind {
        LoanKind::Checks => "loan_checks",
        LoanKind::StandingOrder => "loan_standing_orders",
    }
}
