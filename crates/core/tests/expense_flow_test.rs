use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

use verzoeken_core::db::{self, DbPool};
use verzoeken_core::documents::FsDocumentStore;
use verzoeken_core::errors::{Error, ValidationError};
use verzoeken_core::expenses::{
    current_status, ExpenseError, ExpenseListQuery, ExpenseRepository, ExpenseService,
    ExpenseServiceTrait, ExpenseStatus, ExpenseUpdate, IbDeclaration, NewExpense, PaymentMethod,
};
use verzoeken_core::notifications::{
    EmailMessage, NotificationDispatcher, NotifierTrait,
};
use verzoeken_core::users::{
    AuthContext, NewUser, Role, User, UserRepository, UserRepositoryTrait,
};
use verzoeken_core::companies::{CompanyRepository, CompanyRepositoryTrait, NewCompany};
use verzoeken_core::Result;

struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingNotifier {
    fn new(fail: bool) -> Self {
        RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail,
        }
    }

    fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierTrait for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        if self.fail {
            return Err(verzoeken_core::notifications::NotificationError::RelayRejected(502).into());
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

struct Fixture {
    _tmp: TempDir,
    service: ExpenseService,
    notifier: Arc<RecordingNotifier>,
    financial_worker: AuthContext,
    external_consultant: AuthContext,
    internal_consultant: AuthContext,
    internal_employee: AuthContext,
    company_id: String,
}

fn create_user(pool: &Arc<DbPool>, name: &str, email: &str, role: Role) -> User {
    let repo = UserRepository::new(pool.clone());
    repo.insert_new_user(NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "argon2-hash".to_string(),
        role,
    })
    .unwrap()
}

fn setup() -> Fixture {
    setup_with_notifier(false)
}

fn setup_with_notifier(failing: bool) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let db_file = tmp.path().join("portal.db");
    let db_path = db::init(db_file.to_str().unwrap()).unwrap();
    let pool = db::create_pool(&db_path).unwrap();
    db::run_migrations(&pool).unwrap();

    let fw = create_user(&pool, "Femke", "femke@portal.test", Role::FinancialWorker);
    let ec = create_user(&pool, "Erik", "erik@portal.test", Role::ExternalConsultant);
    let ic = create_user(&pool, "Iris", "iris@portal.test", Role::InternalConsultant);
    let ie = create_user(&pool, "Imre", "imre@portal.test", Role::InternalEmployee);

    let companies = CompanyRepository::new(pool.clone());
    let company = companies
        .insert_new_company(NewCompany {
            id: None,
            name: "Vita Verzekeringen".to_string(),
        })
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new(failing));
    let service = ExpenseService::new(
        Arc::new(ExpenseRepository::new(pool.clone())),
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(FsDocumentStore::new(tmp.path().join("documents"))),
        NotificationDispatcher::new(notifier.clone()),
        "http://localhost:3000".to_string(),
    );

    Fixture {
        _tmp: tmp,
        service,
        notifier,
        financial_worker: AuthContext {
            user_id: fw.id,
            role: Role::FinancialWorker,
        },
        external_consultant: AuthContext {
            user_id: ec.id,
            role: Role::ExternalConsultant,
        },
        internal_consultant: AuthContext {
            user_id: ic.id,
            role: Role::InternalConsultant,
        },
        internal_employee: AuthContext {
            user_id: ie.id,
            role: Role::InternalEmployee,
        },
        company_id: company.id,
    }
}

fn new_expense(company_id: &str, last_name: &str, city: &str) -> NewExpense {
    NewExpense {
        handler_id: None,
        company_id: company_id.to_string(),
        customer_salutation: "Dhr.".to_string(),
        customer_initials: "J.".to_string(),
        customer_prefix: None,
        customer_last_name: last_name.to_string(),
        customer_email: "klant@voorbeeld.nl".to_string(),
        second_customer_salutation: None,
        second_customer_initials: None,
        second_customer_prefix: None,
        second_customer_last_name: None,
        second_customer_email: None,
        invoice_address: "Hoofdstraat 1".to_string(),
        postal_code: "1234 AB".to_string(),
        city: city.to_string(),
        passing_date: None,
        notary_name: "Notariskantoor Kleiner".to_string(),
        starter_loan: false,
        object_address: "Dorpsweg 12".to_string(),
        object_postal_code: "5678 CD".to_string(),
        object_city: city.to_string(),
        mortgage_invoice_amount: Some(Decimal::new(53434, 2)),
        insurance_invoice_amount: None,
        other_invoice_amount: None,
        signed_otdv: None,
        zzp_invoice: None,
        spread_payment_agreement: None,
        payment_method: PaymentMethod::Notary,
        ib_declaration: IbDeclaration::No,
        notes: None,
    }
}

fn list_query(filter: serde_json::Value, sort: serde_json::Value) -> ExpenseListQuery {
    ExpenseListQuery {
        page: 1,
        take: 25,
        filter: filter.as_object().cloned().unwrap_or_default(),
        sort: sort.as_object().cloned().unwrap_or_default(),
    }
}

#[tokio::test]
async fn lifecycle_from_submission_to_completion() {
    let fx = setup();

    let created = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Jansen", "Utrecht"),
        )
        .unwrap();
    assert_eq!(created.handler_name, "Erik");
    assert_eq!(created.company_name, "Vita Verzekeringen");
    assert_eq!(current_status(&created.states), Some(ExpenseStatus::Submitted));
    assert!(created.expense.completed_at.is_none());

    let approved = fx
        .service
        .approve_expense(&fx.financial_worker, &created.expense.id)
        .unwrap();
    assert_eq!(current_status(&approved.states), Some(ExpenseStatus::Approved));

    // The precondition no longer holds, so a second approval conflicts.
    match fx
        .service
        .approve_expense(&fx.financial_worker, &created.expense.id)
    {
        Err(Error::Expense(ExpenseError::InvalidTransition(_))) => {}
        other => panic!("expected conflict, got {:?}", other.map(|_| ())),
    }

    let completed = fx
        .service
        .complete_expense(&fx.financial_worker, &created.expense.id)
        .unwrap();
    assert_eq!(
        current_status(&completed.states),
        Some(ExpenseStatus::Completed)
    );
    assert!(completed.expense.completed_at.is_some());

    // Completed records are locked for the original submitter.
    match fx.service.edit_expense(
        &fx.external_consultant,
        &created.expense.id,
        ExpenseUpdate::default(),
    ) {
        Err(Error::Expense(ExpenseError::Forbidden(_))) => {}
        other => panic!("expected locked record, got {:?}", other.map(|_| ())),
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    let messages = fx.notifier.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.recipient_email == "erik@portal.test"));
    assert!(messages.iter().any(|m| m.subject.contains("goedgekeurd")));
    assert!(messages.iter().any(|m| m.subject.contains("afgerond")));
    assert!(messages[0]
        .button_url
        .ends_with(&format!("/verzoeken/{}", created.expense.id)));
}

#[tokio::test]
async fn rejection_requires_notes_and_allows_resubmission() {
    let fx = setup();
    let created = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Visser", "Breda"),
        )
        .unwrap();

    match fx
        .service
        .reject_expense(&fx.financial_worker, &created.expense.id, "  ".to_string())
    {
        Err(Error::Expense(ExpenseError::InvalidData(_))) => {}
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }
    // Nothing was appended by the refused rejection.
    let unchanged = fx
        .service
        .get_expense(&fx.financial_worker, &created.expense.id)
        .unwrap();
    assert_eq!(unchanged.states.len(), 1);

    let rejected = fx
        .service
        .reject_expense(
            &fx.financial_worker,
            &created.expense.id,
            "Handtekening ontbreekt".to_string(),
        )
        .unwrap();
    assert_eq!(current_status(&rejected.states), Some(ExpenseStatus::Rejected));
    assert_eq!(
        rejected.states.last().unwrap().notes.as_deref(),
        Some("Handtekening ontbreekt")
    );

    // A rejected record unlocks for the submitter; an edit resubmits it.
    let update = ExpenseUpdate {
        object_city: Some("Tilburg".to_string()),
        ..ExpenseUpdate::default()
    };
    let resubmitted = fx
        .service
        .edit_expense(&fx.external_consultant, &created.expense.id, update)
        .unwrap();
    assert_eq!(
        current_status(&resubmitted.states),
        Some(ExpenseStatus::Resubmitted)
    );
    assert_eq!(resubmitted.expense.object_city, "Tilburg");

    // The cycle restarts: the reviewer can act again.
    let approved = fx
        .service
        .approve_expense(&fx.financial_worker, &created.expense.id)
        .unwrap();
    assert_eq!(current_status(&approved.states), Some(ExpenseStatus::Approved));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let messages = fx.notifier.messages();
    assert!(messages
        .iter()
        .any(|m| m.content.contains("Handtekening ontbreekt")));
}

#[tokio::test]
async fn consultants_cannot_review() {
    let fx = setup();
    let created = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Smit", "Zwolle"),
        )
        .unwrap();

    match fx
        .service
        .approve_expense(&fx.external_consultant, &created.expense.id)
    {
        Err(Error::Expense(ExpenseError::Forbidden(_))) => {}
        other => panic!("expected forbidden, got {:?}", other.map(|_| ())),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fx.notifier.messages().is_empty());
}

#[tokio::test]
async fn listing_is_scoped_per_role() {
    let fx = setup();

    // Erik submits his own claim; Imre submits one handled by Iris.
    fx.service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Jansen", "Utrecht"),
        )
        .unwrap();
    let mut handled_by_iris = new_expense(&fx.company_id, "Bakker", "Arnhem");
    handled_by_iris.handler_id = Some(fx.internal_consultant.user_id.clone());
    fx.service
        .create_expense(&fx.internal_employee, handled_by_iris)
        .unwrap();

    let all = fx
        .service
        .list_expenses(&fx.financial_worker, &list_query(json!({}), json!({})))
        .unwrap();
    assert_eq!(all.count, 2);
    assert_eq!(all.collection.len(), 2);

    let own = fx
        .service
        .list_expenses(&fx.external_consultant, &list_query(json!({}), json!({})))
        .unwrap();
    assert_eq!(own.count, 1);
    assert_eq!(own.collection[0].expense.customer_last_name, "Jansen");

    // Internal employees only see claims handled by internal consultants.
    let employee_view = fx
        .service
        .list_expenses(&fx.internal_employee, &list_query(json!({}), json!({})))
        .unwrap();
    assert_eq!(employee_view.count, 1);
    assert_eq!(employee_view.collection[0].handler_name, "Iris");

    let iris_view = fx
        .service
        .list_expenses(&fx.internal_consultant, &list_query(json!({}), json!({})))
        .unwrap();
    assert_eq!(iris_view.count, 1);
    assert_eq!(iris_view.collection[0].expense.customer_last_name, "Bakker");
}

#[tokio::test]
async fn status_filter_shrinks_collection_but_not_count() {
    let fx = setup();
    let first = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Jansen", "Utrecht"),
        )
        .unwrap();
    fx.service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Visser", "Breda"),
        )
        .unwrap();
    fx.service
        .approve_expense(&fx.financial_worker, &first.expense.id)
        .unwrap();

    let submitted_only = fx
        .service
        .list_expenses(
            &fx.financial_worker,
            &list_query(json!({ "states": ["SUBMITTED"] }), json!({})),
        )
        .unwrap();
    assert_eq!(submitted_only.collection.len(), 1);
    assert_eq!(
        submitted_only.collection[0].expense.customer_last_name,
        "Visser"
    );
    // The count stays a storage-level upper bound.
    assert_eq!(submitted_only.count, 2);
}

#[tokio::test]
async fn filters_and_sorts_apply() {
    let fx = setup();
    for (last_name, city) in [
        ("Jansen", "Utrecht"),
        ("Bakker", "Amsterdam"),
        ("Visser", "Amstelveen"),
    ] {
        fx.service
            .create_expense(
                &fx.external_consultant,
                new_expense(&fx.company_id, last_name, city),
            )
            .unwrap();
    }

    let exact = fx
        .service
        .list_expenses(
            &fx.financial_worker,
            &list_query(json!({ "objectCity": { "equals": "Utrecht" } }), json!({})),
        )
        .unwrap();
    assert_eq!(exact.count, 1);
    assert_eq!(exact.collection[0].expense.customer_last_name, "Jansen");

    // One search box matching several columns builds an OR group.
    let or_group = fx
        .service
        .list_expenses(
            &fx.financial_worker,
            &list_query(
                json!({ "objectAddress||objectCity": { "contains": "amst" } }),
                json!({ "customerLastName": "asc" }),
            ),
        )
        .unwrap();
    assert_eq!(or_group.count, 2);
    let names: Vec<&str> = or_group
        .collection
        .iter()
        .map(|d| d.expense.customer_last_name.as_str())
        .collect();
    assert_eq!(names, vec!["Bakker", "Visser"]);

    let unknown_path = fx.service.list_expenses(
        &fx.financial_worker,
        &list_query(json!({ "password": { "contains": "x" } }), json!({})),
    );
    match unknown_path {
        Err(Error::Validation(ValidationError::InvalidInput(_))) => {}
        other => panic!("expected rejected path, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn take_all_disables_pagination() {
    let fx = setup();
    for i in 0..30 {
        fx.service
            .create_expense(
                &fx.external_consultant,
                new_expense(&fx.company_id, &format!("Klant{i:02}"), "Utrecht"),
            )
            .unwrap();
    }

    let paged = fx
        .service
        .list_expenses(
            &fx.financial_worker,
            &ExpenseListQuery {
                page: 2,
                take: 25,
                filter: Default::default(),
                sort: Default::default(),
            },
        )
        .unwrap();
    assert_eq!(paged.count, 30);
    assert_eq!(paged.collection.len(), 5);

    let everything = fx
        .service
        .list_expenses(
            &fx.financial_worker,
            &ExpenseListQuery {
                page: 1,
                take: -1,
                filter: Default::default(),
                sort: Default::default(),
            },
        )
        .unwrap();
    assert_eq!(everything.collection.len(), 30);
}

#[tokio::test]
async fn notifier_failures_never_fail_the_transition() {
    let fx = setup_with_notifier(true);
    let created = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Jansen", "Utrecht"),
        )
        .unwrap();

    let approved = fx
        .service
        .approve_expense(&fx.financial_worker, &created.expense.id)
        .unwrap();
    assert_eq!(current_status(&approved.states), Some(ExpenseStatus::Approved));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fx.notifier.messages().is_empty());
}

#[tokio::test]
async fn is_early_flags_transfers_that_precede_submission() {
    let fx = setup();

    let mut early = new_expense(&fx.company_id, "Jansen", "Utrecht");
    early.passing_date = Some(chrono::Utc::now().date_naive() - chrono::Duration::days(3));
    let created = fx
        .service
        .create_expense(&fx.external_consultant, early)
        .unwrap();
    assert_eq!(created.is_early, Some(true));

    let mut planned = new_expense(&fx.company_id, "Visser", "Breda");
    planned.passing_date = Some(chrono::Utc::now().date_naive() + chrono::Duration::days(14));
    let created = fx
        .service
        .create_expense(&fx.external_consultant, planned)
        .unwrap();
    assert_eq!(created.is_early, Some(false));

    // Without a passing date the flag is absent, not false.
    let created = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Smit", "Zwolle"),
        )
        .unwrap();
    assert_eq!(created.is_early, None);
}

#[tokio::test]
async fn single_record_access_is_scoped() {
    let fx = setup();
    let created = fx
        .service
        .create_expense(
            &fx.external_consultant,
            new_expense(&fx.company_id, "Jansen", "Utrecht"),
        )
        .unwrap();

    // Iris neither handles nor submitted this claim.
    match fx
        .service
        .get_expense(&fx.internal_consultant, &created.expense.id)
    {
        Err(Error::Expense(ExpenseError::Forbidden(_))) => {}
        other => panic!("expected forbidden, got {:?}", other.map(|_| ())),
    }

    match fx.service.get_expense(&fx.financial_worker, "missing-id") {
        Err(Error::Expense(ExpenseError::NotFound(_))) => {}
        other => panic!("expected not found, got {:?}", other.map(|_| ())),
    }
}
