// src/models/crm.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::AppError;

// --- ENUMS ---

// Mapeia o enum `deal_stage` do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub const ALL: [DealStage; 6] = [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "lead",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed_won",
            DealStage::ClosedLost => "closed_lost",
        }
    }

    /// Rótulo da tabela: `closed_won` -> `CLOSED WON`.
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1).to_uppercase()
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

impl FromStr for DealStage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DealStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

// Mapeia o enum `activity_type` do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Note,
    Call,
    Email,
    Meeting,
    Task,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::Note,
        ActivityType::Call,
        ActivityType::Email,
        ActivityType::Meeting,
        ActivityType::Task,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Note => "note",
            ActivityType::Call => "call",
            ActivityType::Email => "email",
            ActivityType::Meeting => "meeting",
            ActivityType::Task => "task",
        }
    }

    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl FromStr for ActivityType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "valor desconhecido: '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// --- RELAÇÃO POLIMÓRFICA ---

/// Para onde aponta uma atividade. No banco são duas colunas
/// (`entity_type` + `entity_id`); aqui só existem as combinações válidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "entity_type", content = "entity_id", rename_all = "lowercase")]
pub enum RelatedEntity {
    Customer(Uuid),
    Deal(Uuid),
}

impl RelatedEntity {
    pub const CUSTOMER: &'static str = "customer";
    pub const DEAL: &'static str = "deal";

    pub fn from_parts(entity_type: &str, entity_id: Uuid) -> Result<Self, UnknownVariant> {
        match entity_type {
            Self::CUSTOMER => Ok(RelatedEntity::Customer(entity_id)),
            Self::DEAL => Ok(RelatedEntity::Deal(entity_id)),
            other => Err(UnknownVariant(other.to_string())),
        }
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            RelatedEntity::Customer(_) => Self::CUSTOMER,
            RelatedEntity::Deal(_) => Self::DEAL,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RelatedEntity::Customer(id) | RelatedEntity::Deal(id) => *id,
        }
    }
}

// --- ENTIDADES ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub status: String,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub amount: Option<Decimal>,
    pub stage: DealStage,
    pub expected_close_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
    pub probability: Option<i32>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActivityRecord")]
pub struct Activity {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub related: RelatedEntity,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A linha crua de `activities`, como o store devolve, com os joins opcionais.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub customers: Option<NameRef>,
    pub deals: Option<NameRef>,
}

impl TryFrom<ActivityRecord> for Activity {
    type Error = UnknownVariant;

    fn try_from(raw: ActivityRecord) -> Result<Self, Self::Error> {
        Ok(Activity {
            id: raw.id,
            kind: raw.kind,
            related: RelatedEntity::from_parts(&raw.entity_type, raw.entity_id)?,
            title: raw.title,
            description: raw.description,
            due_date: raw.due_date,
            completed_at: raw.completed_at,
            assigned_to: raw.assigned_to,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

// Projeção `tabela (name)` usada pelos joins de exibição
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

// Item de um <select> nos formulários
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: Uuid,
    pub name: String,
}

/// Negócio + nome do cliente (join `customers (name)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRow {
    #[serde(flatten)]
    pub deal: Deal,
    pub customers: Option<NameRef>,
}

impl DealRow {
    pub fn customer_name(&self) -> Option<&str> {
        self.customers.as_ref().map(|c| c.name.as_str())
    }
}

/// Atividade + nome do registro relacionado, escolhido pelo tipo da relação.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ActivityRecord")]
pub struct ActivityRow {
    pub activity: Activity,
    pub related_name: Option<String>,
}

impl TryFrom<ActivityRecord> for ActivityRow {
    type Error = UnknownVariant;

    fn try_from(mut raw: ActivityRecord) -> Result<Self, Self::Error> {
        let customers = raw.customers.take();
        let deals = raw.deals.take();
        let activity = Activity::try_from(raw)?;

        // Os dois joins podem vir preenchidos; vale o que o tipo da relação diz.
        let related_name = match activity.related {
            RelatedEntity::Customer(_) => customers.map(|c| c.name),
            RelatedEntity::Deal(_) => deals.map(|d| d.name),
        };

        Ok(ActivityRow { activity, related_name })
    }
}

// =========================================================================
//  FORMULÁRIOS (o modal de criação)
// =========================================================================

/// Um formulário de criação: valida no cliente e vira a linha a inserir.
pub trait InsertForm: Validate + Clone + Default + Serialize + DeserializeOwned + Send + Sync {
    type Insert: Serialize + Send + Sync;

    /// Valida e converte. Erro aqui nunca chega ao store.
    fn to_insert(&self) -> Result<Self::Insert, AppError>;
}

// Strings vazias de campos opcionais viram NULL
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn invalid(field: &'static str, message: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new("invalid").with_message(message.into()));
    AppError::ValidationError(errors)
}

// Só espaços conta como vazio
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_deal_stage(value: &str) -> Result<(), ValidationError> {
    DealStage::from_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("stage").with_message("Please select a valid stage!".into()))
}

fn validate_activity_type(value: &str) -> Result<(), ValidationError> {
    ActivityType::from_str(value).map(|_| ()).map_err(|_| {
        ValidationError::new("activity_type").with_message("Please select a valid activity type!".into())
    })
}

fn validate_entity_type(value: &str) -> Result<(), ValidationError> {
    match value {
        RelatedEntity::CUSTOMER | RelatedEntity::DEAL => Ok(()),
        _ => Err(ValidationError::new("entity_type")
            .with_message("Please select customer or deal!".into())),
    }
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("amount").with_message("Amount must not be negative!".into()));
    }
    Ok(())
}

// --- Cliente ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerForm {
    #[validate(custom(function = "validate_not_blank", message = "Please input customer name!"))]
    #[serde(default)]
    pub name: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    #[validate(email(message = "Please enter a valid email!"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl InsertForm for CustomerForm {
    type Insert = NewCustomer;

    fn to_insert(&self) -> Result<NewCustomer, AppError> {
        // E-mail vazio não é e-mail inválido
        let mut form = self.clone();
        form.email = non_empty(&self.email);
        form.validate()?;

        Ok(NewCustomer {
            name: form.name.trim().to_string(),
            company: non_empty(&form.company),
            industry: non_empty(&form.industry),
            email: form.email,
            phone: non_empty(&form.phone),
        })
    }
}

// --- Negócio ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct DealForm {
    #[validate(custom(function = "validate_not_blank", message = "Please input deal name!"))]
    #[serde(default)]
    pub name: String,
    #[validate(required(message = "Please select a customer!"))]
    pub customer_id: Option<Uuid>,
    #[validate(custom(function = "validate_non_negative"))]
    pub amount: Option<Decimal>,
    #[validate(required(message = "Please select a stage!"), custom(function = "validate_deal_stage"))]
    pub stage: Option<String>,
    pub expected_close_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100!"))]
    pub probability: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDeal {
    pub customer_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub stage: DealStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<i32>,
}

impl InsertForm for DealForm {
    type Insert = NewDeal;

    fn to_insert(&self) -> Result<NewDeal, AppError> {
        self.validate()?;

        let customer_id = self
            .customer_id
            .ok_or_else(|| invalid("customer_id", "Please select a customer!"))?;
        let stage = self
            .stage
            .as_deref()
            .and_then(|s| DealStage::from_str(s).ok())
            .ok_or_else(|| invalid("stage", "Please select a stage!"))?;

        Ok(NewDeal {
            customer_id,
            name: self.name.trim().to_string(),
            amount: self.amount,
            stage,
            expected_close_date: self.expected_close_date,
            probability: self.probability,
        })
    }
}

// --- Atividade ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ActivityForm {
    #[serde(rename = "type")]
    #[validate(required(message = "Please select activity type!"), custom(function = "validate_activity_type"))]
    pub kind: Option<String>,
    #[validate(custom(function = "validate_not_blank", message = "Please input activity title!"))]
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[validate(required(message = "Please select related entity type!"), custom(function = "validate_entity_type"))]
    pub entity_type: Option<String>,
    #[validate(required(message = "Please select the related record!"))]
    pub entity_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewActivity {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub related: RelatedEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl InsertForm for ActivityForm {
    type Insert = NewActivity;

    fn to_insert(&self) -> Result<NewActivity, AppError> {
        self.validate()?;

        let kind = self
            .kind
            .as_deref()
            .and_then(|k| ActivityType::from_str(k).ok())
            .ok_or_else(|| invalid("type", "Please select activity type!"))?;
        let entity_id = self
            .entity_id
            .ok_or_else(|| invalid("entity_id", "Please select the related record!"))?;
        let related = RelatedEntity::from_parts(self.entity_type.as_deref().unwrap_or_default(), entity_id)
            .map_err(|_| invalid("entity_type", "Please select related entity type!"))?;

        Ok(NewActivity {
            kind,
            title: self.title.trim().to_string(),
            description: non_empty(&self.description),
            related,
            due_date: self.due_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::field_messages;
    use serde_json::json;

    fn messages(err: AppError) -> crate::common::error::FieldErrors {
        match err {
            AppError::ValidationError(e) => field_messages(&e),
            other => panic!("esperava erro de validação, veio {other:?}"),
        }
    }

    fn valid_deal() -> DealForm {
        DealForm {
            name: "Website redesign".into(),
            customer_id: Some(Uuid::new_v4()),
            amount: Some(Decimal::from(5000)),
            stage: Some("proposal".into()),
            ..Default::default()
        }
    }

    #[test]
    fn stage_labels_replace_first_underscore() {
        assert_eq!(DealStage::Proposal.label(), "PROPOSAL");
        assert_eq!(DealStage::ClosedWon.label(), "CLOSED WON");
        assert!(DealStage::Negotiation.is_open());
        assert!(!DealStage::ClosedLost.is_open());
    }

    #[test]
    fn stage_round_trips_through_str() {
        for stage in DealStage::ALL {
            assert_eq!(stage.as_str().parse::<DealStage>(), Ok(stage));
        }
        assert!("won".parse::<DealStage>().is_err());
    }

    #[test]
    fn related_entity_rejects_unknown_discriminator() {
        let id = Uuid::new_v4();
        assert_eq!(RelatedEntity::from_parts("deal", id), Ok(RelatedEntity::Deal(id)));
        assert!(RelatedEntity::from_parts("document", id).is_err());
    }

    #[test]
    fn each_missing_deal_field_yields_exactly_one_message() {
        let cases: Vec<(&str, DealForm)> = vec![
            ("name", DealForm { name: String::new(), ..valid_deal() }),
            ("customer_id", DealForm { customer_id: None, ..valid_deal() }),
            ("stage", DealForm { stage: None, ..valid_deal() }),
        ];

        for (field, form) in cases {
            let errors = messages(form.to_insert().unwrap_err());
            assert_eq!(errors.len(), 1, "campo {field}: {errors:?}");
            assert_eq!(errors[field].len(), 1, "campo {field}: {errors:?}");
        }
    }

    fn valid_activity() -> ActivityForm {
        ActivityForm {
            kind: Some("call".into()),
            title: "Intro call".into(),
            entity_type: Some("customer".into()),
            entity_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    #[test]
    fn each_missing_customer_field_yields_exactly_one_message() {
        let cases: Vec<(&str, CustomerForm)> = vec![
            ("name", CustomerForm::default()),
            ("name", CustomerForm { name: "   ".into(), company: Some("Acme".into()), ..Default::default() }),
        ];

        for (field, form) in cases {
            let errors = messages(form.to_insert().unwrap_err());
            assert_eq!(errors.len(), 1, "campo {field}: {errors:?}");
            assert_eq!(errors[field], vec!["Please input customer name!".to_string()]);
        }
    }

    #[test]
    fn each_missing_activity_field_yields_exactly_one_message() {
        let cases: Vec<(&str, ActivityForm)> = vec![
            ("Please select activity type!", ActivityForm { kind: None, ..valid_activity() }),
            ("Please input activity title!", ActivityForm { title: String::new(), ..valid_activity() }),
            ("Please input activity title!", ActivityForm { title: " \t ".into(), ..valid_activity() }),
            ("Please select related entity type!", ActivityForm { entity_type: None, ..valid_activity() }),
            ("Please select the related record!", ActivityForm { entity_id: None, ..valid_activity() }),
        ];

        for (expected, form) in cases {
            let errors = messages(form.to_insert().unwrap_err());
            let all: Vec<&String> = errors.values().flatten().collect();
            assert_eq!(all, vec![expected], "{errors:?}");
        }
    }

    #[test]
    fn blank_deal_name_is_rejected() {
        let form = DealForm { name: "   ".into(), ..valid_deal() };
        let errors = messages(form.to_insert().unwrap_err());
        assert_eq!(errors["name"], vec!["Please input deal name!".to_string()]);
    }

    #[test]
    fn deal_stage_must_be_enumerated() {
        let form = DealForm { stage: Some("won".into()), ..valid_deal() };
        let errors = messages(form.to_insert().unwrap_err());
        assert_eq!(errors["stage"], vec!["Please select a valid stage!".to_string()]);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let form = DealForm { amount: Some(Decimal::from(-1)), ..valid_deal() };
        let errors = messages(form.to_insert().unwrap_err());
        assert!(errors.contains_key("amount"));
    }

    #[test]
    fn valid_deal_serializes_enum_as_snake_case() {
        let insert = valid_deal().to_insert().unwrap();
        let value = serde_json::to_value(&insert).unwrap();
        assert_eq!(value["stage"], json!("proposal"));
        assert_eq!(value["name"], json!("Website redesign"));
    }

    #[test]
    fn customer_form_treats_blank_email_as_absent() {
        let form = CustomerForm {
            name: "Acme".into(),
            email: Some("".into()),
            ..Default::default()
        };
        let insert = form.to_insert().unwrap();
        assert_eq!(insert.email, None);

        let bad = CustomerForm { email: Some("not-an-email".into()), ..form };
        let errors = messages(bad.to_insert().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn activity_form_flattens_relation_into_two_columns() {
        let deal_id = Uuid::new_v4();
        let form = ActivityForm {
            kind: Some("call".into()),
            title: "Intro call".into(),
            entity_type: Some("deal".into()),
            entity_id: Some(deal_id),
            ..Default::default()
        };

        let value = serde_json::to_value(form.to_insert().unwrap()).unwrap();
        assert_eq!(value["type"], json!("call"));
        assert_eq!(value["entity_type"], json!("deal"));
        assert_eq!(value["entity_id"], json!(deal_id));
    }

    #[test]
    fn activity_missing_type_reports_one_message() {
        let form = ActivityForm {
            kind: None,
            title: "Follow up".into(),
            entity_type: Some("customer".into()),
            entity_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let errors = messages(form.to_insert().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert!(errors.values().flatten().any(|m| m == "Please select activity type!"));
    }

    #[test]
    fn activity_row_picks_name_by_relation_type() {
        let customer_id = Uuid::new_v4();
        let row: ActivityRow = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "type": "note",
            "entity_type": "customer",
            "entity_id": customer_id,
            "title": "Kickoff notes",
            "created_at": "2024-03-05T10:00:00Z",
            "updated_at": "2024-03-05T10:00:00Z",
            "customers": { "name": "Acme Corp" },
            "deals": { "name": "Acme renewal" }
        }))
        .unwrap();

        assert_eq!(row.activity.related, RelatedEntity::Customer(customer_id));
        assert_eq!(row.related_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn activity_with_unknown_entity_type_fails_to_decode() {
        let result: Result<Activity, _> = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "type": "note",
            "entity_type": "document",
            "entity_id": Uuid::new_v4(),
            "title": "Orphan",
            "created_at": "2024-03-05T10:00:00Z",
            "updated_at": "2024-03-05T10:00:00Z"
        }));
        assert!(result.is_err());
    }
}
