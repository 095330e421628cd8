use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ClientId);
id_newtype!(PolicyId);
id_newtype!(PaymentId);
id_newtype!(NoteId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentFrequency {
    #[default]
    #[serde(rename = "mensual")]
    Monthly,
    #[serde(rename = "anual")]
    Annual,
}

impl PaymentFrequency {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Monthly => "mensual",
            Self::Annual => "anual",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl std::str::FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mensual" | "monthly" => Ok(Self::Monthly),
            "anual" | "annual" => Ok(Self::Annual),
            other => Err(format!("unknown payment frequency '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "pagado")]
    Paid,
    #[serde(rename = "pendiente")]
    Pending,
    #[default]
    #[serde(rename = "completado")]
    Completed,
}

impl PaymentStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Paid => "pagado",
            Self::Pending => "pendiente",
            Self::Completed => "completado",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pagado" | "paid" => Ok(Self::Paid),
            "pendiente" | "pending" => Ok(Self::Pending),
            "completado" | "completed" => Ok(Self::Completed),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// Fields of a client as sent on create and full update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "contacto_emergencia", default)]
    pub emergency_contact: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(
        rename = "fecha_nacimiento",
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(flatten)]
    pub details: ClientInput,
    #[serde(rename = "edad", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.details.name, self.details.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientNote {
    pub id: NoteId,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields of a policy as sent on create and full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInput {
    #[serde(rename = "tipo_seguro")]
    pub insurance_type: String,
    #[serde(rename = "prima_neta")]
    pub net_premium: Decimal,
    #[serde(rename = "asegurado")]
    pub insured: String,
    #[serde(rename = "vigencia_de", deserialize_with = "required_lenient_date")]
    pub valid_from: NaiveDate,
    #[serde(rename = "vigencia_hasta", deserialize_with = "required_lenient_date")]
    pub valid_to: NaiveDate,
    #[serde(rename = "periodicidad_pago", default)]
    pub payment_frequency: PaymentFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    #[serde(flatten)]
    pub terms: PolicyInput,
    #[serde(rename = "cliente_id", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(rename = "aseguradora", default, skip_serializing_if = "Option::is_none")]
    pub insurer: Option<String>,
    #[serde(rename = "archivo_pdf", default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInput {
    #[serde(rename = "fecha_pago", deserialize_with = "required_lenient_date")]
    pub payment_date: NaiveDate,
    #[serde(rename = "estado_pago", default)]
    pub status: PaymentStatus,
    #[serde(rename = "emision_pago")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    #[serde(rename = "poliza_id")]
    pub policy_id: PolicyId,
    #[serde(flatten)]
    pub details: PaymentInput,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(rename = "apellidos", default, skip_serializing_if = "Option::is_none")]
    pub client_last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.last_name).trim().to_string()
    }
}

/// Parses `YYYY-MM-DD`, or the date prefix of a backend timestamp such as
/// `2024-03-01T00:00:00.000000Z`.
pub fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_lenient_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{value}'"))),
    }
}

fn required_lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_lenient_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}
