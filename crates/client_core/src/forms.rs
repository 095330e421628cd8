//! Editable copies of entities and the client-side checks run before submit.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use shared::domain::{
    Client, ClientInput, PaymentFrequency, PaymentInput, PaymentStatus, Policy, PolicyInput,
};

use crate::attachment::Document;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name to message, sorted by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientForm {
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub emergency_contact: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
}

impl ClientForm {
    /// Editable copy of an existing client.
    pub fn from_client(client: &Client) -> Self {
        let details = &client.details;
        Self {
            name: details.name.clone(),
            last_name: details.last_name.clone(),
            phone: details.phone.clone(),
            emergency_contact: details.emergency_contact.clone(),
            email: details.email.clone(),
            birth_date: details.birth_date,
        }
    }

    pub fn validate(&self) -> Result<ClientInput, FormErrors> {
        let mut errors = FormErrors::default();
        errors.require("name", &self.name, "name is required");
        errors.require("last_name", &self.last_name, "last name is required");
        errors.require("phone", &self.phone, "phone is required");
        errors.require("email", &self.email, "email is required");
        errors.into_result(|| ClientInput {
            name: self.name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            emergency_contact: self.emergency_contact.trim().to_string(),
            email: self.email.trim().to_string(),
            birth_date: self.birth_date,
        })
    }
}

/// End of coverage twelve months after `start`.
///
/// Annual policies move the year forward; monthly policies roll the month
/// forward twelve times. A Feb 29 start clamps to Feb 28 either way.
pub fn derive_end_date(start: NaiveDate, frequency: PaymentFrequency) -> NaiveDate {
    match frequency {
        PaymentFrequency::Annual => start
            .with_year(start.year() + 1)
            .or_else(|| NaiveDate::from_ymd_opt(start.year() + 1, start.month(), 28))
            .unwrap_or(start),
        PaymentFrequency::Monthly => start.checked_add_months(Months::new(12)).unwrap_or(start),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolicyForm {
    pub insurance_type: String,
    pub net_premium: String,
    pub insured: String,
    pub valid_from: Option<NaiveDate>,
    pub payment_frequency: PaymentFrequency,
    pub attachment: Option<Document>,
}

/// A validated policy ready to be sent, with its optional PDF.
#[derive(Debug, Clone)]
pub struct PolicySubmission {
    pub terms: PolicyInput,
    pub attachment: Option<Document>,
}

impl PolicyForm {
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            insurance_type: policy.terms.insurance_type.clone(),
            net_premium: policy.terms.net_premium.to_string(),
            insured: policy.terms.insured.clone(),
            valid_from: Some(policy.terms.valid_from),
            payment_frequency: policy.terms.payment_frequency,
            attachment: None,
        }
    }

    /// Recomputed whenever the start date or the frequency changes.
    pub fn valid_to(&self) -> Option<NaiveDate> {
        self.valid_from
            .map(|start| derive_end_date(start, self.payment_frequency))
    }

    pub fn validate(&self) -> Result<PolicySubmission, FormErrors> {
        let mut errors = FormErrors::default();
        errors.require(
            "insurance_type",
            &self.insurance_type,
            "insurance type is required",
        );
        let premium = self.net_premium.trim().parse::<Decimal>().ok();
        match premium {
            Some(value) if value > Decimal::ZERO => {}
            _ => errors.add("net_premium", "net premium must be greater than zero"),
        }
        errors.require("insured", &self.insured, "insured party is required");
        if self.valid_from.is_none() {
            errors.add("valid_from", "start date is required");
        }
        if let Some(document) = &self.attachment {
            if let Err(err) = document.validate_pdf() {
                errors.add("attachment", err.to_string());
            }
        }

        match (errors.is_empty(), premium, self.valid_from, self.valid_to()) {
            (true, Some(net_premium), Some(valid_from), Some(valid_to)) => Ok(PolicySubmission {
                terms: PolicyInput {
                    insurance_type: self.insurance_type.trim().to_string(),
                    net_premium,
                    insured: self.insured.trim().to_string(),
                    valid_from,
                    valid_to,
                    payment_frequency: self.payment_frequency,
                },
                attachment: self.attachment.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub amount: String,
}

impl PaymentForm {
    pub fn validate(&self) -> Result<PaymentInput, FormErrors> {
        let mut errors = FormErrors::default();
        if self.payment_date.is_none() {
            errors.add("payment_date", "payment date is required");
        }
        let amount = self.amount.trim().parse::<Decimal>().ok();
        if amount.is_none() {
            errors.add("amount", "issued amount is required");
        }
        match (errors.is_empty(), self.payment_date, amount) {
            (true, Some(payment_date), Some(amount)) => Ok(PaymentInput {
                payment_date,
                status: self.status,
                amount,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.require("name", &self.name, "name is required");
        errors.require("last_name", &self.last_name, "last name is required");
        errors.require("email", &self.email, "email is required");
        check_password(&mut errors, &self.password, &self.password_confirmation);
        errors.into_result(|| ())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPasswordForm {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl NewPasswordForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.require("email", &self.email, "email is required");
        check_password(&mut errors, &self.password, &self.password_confirmation);
        errors.into_result(|| ())
    }
}

fn check_password(errors: &mut FormErrors, password: &str, confirmation: &str) {
    if password.is_empty() {
        errors.add("password", "password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "password must be at least 6 characters");
    }
    if password != confirmation {
        errors.add("password_confirmation", "passwords do not match");
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub picture: Option<Document>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.require("name", &self.name, "all fields are required");
        errors.require("last_name", &self.last_name, "all fields are required");
        errors.require("email", &self.email, "all fields are required");
        if let Some(picture) = &self.picture {
            if let Err(err) = picture.validate_profile_picture() {
                errors.add("picture", err.to_string());
            }
        }
        errors.into_result(|| ())
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
