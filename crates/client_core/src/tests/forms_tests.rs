use super::*;
use crate::attachment::{MAX_PDF_BYTES, PDF_MIME};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn filled_policy_form() -> PolicyForm {
    PolicyForm {
        insurance_type: "Gastos medicos".into(),
        net_premium: "12500.00".into(),
        insured: "Jorge Soto".into(),
        valid_from: Some(date(2024, 3, 15)),
        payment_frequency: PaymentFrequency::Monthly,
        attachment: None,
    }
}

#[test]
fn monthly_and_annual_end_dates_are_twelve_months_out() {
    let start = date(2024, 3, 15);
    assert_eq!(derive_end_date(start, PaymentFrequency::Monthly), date(2025, 3, 15));
    assert_eq!(derive_end_date(start, PaymentFrequency::Annual), date(2025, 3, 15));
}

#[test]
fn month_end_starts_stay_within_one_year() {
    for start in [date(2024, 1, 31), date(2023, 12, 31), date(2024, 2, 29)] {
        for frequency in [PaymentFrequency::Monthly, PaymentFrequency::Annual] {
            let end = derive_end_date(start, frequency);
            let days = (end - start).num_days();
            assert!(end > start, "{start} {frequency}");
            assert!(days <= 366, "{start} {frequency} -> {end}");
        }
    }
    assert_eq!(
        derive_end_date(date(2024, 2, 29), PaymentFrequency::Annual),
        date(2025, 2, 28)
    );
    assert_eq!(
        derive_end_date(date(2024, 2, 29), PaymentFrequency::Monthly),
        date(2025, 2, 28)
    );
}

#[test]
fn policy_form_recomputes_end_date_when_frequency_changes() {
    let mut form = filled_policy_form();
    assert_eq!(form.valid_to(), Some(date(2025, 3, 15)));

    form.valid_from = Some(date(2024, 2, 29));
    form.payment_frequency = PaymentFrequency::Annual;
    assert_eq!(form.valid_to(), Some(date(2025, 2, 28)));

    form.valid_from = None;
    assert_eq!(form.valid_to(), None);
}

#[test]
fn valid_policy_form_produces_submission() {
    let submission = filled_policy_form().validate().expect("valid form");
    assert_eq!(submission.terms.net_premium, Decimal::new(1250000, 2));
    assert_eq!(submission.terms.valid_to, date(2025, 3, 15));
    assert!(submission.attachment.is_none());
}

#[test]
fn policy_form_reports_each_missing_field() {
    let form = PolicyForm {
        net_premium: "0".into(),
        ..PolicyForm::default()
    };
    let errors = form.validate().unwrap_err();
    assert_eq!(errors.len(), 4);
    assert!(errors.get("insurance_type").is_some());
    assert_eq!(
        errors.get("net_premium"),
        Some("net premium must be greater than zero")
    );
    assert!(errors.get("insured").is_some());
    assert!(errors.get("valid_from").is_some());
}

#[test]
fn policy_form_rejects_invalid_attachment_before_submit() {
    let mut form = filled_policy_form();
    form.attachment = Some(Document::new("scan.png", "image/png", vec![0; 16]));
    assert!(form.validate().unwrap_err().get("attachment").is_some());

    form.attachment = Some(Document::new("huge.pdf", PDF_MIME, vec![0; MAX_PDF_BYTES + 1]));
    assert!(form.validate().unwrap_err().get("attachment").is_some());

    form.attachment = Some(Document::new("poliza.pdf", PDF_MIME, vec![0; 1024]));
    assert!(form.validate().expect("valid").attachment.is_some());
}

#[test]
fn client_form_requires_contact_fields_and_trims() {
    let errors = ClientForm::default().validate().unwrap_err();
    assert_eq!(errors.len(), 4);
    assert!(errors.get("emergency_contact").is_none());

    let input = ClientForm {
        name: " Ana ".into(),
        last_name: "Lopez".into(),
        phone: "555".into(),
        email: "ana@broker.test".into(),
        ..ClientForm::default()
    }
    .validate()
    .expect("valid");
    assert_eq!(input.name, "Ana");
    assert!(input.birth_date.is_none());
}

#[test]
fn payment_form_defaults_to_completed() {
    let input = PaymentForm {
        payment_date: Some(date(2024, 6, 1)),
        amount: "850.25".into(),
        ..PaymentForm::default()
    }
    .validate()
    .expect("valid");
    assert_eq!(input.status, PaymentStatus::Completed);

    let errors = PaymentForm::default().validate().unwrap_err();
    assert!(errors.get("payment_date").is_some());
    assert!(errors.get("amount").is_some());
}

#[test]
fn register_form_checks_password_length_and_confirmation() {
    let mut form = RegisterForm {
        name: "Ana".into(),
        last_name: "Lopez".into(),
        email: "ana@broker.test".into(),
        password: "12345".into(),
        password_confirmation: "12345".into(),
    };
    assert_eq!(
        form.validate().unwrap_err().get("password"),
        Some("password must be at least 6 characters")
    );

    form.password = "123456".into();
    assert!(form.validate().unwrap_err().get("password_confirmation").is_some());

    form.password_confirmation = "123456".into();
    assert!(form.validate().is_ok());
}

#[test]
fn form_errors_display_lists_fields() {
    let mut errors = FormErrors::default();
    errors.add("phone", "phone is required");
    errors.add("email", "email is required");
    errors.add("email", "ignored duplicate");
    assert_eq!(
        errors.to_string(),
        "email: email is required; phone: phone is required"
    );
}
