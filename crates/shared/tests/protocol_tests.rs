use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use shared::{
    domain::{Client, ClientId, Payment, PaymentFrequency, PaymentStatus, Policy, PolicyId},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{
        total_pages_for, ClientPoliciesPage, ClientSearchPage, HomeSearchResponse,
        HomeSearchResults, LaravelPage, NotesResponse, Page, PolicyPaymentsPage, Saved,
        UserPaymentsPage,
    },
};

fn client_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "nombre": "Ana",
        "apellidos": "Lopez",
        "telefono": "555-0100",
        "contacto_emergencia": "Luis",
        "correo": "ana@example.com",
        "fecha_nacimiento": "1990-04-12T00:00:00.000000Z"
    })
}

fn policy_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "tipo_seguro": "Auto",
        "prima_neta": "1500.50",
        "asegurado": "Ana Lopez",
        "vigencia_de": "2024-01-15",
        "vigencia_hasta": "2025-01-15",
        "periodicidad_pago": "anual",
        "cliente_id": 3
    })
}

#[test]
fn total_pages_rounds_up_and_never_drops_below_one() {
    assert_eq!(total_pages_for(0, 5), 1);
    assert_eq!(total_pages_for(5, 5), 1);
    assert_eq!(total_pages_for(6, 5), 2);
    assert_eq!(total_pages_for(23, 5), 5);
    assert_eq!(total_pages_for(10, 0), 1);
}

#[test]
fn laravel_page_derives_total_pages_from_total_and_per_page() {
    let raw: LaravelPage<Client> = serde_json::from_value(json!({
        "data": [client_json(1), client_json(2)],
        "total": 12,
        "per_page": 5,
        "current_page": 3,
        "last_page": 99
    }))
    .expect("laravel page");

    let page: Page<Client> = raw.into();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_items, Some(12));
}

#[test]
fn laravel_page_without_counts_falls_back_to_last_page() {
    let raw: LaravelPage<Policy> = serde_json::from_value(json!({
        "data": [policy_json(1)],
        "last_page": 4
    }))
    .expect("laravel page");
    let page: Page<Policy> = raw.into();
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.current_page, 1);
}

#[test]
fn client_wire_names_map_to_english_fields() {
    let client: Client = serde_json::from_value(client_json(7)).expect("client");
    assert_eq!(client.id, ClientId(7));
    assert_eq!(client.details.phone, "555-0100");
    assert_eq!(client.details.emergency_contact, "Luis");
    assert_eq!(
        client.details.birth_date,
        NaiveDate::from_ymd_opt(1990, 4, 12)
    );
    assert_eq!(client.full_name(), "Ana Lopez");

    let out = serde_json::to_value(&client.details).expect("serialize");
    assert_eq!(out["nombre"], "Ana");
    assert_eq!(out["fecha_nacimiento"], "1990-04-12");
}

#[test]
fn client_with_blank_birth_date_parses_as_none() {
    let mut raw = client_json(1);
    raw["fecha_nacimiento"] = json!("");
    let client: Client = serde_json::from_value(raw).expect("client");
    assert!(client.details.birth_date.is_none());
}

#[test]
fn policy_accepts_string_premium_and_frequency_names() {
    let policy: Policy = serde_json::from_value(policy_json(4)).expect("policy");
    assert_eq!(policy.id, PolicyId(4));
    assert_eq!(policy.terms.net_premium, Decimal::new(150050, 2));
    assert_eq!(policy.terms.payment_frequency, PaymentFrequency::Annual);
    assert_eq!(policy.client_id, Some(ClientId(3)));
    assert!(policy.attachment.is_none());
}

#[test]
fn client_search_page_accepts_spanish_total_alias() {
    let raw: ClientSearchPage = serde_json::from_value(json!({
        "clients": [client_json(1)],
        "totalPaginas": 6,
        "currentPage": 2
    }))
    .expect("search page");
    let page: Page<Client> = raw.into();
    assert_eq!(page.total_pages, 6);
    assert_eq!(page.current_page, 2);
}

#[test]
fn client_policies_page_defaults_to_single_page() {
    let raw: ClientPoliciesPage = serde_json::from_value(json!({
        "polizas": [policy_json(1), policy_json(2)]
    }))
    .expect("client policies page");
    let page: Page<Policy> = raw.into();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn user_and_policy_payment_pages_use_their_own_key_styles() {
    let payment = json!({
        "id": 1,
        "poliza_id": 4,
        "fecha_pago": "2024-02-01",
        "estado_pago": "pendiente",
        "emision_pago": 320.75,
        "nombre": "Ana",
        "apellidos": "Lopez"
    });

    let user_page: Page<Payment> = serde_json::from_value::<UserPaymentsPage>(json!({
        "pagos": [payment.clone()],
        "perPage": 5,
        "total": 11
    }))
    .expect("user payments")
    .into();
    assert_eq!(user_page.total_pages, 3);
    assert_eq!(
        user_page.items[0].details.status,
        PaymentStatus::Pending
    );

    let policy_page: Page<Payment> = serde_json::from_value::<PolicyPaymentsPage>(json!({
        "pagos": [payment],
        "total_pages": 2,
        "current_page": 2,
        "total": 6
    }))
    .expect("policy payments")
    .into();
    assert_eq!(policy_page.current_page, 2);
    assert_eq!(policy_page.total_pages, 2);
    assert_eq!(policy_page.items[0].policy_id, PolicyId(4));
}

#[test]
fn home_search_splits_into_two_pages() {
    let raw: HomeSearchResponse = serde_json::from_value(json!({
        "clients": [client_json(1)],
        "policies": [policy_json(2)],
        "totalClients": 1,
        "totalPolicies": 9,
        "currentPage": 1,
        "totalPagesClients": 1,
        "totalPagesPolicies": 2
    }))
    .expect("home search");
    let results = HomeSearchResults::from(raw);
    assert_eq!(results.clients.items.len(), 1);
    assert_eq!(results.policies.total_pages, 2);
    assert_eq!(results.policies.total_items, Some(9));
}

#[test]
fn notes_response_accepts_bare_and_wrapped_arrays() {
    let note = json!({ "id": 1, "contenido": "Llamar", "created_at": "2024-05-01T10:00:00.000000Z" });
    let bare: NotesResponse = serde_json::from_value(json!([note.clone()])).expect("bare");
    let wrapped: NotesResponse =
        serde_json::from_value(json!({ "notas": [note] })).expect("wrapped");
    assert_eq!(bare.into_notes().len(), 1);
    let notes = wrapped.into_notes();
    assert_eq!(notes[0].content, "Llamar");
    assert!(notes[0].created_at.is_some());
}

#[test]
fn api_error_summary_includes_field_messages() {
    let body: ApiError = serde_json::from_value(json!({
        "message": "The given data was invalid.",
        "errors": { "correo": ["The correo field is required."] }
    }))
    .expect("error body");
    let exception = ApiException::new(422, &body);
    assert_eq!(exception.code, ErrorCode::Validation);
    assert_eq!(
        exception.message,
        "The given data was invalid. (The correo field is required.)"
    );
}

#[test]
fn saved_answer_accepts_wrapped_bare_or_message_only() {
    let wrapped: Saved<Client> =
        serde_json::from_value(json!({ "message": "ok", "cliente": client_json(4) }))
            .expect("wrapped");
    assert_eq!(wrapped.into_record().map(|c| c.id), Some(ClientId(4)));

    let bare: Saved<Policy> = serde_json::from_value(policy_json(9)).expect("bare");
    assert_eq!(bare.into_record().map(|p| p.id), Some(PolicyId(9)));

    let ack: Saved<Client> =
        serde_json::from_value(json!({ "message": "Cliente actualizado" })).expect("ack");
    assert!(ack.into_record().is_none());
}
